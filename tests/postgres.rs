//! End-to-end tests against a real PostgreSQL database
//!
//! Run with `DATABASE_URL=postgres://... cargo test -- --ignored`.

use rust_decimal::Decimal;
use sqlx::postgres::{PgPool, PgPoolOptions};
use tsquery::config::ExecutorConfig;
use tsquery::{compile_query, parser, Catalog, ExecuteError, Executor, MetricScope, QueryRequest, Row, SeriesSource};

const CATALOG: &str = r#"
orgs:
  - id: 1
    content_metrics:
      - { name: pageviews, kind: count, aggregation: sum }
      - { name: followers, kind: cumulative, aggregation: max }
      - { name: shares, kind: cumulative, aggregation: sum }
      - { name: rank, kind: count, aggregation: last }
"#;

/// One connection, so the session time zone applies to every statement
async fn setup() -> PgPool {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect(&url)
        .await
        .expect("connect");
    sqlx::raw_sql("SET TIME ZONE 'UTC'").execute(&pool).await.expect("set time zone");
    sqlx::raw_sql(include_str!("test_data/postgres_fixture.sql"))
        .execute(&pool)
        .await
        .expect("load fixture");
    pool
}

fn source() -> SeriesSource {
    SeriesSource::new("tsq_test_series", "content_item_id", "tsq_test_calendar", MetricScope::Content).unwrap()
}

fn catalog() -> Catalog {
    parser::parse_str(CATALOG).unwrap()
}

async fn run(pool: &PgPool, request: QueryRequest) -> Vec<Row> {
    let spec = request.into_spec().unwrap();
    let compiled = compile_query(&catalog(), &source(), 1, &spec).unwrap();
    let executor = Executor::new(pool.clone(), &ExecutorConfig { fetch_size: 2, statement_timeout_ms: Some(10_000) });

    let mut stream = executor.execute(&compiled).await.unwrap();
    let mut rows = Vec::new();
    while let Some(row) = stream.next().await.unwrap() {
        rows.push(row);
    }
    rows
}

fn dec(value: i64) -> Option<Decimal> {
    Some(Decimal::from(value))
}

#[tokio::test]
#[ignore = "needs a PostgreSQL database in DATABASE_URL"]
async fn test_daily_dense_scenario() {
    let pool = setup().await;
    let rows = run(&pool, QueryRequest {
        ids: vec![1, 2],
        unit: Some("day".into()),
        sparse: Some(false),
        select: Some(tsquery::query::OneOrMany::Many(vec!["pageviews".into(), "followers".into()])),
        after: Some("2015-04-01".into()),
        before: Some("2015-04-03".into()),
        ..Default::default()
    })
    .await;

    // 3 days x 2 entities, ordered by day then entity
    let got: Vec<_> = rows
        .iter()
        .map(|r| (r.bucket.format("%m-%d").to_string(), r.entity_id, r.get("pageviews"), r.get("followers")))
        .collect();
    let expected = vec![
        ("04-01".to_string(), Some(1), dec(8), dec(100)),
        ("04-01".to_string(), Some(2), dec(0), dec(0)),
        ("04-02".to_string(), Some(1), dec(0), dec(0)),
        ("04-02".to_string(), Some(2), dec(7), dec(50)),
        ("04-03".to_string(), Some(1), dec(2), dec(20)),
        ("04-03".to_string(), Some(2), dec(0), dec(0)),
    ];
    assert_eq!(got, expected);
}

#[tokio::test]
#[ignore = "needs a PostgreSQL database in DATABASE_URL"]
async fn test_cumulative_round_trip() {
    let pool = setup().await;
    let rows = run(&pool, QueryRequest {
        ids: vec![1],
        select: Some(tsquery::query::OneOrMany::One("shares".into())),
        transform: Some("cumulative".into()),
        ..Default::default()
    })
    .await;

    // Deltas of the stored running total summed back up
    let shares: Vec<_> = rows.iter().map(|r| r.get("shares")).collect();
    assert_eq!(shares, vec![dec(10), dec(15), dec(40)]);
}

#[tokio::test]
#[ignore = "needs a PostgreSQL database in DATABASE_URL"]
async fn test_ungrouped_merges_entities() {
    let pool = setup().await;
    let rows = run(&pool, QueryRequest {
        ids: vec![1, 2],
        unit: Some("day".into()),
        group_by_id: Some(false),
        select: Some(tsquery::query::OneOrMany::One("pageviews".into())),
        ..Default::default()
    })
    .await;

    assert!(rows.iter().all(|r| r.entity_id.is_none()));
    let pageviews: Vec<_> = rows.iter().map(|r| r.get("pageviews")).collect();
    assert_eq!(pageviews, vec![dec(8), dec(7), dec(2)]);
}

#[tokio::test]
#[ignore = "needs a PostgreSQL database in DATABASE_URL"]
async fn test_date_only_before_includes_that_day() {
    let pool = setup().await;
    let rows = run(&pool, QueryRequest {
        ids: vec![2],
        unit: Some("day".into()),
        sparse: Some(false),
        select: Some(tsquery::query::OneOrMany::One("pageviews".into())),
        after: Some("2015-04-01".into()),
        before: Some("2015-04-02".into()),
        ..Default::default()
    })
    .await;

    // The 09:00 measurement on the 2nd is inside the window
    let got: Vec<_> = rows.iter().map(|r| (r.bucket.format("%m-%d").to_string(), r.get("pageviews"))).collect();
    assert_eq!(got, vec![("04-01".to_string(), dec(0)), ("04-02".to_string(), dec(7))]);
}

#[tokio::test]
#[ignore = "needs a PostgreSQL database in DATABASE_URL"]
async fn test_dense_quarter() {
    let pool = setup().await;
    let rows = run(&pool, QueryRequest {
        ids: vec![1, 2],
        unit: Some("quarter".into()),
        sparse: Some(false),
        select: Some(tsquery::query::OneOrMany::One("pageviews".into())),
        ..Default::default()
    })
    .await;

    let got: Vec<_> = rows
        .iter()
        .map(|r| (r.bucket.format("%Y-%m-%d").to_string(), r.entity_id, r.get("pageviews")))
        .collect();
    assert_eq!(
        got,
        vec![
            ("2015-04-01".to_string(), Some(1), dec(10)),
            ("2015-04-01".to_string(), Some(2), dec(7)),
        ]
    );
}

#[tokio::test]
#[ignore = "needs a PostgreSQL database in DATABASE_URL"]
async fn test_last_takes_latest_hour() {
    let pool = setup().await;
    let rows = run(&pool, QueryRequest {
        ids: vec![1],
        unit: Some("day".into()),
        select: Some(tsquery::query::OneOrMany::One("rank".into())),
        ..Default::default()
    })
    .await;

    // 04-01 has rank 5 at 10:00 and rank 3 at 11:00
    let got: Vec<_> = rows.iter().map(|r| (r.bucket.format("%m-%d").to_string(), r.get("rank"))).collect();
    assert_eq!(got, vec![("04-01".to_string(), dec(3)), ("04-03".to_string(), dec(9))]);
}

#[tokio::test]
#[ignore = "needs a PostgreSQL database in DATABASE_URL"]
async fn test_closed_stream() {
    let pool = setup().await;
    let spec = QueryRequest { ids: vec![1], ..Default::default() }.into_spec().unwrap();
    let compiled = compile_query(&catalog(), &source(), 1, &spec).unwrap();
    let executor = Executor::new(pool.clone(), &ExecutorConfig::default());

    let mut stream = executor.execute(&compiled).await.unwrap();
    assert!(stream.next().await.unwrap().is_some());
    stream.close().await;
    assert!(matches!(stream.next().await, Err(ExecuteError::StreamClosed)));

    // The connection is usable again once the cursor is released
    let again = executor.execute(&compiled).await.unwrap();
    drop(again);
}
