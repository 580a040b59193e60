//! Integration tests for dense (gap-filled) output

mod common;

use common::compile;
use tsquery::{QueryRequest, StageKind};

const SCENARIO_SQL: &str = r#"SELECT "cal"."datetime", "cal"."content_item_id", COALESCE("sparse"."followers", 0) AS "followers", COALESCE("sparse"."pageviews", 0) AS "pageviews"
FROM "content_metric_calendar"('1 days', ARRAY[1, 2]::bigint[], '2015-04-01T00:00:00Z'::timestamptz, '2015-04-03T23:59:59.999999Z'::timestamptz) AS "cal"
LEFT JOIN (
  SELECT date_trunc('day', "datetime") AS "datetime", "content_item_id", ROUND(MAX("followers"), 2) AS "followers", ROUND(SUM("pageviews"), 2) AS "pageviews"
  FROM (
    SELECT date_trunc('hour', "datetime") AS "datetime", "content_item_id", COALESCE((("metrics" ->> 'followers')::numeric - LAG(("metrics" ->> 'followers')::numeric) OVER (PARTITION BY "content_item_id" ORDER BY "datetime" ASC)), ("metrics" ->> 'followers')::numeric) AS "followers", ("metrics" ->> 'pageviews')::numeric AS "pageviews"
    FROM "content_metric_timeseries"
    WHERE ("content_item_id" IN (1, 2) AND "datetime" >= '2015-04-01T00:00:00Z'::timestamptz AND "datetime" <= '2015-04-03T23:59:59.999999Z'::timestamptz)
  ) AS "_a"
  GROUP BY date_trunc('day', "datetime"), "content_item_id"
) AS "sparse"
  ON "cal"."datetime" = "sparse"."datetime" AND "cal"."content_item_id" = "sparse"."content_item_id"
ORDER BY "datetime" ASC, "content_item_id" ASC"#;

#[test]
fn test_daily_dense_scenario() {
    // pageviews: count/sum, followers: cumulative/max
    let compiled = compile(2, QueryRequest {
        ids: vec![2, 1],
        unit: Some("day".into()),
        sparse: Some(false),
        after: Some("2015-04-01".into()),
        before: Some("2015-04-03".into()),
        ..Default::default()
    });

    assert_eq!(compiled.stages, vec![StageKind::Init, StageKind::Aggregate, StageKind::Densify]);
    assert_eq!(compiled.columns.metrics, vec!["followers", "pageviews"]);
    assert_eq!(compiled.sql, SCENARIO_SQL);
}

#[test]
fn test_hourly_dense_joins_init_directly() {
    let compiled = compile(2, QueryRequest {
        ids: vec![1],
        sparse: Some(false),
        ..Default::default()
    });

    assert_eq!(compiled.stages, vec![StageKind::Init, StageKind::Densify]);
    assert!(!compiled.sql.contains("GROUP BY"));
    assert!(compiled.sql.contains("'1 hours'"));
}

#[test]
fn test_dense_quarter_steps_three_months() {
    let compiled = compile(2, QueryRequest {
        ids: vec![1, 2],
        unit: Some("quarter".into()),
        sparse: Some(false),
        ..Default::default()
    });

    assert_eq!(compiled.stages, vec![StageKind::Init, StageKind::Aggregate, StageKind::Densify]);
    assert!(compiled.sql.contains("\"content_metric_calendar\"('3 months', ARRAY[1, 2]::bigint[]"));
    assert!(compiled.sql.contains("date_trunc('quarter', \"datetime\") AS \"datetime\""));
    assert!(!compiled.sql.contains("quarters"));
}

#[test]
fn test_date_only_before_keeps_last_day() {
    let compiled = compile(2, QueryRequest {
        ids: vec![2],
        unit: Some("day".into()),
        sparse: Some(false),
        after: Some("2015-04-01".into()),
        before: Some("2015-04-02".into()),
        ..Default::default()
    });

    // Rows later on the 2nd still fall inside the window
    assert!(compiled.sql.contains("\"datetime\" <= '2015-04-02T23:59:59.999999Z'::timestamptz"));
    assert!(compiled.sql.contains("'2015-04-01T00:00:00Z'::timestamptz, '2015-04-02T23:59:59.999999Z'::timestamptz)"));
}

#[test]
fn test_missing_bounds_are_typed_nulls() {
    let compiled = compile(2, QueryRequest {
        ids: vec![1],
        unit: Some("day".into()),
        sparse: Some(false),
        before: Some("2015-04-03T12:30:00".into()),
        ..Default::default()
    });

    assert!(compiled.sql.contains(
        "ARRAY[1]::bigint[], CAST(NULL AS TIMESTAMPTZ), '2015-04-03T12:30:00Z'::timestamptz)"
    ));
    // Only the upper bound filters raw rows
    assert!(compiled.sql.contains("\"datetime\" <= '2015-04-03T12:30:00Z'::timestamptz"));
    assert!(!compiled.sql.contains("\"datetime\" >="));
}

#[test]
fn test_ungrouped_dense_uses_distinct_calendar() {
    let compiled = compile(2, QueryRequest {
        ids: vec![1, 2],
        unit: Some("week".into()),
        sparse: Some(false),
        group_by_id: Some(false),
        ..Default::default()
    });

    assert!(compiled.sql.contains("SELECT DISTINCT \"datetime\"\n  FROM \"content_metric_calendar\"('1 weeks'"));
    assert!(compiled.sql.contains("ON \"cal\".\"datetime\" = \"sparse\".\"datetime\"\n"));
    assert!(!compiled.sql.contains("\"cal\".\"content_item_id\""));
    assert!(compiled.sql.ends_with("ORDER BY \"datetime\" ASC"));
}

#[test]
fn test_every_metric_zero_filled() {
    let compiled = compile(1, QueryRequest {
        ids: vec![1],
        unit: Some("day".into()),
        sparse: Some(false),
        ..Default::default()
    });

    for metric in &compiled.columns.metrics {
        let filled = format!("COALESCE(\"sparse\".\"{m}\", 0) AS \"{m}\"", m = metric);
        assert!(compiled.sql.contains(&filled), "{} is not zero-filled", metric);
    }
}
