//! Integration tests for the cumulative transform and delta conversion

mod common;

use common::compile;
use tsquery::{QueryRequest, StageKind};

fn cumulative(ids: Vec<i64>) -> QueryRequest {
    QueryRequest {
        ids,
        transform: Some("cumulative".into()),
        ..Default::default()
    }
}

#[test]
fn test_cumulative_over_init() {
    let compiled = compile(1, cumulative(vec![1]));

    assert_eq!(compiled.stages, vec![StageKind::Init, StageKind::Cumulative]);
    assert!(compiled.sql.contains(
        "SUM(\"pageviews\") OVER (PARTITION BY \"content_item_id\" ORDER BY \"datetime\" ASC) AS \"pageviews\""
    ));
    assert!(compiled.sql.contains(
        "SUM(\"twitter_shares\") OVER (PARTITION BY \"content_item_id\" ORDER BY \"datetime\" ASC) AS \"twitter_shares\""
    ));
    assert!(compiled.sql.contains(
        "SUM(\"social_shares\") OVER (PARTITION BY \"content_item_id\" ORDER BY \"datetime\" ASC) AS \"social_shares\""
    ));
}

#[test]
fn test_non_sum_metrics_pass_through() {
    let compiled = compile(1, cumulative(vec![1]));

    for metric in ["facebook_shares", "time_on_page", "rank"] {
        assert!(!compiled.sql.contains(&format!("SUM(\"{}\") OVER", metric)));
    }
    let outer = compiled.sql.lines().next().unwrap();
    assert!(outer.contains(", \"facebook_shares\", "));
    assert!(outer.contains(", \"rank\", "));
}

#[test]
fn test_cumulative_sources_become_deltas() {
    let compiled = compile(1, QueryRequest { ids: vec![1], ..Default::default() });

    // twitter_shares is stored as a running total
    assert!(compiled.sql.contains(
        "COALESCE(((\"metrics\" ->> 'twitter_shares')::numeric - LAG((\"metrics\" ->> 'twitter_shares')::numeric) \
         OVER (PARTITION BY \"content_item_id\" ORDER BY \"datetime\" ASC)), (\"metrics\" ->> 'twitter_shares')::numeric) AS \"twitter_shares\""
    ));
    // pageviews is already a per-period count
    assert!(compiled.sql.contains("(\"metrics\" ->> 'pageviews')::numeric AS \"pageviews\""));
    assert!(!compiled.sql.contains("LAG((\"metrics\" ->> 'pageviews')"));
}

#[test]
fn test_cumulative_ungrouped_runs_one_total() {
    let compiled = compile(1, QueryRequest {
        group_by_id: Some(false),
        ..cumulative(vec![1, 2])
    });

    assert_eq!(compiled.stages, vec![StageKind::Init, StageKind::Aggregate, StageKind::Cumulative]);
    assert!(compiled.sql.contains("SUM(\"pageviews\") OVER (ORDER BY \"datetime\" ASC) AS \"pageviews\""));
    // Deltas are still taken per entity before merging
    assert!(compiled.sql.contains("LAG((\"metrics\" ->> 'twitter_shares')::numeric) OVER (PARTITION BY \"content_item_id\""));
}

#[test]
fn test_cumulative_over_dense_monthly() {
    let compiled = compile(1, QueryRequest {
        unit: Some("month".into()),
        sparse: Some(false),
        ..cumulative(vec![1])
    });

    assert_eq!(
        compiled.stages,
        vec![StageKind::Init, StageKind::Aggregate, StageKind::Densify, StageKind::Cumulative]
    );
    assert!(compiled.sql.contains("'1 months'"));
    assert!(compiled.sql.contains(") AS \"_p\"\nORDER BY \"datetime\" ASC, \"content_item_id\" ASC"));
}
