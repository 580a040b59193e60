//! Shared test utilities for integration tests

#![allow(dead_code)]

use tsquery::{compile_query, parser, Catalog, CompiledQuery, OrgId, QueryRequest, SeriesSource};

/// Load a test fixture from the tests/test_data directory
pub fn load_fixture(name: &str) -> Catalog {
    let path = format!("tests/test_data/{}", name);
    parser::parse_file(&path)
        .unwrap_or_else(|e| panic!("Failed to load test data {}: {}", name, e))
}

/// Run the full pipeline: catalog + request → compiled SQL
pub fn run_pipeline(
    catalog: &Catalog,
    source: &SeriesSource,
    org: OrgId,
    request: QueryRequest,
) -> Result<CompiledQuery, String> {
    let spec = request
        .into_spec()
        .map_err(|e| format!("Invalid request: {}", e))?;
    compile_query(catalog, source, org, &spec).map_err(|e| format!("Compilation failed: {}", e))
}

/// Compile a content-item query against the newsroom fixture
pub fn compile(org: OrgId, request: QueryRequest) -> CompiledQuery {
    let catalog = load_fixture("newsroom.yaml");
    run_pipeline(&catalog, &SeriesSource::CONTENT, org, request).expect("Pipeline should succeed")
}
