//! Integration tests for the Metricscache API.
//!
//! These tests verify the complete flow of publishing and querying
//! metrics through the HTTP API.

mod admin_tests;
mod common;
mod health_tests;
mod ingest_tests;
mod query_tests;
