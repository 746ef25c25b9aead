//! Shared test utilities for flow-navigator integration tests
//!
//! Tests run against real git repositories in temporary directories.

pub mod assertions;
pub mod fixtures;
pub mod repository;
