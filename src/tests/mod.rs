//! Crate-level tests run against the library's public API.

mod service_tests;
