//! Unit tests for the message module.
//!
//! Tests are organised by pipeline stage, covering happy paths, error cases,
//! and edge cases for all public APIs.


mod addressing_tests;
mod content_tests;
