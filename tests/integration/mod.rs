//! Integration tests for health_probe
//!
//! Each test starts an in-process probe server on an ephemeral port and
//! talks to it over HTTP with reqwest.
//!
//! Run with: cargo test --test integration

mod helpers;

mod concurrency;
mod probes;
