//! Integration Test Harness
//!
//! End-to-end tests over the orchestration engine with an in-memory
//! database and a scripted mock model provider. No network calls are made.

mod support;

mod mirror_test;
mod orchestrator_test;
