// Library target exists for the criterion benchmarks and integration tests.
// The binary entry point is main.rs; this file re-declares the module tree so
// harnesses can import types via `kanadr::engine::*` / `kanadr::store::*`.
// Most code is only exercised through the binary, so suppress dead_code
// warnings.
#![allow(dead_code)]

// Public: used directly by benchmarks and integration tests
pub mod catalog;
pub mod engine;
pub mod session;
pub mod store;

// Private: required transitively (won't compile without them)
mod app;
mod config;
mod event;
mod ui;
