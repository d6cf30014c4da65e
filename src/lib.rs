// elklogs - lib.rs
//
// Library entry point, exposing all modules for integration testing
// and programmatic use. The binary in `main.rs` only wires them together.

pub mod app;
pub mod core;
pub mod platform;
pub mod util;
