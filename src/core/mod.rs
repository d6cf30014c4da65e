// elklogs - core/mod.rs
//
// Core business logic layer: index selection, field lookup, entry formatting.
// Must NOT depend on: app, platform, or any network crate directly.

pub mod expr;
pub mod format;
pub mod index;
pub mod model;
