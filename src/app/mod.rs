// elklogs - app/mod.rs
//
// Application layer: query construction and the tail loop.
// Dependencies: core layer.
// Must NOT depend on: platform specifics (the store is reached via `Connector`).

pub mod query;
pub mod tail;
