// elklogs - platform/mod.rs
//
// Platform layer: config directories/files and the HTTP log-store client.
// Implements the `Connector` contract defined by the app layer.

pub mod config;
pub mod elastic;
