//! HTTP surface of chatbench: preset CRUD plus the trigger/events/abort
//! completion relay.

pub mod api;
pub mod config;

pub use api::build_router;
