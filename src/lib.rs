//! Remote card core.
//!
//! State reconciliation and capability gating for a universal-remote
//! dashboard card: turns noisy, asynchronously updated hub state into a
//! consistent render state without looping on its own writes.
//!
//! The host drives [`app::service::CardService`] through the port traits in
//! [`app::ports`]; everything else is pure logic.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod attributes;
pub mod capability;
pub mod catalog;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod fsm;
pub mod gating;
pub mod loading;
pub mod render;
pub mod scheduler;
pub mod theme;

pub use app::commands::CardCommand;
pub use app::events::CardEvent;
pub use app::service::CardService;
pub use config::CardConfig;
pub use error::{ConfigError, Error, Result, ServiceError};
pub use render::RenderState;
