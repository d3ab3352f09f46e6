//! Application core: reconciliation logic, zero host I/O.
//!
//! All interaction with the dashboard host happens through the **port
//! traits** defined in [`ports`], keeping this layer testable with plain
//! in-memory mocks.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
