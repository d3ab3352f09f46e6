//! Integration test driver for the `tests/integration/` submodules.
//!
//! Each `mod` below maps to a file that drives a [`CardService`] through
//! mock host adapters.  No dashboard runtime is required.
//!
//! [`CardService`]: remotecard::CardService

mod activity_flow_tests;
mod button_gating_tests;
mod mock_host;
mod theme_tests;
