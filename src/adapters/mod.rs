//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter     | Implements           | Connects to                 |
//! |-------------|----------------------|-----------------------------|
//! | `log_sink`  | EventSink            | `log` facade                |
//! | `sim_host`  | ServicePort          | recorded outbound calls     |
//! |             | StylePort, ThemePort | in-memory style + registry  |
//! |             | RenderSink           | JSON lines on a writer      |

pub mod log_sink;
pub mod sim_host;
