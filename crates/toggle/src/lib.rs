//! Toggle behavior: every element carrying the marker class starts closed, and
//! a click anywhere inside it flips the clicked node's parent between the open
//! and closed labels.

pub mod config;
pub mod error;
pub mod handler;
pub mod initializer;

pub use config::{ConfigError, ToggleConfig};
pub use error::ToggleError;
pub use handler::{ToggleState, state_of, toggle_click};
pub use initializer::{CLICK_LISTENER, add_toggle_listeners, install};
