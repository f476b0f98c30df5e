//! Vela Core - Player overlay logic for Vela
//!
//! This crate provides the platform-neutral part of the player overlay:
//! - Overlay state machine and session ownership
//! - Quality selector labels and rendition pinning
//! - Engine error classification and recovery policy
//! - Page guard shortcut policy
//! - Serde-backed configuration
//!
//! Streaming itself is delegated to an adaptive-streaming engine behind
//! [`EngineProvider`]; the page is reached only through [`PlayerView`].
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         Vela Core                           │
//! ├─────────────────────────────────────────────────────────────┤
//! │                                                             │
//! │  ┌──────────────┐   ┌──────────────────┐   ┌─────────────┐  │
//! │  │    Engine    │◀──│ PlayerController │──▶│ PlayerView  │  │
//! │  │   Provider   │   └────────┬─────────┘   └─────────────┘  │
//! │  └──────┬───────┘            │                              │
//! │         │ events      ┌──────┴──────┐                       │
//! │         └────────────▶│   Session   │                       │
//! │          (token)      └─────────────┘                       │
//! │                                                             │
//! │  ┌──────────────┐   ┌──────────────┐                        │
//! │  │ Guard Policy │   │    Config    │                        │
//! │  └──────────────┘   └──────────────┘                        │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod controller;
pub mod engine;
pub mod error;
pub mod guard;
pub mod session;
pub mod types;
pub mod view;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use config::{DomConfig, EngineConfig, OverlayConfig};
pub use controller::{messages, PlayerController};
pub use engine::{EngineProvider, StreamingEngine};
pub use error::{Error, Result};
pub use guard::{KeyChord, Shortcut, NON_DRAGGABLE_SELECTOR};
pub use session::Session;
pub use types::*;
pub use view::PlayerView;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
