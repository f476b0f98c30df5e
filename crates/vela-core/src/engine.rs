//! Streaming engine seam
//!
//! The controller never fetches or decodes media itself. It drives an
//! adaptive-streaming engine through these traits; the browser build
//! implements them over hls.js, tests implement them with recorders.

use crate::{config::EngineConfig, types::SessionToken, Result};

/// One live engine instance bound to the video element.
///
/// Events produced by the instance must be delivered back to
/// [`PlayerController::handle`](crate::PlayerController::handle) stamped with
/// the token the instance was created with.
pub trait StreamingEngine {
    /// Bind the engine to the media element; completion is signalled by
    /// [`PlayerEvent::MediaAttached`](crate::PlayerEvent::MediaAttached)
    fn attach_media(&mut self) -> Result<()>;

    /// Start loading the manifest at `url`
    fn load_source(&mut self, url: &str) -> Result<()>;

    /// Restart loading after a network failure
    fn start_load(&mut self) -> Result<()>;

    /// Reset the media pipeline after a decode failure
    fn recover_media_error(&mut self) -> Result<()>;

    /// Pinned rendition, `None` while automatic selection is active
    fn current_level(&self) -> Option<usize>;

    /// Pin a rendition, or return to automatic selection with `None`
    fn set_current_level(&mut self, level: Option<usize>) -> Result<()>;

    /// Release the instance and everything it holds
    fn destroy(self);
}

/// Capability probe and constructor for engine instances
pub trait EngineProvider {
    type Engine: StreamingEngine;

    /// Whether the platform can run the engine at all
    fn is_supported(&self) -> bool;

    /// Construct a new instance whose events carry `token`
    fn create(&mut self, config: &EngineConfig, token: SessionToken) -> Result<Self::Engine>;
}
