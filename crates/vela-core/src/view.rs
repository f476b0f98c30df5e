//! Overlay view seam
//!
//! Everything the controller does to the page goes through [`PlayerView`]:
//! the modal, the transient UI elements, the quality selector and the media
//! element. Transient elements are single-instance; showing one that is
//! already present replaces it.

use crate::{
    types::{QualityOption, SessionToken},
    Result,
};

pub trait PlayerView {
    /// Blocking user alert for caller misuse
    fn alert(&mut self, message: &str);

    fn set_title(&mut self, title: &str) -> Result<()>;

    fn set_modal_visible(&mut self, visible: bool) -> Result<()>;

    /// Lock or release page scrolling behind the modal
    fn set_scroll_locked(&mut self, locked: bool) -> Result<()>;

    fn show_loading(&mut self) -> Result<()>;

    fn remove_loading(&mut self) -> Result<()>;

    /// Show the error panel with a Retry button
    fn show_error(&mut self, message: &str) -> Result<()>;

    fn remove_error(&mut self) -> Result<()>;

    /// Show the centered play button used when autoplay is refused
    fn show_play_button(&mut self) -> Result<()>;

    fn remove_play_button(&mut self) -> Result<()>;

    /// Replace the selector contents
    fn set_quality_options(&mut self, options: &[QualityOption]) -> Result<()>;

    /// Whether the media element plays the manifest format without an engine
    fn can_play_natively(&self) -> bool;

    /// Blank the media element source before a new binding
    fn clear_source(&mut self) -> Result<()>;

    /// Pause, drop the source and reload the empty state
    fn reset_media(&mut self) -> Result<()>;

    /// Point the media element at `url` directly. Metadata and error events
    /// are delivered back stamped with `token`.
    fn load_native(&mut self, url: &str, token: SessionToken) -> Result<()>;

    /// Request playback. The outcome arrives as
    /// [`PlayerEvent::PlaybackStarted`](crate::PlayerEvent::PlaybackStarted) or
    /// [`PlayerEvent::PlaybackBlocked`](crate::PlayerEvent::PlaybackBlocked).
    fn play(&mut self, token: SessionToken) -> Result<()>;
}
