//! Player Overlay Controller
//!
//! Drives one [`Session`] through the overlay state machine:
//!
//! ```text
//! Closed ──open──▶ Opening ──manifest/metadata + autoplay ok──▶ Playing
//!                     │                └─autoplay refused──▶ AwaitingUserPlay ──click──▶ Playing
//!                     └─fatal error / unsupported──▶ ErrorRetry ──retry──▶ Opening
//! any ──close──▶ Closed
//! ```
//!
//! Engine and media events arrive through [`PlayerController::handle`] stamped
//! with the session token they were issued under; events from a destroyed
//! binding are dropped.

use crate::{
    config::EngineConfig,
    engine::{EngineProvider, StreamingEngine},
    session::Session,
    types::*,
    view::PlayerView,
    Error, Result,
};
use tracing::{debug, error, info, instrument, warn};

/// User-facing texts
pub mod messages {
    pub const MISSING_URL: &str = "Video URL is missing";
    pub const NETWORK_RECOVERING: &str = "Network error. Trying to recover...";
    pub const MEDIA_RECOVERING: &str = "Media error. Trying to recover...";
    pub const LOAD_FAILED: &str = "Failed to load video. Please try again.";
    pub const NATIVE_LOAD_FAILED: &str = "Error loading video. Please try again.";
    pub const UNSUPPORTED: &str =
        "Video playback not supported in your browser. Please try Chrome or Firefox.";
}

/// Overlay controller over an engine provider and a view
pub struct PlayerController<P: EngineProvider, V: PlayerView> {
    provider: P,
    view: V,
    config: EngineConfig,
    session: Session<P::Engine>,
}

impl<P: EngineProvider, V: PlayerView> PlayerController<P, V> {
    pub fn new(provider: P, view: V, config: EngineConfig) -> Self {
        Self {
            provider,
            view,
            config,
            session: Session::new(),
        }
    }

    pub fn state(&self) -> OverlayState {
        self.session.state
    }

    pub fn session(&self) -> &Session<P::Engine> {
        &self.session
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn provider_mut(&mut self) -> &mut P {
        &mut self.provider
    }

    /// Open the overlay and start loading `url`.
    ///
    /// An empty URL raises an alert and leaves everything untouched.
    #[instrument(skip(self))]
    pub fn open(&mut self, url: &str, title: &str) -> Result<()> {
        if url.is_empty() {
            error!("No video URL provided");
            self.view.alert(messages::MISSING_URL);
            return Err(Error::MissingUrl);
        }

        info!("Opening video");
        self.session.record(url, title);
        self.enter(OverlayState::Opening);

        let result = self.view.set_title(title);
        check("set_title", result);
        let result = self.view.set_modal_visible(true);
        check("show_modal", result);
        let result = self.view.set_scroll_locked(true);
        check("lock_scroll", result);
        let result = self.view.remove_error();
        check("remove_error", result);
        let result = self.view.remove_play_button();
        check("remove_play_button", result);
        let result = self.view.show_loading();
        check("show_loading", result);
        let result = self.view.clear_source();
        check("clear_source", result);

        self.destroy_engine();

        let backend = if self.provider.is_supported() {
            Backend::Engine
        } else if self.view.can_play_natively() {
            Backend::Native
        } else {
            Backend::Unsupported
        };
        let token = self.session.bind(backend);
        debug!(%token, %backend, "Playback backend selected");

        match backend {
            Backend::Engine => {
                let mut engine = match self.provider.create(&self.config, token) {
                    Ok(engine) => engine,
                    Err(err) => {
                        error!(error = %err, "Failed to create streaming engine");
                        self.abandon_engine();
                        return Err(err);
                    }
                };
                if let Err(err) = engine.attach_media() {
                    error!(error = %err, "Failed to attach media");
                    engine.destroy();
                    self.abandon_engine();
                    return Err(err);
                }
                self.session.engine = Some(engine);
            }
            Backend::Native => {
                let result = self.view.load_native(url, token);
                check("load_native", result);
            }
            Backend::Unsupported => {
                error!("Adaptive streaming not supported on this platform");
                self.fail(messages::UNSUPPORTED);
            }
        }

        Ok(())
    }

    /// Tear the overlay down. Safe to call when already closed.
    #[instrument(skip(self))]
    pub fn close(&mut self) {
        let was_open = self.session.state.is_open();

        self.destroy_engine();
        self.session.invalidate();

        let result = self.view.reset_media();
        check("reset_media", result);
        let result = self.view.remove_loading();
        check("remove_loading", result);
        let result = self.view.remove_error();
        check("remove_error", result);
        let result = self.view.remove_play_button();
        check("remove_play_button", result);
        let result = self.view.set_modal_visible(false);
        check("hide_modal", result);
        let result = self.view.set_scroll_locked(false);
        check("unlock_scroll", result);

        self.enter(OverlayState::Closed);
        if was_open {
            info!("Overlay closed");
        }
    }

    /// Reopen the last requested video
    pub fn retry(&mut self) -> Result<()> {
        let Some((url, title)) = self
            .session
            .video()
            .map(|(url, title)| (url.to_string(), title.to_string()))
        else {
            debug!("Retry requested with no stored video");
            return Ok(());
        };

        let result = self.view.remove_error();
        check("remove_error", result);
        self.open(&url, &title)
    }

    /// Switch rendition. Does nothing without an engine instance.
    pub fn change_quality(&mut self, selection: QualitySelection) -> Result<()> {
        if self.session.engine.is_none() {
            debug!(%selection, "Quality change ignored, no engine");
            return Ok(());
        }

        let level = match selection {
            QualitySelection::Auto => None,
            QualitySelection::Level(index) => {
                let available = self.session.levels.len();
                if index >= available {
                    warn!(index, available, "Quality change to unknown rendition");
                    return Err(Error::UnknownRendition { index, available });
                }
                Some(index)
            }
        };

        if let Some(engine) = self.session.engine.as_mut() {
            engine.set_current_level(level)?;
        }
        info!(%selection, "Quality changed");
        Ok(())
    }

    /// The play button was clicked after autoplay was refused
    pub fn play_clicked(&mut self) {
        let Some(token) = self.session.active else {
            debug!("Play click with no active session");
            return;
        };

        let result = self.view.remove_play_button();
        check("remove_play_button", result);
        match self.view.play(token) {
            Ok(()) => self.enter(OverlayState::Playing),
            Err(err) => self.on_playback_blocked(&err.to_string()),
        }
    }

    /// Deliver an engine or media event
    pub fn handle(&mut self, token: SessionToken, event: PlayerEvent) {
        if !self.session.is_current(token) {
            debug!(%token, event = event.name(), "Ignoring stale event");
            return;
        }

        match event {
            PlayerEvent::MediaAttached => {
                info!("Media attached");
                let loaded = match (self.session.engine.as_mut(), self.session.url.as_deref()) {
                    (Some(engine), Some(url)) => engine.load_source(url),
                    _ => Ok(()),
                };
                if let Err(err) = loaded {
                    error!(error = %err, "Failed to load source");
                    self.destroy_engine();
                    self.abandon_engine();
                }
            }
            PlayerEvent::ManifestParsed { levels } => {
                info!(renditions = levels.len(), "Manifest parsed");
                let result = self.view.remove_loading();
                check("remove_loading", result);
                let result = self.view.set_quality_options(&QualityOption::ladder(&levels));
                check("set_quality_options", result);
                self.session.levels = levels;
                self.request_play(token);
            }
            PlayerEvent::EngineError(err) => self.on_engine_error(err),
            PlayerEvent::MetadataLoaded => {
                info!("Native metadata loaded");
                let result = self.view.remove_loading();
                check("remove_loading", result);
                self.request_play(token);
            }
            PlayerEvent::MediaError(detail) => {
                error!(%detail, "Native playback error");
                self.fail(messages::NATIVE_LOAD_FAILED);
            }
            PlayerEvent::PlaybackStarted => {
                self.enter(OverlayState::Playing);
            }
            PlayerEvent::PlaybackBlocked(reason) => self.on_playback_blocked(&reason),
        }
    }

    fn on_engine_error(&mut self, err: EngineError) {
        if !err.fatal {
            debug!(kind = %err.kind, details = %err.details, "Non-fatal engine error");
            return;
        }

        error!(kind = %err.kind, details = %err.details, "Fatal engine error");
        match err.kind {
            ErrorKind::Network => {
                self.fail(messages::NETWORK_RECOVERING);
                if let Some(engine) = self.session.engine.as_mut() {
                    if let Err(err) = engine.start_load() {
                        error!(error = %err, "Load restart failed");
                    }
                }
            }
            ErrorKind::Media => {
                self.fail(messages::MEDIA_RECOVERING);
                if let Some(engine) = self.session.engine.as_mut() {
                    if let Err(err) = engine.recover_media_error() {
                        error!(error = %err, "Media recovery failed");
                    }
                }
            }
            ErrorKind::Other => {
                let result = self.view.show_error(messages::LOAD_FAILED);
                check("show_error", result);
                self.close();
            }
        }
    }

    fn on_playback_blocked(&mut self, reason: &str) {
        warn!(%reason, "Autoplay prevented");
        let result = self.view.show_play_button();
        check("show_play_button", result);
        self.enter(OverlayState::AwaitingUserPlay);
    }

    fn request_play(&mut self, token: SessionToken) {
        if let Err(err) = self.view.play(token) {
            self.on_playback_blocked(&err.to_string());
        }
    }

    /// Clear loading and show the error panel in the retry state
    fn fail(&mut self, message: &str) {
        let result = self.view.remove_loading();
        check("remove_loading", result);
        let result = self.view.show_error(message);
        check("show_error", result);
        self.enter(OverlayState::ErrorRetry);
    }

    /// The engine could not be brought up; drop the binding and offer a retry
    fn abandon_engine(&mut self) {
        self.session.invalidate();
        self.fail(messages::LOAD_FAILED);
    }

    fn destroy_engine(&mut self) {
        if let Some(engine) = self.session.engine.take() {
            debug!("Destroying streaming engine");
            engine.destroy();
        }
    }

    fn set_state(&mut self, new_state: OverlayState) -> Result<()> {
        let current = self.session.state;

        if !current.can_transition_to(new_state) {
            return Err(Error::InvalidStateTransition {
                from: current.to_string(),
                to: new_state.to_string(),
            });
        }

        if current != new_state {
            self.session.state = new_state;
            info!(from = %current, to = %new_state, "State transition");
        }

        Ok(())
    }

    fn enter(&mut self, new_state: OverlayState) {
        if let Err(err) = self.set_state(new_state) {
            warn!(error = %err, "Transition refused");
        }
    }
}

/// View failures are logged, never surfaced to the page
fn check(op: &'static str, result: Result<()>) {
    if let Err(err) = result {
        warn!(op, error = %err, "View update failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Call, MockProvider, MockView};

    fn controller() -> PlayerController<MockProvider, MockView> {
        PlayerController::new(MockProvider::default(), MockView::default(), EngineConfig::default())
    }

    fn token(ctrl: &PlayerController<MockProvider, MockView>) -> SessionToken {
        ctrl.session().active_token().unwrap()
    }

    #[test]
    fn test_open_binds_engine() {
        let mut ctrl = controller();
        ctrl.open("https://x/master.m3u8", "Demo").unwrap();

        assert_eq!(ctrl.state(), OverlayState::Opening);
        assert_eq!(ctrl.provider().created(), 1);
        assert_eq!(ctrl.session().backend(), Some(Backend::Engine));
        assert!(ctrl.view().modal_visible);
        assert!(ctrl.view().scroll_locked);
        assert!(ctrl.view().loading);
        assert_eq!(ctrl.view().title, "Demo");
        assert!(ctrl.provider().log().contains(&Call::AttachMedia(1)));
    }

    #[test]
    fn test_media_attached_loads_source() {
        let mut ctrl = controller();
        ctrl.open("https://x/master.m3u8", "Demo").unwrap();
        ctrl.handle(token(&ctrl), PlayerEvent::MediaAttached);

        assert!(ctrl
            .provider()
            .log()
            .contains(&Call::LoadSource(1, "https://x/master.m3u8".to_string())));
    }

    #[test]
    fn test_stale_events_ignored() {
        let mut ctrl = controller();
        ctrl.open("https://x/a.m3u8", "A").unwrap();
        let stale = token(&ctrl);
        ctrl.open("https://x/b.m3u8", "B").unwrap();

        ctrl.handle(stale, PlayerEvent::ManifestParsed { levels: vec![Level::new(720, 2_000_000)] });
        assert!(ctrl.view().options.is_empty());
        assert!(ctrl.view().loading);
        assert_eq!(ctrl.state(), OverlayState::Opening);
    }

    #[test]
    fn test_events_after_close_ignored() {
        let mut ctrl = controller();
        ctrl.open("https://x/a.m3u8", "A").unwrap();
        let t = token(&ctrl);
        ctrl.close();

        ctrl.handle(t, PlayerEvent::PlaybackStarted);
        assert_eq!(ctrl.state(), OverlayState::Closed);
    }

    #[test]
    fn test_native_fallback() {
        let mut ctrl = PlayerController::new(
            MockProvider::unsupported(),
            MockView { native: true, ..Default::default() },
            EngineConfig::default(),
        );
        ctrl.open("https://x/master.m3u8", "Demo").unwrap();
        let t = token(&ctrl);

        assert_eq!(ctrl.session().backend(), Some(Backend::Native));
        assert_eq!(ctrl.provider().created(), 0);
        assert_eq!(ctrl.view().native_source.as_deref(), Some("https://x/master.m3u8"));

        ctrl.handle(t, PlayerEvent::MetadataLoaded);
        assert!(!ctrl.view().loading);
        assert_eq!(ctrl.view().play_requests, vec![t]);

        ctrl.handle(t, PlayerEvent::PlaybackStarted);
        assert_eq!(ctrl.state(), OverlayState::Playing);
    }

    #[test]
    fn test_native_error_shows_retry() {
        let mut ctrl = PlayerController::new(
            MockProvider::unsupported(),
            MockView { native: true, ..Default::default() },
            EngineConfig::default(),
        );
        ctrl.open("https://x/master.m3u8", "Demo").unwrap();
        ctrl.handle(token(&ctrl), PlayerEvent::MediaError("MEDIA_ERR_SRC_NOT_SUPPORTED".into()));

        assert_eq!(ctrl.state(), OverlayState::ErrorRetry);
        assert_eq!(ctrl.view().error.as_deref(), Some(messages::NATIVE_LOAD_FAILED));
        assert!(!ctrl.view().loading);
    }

    #[test]
    fn test_unsupported_platform() {
        let mut ctrl = PlayerController::new(
            MockProvider::unsupported(),
            MockView::default(),
            EngineConfig::default(),
        );
        ctrl.open("https://x/master.m3u8", "Demo").unwrap();

        assert_eq!(ctrl.state(), OverlayState::ErrorRetry);
        assert_eq!(ctrl.view().error.as_deref(), Some(messages::UNSUPPORTED));
        assert!(!ctrl.view().loading);
        assert_eq!(ctrl.provider().created(), 0);
    }

    #[test]
    fn test_engine_construction_failure() {
        let mut ctrl = PlayerController::new(
            MockProvider::failing(),
            MockView::default(),
            EngineConfig::default(),
        );
        let err = ctrl.open("https://x/master.m3u8", "Demo").unwrap_err();

        assert!(matches!(err, Error::Engine(_)));
        assert_eq!(ctrl.state(), OverlayState::ErrorRetry);
        assert_eq!(ctrl.view().error.as_deref(), Some(messages::LOAD_FAILED));
        assert!(ctrl.session().active_token().is_none());
    }

    #[test]
    fn test_attach_failure_offers_retry() {
        let mut provider = MockProvider::default();
        provider.fail_attach = true;
        let mut ctrl = PlayerController::new(provider, MockView::default(), EngineConfig::default());

        let err = ctrl.open("https://x/master.m3u8", "Demo").unwrap_err();
        assert!(matches!(err, Error::Engine(_)));
        assert_eq!(ctrl.state(), OverlayState::ErrorRetry);
        assert_eq!(ctrl.view().error.as_deref(), Some(messages::LOAD_FAILED));
        assert!(!ctrl.view().loading);
        assert!(ctrl.session().engine().is_none());
        assert!(ctrl.session().active_token().is_none());
        assert_eq!(ctrl.provider().count(|c| matches!(c, Call::Destroy(1))), 1);
    }

    #[test]
    fn test_load_source_failure_offers_retry() {
        let mut provider = MockProvider::default();
        provider.fail_load = true;
        let mut ctrl = PlayerController::new(provider, MockView::default(), EngineConfig::default());
        ctrl.open("https://x/master.m3u8", "Demo").unwrap();
        let t = token(&ctrl);
        ctrl.handle(t, PlayerEvent::MediaAttached);

        assert_eq!(ctrl.state(), OverlayState::ErrorRetry);
        assert_eq!(ctrl.view().error.as_deref(), Some(messages::LOAD_FAILED));
        assert!(!ctrl.view().loading);
        assert!(ctrl.session().engine().is_none());
        assert_eq!(ctrl.provider().count(|c| matches!(c, Call::Destroy(1))), 1);

        // Late events from the abandoned engine are dropped
        ctrl.handle(t, PlayerEvent::ManifestParsed { levels: vec![] });
        assert_eq!(ctrl.state(), OverlayState::ErrorRetry);
    }

    #[test]
    fn test_play_click_failure_keeps_button() {
        let mut ctrl = controller();
        ctrl.open("https://x/master.m3u8", "Demo").unwrap();
        let t = token(&ctrl);
        ctrl.handle(t, PlayerEvent::ManifestParsed { levels: vec![] });
        ctrl.handle(t, PlayerEvent::PlaybackBlocked("NotAllowedError".into()));
        assert!(ctrl.view().play_button);

        ctrl.view_mut().play_fails = true;
        ctrl.play_clicked();

        assert_eq!(ctrl.state(), OverlayState::AwaitingUserPlay);
        assert!(ctrl.view().play_button);
    }

    #[test]
    fn test_non_fatal_error_only_logged() {
        let mut ctrl = controller();
        ctrl.open("https://x/master.m3u8", "Demo").unwrap();
        ctrl.handle(
            token(&ctrl),
            PlayerEvent::EngineError(EngineError::non_fatal(ErrorKind::Network, "fragLoadError")),
        );

        assert_eq!(ctrl.state(), OverlayState::Opening);
        assert!(ctrl.view().error.is_none());
        assert!(ctrl.view().loading);
    }

    #[test]
    fn test_fatal_media_error_recovers() {
        let mut ctrl = controller();
        ctrl.open("https://x/master.m3u8", "Demo").unwrap();
        ctrl.handle(
            token(&ctrl),
            PlayerEvent::EngineError(EngineError::fatal(ErrorKind::Media, "bufferStalledError")),
        );

        assert_eq!(ctrl.state(), OverlayState::ErrorRetry);
        assert_eq!(ctrl.view().error.as_deref(), Some(messages::MEDIA_RECOVERING));
        assert_eq!(ctrl.provider().count(|c| matches!(c, Call::RecoverMediaError(1))), 1);
        assert!(ctrl.session().engine().is_some());
    }

    #[test]
    fn test_retry_reopens_last_video() {
        let mut ctrl = PlayerController::new(
            MockProvider::unsupported(),
            MockView::default(),
            EngineConfig::default(),
        );
        ctrl.open("https://x/master.m3u8", "Demo").unwrap();
        ctrl.provider_mut().supported = true;
        ctrl.retry().unwrap();

        assert_eq!(ctrl.state(), OverlayState::Opening);
        assert!(ctrl.view().error.is_none());
        assert_eq!(ctrl.provider().created(), 1);
        assert_eq!(ctrl.session().video(), Some(("https://x/master.m3u8", "Demo")));
    }

    #[test]
    fn test_retry_without_video_is_noop() {
        let mut ctrl = controller();
        ctrl.retry().unwrap();
        assert_eq!(ctrl.state(), OverlayState::Closed);
        assert_eq!(ctrl.provider().created(), 0);
    }

    #[test]
    fn test_quality_change_without_engine_is_noop() {
        let mut ctrl = controller();
        assert!(ctrl.change_quality(QualitySelection::Level(3)).is_ok());
        assert!(ctrl.provider().log().is_empty());
    }

    #[test]
    fn test_quality_change_rejects_unknown_rendition() {
        let mut ctrl = controller();
        ctrl.open("https://x/master.m3u8", "Demo").unwrap();
        ctrl.handle(token(&ctrl), PlayerEvent::ManifestParsed { levels: vec![Level::new(480, 800_000)] });

        let err = ctrl.change_quality(QualitySelection::Level(1)).unwrap_err();
        assert!(matches!(err, Error::UnknownRendition { index: 1, available: 1 }));
        assert_eq!(ctrl.session().engine().unwrap().current_level(), None);
    }

    #[test]
    fn test_reopen_clears_affordances() {
        let mut ctrl = controller();
        ctrl.open("https://x/a.m3u8", "A").unwrap();
        let t = token(&ctrl);
        ctrl.handle(t, PlayerEvent::ManifestParsed { levels: vec![] });
        ctrl.handle(t, PlayerEvent::PlaybackBlocked("NotAllowedError".into()));
        assert!(ctrl.view().play_button);

        ctrl.open("https://x/b.m3u8", "B").unwrap();
        assert!(!ctrl.view().play_button);
        assert!(ctrl.view().loading);
        assert_eq!(ctrl.state(), OverlayState::Opening);
    }

    #[test]
    fn test_synchronous_play_failure_shows_button() {
        let mut ctrl = PlayerController::new(
            MockProvider::default(),
            MockView { play_fails: true, ..Default::default() },
            EngineConfig::default(),
        );
        ctrl.open("https://x/master.m3u8", "Demo").unwrap();
        ctrl.handle(token(&ctrl), PlayerEvent::ManifestParsed { levels: vec![] });

        assert_eq!(ctrl.state(), OverlayState::AwaitingUserPlay);
        assert!(ctrl.view().play_button);
    }
}
