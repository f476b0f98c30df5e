//! Player Session - state of the single active overlay
//!
//! Holds what the page scripts used to keep in globals: the current video,
//! the engine instance, and the token that tells live engine callbacks apart
//! from stale ones.

use crate::types::{Backend, Level, OverlayState, SessionToken};

/// State owned by one [`PlayerController`](crate::PlayerController)
pub struct Session<E> {
    /// Last requested video URL
    pub(crate) url: Option<String>,
    /// Last requested video title
    pub(crate) title: String,
    /// Engine instance, owned exclusively
    pub(crate) engine: Option<E>,
    /// Last issued token
    pub(crate) last_token: SessionToken,
    /// Token whose events are currently accepted
    pub(crate) active: Option<SessionToken>,
    /// Backend picked for the active binding
    pub(crate) backend: Option<Backend>,
    /// Renditions from the last manifest
    pub(crate) levels: Vec<Level>,
    /// Current overlay state
    pub(crate) state: OverlayState,
}

impl<E> Session<E> {
    pub fn new() -> Self {
        Self {
            url: None,
            title: String::new(),
            engine: None,
            last_token: SessionToken(0),
            active: None,
            backend: None,
            levels: Vec::new(),
            state: OverlayState::Closed,
        }
    }

    /// Remember the video so Retry can reopen it
    pub(crate) fn record(&mut self, url: &str, title: &str) {
        self.url = Some(url.to_string());
        self.title = title.to_string();
    }

    /// Issue a fresh token for a new binding; older tokens become stale
    pub(crate) fn bind(&mut self, backend: Backend) -> SessionToken {
        self.last_token = self.last_token.next();
        self.active = Some(self.last_token);
        self.backend = Some(backend);
        self.levels.clear();
        self.last_token
    }

    /// Stop accepting events from the current binding
    pub(crate) fn invalidate(&mut self) {
        self.active = None;
        self.backend = None;
        self.levels.clear();
    }

    /// Whether events stamped with `token` belong to the live binding
    pub fn is_current(&self, token: SessionToken) -> bool {
        self.active == Some(token)
    }

    /// Stored video as `(url, title)`
    pub fn video(&self) -> Option<(&str, &str)> {
        self.url.as_deref().map(|url| (url, self.title.as_str()))
    }

    pub fn engine(&self) -> Option<&E> {
        self.engine.as_ref()
    }

    pub fn active_token(&self) -> Option<SessionToken> {
        self.active
    }

    pub fn backend(&self) -> Option<Backend> {
        self.backend
    }

    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    pub fn state(&self) -> OverlayState {
        self.state
    }
}

impl<E> Default for Session<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_creation() {
        let session: Session<()> = Session::new();
        assert_eq!(session.state(), OverlayState::Closed);
        assert!(session.video().is_none());
        assert!(session.active_token().is_none());
    }

    #[test]
    fn test_bind_invalidates_previous_token() {
        let mut session: Session<()> = Session::new();
        let first = session.bind(Backend::Engine);
        let second = session.bind(Backend::Engine);

        assert!(second > first);
        assert!(!session.is_current(first));
        assert!(session.is_current(second));

        session.invalidate();
        assert!(!session.is_current(second));
        assert!(session.backend().is_none());
    }

    #[test]
    fn test_record_keeps_latest_video() {
        let mut session: Session<()> = Session::new();
        session.record("https://cdn/a.m3u8", "A");
        session.record("https://cdn/b.m3u8", "B");
        assert_eq!(session.video(), Some(("https://cdn/b.m3u8", "B")));
    }
}
