//! Core types for Vela

use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::str::FromStr;

/// Label of the automatic entry in the quality selector
pub const AUTO_QUALITY_LABEL: &str = "Auto Quality";

/// Selector value of the automatic entry
pub const AUTO_QUALITY_VALUE: &str = "auto";

/// One encoded quality variant offered by the manifest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Level {
    /// Video height in pixels
    pub height: u32,
    /// Bandwidth in bits per second
    pub bitrate: u64,
}

impl Level {
    pub fn new(height: u32, bitrate: u64) -> Self {
        Self { height, bitrate }
    }

    /// Selector label, e.g. `1080p (3000kbps)`
    pub fn label(&self) -> String {
        let kbps = (self.bitrate as f64 / 1000.0).round() as u64;
        format!("{}p ({}kbps)", self.height, kbps)
    }
}

/// Requested rendition from the quality selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QualitySelection {
    /// Let the engine pick renditions
    Auto,
    /// Pin playback to the rendition at this index
    Level(usize),
}

impl QualitySelection {
    /// Value stored on the `<option>` element
    pub fn value(&self) -> String {
        match self {
            QualitySelection::Auto => AUTO_QUALITY_VALUE.to_string(),
            QualitySelection::Level(index) => index.to_string(),
        }
    }
}

impl FromStr for QualitySelection {
    type Err = Infallible;

    /// Reads leading decimal digits the way `parseInt(value, 10)` does, so
    /// `"2abc"` and `"1.5"` pin renditions 2 and 1. No digits, or a negative
    /// number, selects automatic mode.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim_start();
        let (negative, rest) = match s.as_bytes().first() {
            Some(b'-') => (true, &s[1..]),
            Some(b'+') => (false, &s[1..]),
            _ => (false, s),
        };
        let end = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        let digits = &rest[..end];

        if digits.is_empty() || (negative && digits.bytes().any(|b| b != b'0')) {
            return Ok(QualitySelection::Auto);
        }
        Ok(digits
            .parse::<usize>()
            .map(QualitySelection::Level)
            .unwrap_or(QualitySelection::Auto))
    }
}

impl std::fmt::Display for QualitySelection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QualitySelection::Auto => write!(f, "auto"),
            QualitySelection::Level(index) => write!(f, "level {}", index),
        }
    }
}

/// An entry of the quality selector
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityOption {
    pub value: String,
    pub label: String,
}

impl QualityOption {
    /// The leading "Auto Quality" entry
    pub fn auto() -> Self {
        Self {
            value: AUTO_QUALITY_VALUE.to_string(),
            label: AUTO_QUALITY_LABEL.to_string(),
        }
    }

    /// Build the full selector list: auto first, then one entry per level in engine order
    pub fn ladder(levels: &[Level]) -> Vec<QualityOption> {
        std::iter::once(Self::auto())
            .chain(levels.iter().enumerate().map(|(index, level)| QualityOption {
                value: QualitySelection::Level(index).value(),
                label: level.label(),
            }))
            .collect()
    }
}

/// Engine error category, decoded once at the engine adapter boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    Network,
    Media,
    Other,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::Network => write!(f, "network"),
            ErrorKind::Media => write!(f, "media"),
            ErrorKind::Other => write!(f, "other"),
        }
    }
}

/// Error reported by the streaming engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineError {
    pub kind: ErrorKind,
    /// Engine-specific detail code
    pub details: String,
    /// Fatal errors halt playback until recovery or teardown
    pub fatal: bool,
}

impl EngineError {
    pub fn fatal(kind: ErrorKind, details: impl Into<String>) -> Self {
        Self {
            kind,
            details: details.into(),
            fatal: true,
        }
    }

    pub fn non_fatal(kind: ErrorKind, details: impl Into<String>) -> Self {
        Self {
            kind,
            details: details.into(),
            fatal: false,
        }
    }
}

/// How the current platform plays adaptive streams
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Backend {
    /// Script engine driving the media element through MSE
    Engine,
    /// The media element understands the manifest natively
    Native,
    /// Neither is available
    Unsupported,
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Backend::Engine => write!(f, "engine"),
            Backend::Native => write!(f, "native"),
            Backend::Unsupported => write!(f, "unsupported"),
        }
    }
}

/// Identifies one engine binding; events carrying an older token are stale
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SessionToken(pub u64);

impl SessionToken {
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl std::fmt::Display for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Events delivered to the controller by the engine and the media element
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerEvent {
    /// Engine is bound to the media element
    MediaAttached,
    /// Engine parsed the manifest
    ManifestParsed { levels: Vec<Level> },
    /// Engine reported an error
    EngineError(EngineError),
    /// Native playback loaded metadata
    MetadataLoaded,
    /// Native playback failed
    MediaError(String),
    /// A play request resolved
    PlaybackStarted,
    /// A play request was rejected, usually by autoplay policy
    PlaybackBlocked(String),
}

impl PlayerEvent {
    /// Short name for logs
    pub fn name(&self) -> &'static str {
        match self {
            PlayerEvent::MediaAttached => "media_attached",
            PlayerEvent::ManifestParsed { .. } => "manifest_parsed",
            PlayerEvent::EngineError(_) => "engine_error",
            PlayerEvent::MetadataLoaded => "metadata_loaded",
            PlayerEvent::MediaError(_) => "media_error",
            PlayerEvent::PlaybackStarted => "playback_started",
            PlayerEvent::PlaybackBlocked(_) => "playback_blocked",
        }
    }
}

/// Overlay state machine states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OverlayState {
    /// Modal hidden, no engine
    Closed,
    /// Modal shown, waiting for the manifest or the first play attempt
    Opening,
    /// Playback running
    Playing,
    /// Error panel shown; recovery may be in progress
    ErrorRetry,
    /// Autoplay was refused; play button shown
    AwaitingUserPlay,
}

impl OverlayState {
    /// Check if transition to target state is valid
    pub fn can_transition_to(&self, target: OverlayState) -> bool {
        use OverlayState::*;
        if *self == target || target == Closed {
            return true;
        }
        matches!(
            (self, target),
            // Re-open from any state
            (_, Opening) |
            // From Opening
            (Opening, Playing) | (Opening, AwaitingUserPlay) | (Opening, ErrorRetry) |
            // From Playing
            (Playing, ErrorRetry) | (Playing, AwaitingUserPlay) |
            // From AwaitingUserPlay
            (AwaitingUserPlay, Playing) | (AwaitingUserPlay, ErrorRetry) |
            // From ErrorRetry (engine self-healed)
            (ErrorRetry, Playing) | (ErrorRetry, AwaitingUserPlay)
        )
    }

    /// True while the modal is shown
    pub fn is_open(&self) -> bool {
        !matches!(self, OverlayState::Closed)
    }
}

impl std::fmt::Display for OverlayState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OverlayState::Closed => write!(f, "closed"),
            OverlayState::Opening => write!(f, "opening"),
            OverlayState::Playing => write!(f, "playing"),
            OverlayState::ErrorRetry => write!(f, "error_retry"),
            OverlayState::AwaitingUserPlay => write!(f, "awaiting_user_play"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_label_rounds_kbps() {
        assert_eq!(Level::new(480, 800_000).label(), "480p (800kbps)");
        assert_eq!(Level::new(720, 1_499_500).label(), "720p (1500kbps)");
        assert_eq!(Level::new(360, 499_499).label(), "360p (499kbps)");
    }

    #[test]
    fn test_quality_selection_parsing() {
        assert_eq!("auto".parse::<QualitySelection>(), Ok(QualitySelection::Auto));
        assert_eq!("2".parse::<QualitySelection>(), Ok(QualitySelection::Level(2)));
        assert_eq!(" 0 ".parse::<QualitySelection>(), Ok(QualitySelection::Level(0)));
        assert_eq!("-1".parse::<QualitySelection>(), Ok(QualitySelection::Auto));
        assert_eq!("".parse::<QualitySelection>(), Ok(QualitySelection::Auto));
    }

    #[test]
    fn test_quality_selection_leading_digits() {
        assert_eq!("2abc".parse::<QualitySelection>(), Ok(QualitySelection::Level(2)));
        assert_eq!("1.5".parse::<QualitySelection>(), Ok(QualitySelection::Level(1)));
        assert_eq!("+3".parse::<QualitySelection>(), Ok(QualitySelection::Level(3)));
        assert_eq!("-0".parse::<QualitySelection>(), Ok(QualitySelection::Level(0)));
        assert_eq!("abc2".parse::<QualitySelection>(), Ok(QualitySelection::Auto));
        assert_eq!("-".parse::<QualitySelection>(), Ok(QualitySelection::Auto));
    }

    #[test]
    fn test_ladder_order() {
        let options = QualityOption::ladder(&[Level::new(1080, 3_000_000), Level::new(480, 800_000)]);
        let labels: Vec<_> = options.iter().map(|o| o.label.as_str()).collect();
        assert_eq!(labels, ["Auto Quality", "1080p (3000kbps)", "480p (800kbps)"]);
        assert_eq!(options[0].value, "auto");
        assert_eq!(options[2].value, "1");
    }

    #[test]
    fn test_ladder_without_levels() {
        assert_eq!(QualityOption::ladder(&[]), vec![QualityOption::auto()]);
    }

    #[test]
    fn test_overlay_state_transitions() {
        use OverlayState::*;

        assert!(Closed.can_transition_to(Opening));
        assert!(Opening.can_transition_to(Playing));
        assert!(Opening.can_transition_to(AwaitingUserPlay));
        assert!(AwaitingUserPlay.can_transition_to(Playing));
        assert!(ErrorRetry.can_transition_to(Opening));
        assert!(Playing.can_transition_to(Closed));
        assert!(Closed.can_transition_to(Closed));

        assert!(!Closed.can_transition_to(Playing));
        assert!(!Closed.can_transition_to(ErrorRetry));
        assert!(!Closed.can_transition_to(AwaitingUserPlay));
    }

    #[test]
    fn test_session_token_is_monotonic() {
        let first = SessionToken(0);
        assert!(first.next() > first);
        assert_eq!(first.next().to_string(), "#1");
    }
}
