//! Overlay configuration
//!
//! Every field has a default matching the stock page markup, so hosts only
//! override what differs. Field names are camelCase on the wire because the
//! config usually arrives as a JavaScript object.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Settings handed to the streaming engine constructor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    /// Upper bound of the forward buffer (seconds)
    pub max_max_buffer_length: u32,
    /// Forward buffer size cap (bytes)
    pub max_buffer_size: u64,
    /// Transmux in a web worker
    pub enable_worker: bool,
    /// Initial rendition, -1 = automatic
    pub start_level: i32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_max_buffer_length: 600,
            max_buffer_size: 60 * 1000 * 1000,
            enable_worker: true,
            start_level: -1,
        }
    }
}

/// Element ids and class names the overlay binds to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DomConfig {
    pub overlay_id: String,
    pub video_id: String,
    pub quality_select_id: String,
    pub title_id: String,
    /// Selector of the element that hosts transient UI
    pub container_selector: String,
    pub loading_class: String,
    pub error_class: String,
    pub play_button_class: String,
    /// Icon classes inside the play button
    pub play_icon_class: String,
}

impl Default for DomConfig {
    fn default() -> Self {
        Self {
            overlay_id: "playerOverlay".to_string(),
            video_id: "videoPlayer".to_string(),
            quality_select_id: "qualitySelect".to_string(),
            title_id: "videoTitle".to_string(),
            container_selector: ".video-container".to_string(),
            loading_class: "loading-spinner".to_string(),
            error_class: "player-error".to_string(),
            play_button_class: "play-button-overlay".to_string(),
            play_icon_class: "fas fa-play".to_string(),
        }
    }
}

/// Full overlay configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OverlayConfig {
    pub engine: EngineConfig,
    pub dom: DomConfig,
    /// MIME type probed for native adaptive-streaming support
    pub native_mime_type: String,
    /// Console log level: error, warn, info, debug or trace
    pub log_level: String,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            dom: DomConfig::default(),
            native_mime_type: "application/vnd.apple.mpegurl".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl OverlayConfig {
    /// Parse and validate a JSON config; missing fields take defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: OverlayConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Parsed console log level
    pub fn log_level(&self) -> Result<tracing::Level> {
        self.log_level
            .parse()
            .map_err(|_| Error::InvalidConfig(format!("unknown log level '{}'", self.log_level)))
    }

    pub fn validate(&self) -> Result<()> {
        let dom = &self.dom;
        let required = [
            ("overlayId", &dom.overlay_id),
            ("videoId", &dom.video_id),
            ("qualitySelectId", &dom.quality_select_id),
            ("titleId", &dom.title_id),
            ("containerSelector", &dom.container_selector),
            ("loadingClass", &dom.loading_class),
            ("errorClass", &dom.error_class),
            ("playButtonClass", &dom.play_button_class),
        ];
        if let Some((name, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(Error::InvalidConfig(format!("{} must not be empty", name)));
        }
        if self.engine.max_buffer_size == 0 {
            return Err(Error::InvalidConfig("maxBufferSize must be positive".to_string()));
        }
        if self.engine.start_level < -1 {
            return Err(Error::InvalidConfig(format!(
                "startLevel must be -1 or a rendition index, got {}",
                self.engine.start_level
            )));
        }
        self.log_level()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_defaults() {
        let engine = EngineConfig::default();
        assert_eq!(engine.max_max_buffer_length, 600);
        assert_eq!(engine.max_buffer_size, 60_000_000);
        assert!(engine.enable_worker);
        assert_eq!(engine.start_level, -1);
    }

    #[test]
    fn test_engine_wire_names() {
        let json = serde_json::to_value(EngineConfig::default()).unwrap();
        assert_eq!(json["maxMaxBufferLength"], 600);
        assert_eq!(json["maxBufferSize"], 60_000_000);
        assert_eq!(json["enableWorker"], true);
        assert_eq!(json["startLevel"], -1);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = OverlayConfig::from_json(
            r#"{ "dom": { "videoId": "lecture" }, "logLevel": "debug" }"#,
        )
        .unwrap();
        assert_eq!(config.dom.video_id, "lecture");
        assert_eq!(config.dom.overlay_id, "playerOverlay");
        assert_eq!(config.engine, EngineConfig::default());
        assert_eq!(config.log_level().unwrap(), tracing::Level::DEBUG);
    }

    #[test]
    fn test_rejects_empty_ids() {
        let err = OverlayConfig::from_json(r#"{ "dom": { "overlayId": " " } }"#).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn test_rejects_unknown_log_level() {
        let err = OverlayConfig::from_json(r#"{ "logLevel": "loud" }"#).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_CONFIG");
    }

    #[test]
    fn test_rejects_malformed_json() {
        let err = OverlayConfig::from_json("{ engine: ").unwrap_err();
        assert!(matches!(err, Error::ConfigDecode(_)));
    }
}
