//! Recording collaborators for driving the controller without a browser

use crate::{
    config::EngineConfig,
    engine::{EngineProvider, StreamingEngine},
    types::{QualityOption, SessionToken},
    view::PlayerView,
    Error, Result,
};
use std::cell::RefCell;
use std::rc::Rc;

/// Engine interaction, tagged with the engine instance id (1-based)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Create(usize, SessionToken),
    AttachMedia(usize),
    LoadSource(usize, String),
    StartLoad(usize),
    RecoverMediaError(usize),
    SetLevel(usize, Option<usize>),
    Destroy(usize),
}

type CallLog = Rc<RefCell<Vec<Call>>>;

/// Engine provider that records every call its engines receive
#[derive(Debug)]
pub struct MockProvider {
    pub supported: bool,
    /// Make construction fail
    pub fail: bool,
    /// Make `attach_media` fail on every engine
    pub fail_attach: bool,
    /// Make `load_source` fail on every engine
    pub fail_load: bool,
    log: CallLog,
    next_id: usize,
}

impl MockProvider {
    pub fn unsupported() -> Self {
        Self {
            supported: false,
            ..Default::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn log(&self) -> Vec<Call> {
        self.log.borrow().clone()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.log.borrow().iter().filter(|call| pred(call)).count()
    }

    /// Number of engines constructed
    pub fn created(&self) -> usize {
        self.count(|call| matches!(call, Call::Create(..)))
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self {
            supported: true,
            fail: false,
            fail_attach: false,
            fail_load: false,
            log: CallLog::default(),
            next_id: 0,
        }
    }
}

impl EngineProvider for MockProvider {
    type Engine = MockEngine;

    fn is_supported(&self) -> bool {
        self.supported
    }

    fn create(&mut self, _config: &EngineConfig, token: SessionToken) -> Result<MockEngine> {
        if self.fail {
            return Err(Error::engine("constructor threw"));
        }
        self.next_id += 1;
        self.log.borrow_mut().push(Call::Create(self.next_id, token));
        Ok(MockEngine {
            id: self.next_id,
            level: None,
            fail_attach: self.fail_attach,
            fail_load: self.fail_load,
            log: Rc::clone(&self.log),
        })
    }
}

#[derive(Debug)]
pub struct MockEngine {
    pub id: usize,
    level: Option<usize>,
    fail_attach: bool,
    fail_load: bool,
    log: CallLog,
}

impl MockEngine {
    fn record(&self, call: Call) {
        self.log.borrow_mut().push(call);
    }
}

impl StreamingEngine for MockEngine {
    fn attach_media(&mut self) -> Result<()> {
        self.record(Call::AttachMedia(self.id));
        if self.fail_attach {
            return Err(Error::engine("attachMedia threw"));
        }
        Ok(())
    }

    fn load_source(&mut self, url: &str) -> Result<()> {
        self.record(Call::LoadSource(self.id, url.to_string()));
        if self.fail_load {
            return Err(Error::engine("loadSource threw"));
        }
        Ok(())
    }

    fn start_load(&mut self) -> Result<()> {
        self.record(Call::StartLoad(self.id));
        Ok(())
    }

    fn recover_media_error(&mut self) -> Result<()> {
        self.record(Call::RecoverMediaError(self.id));
        Ok(())
    }

    fn current_level(&self) -> Option<usize> {
        self.level
    }

    fn set_current_level(&mut self, level: Option<usize>) -> Result<()> {
        self.record(Call::SetLevel(self.id, level));
        self.level = level;
        Ok(())
    }

    fn destroy(self) {
        self.record(Call::Destroy(self.id));
    }
}

/// View that keeps the visible page state as plain fields
#[derive(Debug, Default)]
pub struct MockView {
    /// Report native manifest support
    pub native: bool,
    /// Make `play` fail synchronously
    pub play_fails: bool,

    pub title: String,
    pub modal_visible: bool,
    pub scroll_locked: bool,
    pub loading: bool,
    pub error: Option<String>,
    /// Every message ever shown in the error panel
    pub error_history: Vec<String>,
    pub play_button: bool,
    pub options: Vec<QualityOption>,
    pub alerts: Vec<String>,
    pub native_source: Option<String>,
    pub play_requests: Vec<SessionToken>,
    pub media_resets: usize,
}

impl PlayerView for MockView {
    fn alert(&mut self, message: &str) {
        self.alerts.push(message.to_string());
    }

    fn set_title(&mut self, title: &str) -> Result<()> {
        self.title = title.to_string();
        Ok(())
    }

    fn set_modal_visible(&mut self, visible: bool) -> Result<()> {
        self.modal_visible = visible;
        Ok(())
    }

    fn set_scroll_locked(&mut self, locked: bool) -> Result<()> {
        self.scroll_locked = locked;
        Ok(())
    }

    fn show_loading(&mut self) -> Result<()> {
        self.loading = true;
        Ok(())
    }

    fn remove_loading(&mut self) -> Result<()> {
        self.loading = false;
        Ok(())
    }

    fn show_error(&mut self, message: &str) -> Result<()> {
        self.error = Some(message.to_string());
        self.error_history.push(message.to_string());
        Ok(())
    }

    fn remove_error(&mut self) -> Result<()> {
        self.error = None;
        Ok(())
    }

    fn show_play_button(&mut self) -> Result<()> {
        self.play_button = true;
        Ok(())
    }

    fn remove_play_button(&mut self) -> Result<()> {
        self.play_button = false;
        Ok(())
    }

    fn set_quality_options(&mut self, options: &[QualityOption]) -> Result<()> {
        self.options = options.to_vec();
        Ok(())
    }

    fn can_play_natively(&self) -> bool {
        self.native
    }

    fn clear_source(&mut self) -> Result<()> {
        self.native_source = None;
        Ok(())
    }

    fn reset_media(&mut self) -> Result<()> {
        self.native_source = None;
        self.media_resets += 1;
        Ok(())
    }

    fn load_native(&mut self, url: &str, _token: SessionToken) -> Result<()> {
        self.native_source = Some(url.to_string());
        Ok(())
    }

    fn play(&mut self, token: SessionToken) -> Result<()> {
        if self.play_fails {
            return Err(Error::view("NotAllowedError"));
        }
        self.play_requests.push(token);
        Ok(())
    }
}
