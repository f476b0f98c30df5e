//! Input queue between the page and the controller
//!
//! hls.js may emit events synchronously from inside a call the controller is
//! making (an error thrown during `loadSource`, for instance). Every input is
//! therefore queued and applied in arrival order by whichever caller holds
//! the controller; nested posts only enqueue.

use crate::{dom::DomView, hls::HlsProvider};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::{Rc, Weak};
use tracing::{debug, warn};
use vela_core::{PlayerController, PlayerEvent, QualitySelection, SessionToken};

pub(crate) type Controller = PlayerController<HlsProvider, DomView>;

/// The controller behind the exported player
pub(crate) type Shared = Dispatcher<Controller>;

/// Something that consumes queued inputs one at a time
pub(crate) trait Apply {
    type Input;

    fn apply(&mut self, input: Self::Input);
}

/// Something the controller has to react to
#[derive(Debug, Clone)]
pub(crate) enum Input {
    Open { url: String, title: String },
    Close,
    Retry,
    ChangeQuality(QualitySelection),
    PlayClicked,
    Event(SessionToken, PlayerEvent),
}

/// Owns the target and the inputs waiting for it
pub(crate) struct Dispatcher<T: Apply> {
    pub(crate) target: RefCell<T>,
    queue: RefCell<VecDeque<T::Input>>,
}

impl<T: Apply> Dispatcher<T> {
    pub(crate) fn new(target: T) -> Self {
        Self {
            target: RefCell::new(target),
            queue: RefCell::new(VecDeque::new()),
        }
    }

    pub(crate) fn post(&self, input: T::Input) {
        self.queue.borrow_mut().push_back(input);
        self.pump();
    }

    /// Apply queued inputs until the queue is empty or the target is busy
    fn pump(&self) {
        loop {
            let Ok(mut target) = self.target.try_borrow_mut() else {
                // The current holder drains the rest
                return;
            };
            let next = self.queue.borrow_mut().pop_front();
            let Some(input) = next else {
                return;
            };
            target.apply(input);
        }
    }
}

impl Apply for Controller {
    type Input = Input;

    fn apply(&mut self, input: Input) {
        match input {
            Input::Open { url, title } => {
                if let Err(err) = self.open(&url, &title) {
                    warn!(code = err.error_code(), error = %err, "Open failed");
                }
            }
            Input::Close => self.close(),
            Input::Retry => {
                if let Err(err) = self.retry() {
                    warn!(code = err.error_code(), error = %err, "Retry failed");
                }
            }
            Input::ChangeQuality(selection) => {
                if let Err(err) = self.change_quality(selection) {
                    warn!(code = err.error_code(), error = %err, "Quality change failed");
                }
            }
            Input::PlayClicked => self.play_clicked(),
            Input::Event(token, event) => {
                debug!(%token, event = event.name(), "Engine event");
                self.handle(token, event);
            }
        }
    }
}

/// Weak handle given to JS callbacks; posts are dropped once the player is gone
#[derive(Clone)]
pub(crate) struct Inbox(Weak<Shared>);

impl Inbox {
    pub(crate) fn new(shared: Weak<Shared>) -> Self {
        Self(shared)
    }

    pub(crate) fn post(&self, input: Input) {
        match self.0.upgrade() {
            Some(shared) => shared.post(input),
            None => debug!(?input, "Player released, dropping input"),
        }
    }

    pub(crate) fn event(&self, token: SessionToken, event: PlayerEvent) {
        self.post(Input::Event(token, event));
    }
}

/// Build the shared state; `build` receives an inbox pointing back at it
pub(crate) fn shared_cyclic(build: impl FnOnce(Inbox) -> Controller) -> Rc<Shared> {
    Rc::new_cyclic(|weak| Dispatcher::new(build(Inbox::new(weak.clone()))))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Logs when each input starts and finishes; input 1 posts two more
    /// while it is being applied
    struct Recorder {
        trace: Vec<String>,
        dispatcher: Weak<Dispatcher<Recorder>>,
    }

    impl Apply for Recorder {
        type Input = u32;

        fn apply(&mut self, input: u32) {
            self.trace.push(format!("begin {}", input));
            if input == 1 {
                if let Some(dispatcher) = self.dispatcher.upgrade() {
                    dispatcher.post(10);
                    dispatcher.post(11);
                }
            }
            self.trace.push(format!("end {}", input));
        }
    }

    fn recorder() -> Rc<Dispatcher<Recorder>> {
        Rc::new_cyclic(|weak| {
            Dispatcher::new(Recorder {
                trace: Vec::new(),
                dispatcher: weak.clone(),
            })
        })
    }

    #[test]
    fn test_nested_posts_run_after_current_input() {
        let dispatcher = recorder();
        dispatcher.post(1);
        dispatcher.post(2);

        assert_eq!(
            dispatcher.target.borrow().trace,
            vec![
                "begin 1", "end 1", "begin 10", "end 10", "begin 11", "end 11", "begin 2",
                "end 2",
            ]
        );
        assert!(dispatcher.queue.borrow().is_empty());
    }

    #[test]
    fn test_post_while_borrowed_waits_for_next_pump() {
        let dispatcher = recorder();
        {
            let _held = dispatcher.target.borrow_mut();
            dispatcher.post(5);
            dispatcher.post(6);
        }
        assert_eq!(dispatcher.queue.borrow().len(), 2);

        dispatcher.post(7);
        assert_eq!(
            dispatcher.target.borrow().trace,
            vec!["begin 5", "end 5", "begin 6", "end 6", "begin 7", "end 7"]
        );
    }
}
