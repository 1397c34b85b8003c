//! State traits and the shared session state

use std::{
    fmt::Debug,
    sync::{
        atomic::{AtomicBool, Ordering},
        Mutex, MutexGuard, PoisonError,
    },
};

use crossterm::event::{KeyCode, KeyModifiers};

use crate::{
    ai::AiOutcome,
    error::EmojidexResult,
    event::Event,
    session::{Flow, Session, SessionSnapshot},
};

/// Represents an immutable snapshot of application state
pub trait StateSnapshot: Clone + Send + Debug + 'static {
    /// Returns whether the application should quit
    fn should_quit(&self) -> bool;
}

/// Represents a thread-safe application state
pub trait AtomicState: Send + Sync + Debug + 'static {
    /// The type of snapshot this state produces
    type Snapshot: StateSnapshot;

    /// Take a consistent snapshot of the current state
    fn snapshot(&self) -> Self::Snapshot;

    /// Apply one event from the event loop
    fn handle_event(&self, event: &Event) -> EmojidexResult<()>;

    /// Signal the application to quit
    fn quit(&self);

    /// Check if the application is still running
    fn is_running(&self) -> bool;
}

impl StateSnapshot for SessionSnapshot {
    fn should_quit(&self) -> bool {
        !self.running
    }
}

/// [`Session`] behind a lock, with a lock-free running flag
#[derive(Debug)]
pub struct SessionState {
    session: Mutex<Session>,
    running: AtomicBool,
}

impl SessionState {
    pub fn new(session: Session) -> Self {
        Self {
            session: Mutex::new(session),
            running: AtomicBool::new(true),
        }
    }

    /// Locks the session. A poisoned lock still yields the session.
    pub fn lock(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl AtomicState for SessionState {
    type Snapshot = SessionSnapshot;

    /// Snapshots are taken once per frame, so the notice counts as shown.
    fn snapshot(&self) -> Self::Snapshot {
        let mut session = self.lock();
        session.mark_rendered();
        session.snapshot(self.is_running())
    }

    fn handle_event(&self, event: &Event) -> EmojidexResult<()> {
        match event {
            Event::Key(key)
                if key.modifiers.contains(KeyModifiers::CONTROL)
                    && key.code == KeyCode::Char('c') =>
            {
                self.quit()
            }
            Event::Key(key) => {
                if self.lock().handle_key(*key) == Flow::Quit {
                    self.quit();
                }
            }
            Event::Mouse(mouse) => self.lock().handle_mouse(*mouse),
            Event::Custom(_) => {
                if let Some(outcome) = event.downcast_ref::<AiOutcome>() {
                    self.lock().handle_outcome(outcome);
                }
            }
            Event::Resize(..) => {}
            Event::Quit => self.quit(),
        }
        Ok(())
    }

    fn quit(&self) {
        self.running.store(false, Ordering::Release);
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        ai::{AiReply, Sentiment},
        catalog::Catalog,
        router::View,
        session::{AiLink, NoticeLevel},
        store::{KvStore, MemoryStore, UserStore},
    };
    use crossterm::event::KeyEvent;
    use pretty_assertions::assert_eq;

    fn state_at(view: View) -> SessionState {
        let store = UserStore::open(Box::new(MemoryStore::new()) as Box<dyn KvStore>);
        SessionState::new(Session::new(Catalog::builtin(), store, view))
    }

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::empty()))
    }

    #[test]
    fn test_state_lifecycle() {
        let state = state_at(View::Landing);
        assert!(state.is_running());
        assert!(!state.snapshot().should_quit());

        state.quit();
        assert!(!state.is_running());
        assert!(state.snapshot().should_quit());
    }

    #[test]
    fn test_key_events_drive_the_session() {
        let state = state_at(View::Landing);
        state.handle_event(&key(KeyCode::Enter)).unwrap();
        assert_eq!(state.snapshot().view, View::Home);

        state.handle_event(&Event::Resize(80, 24)).unwrap();
        assert!(state.is_running());

        state
            .handle_event(&Event::Key(KeyEvent::new(
                KeyCode::Char('c'),
                KeyModifiers::CONTROL,
            )))
            .unwrap();
        assert!(!state.is_running());
    }

    #[test]
    fn test_landing_q_quits() {
        let state = state_at(View::Landing);
        state.handle_event(&key(KeyCode::Char('q'))).unwrap();
        assert!(!state.is_running());
    }

    #[test]
    fn test_custom_events_deliver_ai_outcomes() {
        let (tx, rx) = async_channel::unbounded();
        let store = UserStore::open(Box::new(MemoryStore::new()) as Box<dyn KvStore>);
        let session =
            Session::new(Catalog::builtin(), store, View::Suggest).with_ai(AiLink::Ready(tx));
        let state = SessionState::new(session);

        for c in "meh".chars() {
            state.handle_event(&key(KeyCode::Char(c))).unwrap();
        }
        state.handle_event(&key(KeyCode::Enter)).unwrap();
        let request = rx.try_recv().unwrap();

        let reply = AiReply::Sentiment(Sentiment {
            overall: "neutral".into(),
            confidence: 40,
            emotions: vec![],
            tone: "flat".into(),
            emojis: vec![Catalog::builtin().find("U+1F600").unwrap()],
        });
        state
            .handle_event(&Event::custom(AiOutcome {
                seq: request.seq,
                result: Ok(reply.clone()),
            }))
            .unwrap();

        let snapshot = state.snapshot();
        assert_eq!(snapshot.ai.reply, Some(reply));
        assert_eq!(snapshot.ai.pending, None);

        // Payloads of other types are ignored.
        state.handle_event(&Event::custom(42_u32)).unwrap();
        assert!(state.is_running());
    }

    #[test]
    fn test_notice_outlives_keys_until_drawn() {
        let (tx, rx) = async_channel::unbounded();
        let store = UserStore::open(Box::new(MemoryStore::new()) as Box<dyn KvStore>);
        let session =
            Session::new(Catalog::builtin(), store, View::Suggest).with_ai(AiLink::Ready(tx));
        let state = SessionState::new(session);

        for c in "party".chars() {
            state.handle_event(&key(KeyCode::Char(c))).unwrap();
        }
        state.handle_event(&key(KeyCode::Enter)).unwrap();
        let request = rx.try_recv().unwrap();

        // Outcome and key press arrive in the same batch, before any frame.
        state
            .handle_event(&Event::custom(AiOutcome {
                seq: request.seq,
                result: Err("Network error: timed out".into()),
            }))
            .unwrap();
        state.handle_event(&key(KeyCode::Char('x'))).unwrap();

        let drawn = state.snapshot();
        assert_eq!(drawn.notice.map(|n| n.level), Some(NoticeLevel::Error));

        state.handle_event(&key(KeyCode::Char('x'))).unwrap();
        assert_eq!(state.snapshot().notice, None);
    }
}
