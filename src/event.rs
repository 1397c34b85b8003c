//! Event handling
//!
//! Terminal input and results from background work share one bounded
//! channel. Background tasks post their results as [`Event::Custom`] and the
//! state downcasts them on receipt.

use crossterm::event::{Event as CrosstermEvent, KeyEvent, KeyEventKind, MouseEvent};
use smol::channel::{bounded, Receiver, Sender};
use std::{
    any::Any,
    fmt::Debug,
    sync::atomic::{AtomicBool, Ordering},
    time::Duration,
};

use crate::error::{EmojidexError, EmojidexResult};

/// Maximum number of pending events in the channel
pub(crate) const MAX_EVENTS: usize = 1024;

#[derive(Debug, Clone)]
pub enum Event {
    /// Key presses; release and repeat events are filtered out
    Key(KeyEvent),
    Mouse(MouseEvent),
    Resize(u16, u16),
    /// Payload from a background task
    Custom(Box<dyn CloneableAny + Send>),
    /// Terminates the event loop
    Quit,
}

impl Event {
    /// Wraps a background task payload.
    pub fn custom<T: CloneableAny + Send>(payload: T) -> Self {
        Event::Custom(Box::new(payload))
    }

    /// Borrows a custom payload as `T`, if it is one.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            Event::Custom(payload) => (**payload).as_any().downcast_ref::<T>(),
            _ => None,
        }
    }
}

/// A cloneable, downcastable payload
pub trait CloneableAny: Any + Debug {
    fn clone_box(&self) -> Box<dyn CloneableAny + Send>;

    fn as_any(&self) -> &dyn Any;
}

impl<T> CloneableAny for T
where
    T: 'static + Any + Clone + Send + Debug,
{
    fn clone_box(&self) -> Box<dyn CloneableAny + Send> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Clone for Box<dyn CloneableAny + Send> {
    fn clone(&self) -> Box<dyn CloneableAny + Send> {
        // Dispatch on the inner value, not on the box itself.
        (**self).clone_box()
    }
}

#[derive(Debug)]
pub struct EventHandler {
    tx: Sender<Event>,
    rx: Receiver<Event>,
    running: AtomicBool,
}

impl EventHandler {
    pub fn new() -> Self {
        let (tx, rx) = bounded(MAX_EVENTS);
        Self {
            tx,
            rx,
            running: AtomicBool::new(true),
        }
    }

    /// Attempts to send an event through the channel without blocking
    pub fn try_send(&self, event: Event) -> EmojidexResult<()> {
        self.tx
            .try_send(event)
            .map_err(|_| EmojidexError::channel_closed("event channel", (0, 0)).into())
    }

    /// Non-blocking attempt to receive an event
    pub fn try_recv(&self) -> EmojidexResult<Option<Event>> {
        match self.rx.try_recv() {
            Ok(event) => Ok(Some(event)),
            Err(smol::channel::TryRecvError::Empty) => Ok(None),
            Err(_) => Err(EmojidexError::channel_closed("event channel", (0, 0)).into()),
        }
    }

    /// Polls the terminal and forwards input until stopped
    pub async fn run(&self, tick_rate: Duration) -> EmojidexResult<()> {
        while self.running.load(Ordering::Acquire) {
            if self.poll_events(tick_rate)? {
                match self.read_event()? {
                    CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => {
                        self.try_send(Event::Key(key))?;
                    }
                    CrosstermEvent::Mouse(mouse) => {
                        self.try_send(Event::Mouse(mouse))?;
                    }
                    CrosstermEvent::Resize(width, height) => {
                        self.try_send(Event::Resize(width, height))?;
                    }
                    _ => {}
                }
            }

            smol::future::yield_now().await;
        }

        Ok(())
    }

    fn poll_events(&self, tick_rate: Duration) -> EmojidexResult<bool> {
        crossterm::event::poll(tick_rate).map_err(|e| {
            EmojidexError::terminal(
                "event polling",
                (0, 0),
                format!("Failed to poll events: {}", e),
            )
            .into()
        })
    }

    fn read_event(&self) -> EmojidexResult<CrosstermEvent> {
        crossterm::event::read().map_err(|e| {
            EmojidexError::terminal(
                "event reading",
                (0, 0),
                format!("Failed to read event: {}", e),
            )
            .into()
        })
    }

    pub fn stop(&self) {
        self.running.store(false, Ordering::Release);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyModifiers};
    use pretty_assertions::assert_eq;
    use smol::block_on;

    #[derive(Debug, Clone, PartialEq)]
    struct Payload(u64);

    #[test]
    fn test_event_handler_lifecycle() {
        let handler = EventHandler::new();
        assert!(handler.is_running());

        handler.stop();
        assert!(!handler.is_running());
    }

    #[test]
    fn test_event_sending() {
        let handler = EventHandler::new();

        let key_event = Event::Key(KeyEvent::new(KeyCode::Char('a'), KeyModifiers::empty()));
        assert!(handler.try_send(key_event).is_ok());

        let received = block_on(async { handler.try_recv() }).unwrap();
        assert!(matches!(received, Some(Event::Key(_))));
        assert!(handler.try_recv().unwrap().is_none());
    }

    #[test]
    fn test_custom_payload_downcast() {
        let handler = EventHandler::new();
        handler.try_send(Event::custom(Payload(42))).unwrap();

        let event = handler.try_recv().unwrap().unwrap();
        assert_eq!(event.downcast_ref::<Payload>(), Some(&Payload(42)));
        assert_eq!(event.downcast_ref::<String>(), None);

        let cloned = event.clone();
        assert_eq!(cloned.downcast_ref::<Payload>(), Some(&Payload(42)));
        assert_eq!(Event::Quit.downcast_ref::<Payload>(), None);
    }

    #[test]
    fn test_channel_capacity() {
        let handler = EventHandler::new();

        for _ in 0..MAX_EVENTS {
            let event = Event::Key(KeyEvent::new(KeyCode::Char('a'), KeyModifiers::empty()));
            assert!(handler.try_send(event).is_ok());
        }

        let event = Event::Key(KeyEvent::new(KeyCode::Char('a'), KeyModifiers::empty()));
        assert!(handler.try_send(event).is_err());
    }
}
