//! Application orchestration
//!
//! [`App`] owns the terminal, the event channel and the background tasks.
//! The loop drains pending events into the state, renders one frame from a
//! snapshot and then yields until the next frame is due.

use std::{future::Future, sync::Arc, time::Duration};

use smol::{future::FutureExt, Task};
use tracing::{debug, error, info};

use crate::{
    error::EmojidexResult,
    event::{Event, EventHandler},
    state::AtomicState,
    tui::Tui,
};

/// Minimum delay between frames when the channel is idle
const FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// How long shutdown waits for each background task
const TASK_GRACE: Duration = Duration::from_secs(1);

pub struct App<S: AtomicState> {
    tui: Tui<S>,
    events: Arc<EventHandler>,
    /// Terminal polling interval
    tick_rate: Duration,
    tasks: Vec<Task<EmojidexResult<()>>>,
}

impl<S: AtomicState + 'static> App<S> {
    pub fn new(state: S, tick_rate: Duration) -> EmojidexResult<Self> {
        let tui = Tui::new(state)?;

        Ok(Self {
            tui,
            events: Arc::new(EventHandler::new()),
            tick_rate,
            tasks: Vec::new(),
        })
    }

    /// Spawns a background task that is awaited on shutdown
    pub fn spawn<F>(&mut self, future: F) -> EmojidexResult<()>
    where
        F: Future<Output = EmojidexResult<()>> + Send + 'static,
    {
        self.tasks.push(smol::spawn(future));
        Ok(())
    }

    /// Runs until the state stops running
    pub async fn run<F>(&mut self, render_fn: F) -> EmojidexResult<()>
    where
        F: Fn(&S::Snapshot, ratatui::layout::Rect, &mut ratatui::Frame<'_>) + Send + 'static,
    {
        let events = self.events.clone();
        let tick_rate = self.tick_rate;
        self.spawn(async move { events.run(tick_rate).await })?;
        info!(tick_rate_ms = tick_rate.as_millis() as u64, "event loop started");

        let mut dirty = true;
        while self.tui.state().is_running() {
            while let Some(event) = self.events.try_recv()? {
                if let Event::Quit = event {
                    self.tui.state().quit();
                    break;
                }
                self.tui.state().handle_event(&event)?;
                dirty = true;
            }

            if !self.tui.state().is_running() {
                break;
            }

            if dirty {
                self.tui.render(&render_fn)?;
                dirty = false;
            }

            smol::Timer::after(FRAME_INTERVAL).await;
        }

        debug!("event loop stopping");
        self.events.stop();
        self.cleanup_tasks().await;

        Ok(())
    }

    async fn cleanup_tasks(&mut self) {
        let tasks = std::mem::take(&mut self.tasks);
        for task in tasks {
            let joined = task
                .or(async {
                    smol::Timer::after(TASK_GRACE).await;
                    Ok(())
                })
                .await;
            if let Err(e) = joined {
                error!(error = %e, "background task failed");
            }
        }
    }

    pub fn tui(&self) -> &Tui<S> {
        &self.tui
    }

    /// Shared handle for tasks that post [`Event::Custom`] results
    pub fn events(&self) -> Arc<EventHandler> {
        self.events.clone()
    }

    pub fn tick_rate(&self) -> Duration {
        self.tick_rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        catalog::Catalog,
        router::View,
        session::Session,
        state::SessionState,
        store::{KvStore, MemoryStore, UserStore},
    };

    fn state() -> SessionState {
        let store = UserStore::open(Box::new(MemoryStore::new()) as Box<dyn KvStore>);
        SessionState::new(Session::new(Catalog::builtin(), store, View::Landing))
    }

    #[test]
    fn test_app_creation() {
        std::env::set_var("TERM", "dumb");

        let app_result = App::new(state(), Duration::from_millis(50));
        assert!(
            app_result.is_err(),
            "App creation should fail in test environment"
        );
    }

    #[test]
    fn test_task_spawning() {
        std::env::set_var("TERM", "dumb");

        if let Ok(mut app) = App::new(state(), Duration::from_millis(50)) {
            let spawn_result = app.spawn(async { Ok(()) });
            assert!(spawn_result.is_ok());
            assert_eq!(app.tasks.len(), 1);
        }
    }
}
