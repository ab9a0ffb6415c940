use std::time::Duration;

use crossterm::event::{self, Event as CrosstermEvent, KeyEvent, MouseEvent};
use tokio::sync::mpsc;

use crate::api::GitInfo;
use crate::error::Result;
use crate::notes::file::{FileId, NoteFile};
use crate::notes::tree::FolderNode;

/// Completion of a background request to the backend.
#[derive(Debug)]
pub enum ApiEvent {
    LoggedIn(Result<()>),
    Listed(Result<Vec<FolderNode>>),
    /// `generation` identifies the query; stale ones are dropped.
    Searched {
        generation: u64,
        result: Result<Vec<FolderNode>>,
    },
    Pulled(Result<()>),
    Pushed(Result<()>),
    Loaded(Result<NoteFile>),
    Edited {
        id: FileId,
        result: Result<()>,
    },
    Committed {
        filename: String,
        result: Result<()>,
    },
    GitInfo(Result<GitInfo>),
}

/// Application events.
#[derive(Debug)]
pub enum Event {
    Key(KeyEvent),
    Mouse(MouseEvent),
    /// A periodic tick for rendering and timers.
    Tick,
    #[allow(dead_code)]
    Resize(u16, u16),
    /// The search debounce delay for `generation` has elapsed.
    SearchDue { generation: u64 },
    Api(ApiEvent),
}

/// Async event handler that polls crossterm events and forwards them via a channel.
pub struct EventHandler {
    rx: mpsc::UnboundedReceiver<Event>,
    tx: mpsc::UnboundedSender<Event>,
}

impl EventHandler {
    /// Create a new EventHandler with the given tick rate.
    pub fn new(tick_rate: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let event_tx = tx.clone();

        tokio::spawn(async move {
            loop {
                let event = if event::poll(tick_rate).unwrap_or(false) {
                    match event::read() {
                        Ok(CrosstermEvent::Key(key)) => Event::Key(key),
                        Ok(CrosstermEvent::Mouse(mouse)) => Event::Mouse(mouse),
                        Ok(CrosstermEvent::Resize(w, h)) => Event::Resize(w, h),
                        _ => continue,
                    }
                } else {
                    Event::Tick
                };
                if event_tx.send(event).is_err() {
                    break;
                }
            }
        });

        Self { rx, tx }
    }

    /// Get a sender clone for background tasks to report completions.
    pub fn sender(&self) -> mpsc::UnboundedSender<Event> {
        self.tx.clone()
    }

    /// Receive the next event (blocks until available).
    pub async fn next(&mut self) -> Result<Event> {
        self.rx
            .recv()
            .await
            .ok_or_else(|| crate::error::AppError::Terminal("Event channel closed".into()))
    }
}
