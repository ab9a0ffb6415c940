//! Background requests queued by the UI and run on the tokio runtime.
//!
//! State updates never wait on the network: they queue an [`Action`], the
//! main loop hands it to [`spawn`], and the result comes back as an
//! [`ApiEvent`] on the event channel.

use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

use crate::api::ApiClient;
use crate::event::{ApiEvent, Event};
use crate::notes::file::FileId;

/// A request the UI wants performed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Login { username: String, password: String },
    List,
    /// Wait out the debounce delay, then report `Event::SearchDue`.
    ScheduleSearch { generation: u64, delay: Duration },
    Search { generation: u64, query: String },
    Pull,
    Push,
    Load(FileId),
    Edit { id: FileId, content: String },
    Commit { filename: String, content: String },
    GitInfo,
}

impl Action {
    /// Short label for logs. Never includes request data such as passwords.
    pub fn name(&self) -> &'static str {
        match self {
            Action::Login { .. } => "login",
            Action::List => "list",
            Action::ScheduleSearch { .. } => "schedule_search",
            Action::Search { .. } => "search",
            Action::Pull => "pull",
            Action::Push => "push",
            Action::Load(_) => "load",
            Action::Edit { .. } => "edit",
            Action::Commit { .. } => "commit",
            Action::GitInfo => "git_info",
        }
    }
}

/// Run `action` in the background, reporting its outcome on `tx`.
pub fn spawn(action: Action, client: &ApiClient, tx: &UnboundedSender<Event>) {
    let client = client.clone();
    let tx = tx.clone();
    debug!(action = action.name(), "dispatching");

    tokio::spawn(async move {
        let event = match action {
            Action::Login { username, password } => {
                ApiEvent::LoggedIn(client.login(&username, &password).await)
            }
            Action::List => ApiEvent::Listed(client.list().await),
            Action::ScheduleSearch { generation, delay } => {
                tokio::time::sleep(delay).await;
                let _ = tx.send(Event::SearchDue { generation });
                return;
            }
            Action::Search { generation, query } => ApiEvent::Searched {
                generation,
                result: client.search(&query).await,
            },
            Action::Pull => ApiEvent::Pulled(client.pull().await),
            Action::Push => ApiEvent::Pushed(client.push().await),
            Action::Load(id) => ApiEvent::Loaded(client.load(id).await),
            Action::Edit { id, content } => ApiEvent::Edited {
                id,
                result: client.edit(id, &content).await,
            },
            Action::Commit { filename, content } => {
                let result = client.commit(&filename, &content).await;
                ApiEvent::Committed { filename, result }
            }
            Action::GitInfo => ApiEvent::GitInfo(client.git_info().await),
        };
        // The receiver only goes away on shutdown.
        let _ = tx.send(Event::Api(event));
    });
}
