//! Fetch state for the tree screen.
//!
//! Every request gets a ticket carrying a generation number. Only the newest
//! ticket may change the state, so a slow response that lands after a
//! refresh has started is dropped instead of overwriting newer data.

use crate::api::{ApiError, TreeSource};
use crate::model::TreeResponse;
use crate::session::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestTicket(u64);

#[derive(Debug, Clone, PartialEq)]
pub enum LoadState {
    Idle,
    Loading,
    Loaded(TreeResponse),
    /// Message shown next to the retry action.
    Failed(String),
}

#[derive(Debug)]
pub struct TreeLoader {
    state: LoadState,
    latest: u64,
    in_flight: bool,
    last_good: Option<TreeResponse>,
}

impl Default for TreeLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeLoader {
    pub fn new() -> Self {
        Self {
            state: LoadState::Idle,
            latest: 0,
            in_flight: false,
            last_good: None,
        }
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight
    }

    /// Tree to draw right now: the fresh one if loaded, otherwise the last
    /// good one while a refresh is running. Nothing after a failure.
    pub fn visible_tree(&self) -> Option<&TreeResponse> {
        match &self.state {
            LoadState::Loaded(response) => Some(response),
            LoadState::Loading => self.last_good.as_ref(),
            LoadState::Idle | LoadState::Failed(_) => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.state {
            LoadState::Failed(message) => Some(message),
            _ => None,
        }
    }

    /// Starts a request; any earlier ticket becomes stale.
    pub fn begin(&mut self) -> RequestTicket {
        self.latest += 1;
        self.in_flight = true;
        self.state = LoadState::Loading;
        log::debug!("tree request #{} started", self.latest);
        RequestTicket(self.latest)
    }

    pub fn retry(&mut self) -> RequestTicket {
        self.begin()
    }

    pub fn is_current(&self, ticket: RequestTicket) -> bool {
        ticket.0 == self.latest
    }

    /// Applies a finished request. Returns false when the ticket was
    /// superseded and the result was discarded.
    pub fn complete(&mut self, ticket: RequestTicket, result: Result<TreeResponse, ApiError>) -> bool {
        if !self.is_current(ticket) {
            log::warn!(
                "dropping stale tree response #{} (latest is #{})",
                ticket.0,
                self.latest
            );
            return false;
        }
        self.in_flight = false;
        self.state = match result {
            Ok(response) => {
                log::debug!(
                    "tree request #{} loaded {} nodes",
                    ticket.0,
                    response.tree.node_count()
                );
                self.last_good = Some(response.clone());
                LoadState::Loaded(response)
            }
            Err(err) => {
                log::warn!("tree request #{} failed: {err}", ticket.0);
                LoadState::Failed(err.to_string())
            }
        };
        true
    }

    /// Runs one request to completion against `source`.
    pub fn load_with<S: TreeSource + ?Sized>(&mut self, source: &S, session: &Session) -> &LoadState {
        let ticket = self.begin();
        let result = source.fetch_tree(session);
        self.complete(ticket, result);
        &self.state
    }
}
