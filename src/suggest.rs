use std::time::Duration;

use tracing::{debug, warn};

use crate::media::{without_adult, ApiError, MovieSummary};

pub const SUGGESTION_LIMIT: usize = 5;

/// Sequence number stamped on every keystroke. Only the newest one may fire a
/// lookup or apply its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

#[derive(Debug, Clone)]
pub struct SearchSuggest {
    pub input: String,
    pub results: Vec<MovieSummary>,
    pub loading: bool,
    pub visible: bool,
    latest: u64,
    min_chars: usize,
    debounce: Duration,
}

impl SearchSuggest {
    pub fn new(min_chars: usize, debounce: Duration) -> Self {
        Self {
            input: String::new(),
            results: Vec::new(),
            loading: false,
            visible: false,
            latest: 0,
            min_chars,
            debounce,
        }
    }

    pub fn debounce(&self) -> Duration {
        self.debounce
    }

    pub fn input(&mut self, value: String) -> Option<Ticket> {
        self.latest += 1;
        self.input = value;

        if self.input.trim().chars().count() < self.min_chars {
            self.results.clear();
            self.loading = false;
            self.visible = false;
            return None;
        }
        Some(Ticket(self.latest))
    }

    pub fn fire(&mut self, ticket: Ticket) -> Option<String> {
        if ticket.0 != self.latest {
            debug!(?ticket, latest = self.latest, "suggestion superseded before firing");
            return None;
        }
        self.loading = true;
        self.visible = true;
        Some(self.input.trim().to_string())
    }

    pub fn complete(&mut self, ticket: Ticket, result: Result<Vec<MovieSummary>, ApiError>) -> bool {
        if ticket.0 != self.latest {
            debug!(?ticket, latest = self.latest, "stale suggestions discarded");
            return false;
        }
        self.loading = false;
        match result {
            Ok(items) => {
                self.results = without_adult(items).into_iter().take(SUGGESTION_LIMIT).collect();
            }
            Err(error) => warn!(%error, "suggestion lookup failed"),
        }
        true
    }

    pub fn dismiss(&mut self) {
        self.visible = false;
    }

    pub fn submit(&mut self) -> Option<String> {
        let keyword = self.input.trim();
        if keyword.is_empty() {
            return None;
        }
        let keyword = keyword.to_string();
        self.visible = false;
        Some(keyword)
    }

    pub fn is_open(&self) -> bool {
        self.visible && (self.loading || !self.results.is_empty())
    }
}
