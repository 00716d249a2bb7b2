//! Two-way sync between the browser query string and the filter state.
//!
//! Two write paths meet here: external navigation (links, back/forward)
//! decodes the URL into the live filters, and settled local edits are
//! written back with a history replace. The reference query string kept in
//! [`UrlSync`] is what stops our own write from coming back as an
//! "external" change.

use futures::stream::{Stream, StreamExt};
use futures::select;
use shared::{FilterState, build_url, query_string, read_filters};
use std::pin::pin;

use crate::router::{NavigateOptions, Router};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    Idle,
    AwaitingDebounce,
    WritingUrl,
}

#[derive(Debug, Clone)]
pub struct UrlSync {
    route_path: String,
    /// Query we last wrote, or the last external one we accepted.
    last_synced_query: String,
    phase: SyncPhase,
}

fn without_question_mark(query: &str) -> &str {
    query.strip_prefix('?').unwrap_or(query)
}

impl UrlSync {
    pub fn new(route_path: impl Into<String>, initial_query: &str) -> Self {
        Self {
            route_path: route_path.into(),
            last_synced_query: without_question_mark(initial_query).to_string(),
            phase: SyncPhase::Idle,
        }
    }

    #[cfg(test)]
    pub fn phase(&self) -> SyncPhase {
        self.phase
    }

    /// The router reported `query`. Returns the decoded filters when the
    /// change came from outside; our own echo returns `None`.
    pub fn external_query_changed(&mut self, query: &str) -> Option<FilterState> {
        let query = without_question_mark(query);
        if query == self.last_synced_query {
            if self.phase == SyncPhase::WritingUrl {
                self.phase = SyncPhase::Idle;
            }
            return None;
        }
        // Accepting it as the new reference keeps a later back/forward to a
        // URL we wrote earlier from being mistaken for an echo.
        self.last_synced_query = query.to_string();
        self.phase = SyncPhase::Idle;
        Some(read_filters(query))
    }

    pub fn local_edit(&mut self) {
        self.phase = SyncPhase::AwaitingDebounce;
    }

    /// The debounced filters settled. Returns the URL to replace when it
    /// differs canonically from the current one.
    pub fn debounce_elapsed(&mut self, debounced: &FilterState, current_query: &str) -> Option<String> {
        let target = build_url(&self.route_path, debounced);
        let current = build_url(&self.route_path, &read_filters(current_query));
        if target == current {
            self.phase = SyncPhase::Idle;
            return None;
        }
        // Recorded before navigating so the echo is recognised.
        self.last_synced_query = query_string(debounced);
        self.phase = SyncPhase::WritingUrl;
        Some(target)
    }
}

/// Drives [`UrlSync`] from the router's query changes, the live filters and
/// the debounced filters. One loop owns the state machine, so the two write
/// paths never interleave.
///
/// `on_external` receives filters decoded from external navigation; the
/// caller writes them into the live state.
pub async fn run_url_sync<R, Q, L, D, E>(
    mut sync: UrlSync,
    router: R,
    query_changes: Q,
    live_filters: L,
    debounced_filters: D,
    mut on_external: E,
) where
    R: Router,
    Q: Stream<Item = String>,
    L: Stream<Item = FilterState>,
    D: Stream<Item = FilterState>,
    E: FnMut(FilterState),
{
    let mut query_changes = pin!(query_changes.fuse());
    let mut live_filters = pin!(live_filters.fuse());
    let mut debounced_filters = pin!(debounced_filters.fuse());

    loop {
        select! {
            query = query_changes.next() => {
                if let Some(query) = query {
                    if let Some(filters) = sync.external_query_changed(&query) {
                        on_external(filters);
                    }
                }
            }
            live = live_filters.next() => {
                if live.is_some() {
                    sync.local_edit();
                }
            }
            settled = debounced_filters.next() => {
                if let Some(filters) = settled {
                    if let Some(url) = sync.debounce_elapsed(&filters, &router.current_query()) {
                        router.replace(&url, NavigateOptions { scroll: false });
                    }
                }
            }
            complete => break,
        }
    }
}
