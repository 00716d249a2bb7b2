//! Total number of members matching the text filters.
//!
//! Keyed by [`MemberFilter`] only, so sorting or paging never refetches it.

use shared::{ApiError, FilterState, MemberFilter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CountState {
    Pending,
    Failed(String),
    Available(u64),
}

impl CountState {
    pub fn label(&self) -> String {
        match self {
            CountState::Pending => "…".to_string(),
            CountState::Failed(_) => "—".to_string(),
            CountState::Available(count) => format_count(*count),
        }
    }

    pub fn available(&self) -> Option<u64> {
        match self {
            CountState::Available(count) => Some(*count),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountTicket {
    pub generation: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CountRequest {
    pub ticket: CountTicket,
    pub filter: MemberFilter,
}

#[derive(Debug, Clone)]
pub struct TotalCount {
    key: Option<MemberFilter>,
    generation: u64,
    state: CountState,
}

impl Default for TotalCount {
    fn default() -> Self {
        Self {
            key: None,
            generation: 0,
            state: CountState::Pending,
        }
    }
}

impl TotalCount {
    pub fn state(&self) -> &CountState {
        &self.state
    }

    /// Request a fresh count when the text filters changed.
    pub fn set_filters(&mut self, filters: &FilterState) -> Option<CountRequest> {
        let filter = filters.member_filter();
        if self.key.as_ref() == Some(&filter) {
            return None;
        }
        self.key = Some(filter);
        self.request()
    }

    /// `ticket` belongs to the latest request and its answer is still open.
    pub fn is_awaiting(&self, ticket: CountTicket) -> bool {
        ticket.generation == self.generation && self.state == CountState::Pending
    }

    pub fn count_loaded(&mut self, ticket: CountTicket, result: Result<u64, ApiError>) -> bool {
        if !self.is_awaiting(ticket) {
            return false;
        }
        self.state = match result {
            Ok(count) => CountState::Available(count),
            Err(error) => CountState::Failed(error.to_string()),
        };
        true
    }

    pub fn retry(&mut self) -> Option<CountRequest> {
        match self.state {
            CountState::Failed(_) => self.request(),
            _ => None,
        }
    }

    fn request(&mut self) -> Option<CountRequest> {
        let filter = self.key.clone()?;
        self.generation += 1;
        self.state = CountState::Pending;
        Some(CountRequest {
            ticket: CountTicket {
                generation: self.generation,
            },
            filter,
        })
    }
}

/// `ceil(count / page_size)`, never less than 1.
pub fn total_pages(count: u64, page_size: u32) -> u64 {
    let page_size = u64::from(page_size.max(1));
    count.div_ceil(page_size).max(1)
}

/// `1234567` -> `"1,234,567"`.
pub fn format_count(count: u64) -> String {
    let digits = count.to_string();
    let mut formatted = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            formatted.push(',');
        }
        formatted.push(digit);
    }
    formatted
}

/// "Page X of Y · N members". Y is only known once the count arrived.
pub fn page_summary(page: u32, count: &CountState, page_size: u32) -> String {
    let current = u64::from(page) + 1;
    let total = match count.available() {
        Some(count) => total_pages(count, page_size).to_string(),
        None => count.label(),
    };
    let noun = if count.available() == Some(1) { "member" } else { "members" };
    format!("Page {current} of {total} · {} {noun}", count.label())
}
