//! Decisions behind the infinite-scroll sentinel.
//!
//! The browser side (an `IntersectionObserver` on an element under the
//! list) lives in the views; this only decides when to observe and when
//! an intersection should advance the page.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObserverAction {
    Connect,
    Disconnect,
    Keep,
}

#[derive(Debug, Clone, Default)]
pub struct ScrollSentinel {
    observing: bool,
}

impl ScrollSentinel {
    /// Observe only while there is a next page to load.
    pub fn sync(&mut self, has_next_page: bool) -> ObserverAction {
        match (self.observing, has_next_page) {
            (false, true) => {
                self.observing = true;
                ObserverAction::Connect
            }
            (true, false) => {
                self.observing = false;
                ObserverAction::Disconnect
            }
            _ => ObserverAction::Keep,
        }
    }

    #[cfg(test)]
    pub fn is_observing(&self) -> bool {
        self.observing
    }

    pub fn should_advance(&self, intersecting: bool, has_next_page: bool, fetching: bool) -> bool {
        self.observing && intersecting && has_next_page && !fetching
    }
}

/// `rootMargin` extending the viewport downwards so the next page starts
/// loading before the sentinel scrolls into view.
pub fn root_margin(forward_px: u32) -> String {
    format!("0px 0px {forward_px}px 0px")
}
