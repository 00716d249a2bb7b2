//! Shareable link for the current debounced filters, plus the transient
//! "copied" flag shown after a successful clipboard write.

use shared::{FilterState, build_url};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareLink {
    pub path: String,
    pub absolute: Option<String>,
}

impl ShareLink {
    pub fn new(route_path: &str, filters: &FilterState, origin: Option<&str>) -> Self {
        let path = build_url(route_path, filters);
        let absolute = origin
            .map(|origin| origin.trim_end_matches('/'))
            .filter(|origin| !origin.is_empty() && *origin != "null")
            .map(|origin| format!("{origin}{path}"));
        Self { path, absolute }
    }

    /// What goes to the clipboard: the absolute URL when the origin is known.
    pub fn copy_target(&self) -> &str {
        self.absolute.as_deref().unwrap_or(&self.path)
    }
}

/// Each successful copy gets a new stamp; a reset timer only clears the
/// flag if no newer copy happened in the meantime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CopiedFlag {
    stamp: u64,
    copied: bool,
}

impl CopiedFlag {
    pub fn is_copied(&self) -> bool {
        self.copied
    }

    /// Returns the stamp to hand to the reset timer.
    pub fn copy_succeeded(&mut self) -> u64 {
        self.stamp += 1;
        self.copied = true;
        self.stamp
    }

    pub fn reset_elapsed(&mut self, stamp: u64) -> bool {
        if stamp != self.stamp || !self.copied {
            return false;
        }
        self.copied = false;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{DEFAULT_ROUTE_PATH, FilterField, SortOption};

    #[test]
    fn test_relative_and_absolute_links() {
        let filters = FilterState::default()
            .with_filter(FilterField::Industry, "Finance")
            .with_sort(SortOption::CohortDesc);
        let link = ShareLink::new(DEFAULT_ROUTE_PATH, &filters, Some("https://alumni.example.org/"));

        assert_eq!(link.path, "/directory?industry=Finance&sort=cohort_desc");
        assert_eq!(
            link.copy_target(),
            "https://alumni.example.org/directory?industry=Finance&sort=cohort_desc"
        );
    }

    #[test]
    fn test_without_origin_copies_path() {
        let link = ShareLink::new(DEFAULT_ROUTE_PATH, &FilterState::default(), None);
        assert_eq!(link.absolute, None);
        assert_eq!(link.copy_target(), "/directory");

        let opaque = ShareLink::new(DEFAULT_ROUTE_PATH, &FilterState::default(), Some("null"));
        assert_eq!(opaque.copy_target(), "/directory");
    }

    #[test]
    fn test_newer_copy_outlives_older_timer() {
        let mut flag = CopiedFlag::default();
        let first = flag.copy_succeeded();
        let second = flag.copy_succeeded();

        assert!(!flag.reset_elapsed(first));
        assert!(flag.is_copied());
        assert!(flag.reset_elapsed(second));
        assert!(!flag.is_copied());
        assert!(!flag.reset_elapsed(second));
    }
}
