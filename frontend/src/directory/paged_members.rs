//! Incremental member pages for one query identity.
//!
//! Pages are fetched strictly one at a time in increasing offset order. A
//! page shorter than `page_size` marks the end of the data. Responses carry
//! the [`PageTicket`] they were issued with; anything from a superseded
//! generation is dropped, so a slow response for old filters never ends up
//! in the visible list.

use shared::{ApiError, FilterState, MemberListQuery, MemberRecord, QueryKey};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageTicket {
    pub generation: u64,
    pub page_index: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageRequest {
    pub ticket: PageTicket,
    pub query: MemberListQuery,
}

/// Outcome of "load more": the page the URL should move to, and the
/// request to start when that page is not cached yet.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadMore {
    pub page: u32,
    pub request: Option<PageRequest>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageFailure {
    pub page_index: u32,
    pub error: ApiError,
}

#[derive(Debug, Clone)]
pub struct PagedMembers {
    page_size: u32,
    key: Option<QueryKey>,
    generation: u64,
    pages: Vec<Vec<MemberRecord>>,
    desired_pages: u32,
    in_flight: Option<PageTicket>,
    failure: Option<PageFailure>,
}

impl PagedMembers {
    pub fn new(page_size: u32) -> Self {
        Self {
            page_size: page_size.max(1),
            key: None,
            generation: 0,
            pages: Vec::new(),
            desired_pages: 1,
            in_flight: None,
            failure: None,
        }
    }

    /// Apply settled filters. A different [`QueryKey`] starts over from
    /// offset 0; the same key only moves the desired page count.
    pub fn set_filters(&mut self, filters: &FilterState) -> Option<PageRequest> {
        self.desired_pages = filters.page.saturating_add(1);
        let key = filters.query_key();
        if self.key.as_ref() != Some(&key) {
            self.key = Some(key);
            self.generation += 1;
            self.pages.clear();
            self.in_flight = None;
            self.failure = None;
        }
        self.next_auto_request()
    }

    /// Response for `ticket`. Returns the follow-up request while more
    /// pages are wanted and available.
    pub fn page_loaded(
        &mut self,
        ticket: PageTicket,
        result: Result<Vec<MemberRecord>, ApiError>,
    ) -> Option<PageRequest> {
        if self.in_flight != Some(ticket) {
            return None;
        }
        self.in_flight = None;
        match result {
            Ok(members) => {
                self.pages.push(members);
                self.next_auto_request()
            }
            Err(error) => {
                self.failure = Some(PageFailure {
                    page_index: ticket.page_index,
                    error,
                });
                None
            }
        }
    }

    /// "Load more": one page past the last visible one, if there is one and
    /// nothing is already in flight. The page counts as desired at once, so
    /// it shows before the debounced page number catches up. A page still
    /// cached from an earlier, deeper position is shown without a request.
    pub fn fetch_next(&mut self) -> Option<LoadMore> {
        if !self.can_fetch_next() {
            return None;
        }
        let next_page = self.visible_page_count();
        self.desired_pages = next_page + 1;
        let request = if next_page < self.loaded_pages() {
            None
        } else {
            self.request(next_page)
        };
        Some(LoadMore {
            page: next_page,
            request,
        })
    }

    pub fn retry(&mut self) -> Option<PageRequest> {
        let failure = self.failure.take()?;
        if self.in_flight.is_some() {
            return None;
        }
        self.request(failure.page_index)
    }

    fn next_auto_request(&mut self) -> Option<PageRequest> {
        if self.in_flight.is_some() || self.failure.is_some() {
            return None;
        }
        let loaded = self.loaded_pages();
        if loaded == 0 {
            return self.request(0);
        }
        if loaded < self.desired_pages && self.has_next_page() {
            return self.request(loaded);
        }
        None
    }

    fn request(&mut self, page_index: u32) -> Option<PageRequest> {
        let key = self.key.as_ref()?;
        let ticket = PageTicket {
            generation: self.generation,
            page_index,
        };
        self.in_flight = Some(ticket);
        Some(PageRequest {
            ticket,
            query: MemberListQuery::page(key, page_index, self.page_size),
        })
    }

    pub fn is_awaiting(&self, ticket: PageTicket) -> bool {
        self.in_flight == Some(ticket)
    }

    pub fn loaded_pages(&self) -> u32 {
        self.pages.len() as u32
    }

    #[cfg(test)]
    pub fn desired_pages(&self) -> u32 {
        self.desired_pages
    }

    /// The last visible page came back full.
    pub fn has_next_page(&self) -> bool {
        self.visible_pages()
            .last()
            .is_some_and(|page| page.len() as u32 >= self.page_size)
    }

    pub fn is_fetching(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn is_fetching_next_page(&self) -> bool {
        self.in_flight.is_some_and(|ticket| ticket.page_index > 0)
    }

    pub fn is_initial_loading(&self) -> bool {
        self.pages.is_empty() && self.in_flight.is_some()
    }

    pub fn can_fetch_next(&self) -> bool {
        self.has_next_page() && !self.is_fetching() && self.failure.is_none()
    }

    pub fn failure(&self) -> Option<&PageFailure> {
        self.failure.as_ref()
    }

    fn visible_page_count(&self) -> u32 {
        self.desired_pages.min(self.loaded_pages())
    }

    fn visible_pages(&self) -> impl Iterator<Item = &Vec<MemberRecord>> {
        self.pages.iter().take(self.visible_page_count() as usize)
    }

    /// Pages `0..min(desired, loaded)` in fetch order, as the backend sent them.
    pub fn visible_members(&self) -> Vec<MemberRecord> {
        self.visible_pages().flatten().cloned().collect()
    }

    pub fn visible_count(&self) -> usize {
        self.visible_pages().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{FilterField, SortOption, read_filters};

    fn members(prefix: &str, count: usize) -> Vec<MemberRecord> {
        (0..count)
            .map(|index| MemberRecord {
                id: format!("{prefix}-{index}"),
                name: format!("Member {prefix} {index}"),
                cohort: "2010".to_string(),
                major: String::new(),
                company: String::new(),
                industry: String::new(),
                region: String::new(),
                job_title: String::new(),
                avatar_url: None,
                email: None,
            })
            .collect()
    }

    #[test]
    fn test_deep_link_prefetches_pages_in_order() {
        let mut paged = PagedMembers::new(10);
        let mut offsets = Vec::new();

        let mut request = paged.set_filters(&read_filters("page=2"));
        let mut page_sizes = [10, 10, 5].into_iter();
        while let Some(next) = request {
            assert_eq!(next.query.sort, SortOption::Recent);
            assert_eq!(next.query.limit, 10);
            offsets.push(next.query.offset);
            let size = page_sizes.next().expect("no more pages than planned");
            request = paged.page_loaded(next.ticket, Ok(members("p", size)));
        }

        assert_eq!(offsets, vec![0, 10, 20]);
        assert_eq!(paged.loaded_pages(), 3);
    }

    #[test]
    fn test_short_page_halts_prefetch_early() {
        let mut paged = PagedMembers::new(10);

        let first = paged.set_filters(&read_filters("page=3")).unwrap();
        let second = paged.page_loaded(first.ticket, Ok(members("a", 10))).unwrap();
        assert_eq!(second.query.offset, 10);

        assert_eq!(paged.page_loaded(second.ticket, Ok(members("b", 4))), None);
        assert!(!paged.has_next_page());
        assert_eq!(paged.visible_count(), 14);
    }

    #[test]
    fn test_twenty_five_members_end_to_end() {
        let mut paged = PagedMembers::new(10);
        let mut request = paged.set_filters(&FilterState::default());
        let mut page_sizes = [10, 10, 5].into_iter();

        // first page, then two "load more" rounds as the URL page advances
        for page in 0..3 {
            let current = request.take().unwrap();
            assert_eq!(current.query.offset, page * 10);
            request = paged.page_loaded(current.ticket, Ok(members("m", page_sizes.next().unwrap())));
            assert_eq!(request, None);
            if page < 2 {
                request = paged.fetch_next().and_then(|load_more| load_more.request);
                paged.set_filters(&FilterState::default().with_page(page + 1));
            }
        }

        assert_eq!(paged.desired_pages(), 3);
        assert_eq!(paged.visible_count(), 25);
        assert!(!paged.has_next_page());
        assert!(!paged.can_fetch_next());
        assert_eq!(paged.fetch_next(), None);
    }

    #[test]
    fn test_filter_change_discards_stale_response() {
        let mut paged = PagedMembers::new(10);
        let stale = paged
            .set_filters(&FilterState::default().with_filter(FilterField::Query, "al"))
            .unwrap();

        let fresh = paged
            .set_filters(&FilterState::default().with_filter(FilterField::Query, "alice"))
            .unwrap();
        assert_eq!(fresh.query.offset, 0);
        assert_eq!(fresh.query.filter.q, "alice");
        assert_ne!(stale.ticket, fresh.ticket);

        assert_eq!(paged.page_loaded(stale.ticket, Ok(members("al", 10))), None);
        assert_eq!(paged.visible_count(), 0);
        assert!(paged.is_initial_loading());

        paged.page_loaded(fresh.ticket, Ok(members("alice", 3)));
        let visible = paged.visible_members();
        assert_eq!(visible.len(), 3);
        assert!(visible.iter().all(|member| member.id.starts_with("alice")));
    }

    #[test]
    fn test_sort_change_is_new_identity_but_page_change_is_not() {
        let mut paged = PagedMembers::new(10);
        let first = paged.set_filters(&FilterState::default()).unwrap();
        paged.page_loaded(first.ticket, Ok(members("a", 10)));

        // same identity, one more page wanted
        let second = paged.set_filters(&FilterState::default().with_page(1)).unwrap();
        assert_eq!(second.query.offset, 10);
        paged.page_loaded(second.ticket, Ok(members("b", 10)));
        assert_eq!(paged.visible_count(), 20);

        // page back down: pages stay cached, fewer are visible
        assert_eq!(paged.set_filters(&FilterState::default()), None);
        assert_eq!(paged.visible_count(), 10);
        assert_eq!(paged.loaded_pages(), 2);

        let resorted = paged
            .set_filters(&FilterState::default().with_sort(SortOption::Name))
            .unwrap();
        assert_eq!(resorted.query.offset, 0);
        assert_eq!(resorted.query.sort, SortOption::Name);
        assert_eq!(paged.loaded_pages(), 0);
    }

    #[test]
    fn test_fetch_next_does_not_double_trigger() {
        let mut paged = PagedMembers::new(10);
        let first = paged.set_filters(&FilterState::default()).unwrap();
        assert_eq!(paged.fetch_next(), None);

        paged.page_loaded(first.ticket, Ok(members("a", 10)));
        let load_more = paged.fetch_next().unwrap();
        assert_eq!(load_more.page, 1);
        let next = load_more.request.unwrap();
        assert_eq!(next.query.offset, 10);
        assert_eq!(paged.desired_pages(), 2);
        assert!(paged.is_awaiting(next.ticket));
        assert!(paged.is_fetching_next_page());
        assert_eq!(paged.fetch_next(), None);

        // settled page catches up: already in flight, nothing new
        assert_eq!(paged.set_filters(&FilterState::default().with_page(1)), None);
    }

    #[test]
    fn test_load_more_after_paging_back_reuses_cached_page() {
        let mut paged = PagedMembers::new(10);
        let first = paged.set_filters(&read_filters("page=1")).unwrap();
        let second = paged.page_loaded(first.ticket, Ok(members("a", 10))).unwrap();
        assert_eq!(paged.page_loaded(second.ticket, Ok(members("b", 10))), None);

        // back to the bare route: page 1 stays cached but hidden
        assert_eq!(paged.set_filters(&FilterState::default()), None);
        assert_eq!(paged.visible_count(), 10);

        let cached = paged.fetch_next().unwrap();
        assert_eq!(cached.page, 1);
        assert_eq!(cached.request, None);
        assert_eq!(paged.visible_count(), 20);
        assert!(!paged.is_fetching());

        let fetched = paged.fetch_next().unwrap();
        assert_eq!(fetched.page, 2);
        assert_eq!(fetched.request.map(|request| request.query.offset), Some(20));
        assert_eq!(paged.visible_count(), 20);
    }

    #[test]
    fn test_next_page_follows_last_visible_page() {
        let mut paged = PagedMembers::new(10);
        let first = paged.set_filters(&read_filters("page=1")).unwrap();
        let second = paged.page_loaded(first.ticket, Ok(members("a", 10))).unwrap();
        paged.page_loaded(second.ticket, Ok(members("b", 3)));
        assert!(!paged.has_next_page());

        // the short page is hidden again, so a next page exists
        paged.set_filters(&FilterState::default());
        assert!(paged.has_next_page());
        assert!(paged.can_fetch_next());
    }

    #[test]
    fn test_failure_stops_fetching_until_retry() {
        let mut paged = PagedMembers::new(10);
        let first = paged.set_filters(&read_filters("page=1")).unwrap();
        let second = paged.page_loaded(first.ticket, Ok(members("a", 10))).unwrap();

        let error = ApiError::Status {
            status: 503,
            url: "/api/members".to_string(),
        };
        assert_eq!(paged.page_loaded(second.ticket, Err(error.clone())), None);
        assert_eq!(paged.failure().map(|failure| &failure.error), Some(&error));
        assert_eq!(paged.visible_count(), 10);
        assert_eq!(paged.fetch_next(), None);
        assert_eq!(paged.set_filters(&read_filters("page=1")), None);

        let retried = paged.retry().unwrap();
        assert_eq!(retried.query.offset, 10);
        assert!(paged.failure().is_none());
        assert_eq!(paged.page_loaded(retried.ticket, Ok(members("b", 2))), None);
        assert_eq!(paged.visible_count(), 12);
    }

    #[test]
    fn test_filter_change_clears_failure() {
        let mut paged = PagedMembers::new(10);
        let first = paged.set_filters(&FilterState::default()).unwrap();
        paged.page_loaded(first.ticket, Err(ApiError::Transport("offline".to_string())));
        assert!(paged.failure().is_some());

        let request = paged
            .set_filters(&FilterState::default().with_filter(FilterField::Region, "Busan"))
            .unwrap();
        assert_eq!(request.query.offset, 0);
        assert!(paged.failure().is_none());
    }
}
