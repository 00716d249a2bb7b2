//! Directory domain
//!
//! Actors for the directory page, wired the same way everywhere: a UI
//! event goes into a relay, the owning actor applies it to its state
//! machine, and any network request that results is started as a task
//! whose response comes back through another relay.
//!
//! ```text
//! filter/sort/reset/page relays ──► filters (live)
//!          │                          │
//!   url_navigated ◄── url sync ◄──────┤
//!                                     ▼ debounce
//!                              debounced_filters ──► members, total_count, share link
//! ```

pub mod debounce;
pub mod paged_members;
pub mod scroll_sentinel;
pub mod share_link;
pub mod total_count;
pub mod url_sync;

use futures::{StreamExt, select};
use shared::{ApiError, DirectoryConfig, FilterField, FilterState, MemberRecord, SortOption, read_filters};
use std::pin::pin;
use zoon::{Signal, SignalExt, Task, Timer, map_ref};

use crate::api::MemberApi;
use crate::clipboard;
use crate::dataflow::{Actor, Relay, relay};
use crate::error_display::{ErrorAlert, ErrorDisplay, add_error_alert};
use crate::router::{Router, WebRouter};
use debounce::debounce;
use paged_members::{PageRequest, PageTicket, PagedMembers};
use share_link::{CopiedFlag, ShareLink};
use total_count::{CountRequest, CountTicket, TotalCount, page_summary};
use url_sync::{UrlSync, run_url_sync};

type PageResult = (PageTicket, Result<Vec<MemberRecord>, ApiError>);
type CountResult = (CountTicket, Result<u64, ApiError>);

#[derive(Clone)]
pub struct DirectoryDomain {
    /// Updated synchronously on every edit.
    pub filters: Actor<FilterState>,
    /// Drives the URL, the member pages and the count.
    pub debounced_filters: Actor<FilterState>,
    pub members: Actor<PagedMembers>,
    pub total_count: Actor<TotalCount>,
    pub copied: Actor<CopiedFlag>,
    _url_sync: Actor<()>,

    filter_changed_relay: Relay<(FilterField, String)>,
    sort_changed_relay: Relay<SortOption>,
    reset_clicked_relay: Relay,
    page_changed_relay: Relay<u32>,
    load_more_requested_relay: Relay,
    members_retry_requested_relay: Relay,
    count_retry_requested_relay: Relay,
    share_link_copy_requested_relay: Relay,

    route_path: String,
    page_size: u32,
    scroll_root_margin_px: u32,
}

impl DirectoryDomain {
    pub fn new(config: &DirectoryConfig, error_display: &ErrorDisplay) -> Self {
        let settings = &config.directory;
        let api = MemberApi::new(config.api_base());
        let (router, query_changes) = WebRouter::new();
        let initial_query = router.current_query();
        let initial_filters = read_filters(&initial_query);
        zoon::println!("🔗 URL_SYNC: Mounted with '{}' -> {:?}", initial_query, initial_filters);

        let (filter_changed_relay, mut filter_changed_stream) = relay::<(FilterField, String)>();
        let (sort_changed_relay, mut sort_changed_stream) = relay::<SortOption>();
        let (reset_clicked_relay, mut reset_clicked_stream) = relay();
        let (page_changed_relay, mut page_changed_stream) = relay::<u32>();
        let (url_navigated_relay, mut url_navigated_stream) = relay::<FilterState>();
        let (load_more_requested_relay, mut load_more_requested_stream) = relay();
        let (members_retry_requested_relay, mut members_retry_requested_stream) = relay();
        let (count_retry_requested_relay, mut count_retry_requested_stream) = relay();
        let (page_loaded_relay, mut page_loaded_stream) = relay::<PageResult>();
        let (count_loaded_relay, mut count_loaded_stream) = relay::<CountResult>();
        let (share_link_copy_requested_relay, mut share_link_copy_requested_stream) = relay();
        let (copy_succeeded_relay, mut copy_succeeded_stream) = relay();
        let (copied_reset_relay, mut copied_reset_stream) = relay::<u64>();

        let filters = Actor::new(initial_filters.clone(), async move |state| {
            loop {
                select! {
                    change = filter_changed_stream.next() => {
                        if let Some((field, value)) = change {
                            state.set_neq(state.get_cloned().with_filter(field, value));
                        }
                    }
                    sort = sort_changed_stream.next() => {
                        if let Some(sort) = sort {
                            state.set_neq(state.get_cloned().with_sort(sort));
                        }
                    }
                    reset = reset_clicked_stream.next() => {
                        if let Some(()) = reset {
                            state.set_neq(FilterState::reset());
                        }
                    }
                    page = page_changed_stream.next() => {
                        if let Some(page) = page {
                            state.set_neq(state.get_cloned().with_page(page));
                        }
                    }
                    navigated = url_navigated_stream.next() => {
                        if let Some(navigated) = navigated {
                            state.set_neq(navigated);
                        }
                    }
                    complete => break,
                }
            }
        });

        let debounced_filters = Actor::new(initial_filters, {
            let live_filters = filters.signal();
            let debounce_ms = settings.debounce_ms;
            async move |state| {
                let mut settled = pin!(debounce(live_filters.to_stream(), debounce_ms, |ms| {
                    Timer::sleep(ms)
                }));
                while let Some(filters) = settled.next().await {
                    state.set_neq(filters);
                }
            }
        });

        let url_sync = Actor::new((), {
            let live_filters = filters.signal();
            let settled_filters = debounced_filters.signal();
            let sync = UrlSync::new(settings.route_path.clone(), &initial_query);
            async move |_state| {
                run_url_sync(
                    sync,
                    router,
                    query_changes,
                    live_filters.to_stream(),
                    settled_filters.to_stream(),
                    move |navigated: FilterState| {
                        zoon::println!("🔗 URL_SYNC: External navigation -> {:?}", navigated);
                        url_navigated_relay.send(navigated);
                    },
                )
                .await;
            }
        });

        let members = Actor::new(PagedMembers::new(settings.page_size), {
            let settled_filters = debounced_filters.signal();
            let api = api.clone();
            let error_display = error_display.clone();
            let page_changed_relay = page_changed_relay.clone();
            async move |state| {
                let mut settled_filters = settled_filters.to_stream().fuse();
                loop {
                    let request = select! {
                        settled = settled_filters.next() => {
                            let Some(settled) = settled else { break };
                            state.lock_mut().set_filters(&settled)
                        }
                        loaded = page_loaded_stream.next() => {
                            let Some((ticket, result)) = loaded else { break };
                            let mut members = state.lock_mut();
                            if !members.is_awaiting(ticket) {
                                zoon::println!("📄 MEMBERS: Dropping stale page {} (generation {})", ticket.page_index, ticket.generation);
                                continue;
                            }
                            match &result {
                                Ok(page) => zoon::println!("📄 MEMBERS: Page {} returned {} members", ticket.page_index, page.len()),
                                Err(error) => add_error_alert(ErrorAlert::new_members_error(error), &error_display),
                            }
                            members.page_loaded(ticket, result)
                        }
                        requested = load_more_requested_stream.next() => {
                            let Some(()) = requested else { break };
                            let Some(load_more) = state.lock_mut().fetch_next() else { continue };
                            page_changed_relay.send(load_more.page);
                            load_more.request
                        }
                        retry = members_retry_requested_stream.next() => {
                            let Some(()) = retry else { break };
                            state.lock_mut().retry()
                        }
                    };
                    if let Some(request) = request {
                        start_page_request(&api, request, page_loaded_relay.clone());
                    }
                }
            }
        });

        let total_count = Actor::new(TotalCount::default(), {
            let settled_filters = debounced_filters.signal();
            let error_display = error_display.clone();
            async move |state| {
                let mut settled_filters = settled_filters.to_stream().fuse();
                loop {
                    let request = select! {
                        settled = settled_filters.next() => {
                            let Some(settled) = settled else { break };
                            state.lock_mut().set_filters(&settled)
                        }
                        loaded = count_loaded_stream.next() => {
                            let Some((ticket, result)) = loaded else { break };
                            let mut total = state.lock_mut();
                            if !total.is_awaiting(ticket) {
                                zoon::println!("🔢 COUNT: Dropping stale count (generation {})", ticket.generation);
                                continue;
                            }
                            if let Err(error) = &result {
                                add_error_alert(ErrorAlert::new_count_error(error), &error_display);
                            }
                            total.count_loaded(ticket, result);
                            None
                        }
                        retry = count_retry_requested_stream.next() => {
                            let Some(()) = retry else { break };
                            state.lock_mut().retry()
                        }
                    };
                    if let Some(request) = request {
                        start_count_request(&api, request, count_loaded_relay.clone());
                    }
                }
            }
        });

        let copied = Actor::new(CopiedFlag::default(), {
            let settled_filters = debounced_filters.clone();
            let route_path = settings.route_path.clone();
            let copied_reset_ms = settings.copied_reset_ms;
            async move |state| {
                loop {
                    select! {
                        requested = share_link_copy_requested_stream.next() => {
                            let Some(()) = requested else { break };
                            let filters = settled_filters.signal().to_stream().next().await.unwrap_or_default();
                            let link = ShareLink::new(&route_path, &filters, clipboard::page_origin().as_deref());
                            let copy_succeeded_relay = copy_succeeded_relay.clone();
                            Task::start(async move {
                                match clipboard::write_text(link.copy_target()).await {
                                    Ok(()) => {
                                        zoon::println!("📋 SHARE: Copied {}", link.copy_target());
                                        copy_succeeded_relay.send(());
                                    }
                                    Err(error) => zoon::println!("📋 SHARE: Clipboard write failed: {}", error),
                                }
                            });
                        }
                        succeeded = copy_succeeded_stream.next() => {
                            let Some(()) = succeeded else { break };
                            let mut flag = state.get();
                            let stamp = flag.copy_succeeded();
                            state.set(flag);
                            let copied_reset_relay = copied_reset_relay.clone();
                            Task::start(async move {
                                Timer::sleep(copied_reset_ms).await;
                                copied_reset_relay.send(stamp);
                            });
                        }
                        elapsed = copied_reset_stream.next() => {
                            let Some(stamp) = elapsed else { break };
                            let mut flag = state.get();
                            if flag.reset_elapsed(stamp) {
                                state.set(flag);
                            }
                        }
                    }
                }
            }
        });

        Self {
            filters,
            debounced_filters,
            members,
            total_count,
            copied,
            _url_sync: url_sync,
            filter_changed_relay,
            sort_changed_relay,
            reset_clicked_relay,
            page_changed_relay,
            load_more_requested_relay,
            members_retry_requested_relay,
            count_retry_requested_relay,
            share_link_copy_requested_relay,
            route_path: settings.route_path.clone(),
            page_size: settings.page_size,
            scroll_root_margin_px: settings.scroll_root_margin_px,
        }
    }

    pub fn update_filter(&self, field: FilterField, value: impl Into<String>) {
        self.filter_changed_relay.send((field, value.into()));
    }

    pub fn update_sort(&self, sort: SortOption) {
        self.sort_changed_relay.send(sort);
    }

    pub fn reset_filters(&self) {
        self.reset_clicked_relay.send(());
    }

    /// Moves the page without touching the filters.
    pub fn set_page(&self, page: u32) {
        self.page_changed_relay.send(page);
    }

    /// "Load more" and the scroll sentinel: fetch the next page now and
    /// move the URL page along with it. Ignored while no next page can be
    /// fetched.
    pub fn advance_page(&self) {
        if self.members.with_state(PagedMembers::can_fetch_next) {
            self.load_more_requested_relay.send(());
        }
    }

    pub fn retry(&self) {
        self.members_retry_requested_relay.send(());
        self.count_retry_requested_relay.send(());
    }

    pub fn copy_share_link(&self) {
        self.share_link_copy_requested_relay.send(());
    }

    pub fn scroll_root_margin_px(&self) -> u32 {
        self.scroll_root_margin_px
    }

    pub fn share_link_signal(&self) -> impl Signal<Item = ShareLink> + use<> {
        let route_path = self.route_path.clone();
        self.debounced_filters.signal().map(move |filters| {
            ShareLink::new(&route_path, &filters, clipboard::page_origin().as_deref())
        })
    }

    /// "Page X of Y · N members" for the settled filters.
    pub fn summary_signal(&self) -> impl Signal<Item = String> + use<> {
        let page_size = self.page_size;
        map_ref! {
            let page = self.debounced_filters.signal_ref(|filters| filters.page),
            let count = self.total_count.signal_ref(|total| total.state().clone()) =>
            page_summary(*page, count, page_size)
        }
    }
}

fn start_page_request(api: &MemberApi, request: PageRequest, page_loaded_relay: Relay<PageResult>) {
    zoon::println!(
        "📄 MEMBERS: Fetching page {} (offset {}, sort {})",
        request.ticket.page_index,
        request.query.offset,
        request.query.sort
    );
    let api = api.clone();
    Task::start(async move {
        let result = api.list_members(&request.query).await;
        page_loaded_relay.send((request.ticket, result));
    });
}

fn start_count_request(api: &MemberApi, request: CountRequest, count_loaded_relay: Relay<CountResult>) {
    zoon::println!("🔢 COUNT: Fetching total for {:?}", request.filter);
    let api = api.clone();
    Task::start(async move {
        let result = api.count_members(&request.filter).await;
        count_loaded_relay.send((request.ticket, result));
    });
}
