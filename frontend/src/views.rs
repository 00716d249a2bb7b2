use futures::{select, stream::StreamExt};
use shared::{FilterField, FilterState, MemberRecord, SortOption};
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use zoon::*;

use crate::dataflow::relay;
use crate::directory::DirectoryDomain;
use crate::directory::scroll_sentinel::{ObserverAction, ScrollSentinel, root_margin};

const NEUTRAL_TEXT: &str = "oklch(45% 0.02 255)";
const BORDER: &str = "oklch(88% 0.01 255)";
const ACCENT: &str = "oklch(50% 0.15 255)";
const ON_ACCENT: &str = "oklch(99% 0 0)";
const ERROR_TEXT: &str = "oklch(50% 0.18 25)";

pub fn directory_page(directory: &DirectoryDomain) -> impl Element {
    Column::new()
        .s(Width::fill().max(960))
        .s(Align::new().center_x())
        .s(Padding::new().x(16).y(24))
        .s(Gap::new().y(16))
        .item(El::new().s(Font::new().size(24).weight(FontWeight::SemiBold)).child("Alumni directory"))
        .item(search_input(directory))
        .item(filter_inputs(directory))
        .item(toolbar(directory))
        .item(summary_line(directory))
        .item(members_list(directory))
        .item(members_error(directory))
        .item(load_more_button(directory))
        .item(scroll_sentinel(directory.clone()))
}

fn text_filter_input(directory: &DirectoryDomain, field: FilterField) -> impl Element {
    TextInput::new()
        .s(Width::fill())
        .s(Padding::new().x(10).y(6))
        .s(Borders::all(Border::new().width(1).color(BORDER)))
        .s(RoundedCorners::all(4))
        .label_hidden(field.placeholder())
        .placeholder(Placeholder::new(field.placeholder()))
        .text_signal(directory.filters.signal_ref(move |filters| filters.text(field).to_string()))
        .on_change({
            let directory = directory.clone();
            move |text| directory.update_filter(field, text)
        })
}

fn search_input(directory: &DirectoryDomain) -> impl Element {
    text_filter_input(directory, FilterField::Query)
}

fn filter_inputs(directory: &DirectoryDomain) -> impl Element {
    Row::new()
        .s(Width::fill())
        .s(Gap::new().x(8).y(8))
        .multiline()
        .items(
            FilterField::ALL
                .into_iter()
                .filter(|field| *field != FilterField::Query)
                .map(|field| El::new().s(Width::exact(180)).child(text_filter_input(directory, field))),
        )
}

fn toolbar(directory: &DirectoryDomain) -> impl Element {
    Row::new()
        .s(Width::fill())
        .s(Gap::new().x(8))
        .s(Align::new().center_y())
        .item(El::new().s(Font::new().color(NEUTRAL_TEXT)).child("Sort:"))
        .items(SortOption::ALL.into_iter().map(|sort| sort_button(directory, sort)))
        .item(El::new().s(Width::fill()))
        .item(
            Button::new()
                .s(Padding::new().x(12).y(6))
                .s(Borders::all(Border::new().width(1).color(BORDER)))
                .s(RoundedCorners::all(4))
                .label("Reset")
                .on_press({
                    let directory = directory.clone();
                    move || directory.reset_filters()
                }),
        )
        .item(share_button(directory))
}

fn sort_button(directory: &DirectoryDomain, sort: SortOption) -> impl Element {
    let is_selected = directory.filters.signal_ref(move |filters| filters.sort == sort);
    Button::new()
        .s(Padding::new().x(10).y(6))
        .s(RoundedCorners::all(4))
        .s(Font::new().color_signal(
            is_selected.map(|selected| if selected { ON_ACCENT } else { NEUTRAL_TEXT }),
        ))
        .s(Background::new().color_signal(
            directory
                .filters
                .signal_ref(move |filters| filters.sort == sort)
                .map(|selected| if selected { ACCENT } else { "oklch(96% 0.01 255)" }),
        ))
        .label(sort.label())
        .on_press({
            let directory = directory.clone();
            move || directory.update_sort(sort)
        })
}

fn share_button(directory: &DirectoryDomain) -> impl Element {
    Button::new()
        .s(Padding::new().x(12).y(6))
        .s(RoundedCorners::all(4))
        .s(Background::new().color(ACCENT))
        .s(Font::new().color(ON_ACCENT))
        .update_raw_el({
            let directory = directory.clone();
            move |raw_el| {
                raw_el.attr_signal(
                    "title",
                    directory.share_link_signal().map(|link| Some(link.copy_target().to_string())),
                )
            }
        })
        .label_signal(
            directory
                .copied
                .signal_ref(|flag| flag.is_copied())
                .map(|copied| if copied { "Copied!" } else { "Copy share link" }),
        )
        .on_press({
            let directory = directory.clone();
            move || directory.copy_share_link()
        })
}

fn summary_line(directory: &DirectoryDomain) -> impl Element {
    El::new()
        .s(Font::new().size(14).color(NEUTRAL_TEXT))
        .child_signal(directory.summary_signal())
}

fn members_list(directory: &DirectoryDomain) -> impl Element {
    let state_signal = map_ref! {
        let list = directory
            .members
            .signal_ref(|members| (members.visible_members(), members.is_initial_loading(), members.failure().is_some())),
        let filtered = directory.debounced_filters.signal_ref(FilterState::has_active_filters) =>
        (list.clone(), *filtered)
    };
    El::new().s(Width::fill()).child_signal(state_signal.map(
        |((members, initial_loading, failed), filtered)| {
            if initial_loading {
                return empty_state_hint("Loading members…").unify();
            }
            if members.is_empty() && !failed {
                let hint = if filtered {
                    "No members match these filters."
                } else {
                    "The directory has no members yet."
                };
                return empty_state_hint(hint).unify();
            }
            Column::new()
                .s(Width::fill())
                .s(Gap::new().y(8))
                .items(members.into_iter().map(member_card))
                .unify()
        },
    ))
}

fn member_card(member: MemberRecord) -> impl Element {
    let details = [member.cohort.as_str(), member.major.as_str(), member.region.as_str()]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" · ");
    let headline = member.headline();
    Column::new()
        .s(Width::fill())
        .s(Padding::all(12))
        .s(Gap::new().y(4))
        .s(Borders::all(Border::new().width(1).color(BORDER)))
        .s(RoundedCorners::all(6))
        .update_raw_el({
            let id = member.id.clone();
            move |raw_el| raw_el.attr("data-member-id", &id)
        })
        .item(El::new().s(Font::new().weight(FontWeight::SemiBold)).child(member.name.clone()))
        .item((!headline.is_empty()).then(|| El::new().s(Font::new().size(14)).child(headline)))
        .item(El::new().s(Font::new().size(13).color(NEUTRAL_TEXT)).child(details))
}

fn members_error(directory: &DirectoryDomain) -> impl Element {
    El::new().child_signal(
        directory
            .members
            .signal_ref(|members| members.failure().map(|failure| failure.error.clone()))
            .map({
                let directory = directory.clone();
                move |error| {
                    error.map(|error| {
                        Row::new()
                            .s(Gap::new().x(12))
                            .s(Align::new().center_y())
                            .s(Font::new().color(ERROR_TEXT))
                            .item(El::new().child("Failed to load members"))
                            .item(
                                El::new()
                                    .s(Font::new().size(13).color(NEUTRAL_TEXT))
                                    .child(crate::error_display::make_error_user_friendly(&error)),
                            )
                            .item(
                                Button::new()
                                    .s(Padding::new().x(10).y(4))
                                    .s(Borders::all(Border::new().width(1).color(BORDER)))
                                    .s(RoundedCorners::all(4))
                                    .label("Retry")
                                    .on_press({
                                        let directory = directory.clone();
                                        move || directory.retry()
                                    }),
                            )
                    })
                }
            }),
    )
}

fn load_more_button(directory: &DirectoryDomain) -> impl Element {
    let label_signal = directory.members.signal_ref(|members| {
        if members.is_fetching_next_page() {
            "Loading…"
        } else if members.has_next_page() {
            "Load more"
        } else {
            "No more members"
        }
    });
    let enabled_signal = directory.members.signal_ref(|members| members.can_fetch_next());
    let disabled_signal = directory
        .members
        .signal_ref(|members| (!members.can_fetch_next()).then_some("true"));
    Button::new()
        .s(Align::new().center_x())
        .s(Padding::new().x(16).y(8))
        .s(Borders::all(Border::new().width(1).color(BORDER)))
        .s(RoundedCorners::all(4))
        .update_raw_el(move |raw_el| {
            raw_el
                .style_signal("opacity", enabled_signal.map(|enabled| if enabled { "1" } else { "0.5" }))
                .attr_signal("aria-disabled", disabled_signal)
        })
        .label_signal(label_signal)
        .on_press({
            let directory = directory.clone();
            move || directory.advance_page()
        })
}

fn empty_state_hint(text: &str) -> impl Element {
    El::new()
        .s(Padding::all(20))
        .s(Font::new().color(NEUTRAL_TEXT).italic())
        .child(text)
}

/// Invisible marker under the list. While a next page exists it is
/// watched by an `IntersectionObserver`; reaching it loads the next page
/// the same way "Load more" does.
fn scroll_sentinel(directory: DirectoryDomain) -> impl Element {
    let removed = Mutable::new(false);
    El::new()
        .s(Width::fill())
        .s(Height::exact(1))
        .after_insert({
            let removed = removed.clone();
            move |element| observe_sentinel(element.unchecked_into(), directory.clone(), removed.clone())
        })
        .after_remove(move |_| removed.set(true))
}

fn observe_sentinel(element: web_sys::Element, directory: DirectoryDomain, removed: Mutable<bool>) {
    let (intersection_changed_relay, mut intersection_changed_stream) = relay::<bool>();
    let on_intersect = Closure::<dyn FnMut(js_sys::Array, web_sys::IntersectionObserver)>::new(
        move |entries: js_sys::Array, _observer: web_sys::IntersectionObserver| {
            let intersecting = entries.iter().any(|entry| {
                entry
                    .dyn_ref::<web_sys::IntersectionObserverEntry>()
                    .is_some_and(|entry| entry.is_intersecting())
            });
            intersection_changed_relay.send(intersecting);
        },
    );
    let options = web_sys::IntersectionObserverInit::new();
    options.set_root_margin(&root_margin(directory.scroll_root_margin_px()));
    let observer = match web_sys::IntersectionObserver::new_with_options(
        on_intersect.as_ref().unchecked_ref(),
        &options,
    ) {
        Ok(observer) => observer,
        Err(error) => {
            zoon::println!("📄 MEMBERS: IntersectionObserver unavailable, use Load more: {:?}", error);
            return;
        }
    };

    Task::start(async move {
        let mut sentinel = ScrollSentinel::default();
        let mut paging = directory
            .members
            .signal_ref(|members| (members.has_next_page(), members.is_fetching()))
            .to_stream()
            .fuse();
        let mut removed = removed.signal().to_stream().fuse();
        let (mut has_next_page, mut fetching, mut intersecting) = (false, false, false);

        loop {
            select! {
                state = paging.next() => {
                    let Some((next_page, in_flight)) = state else { break };
                    has_next_page = next_page;
                    fetching = in_flight;
                    match sentinel.sync(has_next_page) {
                        ObserverAction::Connect => observer.observe(&element),
                        ObserverAction::Disconnect => {
                            observer.disconnect();
                            intersecting = false;
                        }
                        ObserverAction::Keep => {}
                    }
                }
                change = intersection_changed_stream.next() => {
                    let Some(change) = change else { break };
                    intersecting = change;
                }
                is_removed = removed.next() => {
                    if is_removed != Some(false) {
                        break;
                    }
                }
            }
            if sentinel.should_advance(intersecting, has_next_page, fetching) {
                directory.advance_page();
            }
        }
        observer.disconnect();
        drop(on_intersect);
    });
}
