//! Browser URL access for the directory page.
//!
//! Only the query string matters here. Writes always use
//! `history.replaceState`, which neither adds a history entry nor scrolls.

use futures::channel::mpsc::{UnboundedReceiver, UnboundedSender, unbounded};
use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use wasm_bindgen::closure::Closure;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigateOptions {
    pub scroll: bool,
}

pub trait Router {
    /// Current query string without the leading `?`.
    fn current_query(&self) -> String;

    /// Replace the current history entry with `url`.
    fn replace(&self, url: &str, options: NavigateOptions);
}

/// Router over `window.location` / `window.history`.
///
/// Every query change, our own replaces included, is reported on the
/// stream returned by [`WebRouter::new`], the way a framework router
/// re-renders with new search params after a navigation.
#[derive(Clone)]
pub struct WebRouter {
    query_changed: UnboundedSender<String>,
}

impl WebRouter {
    pub fn new() -> (Self, UnboundedReceiver<String>) {
        let (query_changed, query_changes) = unbounded();
        let router = Self { query_changed };
        router.listen_popstate();
        (router, query_changes)
    }

    fn listen_popstate(&self) {
        let Some(window) = web_sys::window() else {
            zoon::println!("🔗 ROUTER: No window, back/forward navigation will not be observed");
            return;
        };
        let router = self.clone();
        let on_popstate = Closure::<dyn FnMut(web_sys::Event)>::new(move |_event: web_sys::Event| {
            router.notify();
        });
        if let Err(error) =
            window.add_event_listener_with_callback("popstate", on_popstate.as_ref().unchecked_ref())
        {
            zoon::println!("🔗 ROUTER: Failed to listen for popstate: {:?}", error);
        }
        // Lives as long as the page.
        on_popstate.forget();
    }

    fn notify(&self) {
        let _ = self.query_changed.unbounded_send(self.current_query());
    }
}

impl Router for WebRouter {
    fn current_query(&self) -> String {
        web_sys::window()
            .and_then(|window| window.location().search().ok())
            .map(|search| search.trim_start_matches('?').to_string())
            .unwrap_or_default()
    }

    fn replace(&self, url: &str, options: NavigateOptions) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let history = match window.history() {
            Ok(history) => history,
            Err(error) => {
                zoon::println!("🔗 ROUTER: History API unavailable: {:?}", error);
                return;
            }
        };
        if let Err(error) = history.replace_state_with_url(&JsValue::NULL, "", Some(url)) {
            zoon::println!("🔗 ROUTER: replaceState to '{}' failed: {:?}", url, error);
            return;
        }
        if options.scroll {
            window.scroll_to_with_x_and_y(0.0, 0.0);
        }
        zoon::println!("🔗 ROUTER: Replaced URL with {}", url);
        self.notify();
    }
}
