use futures::StreamExt;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::dataflow::{ActorVec, Relay, relay};
use shared::ApiError;

#[derive(Debug, Clone, PartialEq)]
pub struct ErrorAlert {
    pub id: String,
    pub title: String,
    pub message: String,
    pub technical_error: String, // Raw technical error for console logging
    pub auto_dismiss_ms: u32,
}

impl ErrorAlert {
    pub fn new_members_error(error: &ApiError) -> Self {
        Self {
            id: String::new(),
            title: "Failed to load members".to_string(),
            message: make_error_user_friendly(error),
            technical_error: format!("Member page request failed: {error}"),
            auto_dismiss_ms: 5000,
        }
    }

    pub fn new_count_error(error: &ApiError) -> Self {
        Self {
            id: String::new(),
            title: "Failed to count members".to_string(),
            message: make_error_user_friendly(error),
            technical_error: format!("Member count request failed: {error}"),
            auto_dismiss_ms: 5000,
        }
    }
}

pub fn make_error_user_friendly(error: &ApiError) -> String {
    match error {
        ApiError::Transport(_) => "Connection error. Please check your network connection.".to_string(),
        ApiError::Status { status: 401 | 403, .. } => {
            "You need to be signed in as a member to browse the directory.".to_string()
        }
        ApiError::Status { status: 404, .. } => "The member directory is not available.".to_string(),
        ApiError::Status { status: 408 | 504, .. } => "Request timed out. Please try again.".to_string(),
        ApiError::Status { status, .. } if *status >= 500 => {
            "The server had a problem. Please try again in a moment.".to_string()
        }
        ApiError::Status { status, .. } => format!("The server rejected the request ({status})."),
        ApiError::Decode(_) => "The server sent an unexpected response.".to_string(),
    }
}

static TOAST_ID_COUNTER: AtomicUsize = AtomicUsize::new(0);

/// Toast notifications for failed requests.
#[derive(Clone)]
pub struct ErrorDisplay {
    pub active_toasts: ActorVec<ErrorAlert>,
    pub toast_added_relay: Relay<ErrorAlert>,
    pub toast_dismissed_relay: Relay<String>,
    toast_dismiss_ms: u32,
}

impl ErrorDisplay {
    pub fn new(toast_dismiss_ms: u32) -> Self {
        let (toast_added_relay, mut toast_added_stream) = relay::<ErrorAlert>();
        let (toast_dismissed_relay, mut toast_dismissed_stream) = relay::<String>();

        let active_toasts = ActorVec::new(vec![], async move |toasts| {
            loop {
                futures::select! {
                    toast = toast_added_stream.next() => {
                        if let Some(alert) = toast {
                            toasts.lock_mut().push_cloned(alert);
                        }
                    }
                    dismissed_id = toast_dismissed_stream.next() => {
                        if let Some(id) = dismissed_id {
                            toasts.lock_mut().retain(|alert| alert.id != id);
                        }
                    }
                    complete => break,
                }
            }
        });

        Self {
            active_toasts,
            toast_added_relay,
            toast_dismissed_relay,
            toast_dismiss_ms,
        }
    }
}

pub fn add_error_alert(mut alert: ErrorAlert, error_display: &ErrorDisplay) {
    zoon::println!("❌ ERROR: {}", alert.technical_error);

    let toast_id = TOAST_ID_COUNTER.fetch_add(1, Ordering::Relaxed);
    alert.id = format!("toast_{}", toast_id);
    alert.auto_dismiss_ms = error_display.toast_dismiss_ms;

    error_display.toast_added_relay.send(alert);
}

pub fn dismiss_error_alert(id: &str, error_display: &ErrorDisplay) {
    error_display.toast_dismissed_relay.send(id.to_string());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(status: u16) -> ApiError {
        ApiError::Status {
            status,
            url: "/api/members".to_string(),
        }
    }

    #[test]
    fn test_user_friendly_messages() {
        assert_eq!(
            make_error_user_friendly(&ApiError::Transport("TypeError: Failed to fetch".to_string())),
            "Connection error. Please check your network connection."
        );
        assert_eq!(
            make_error_user_friendly(&status(403)),
            "You need to be signed in as a member to browse the directory."
        );
        assert_eq!(
            make_error_user_friendly(&status(503)),
            "The server had a problem. Please try again in a moment."
        );
        assert_eq!(
            make_error_user_friendly(&status(422)),
            "The server rejected the request (422)."
        );
    }

    #[test]
    fn test_alert_keeps_technical_details() {
        let alert = ErrorAlert::new_members_error(&status(500));
        assert_eq!(alert.title, "Failed to load members");
        assert!(alert.technical_error.contains("/api/members"));
        assert!(alert.technical_error.contains("500"));
    }
}
