//! DirectoryApp - owns every domain of the page

use zoon::*;

use crate::config::load_directory_config;
use crate::directory::DirectoryDomain;
use crate::error_display::ErrorDisplay;
use crate::error_ui::toast_notifications_container;
use crate::views::directory_page;

pub struct DirectoryApp {
    pub directory: DirectoryDomain,
    pub error_display: ErrorDisplay,
}

impl DirectoryApp {
    pub async fn new() -> Self {
        let config = load_directory_config().await;
        let error_display = ErrorDisplay::new(config.directory.toast_dismiss_ms);
        let directory = DirectoryDomain::new(&config, &error_display);
        Self {
            directory,
            error_display,
        }
    }

    pub fn root(&self) -> impl Element {
        // The document scrolls, so the sentinel observer can use the viewport as root.
        Stack::new()
            .s(Width::fill())
            .s(Font::new().family([FontFamily::new("Inter"), FontFamily::SansSerif]))
            .layer(directory_page(&self.directory))
            .layer(toast_notifications_container(self.error_display.clone()))
    }
}
