//! Alumni directory entry point

use std::sync::OnceLock;
use zoon::*;

/// Stores the main application task handle to prevent it from being dropped.
static MAIN_TASK: OnceLock<TaskHandle> = OnceLock::new();

mod api;
mod app;
mod clipboard;
mod config;
mod dataflow;
mod directory;
mod error_display;
mod error_ui;
mod router;
mod views;

pub fn main() {
    let handle = Task::start_droppable(async {
        let app = crate::app::DirectoryApp::new().await;
        let root_element = app.root();
        start_app("app", move || root_element);
    });
    let _ = MAIN_TASK.set(handle);
}
