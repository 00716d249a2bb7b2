//! Directory configuration loading.
//!
//! The TOML file is served from MoonZoon's public folder. Anything going
//! wrong here only costs the customisation: the app starts with defaults.

use shared::DirectoryConfig;

use crate::api::fetch_text;

pub const CONFIG_URL: &str = "/_api/public/directory.toml";

pub async fn load_directory_config() -> DirectoryConfig {
    let source = match fetch_text(CONFIG_URL).await {
        Ok(source) => source,
        Err(error) => {
            zoon::println!("⚙️ CONFIG: {} unavailable ({}), using defaults", CONFIG_URL, error);
            return DirectoryConfig::default();
        }
    };
    match DirectoryConfig::from_toml_str(&source) {
        Ok(config) => {
            zoon::println!(
                "⚙️ CONFIG: Loaded {} (api {}, page size {}, debounce {}ms)",
                CONFIG_URL,
                config.api_base(),
                config.directory.page_size,
                config.directory.debounce_ms
            );
            config
        }
        Err(error) => {
            zoon::println!("⚙️ CONFIG: {}, using defaults", error);
            DirectoryConfig::default()
        }
    }
}
