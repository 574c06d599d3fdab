/// Application configuration
///
/// Endpoint URLs, the vision model id and the upload/timeout limits.
/// Read once at startup from `<config_dir>/ora-ai/config.json`; every
/// field is optional in the file and falls back to the defaults below.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Vision endpoint (POST, chat-style JSON body)
pub const DEFAULT_VISION_URL: &str = "https://text.pollinations.ai/vision";

/// Image-generation endpoint (GET, prompt in the path)
pub const DEFAULT_IMAGE_URL: &str = "https://image.pollinations.ai/prompt/";

/// How the image prompt seed is pulled out of the free-form report
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SeedStrategy {
    /// First `seed_length` characters of the report
    #[default]
    Prefix,
    /// Last parenthesised English description, else `Prefix`
    Parenthesized,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub vision_url: String,
    pub image_url: String,
    /// Model identifier sent in the vision payload
    pub model: String,
    /// Bound applied to both outbound calls, in seconds
    pub request_timeout_secs: u64,
    /// Uploads above this size are downscaled, then rejected if still too big
    pub max_upload_bytes: usize,
    /// Longest side after downscaling
    pub max_image_dimension: u32,
    pub seed_strategy: SeedStrategy,
    pub seed_length: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            vision_url: DEFAULT_VISION_URL.to_string(),
            image_url: DEFAULT_IMAGE_URL.to_string(),
            model: "openai".to_string(),
            request_timeout_secs: 35,
            max_upload_bytes: 4 * 1024 * 1024,
            max_image_dimension: 1280,
            seed_strategy: SeedStrategy::Prefix,
            seed_length: 200,
        }
    }
}

impl Config {
    /// Load the user's config, falling back to defaults.
    ///
    /// A missing file is normal. A malformed one is logged and ignored so
    /// the app always starts.
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    /// Load from an explicit path (missing or malformed → defaults)
    pub fn load_from(path: &Path) -> Self {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No config at {}, using defaults", path.display());
                return Self::default();
            }
            Err(e) => {
                log::warn!("⚠️  Could not read config {}: {}", path.display(), e);
                return Self::default();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(config) => {
                log::info!("📁 Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                log::warn!("⚠️  Ignoring malformed config {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// `~/.config/ora-ai/config.json` on Linux, the platform equivalent elsewhere
    fn config_path() -> Option<PathBuf> {
        let mut path = dirs::config_dir()?;
        path.push("ora-ai");
        path.push("config.json");
        Some(path)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
