/// Meal analysis workflow
///
/// This module turns a local photo into:
/// - A nutrition report from the vision endpoint (vision.rs)
/// - A URL for a regenerated, stylised shot of the meal (generation.rs)
///
/// Request building and the upload limit live in request.rs, the error
/// taxonomy in error.rs.

pub mod error;
pub mod generation;
pub mod request;
pub mod vision;

use chrono::Utc;
use std::path::Path;
use std::sync::Arc;

pub use error::AnalysisError;

use crate::config::Config;

/// Outcome of one successful analysis
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisResult {
    /// Vision reply, verbatim
    pub report_text: String,
    /// Excerpt of the report used as the generation prompt
    pub image_prompt_seed: String,
    /// Not fetched here; the UI loads it lazily
    pub generated_image_url: String,
}

/// Runs analyses against the configured endpoints.
///
/// Cheap to clone: the HTTP client and config are shared.
#[derive(Debug, Clone)]
pub struct MealAnalyzer {
    config: Arc<Config>,
    http: reqwest::Client,
}

impl MealAnalyzer {
    /// Build an analyzer whose HTTP client applies the configured timeout
    /// to every outbound call.
    pub fn new(config: Config) -> Result<Self, AnalysisError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| AnalysisError::Network(format!("HTTP client setup failed: {}", e)))?;

        Ok(Self {
            config: Arc::new(config),
            http,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Analyse the photo at `path`.
    ///
    /// Always terminates within the request timeout; every failure comes
    /// back as an `AnalysisError`.
    pub async fn analyze(&self, path: &Path) -> Result<AnalysisResult, AnalysisError> {
        let started = std::time::Instant::now();
        log::info!("🔍 Analysing {}", path.display());

        let request = request::load_request(path, &self.config).await?;
        let body = request.to_json(&self.config.model)?;

        let report_text = vision::request_report(
            &self.http,
            &self.config.vision_url,
            body,
            self.config.request_timeout(),
        )
        .await?;

        let image_prompt_seed = generation::extract_seed(
            &report_text,
            self.config.seed_strategy,
            self.config.seed_length,
        );

        let generated_image_url = generation::generation_url(
            &self.config.image_url,
            &image_prompt_seed,
            Utc::now().timestamp_millis(),
        )?;

        log::info!(
            "✅ Analysis done in {:.1}s ({} chars of report)",
            started.elapsed().as_secs_f64(),
            report_text.chars().count()
        );

        Ok(AnalysisResult {
            report_text,
            image_prompt_seed,
            generated_image_url,
        })
    }

    /// Fetch an image (generated or placeholder) for display
    pub async fn fetch_image(&self, url: &str) -> Result<Vec<u8>, AnalysisError> {
        generation::fetch_image(&self.http, url, self.config.request_timeout()).await
    }
}
