/// Image-generation side of the workflow
///
/// Picks the prompt seed out of the nutrition report, builds the
/// generation URL and fetches images for display.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::Url;
use std::time::Duration;

use super::error::AnalysisError;
use crate::config::SeedStrategy;

/// Style appended to every generation prompt
pub const STYLE_SUFFIX: &str = "8k food photography, cinematic lighting";

/// Everything but RFC 3986 unreserved characters gets escaped
const PROMPT_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Shown before the first analysis
pub const PLACEHOLDER_PROMPT: &str = "futuristic healthy food plate";

/// Pull the image prompt seed out of a free-form report
pub fn extract_seed(report: &str, strategy: SeedStrategy, max_chars: usize) -> String {
    match strategy {
        SeedStrategy::Prefix => prefix(report, max_chars),
        SeedStrategy::Parenthesized => match last_english_parenthetical(report) {
            Some(description) => prefix(description, max_chars),
            None => prefix(report, max_chars),
        },
    }
}

/// Character-based so multi-byte text is never cut mid-codepoint
fn prefix(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

/// Last `( ... )` run that contains ASCII letters
fn last_english_parenthetical(report: &str) -> Option<&str> {
    let mut found = None;
    let mut rest = report;

    while let Some(open) = rest.find('(') {
        let after_open = open + 1;
        let Some(close) = rest[after_open..].find(')') else {
            break;
        };
        let inner = rest[after_open..after_open + close].trim();
        if inner.chars().any(|c| c.is_ascii_alphabetic()) {
            found = Some(inner);
        }
        rest = &rest[after_open + close + 1..];
    }

    found
}

/// `<base>/<seed>, <style>?nologo=true&n=<timestamp>`
///
/// The seed and style are percent-encoded as one path segment, newlines
/// included. `timestamp` is the cache-busting value, so two calls at
/// different times never share a URL.
pub fn generation_url(base: &str, seed: &str, timestamp: i64) -> Result<String, AnalysisError> {
    let prompt = if seed.is_empty() {
        STYLE_SUFFIX.to_string()
    } else {
        format!("{}, {}", seed, STYLE_SUFFIX)
    };

    Ok(format!("{}?nologo=true&n={}", prompt_url(base, &prompt)?, timestamp))
}

/// Startup image shown before anything is analysed
pub fn placeholder_url(base: &str) -> Result<String, AnalysisError> {
    Ok(format!("{}?nologo=true", prompt_url(base, PLACEHOLDER_PROMPT)?))
}

/// Base endpoint path plus the encoded prompt, without a query
fn prompt_url(base: &str, prompt: &str) -> Result<String, AnalysisError> {
    let mut url = Url::parse(base)
        .map_err(|e| AnalysisError::Encoding(format!("invalid image endpoint {}: {}", base, e)))?;
    if url.cannot_be_a_base() {
        return Err(AnalysisError::Encoding(format!(
            "image endpoint {} cannot take a path",
            base
        )));
    }
    url.set_query(None);
    url.set_fragment(None);

    // Encoded by hand: the URL parser would drop tabs and newlines
    let mut prefix: String = url.into();
    if !prefix.ends_with('/') {
        prefix.push('/');
    }

    Ok(format!("{}{}", prefix, utf8_percent_encode(prompt, PROMPT_SEGMENT)))
}

/// Download an image for display
pub async fn fetch_image(
    http: &reqwest::Client,
    url: &str,
    timeout: Duration,
) -> Result<Vec<u8>, AnalysisError> {
    let response = http
        .get(url)
        .send()
        .await
        .map_err(|e| AnalysisError::from_transport(e, timeout))?;

    let status = response.status();
    if !status.is_success() {
        let body = match response.text().await {
            Ok(text) => text.chars().take(200).collect(),
            Err(e) => format!("<unreadable body: {}>", e),
        };
        return Err(AnalysisError::HttpStatus {
            status: status.as_u16(),
            body,
        });
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| AnalysisError::from_transport(e, timeout))?;

    if bytes.is_empty() {
        return Err(AnalysisError::UnexpectedResponseShape(
            "image endpoint returned an empty body".to_string(),
        ));
    }

    Ok(bytes.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://image.pollinations.ai/prompt/";

    #[test]
    fn test_prefix_seed_counts_characters() {
        let report = "س".repeat(300);
        let seed = extract_seed(&report, SeedStrategy::Prefix, 200);
        assert_eq!(seed.chars().count(), 200);
    }

    #[test]
    fn test_short_report_is_whole_seed() {
        let report = "السعرات: 450\n(A bowl of fresh salad)";
        assert_eq!(extract_seed(report, SeedStrategy::Prefix, 200), report);
    }

    #[test]
    fn test_parenthesized_seed_takes_last_english_run() {
        let report = "السعرات (تقريباً): 450\nنصيحة (أضف البروتين)\n(Grilled chicken with rice)";
        assert_eq!(
            extract_seed(report, SeedStrategy::Parenthesized, 200),
            "Grilled chicken with rice"
        );
    }

    #[test]
    fn test_parenthesized_seed_falls_back_to_prefix() {
        let report = "لا يوجد وصف (عربي فقط)";
        assert_eq!(extract_seed(report, SeedStrategy::Parenthesized, 5), "لا يو");
    }

    #[test]
    fn test_generation_url_encodes_seed() {
        let url = generation_url(BASE, "A bowl of fresh salad", 1_700_000_000_000).unwrap();
        assert_eq!(
            url,
            "https://image.pollinations.ai/prompt/\
             A%20bowl%20of%20fresh%20salad%2C%208k%20food%20photography%2C%20cinematic%20lighting\
             ?nologo=true&n=1700000000000"
        );
    }

    #[test]
    fn test_generation_url_escapes_newlines_and_slashes() {
        let url = generation_url(BASE, "450\n(rice/beans)", 1).unwrap();
        assert!(url.contains("/prompt/450%0A%28rice%2Fbeans%29%2C%208k"));
        assert!(!url.contains('\n'));
    }

    #[test]
    fn test_generation_url_keeps_tabs_and_arabic() {
        let url = generation_url(BASE, "السعرات: 450\n(A bowl\tof salad/x)", 1).unwrap();
        assert!(url.starts_with(
            "https://image.pollinations.ai/prompt/\
             %D8%A7%D9%84%D8%B3%D8%B9%D8%B1%D8%A7%D8%AA%3A%20450%0A%28A%20bowl%09of%20salad%2Fx%29%2C%208k"
        ));
    }

    #[test]
    fn test_base_without_trailing_slash() {
        let url = generation_url("https://image.test/prompt", "salad", 7).unwrap();
        assert_eq!(
            url,
            "https://image.test/prompt/salad%2C%208k%20food%20photography%2C%20cinematic%20lighting?nologo=true&n=7"
        );
    }

    #[test]
    fn test_cache_buster_differs_between_timestamps() {
        let first = generation_url(BASE, "salad", 1000).unwrap();
        let second = generation_url(BASE, "salad", 1001).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_placeholder_url() {
        assert_eq!(
            placeholder_url(BASE).unwrap(),
            "https://image.pollinations.ai/prompt/futuristic%20healthy%20food%20plate?nologo=true"
        );
    }

    #[test]
    fn test_invalid_base_is_encoding_error() {
        assert!(matches!(
            generation_url("not a url", "salad", 1),
            Err(AnalysisError::Encoding(_))
        ));
    }
}
