use std::env;

use chrono_tz::Tz;
use url::Url;

use super::boilerplate::DEFAULT_POSTER_BACKGROUND_URL;

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_QUOTE_MAX_WORDS: usize = 40;
pub const DEFAULT_TIMEZONE: Tz = chrono_tz::Asia::Tehran;

/// Server-side configuration for the summarization endpoint.
///
/// The API key is optional here on purpose: a missing key is reported per
/// request as a configuration error instead of failing the whole process.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_api_base: String,
    pub quote_max_words: usize,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        let gemini_api_key = env::var("GEMINI_API_KEY")
            .or_else(|_| env::var("GOOGLE_API_KEY"))
            .ok()
            .filter(|k| !k.trim().is_empty());

        let gemini_api_base = match env::var("GEMINI_API_BASE") {
            Ok(base) => {
                Url::parse(&base).map_err(|e| format!("GEMINI_API_BASE: {}", e))?;
                base.trim_end_matches('/').to_string()
            }
            Err(_) => DEFAULT_GEMINI_API_BASE.to_string(),
        };

        let quote_max_words = match env::var("QUOTE_MAX_WORDS") {
            Ok(raw) => raw
                .parse()
                .map_err(|e| format!("QUOTE_MAX_WORDS: {}", e))?,
            Err(_) => DEFAULT_QUOTE_MAX_WORDS,
        };

        Ok(Self {
            gemini_api_key,
            gemini_model: env::var("GEMINI_MODEL")
                .unwrap_or_else(|_| DEFAULT_GEMINI_MODEL.to_string()),
            gemini_api_base,
            quote_max_words,
        })
    }
}

/// Client-side configuration: where to send transcripts and how to draw posters.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub summarize_endpoint: Url,
    pub poster_background_url: String,
    pub poster_font_path: Option<String>,
    pub timezone: Tz,
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, String> {
        let endpoint = env::var("SUMMARIZE_ENDPOINT")
            .map_err(|e| format!("SUMMARIZE_ENDPOINT: {}", e))?;
        let mut config = Self::new(&endpoint)?;

        if let Ok(url) = env::var("POSTER_BACKGROUND_URL") {
            config.poster_background_url = url;
        }
        config.poster_font_path = env::var("POSTER_FONT_PATH").ok();
        if let Ok(tz) = env::var("DIGEST_TIMEZONE") {
            config.timezone = tz
                .parse()
                .map_err(|e| format!("DIGEST_TIMEZONE: {}", e))?;
        }

        Ok(config)
    }

    /// Builds a configuration with defaults for everything but the endpoint.
    pub fn new(summarize_endpoint: &str) -> Result<Self, String> {
        let summarize_endpoint =
            Url::parse(summarize_endpoint).map_err(|e| format!("SUMMARIZE_ENDPOINT: {}", e))?;
        Ok(Self {
            summarize_endpoint,
            poster_background_url: DEFAULT_POSTER_BACKGROUND_URL.to_string(),
            poster_font_path: None,
            timezone: DEFAULT_TIMEZONE,
        })
    }
}
