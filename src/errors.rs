use thiserror::Error;

/// Fixed, pre-composed messages shown to the user. Raw error text is logged,
/// never shown.
pub mod messages {
    pub const EMPTY_INPUT: &str = "لطفاً متن هر دو خطبه را وارد کنید.";
    pub const BUSY: &str = "درخواست قبلی هنوز در حال پردازش است.";
    pub const CONNECTION: &str = "خطا در برقراری ارتباط با سرور. لطفاً دوباره تلاش کنید.";
    pub const SERVER: &str = "خطایی در سرور رخ داد.";
    pub const CONFIGURATION: &str = "کلید API هوش مصنوعی روی سرور تنظیم نشده است.";
    pub const INVALID_SERVER_RESPONSE: &str = "پاسخ نامعتبر از سرور دریافت شد.";
    pub const INVALID_AI_RESPONSE: &str =
        "پاسخ نامعتبر از هوش مصنوعی دریافت شد. لطفاً دوباره تلاش کنید.";
    pub const PDF_FAILED: &str = "خطایی در تولید فایل PDF رخ داد. این مشکل معمولاً به دلیل ناسازگاری استایل‌ها با خروجی PDF است. لطفاً از دکمه Word استفاده کنید یا متن را کپی کنید.";
    pub const WORD_FAILED: &str = "خطا در تولید فایل Word.";
    pub const IMAGE_LOAD_FAILED: &str = "خطا در بارگذاری تصویر پس‌زمینه.";
    pub const IMAGE_EXPORT_FAILED: &str =
        "خطا در تولید تصویر! لطفاً از مرورگر دیگری استفاده کنید.";
    pub const NO_QUOTE: &str = "متن نقل قول یافت نشد.";
}

/// Server-side error for the summarization endpoint.
#[derive(Debug, Error)]
pub enum DigestError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Failed to parse request: {0}")]
    ParseError(String),

    #[error("Failed to send HTTP request: {0}")]
    HttpError(String),

    #[error("Failed to access Gemini API: {0}")]
    UpstreamError(String),

    #[error("Invalid response from AI: {0}")]
    InvalidAiResponse(String),
}

impl DigestError {
    /// Machine-readable kind carried in the endpoint's error body.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::ConfigError(_) => "configuration",
            Self::ParseError(_) => "bad_request",
            Self::HttpError(_) | Self::UpstreamError(_) => "upstream",
            Self::InvalidAiResponse(_) => "invalid_ai_response",
        }
    }

    /// HTTP status the endpoint answers with for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::ConfigError(_) => 500,
            Self::ParseError(_) => 400,
            Self::HttpError(_) | Self::UpstreamError(_) | Self::InvalidAiResponse(_) => 502,
        }
    }
}

impl From<reqwest::Error> for DigestError {
    fn from(error: reqwest::Error) -> Self {
        DigestError::HttpError(error.to_string())
    }
}

impl From<serde_json::Error> for DigestError {
    fn from(error: serde_json::Error) -> Self {
        DigestError::ParseError(error.to_string())
    }
}

/// Failure of one summarization round trip, as seen by the client.
#[derive(Debug, Error)]
pub enum SummarizeError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Server error (status {status}): {message:?}")]
    Server {
        status: u16,
        message: Option<String>,
    },

    #[error("Server is missing its AI credential: {0}")]
    Configuration(String),

    #[error("Invalid server response: {0}")]
    InvalidServerResponse(String),

    #[error("Invalid response from AI: {0}")]
    InvalidAiResponse(String),
}

impl SummarizeError {
    /// The text shown to the user for this failure.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Connection(_) => messages::CONNECTION.to_string(),
            Self::Server {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => format!("{} ({})", messages::SERVER, message),
            Self::Server { .. } => messages::SERVER.to_string(),
            Self::Configuration(_) => messages::CONFIGURATION.to_string(),
            Self::InvalidServerResponse(_) => messages::INVALID_SERVER_RESPONSE.to_string(),
            Self::InvalidAiResponse(_) => messages::INVALID_AI_RESPONSE.to_string(),
        }
    }
}

impl From<reqwest::Error> for SummarizeError {
    fn from(error: reqwest::Error) -> Self {
        SummarizeError::Connection(error.to_string())
    }
}

/// The background image of a poster could not be fetched or decoded.
#[derive(Debug, Error)]
pub enum ImageLoadError {
    #[error("Failed to fetch background image: {0}")]
    Fetch(String),

    #[error("Background image request returned status {0}")]
    Status(u16),

    #[error("Failed to decode background image: {0}")]
    Decode(String),
}

/// Failure of one export operation. Never affects other exports or the record.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Failed to build Word document: {0}")]
    Document(String),

    #[error("Failed to rasterize content: {0}")]
    Rasterize(String),

    #[error("Failed to write PDF: {0}")]
    Pdf(String),

    #[error(transparent)]
    ImageLoad(#[from] ImageLoadError),

    #[error("Failed to encode image: {0}")]
    Encode(String),

    #[error("No quote to draw")]
    MissingQuote,

    #[error("Subtree not found: {0}")]
    SubtreeNotFound(String),

    #[error("Poster is {actual}, expected {expected}")]
    PosterState {
        expected: &'static str,
        actual: &'static str,
    },
}

impl ExportError {
    /// The text shown to the user for this failure.
    #[must_use]
    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::Document(_) => messages::WORD_FAILED,
            Self::Rasterize(_) | Self::Pdf(_) | Self::SubtreeNotFound(_) => messages::PDF_FAILED,
            Self::ImageLoad(_) => messages::IMAGE_LOAD_FAILED,
            Self::Encode(_) | Self::PosterState { .. } => messages::IMAGE_EXPORT_FAILED,
            Self::MissingQuote => messages::NO_QUOTE,
        }
    }
}

impl From<zip::result::ZipError> for ExportError {
    fn from(error: zip::result::ZipError) -> Self {
        ExportError::Document(error.to_string())
    }
}

impl From<image::ImageError> for ExportError {
    fn from(error: image::ImageError) -> Self {
        ExportError::Encode(error.to_string())
    }
}

/// Why a summarize action from the session did not produce a record.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Both transcripts are required")]
    EmptyInput,

    #[error("A summarization request is already in flight")]
    Busy,

    #[error(transparent)]
    Summarize(#[from] SummarizeError),
}

impl SessionError {
    /// The text shown to the user for this failure.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::EmptyInput => messages::EMPTY_INPUT.to_string(),
            Self::Busy => messages::BUSY.to_string(),
            Self::Summarize(e) => e.user_message(),
        }
    }
}
