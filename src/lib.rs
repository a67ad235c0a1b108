/// Sermon digest - summarizes two Friday sermon transcripts with Gemini and
/// exports the result.
///
/// The crate has two halves:
/// 1. A summarization endpoint (Lambda) that owns the Gemini credential, builds
///    the prompt and response schema, and returns a validated `SummaryRecord`
/// 2. A client side that calls the endpoint and projects the record into an
///    on-screen tree, a Word document, a rasterized PDF/PNG and quote posters
///
/// # Architecture
///
/// The system uses:
/// - AWS Lambda (`lambda_runtime`) for the endpoint
/// - reqwest for Gemini and endpoint calls
/// - zip for the DOCX package, printpdf for the PDF container
/// - fontdb, rustybuzz and tiny-skia for CPU rasterization of Persian text
/// - image for decoding backgrounds and encoding PNG/JPEG
///
/// # Example
///
/// ```no_run
/// use sermon_digest::clients::SummarizeClient;
/// use sermon_digest::export::to_document;
/// use sermon_digest::session::Session;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     sermon_digest::setup_logging();
///
///     let endpoint = url::Url::parse("https://example.com/api/summarize")?;
///     let session = Session::new(SummarizeClient::new(endpoint));
///
///     match session.run_summarize("متن خطبه اول", "متن خطبه دوم").await {
///         Ok(record) => {
///             let docx = to_document(&record)?;
///             std::fs::write(sermon_digest::export::docx::DOCX_FILENAME, docx)?;
///         }
///         Err(e) => eprintln!("{}", e.user_message()),
///     }
///
///     Ok(())
/// }
/// ```
// Module declarations
pub mod ai;
pub mod api;
pub mod clients;
pub mod core;
pub mod errors;
pub mod export;
pub mod raster;
pub mod session;
pub mod style;
pub mod utils;
pub mod views;

/// Configure structured logging with JSON format for AWS Lambda environments.
///
/// This function sets up tracing-subscriber with a JSON formatter suitable for
/// `CloudWatch` Logs integration, filtered by `RUST_LOG` (default `info`).
/// Calling it more than once is harmless; only the first call installs the
/// subscriber.
///
/// # Example
///
/// ```
/// // Initialize structured logging at the start of your Lambda handler
/// sermon_digest::setup_logging();
/// ```
pub fn setup_logging() {
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::prelude::*;

    let default_level = if cfg!(feature = "debug-logs") {
        "debug"
    } else {
        "info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let fmt_layer = tracing_subscriber::fmt::layer().json().with_target(true);

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}
