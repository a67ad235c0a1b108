//! Command-line client: summarize two transcripts and write the exports.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::{error, info};

use sermon_digest::clients::{RequestMode, SummarizeClient};
use sermon_digest::core::config::{ClientConfig, DEFAULT_QUOTE_MAX_WORDS};
use sermon_digest::core::models::SummaryRecord;
use sermon_digest::errors::ExportError;
use sermon_digest::export::{self, PosterFormat, docx, pdf, poster};
use sermon_digest::raster::FontSystem;
use sermon_digest::session::Session;
use sermon_digest::utils::jalali;
use sermon_digest::views::{self, Page, SUMMARY_ROOT_ID};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ExportKind {
    Docx,
    Pdf,
    Png,
    Posters,
    Text,
    Html,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum PosterFormatArg {
    Jpeg,
    Png,
}

impl From<PosterFormatArg> for PosterFormat {
    fn from(arg: PosterFormatArg) -> Self {
        match arg {
            PosterFormatArg::Jpeg => PosterFormat::Jpeg,
            PosterFormatArg::Png => PosterFormat::Png,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "digest", version, about = "Summarize two sermon transcripts and export the result", long_about = None)]
struct Cli {
    /// File holding the first (religious) sermon transcript
    #[arg(long)]
    text_a: PathBuf,

    /// File holding the second (political) sermon transcript
    #[arg(long)]
    text_b: PathBuf,

    /// Summarization endpoint URL
    #[arg(long, env = "SUMMARIZE_ENDPOINT")]
    endpoint: String,

    /// Send a complete generateContent payload instead of the two texts
    #[arg(long)]
    prebuilt: bool,

    /// Output directory
    #[arg(long, short, default_value = ".")]
    out: PathBuf,

    /// Exports to write
    #[arg(long, value_enum, value_delimiter = ',', default_values_t = [ExportKind::Docx, ExportKind::Pdf, ExportKind::Posters, ExportKind::Text])]
    export: Vec<ExportKind>,

    /// Poster background (http(s) URL or file path)
    #[arg(long, env = "POSTER_BACKGROUND_URL")]
    background: Option<String>,

    /// Extra font file used for rasterized exports
    #[arg(long, env = "POSTER_FONT_PATH")]
    font: Option<PathBuf>,

    /// IANA time zone for the poster date line
    #[arg(long, env = "DIGEST_TIMEZONE")]
    timezone: Option<String>,

    #[arg(long, value_enum, default_value_t = PosterFormatArg::Jpeg)]
    poster_format: PosterFormatArg,
}

impl Cli {
    fn client_config(&self) -> Result<ClientConfig> {
        let mut config = ClientConfig::new(&self.endpoint).map_err(anyhow::Error::msg)?;
        if let Some(background) = &self.background {
            config.poster_background_url.clone_from(background);
        }
        config.poster_font_path = self.font.as_ref().map(|p| p.display().to_string());
        if let Some(tz) = &self.timezone {
            config.timezone = tz
                .parse()
                .map_err(|e| anyhow::anyhow!("DIGEST_TIMEZONE: {e}"))?;
        }
        Ok(config)
    }
}

async fn write_output(dir: &Path, name: &str, bytes: &[u8]) -> Result<()> {
    let path = dir.join(name);
    tokio::fs::write(&path, bytes)
        .await
        .with_context(|| format!("writing {}", path.display()))?;
    println!("{}", path.display());
    Ok(())
}

fn report(label: &str, e: &ExportError) {
    error!(export = label, "Export failed: {}", e);
    eprintln!("{}", e.user_message());
}

async fn run_exports(cli: &Cli, config: &ClientConfig, record: &SummaryRecord) -> Result<()> {
    let fonts = if cli
        .export
        .iter()
        .any(|k| matches!(k, ExportKind::Pdf | ExportKind::Png | ExportKind::Posters))
    {
        match FontSystem::new(config.poster_font_path.as_deref().map(Path::new)) {
            Ok(fonts) => Some(fonts),
            Err(e) => {
                report("fonts", &e);
                None
            }
        }
    } else {
        None
    };

    for kind in &cli.export {
        match kind {
            ExportKind::Docx => match export::to_document(record) {
                Ok(bytes) => write_output(&cli.out, docx::DOCX_FILENAME, &bytes).await?,
                Err(e) => report("docx", &e),
            },
            ExportKind::Text => {
                write_output(&cli.out, "khutbah_summary.txt", views::to_plain_text(record).as_bytes())
                    .await?;
            }
            ExportKind::Html => {
                let html = views::to_html(&views::render(record));
                write_output(&cli.out, "khutbah_summary.html", html.as_bytes()).await?;
            }
            ExportKind::Pdf | ExportKind::Png => {
                let Some(fonts) = fonts.as_ref() else { continue };
                let mut page = Page::new(record);
                let (name, result) = if *kind == ExportKind::Pdf {
                    (pdf::PDF_FILENAME, export::to_pdf(&mut page, SUMMARY_ROOT_ID, fonts))
                } else {
                    (pdf::PNG_FILENAME, export::to_png(&mut page, SUMMARY_ROOT_ID, fonts))
                };
                match result {
                    Ok(bytes) => write_output(&cli.out, name, &bytes).await?,
                    Err(e) => report(name, &e),
                }
            }
            ExportKind::Posters => {
                let Some(fonts) = fonts.as_ref() else { continue };
                let http = reqwest::Client::new();
                let date = jalali::today(config.timezone);
                let format = PosterFormat::from(cli.poster_format);

                for (section_kind, section) in record.sections() {
                    let Some(quote) = section.highlight_quote.as_deref() else {
                        info!(section = section_kind.slug(), "No quote; skipping poster");
                        continue;
                    };
                    let result = poster::render_poster(
                        &http,
                        fonts,
                        &config.poster_background_url,
                        quote,
                        &date,
                        format,
                    )
                    .await;
                    match result {
                        Ok(bytes) => {
                            let name = poster::poster_filename(
                                section_kind,
                                format,
                                chrono::Utc::now().timestamp_millis(),
                            );
                            write_output(&cli.out, &name, &bytes).await?;
                        }
                        Err(e) => report("poster", &e),
                    }
                }
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    sermon_digest::setup_logging();
    let cli = Cli::parse();
    let config = cli.client_config()?;

    let text_a = tokio::fs::read_to_string(&cli.text_a)
        .await
        .with_context(|| format!("reading {}", cli.text_a.display()))?;
    let text_b = tokio::fs::read_to_string(&cli.text_b)
        .await
        .with_context(|| format!("reading {}", cli.text_b.display()))?;

    let mode = if cli.prebuilt {
        RequestMode::Prebuilt {
            quote_max_words: DEFAULT_QUOTE_MAX_WORDS,
        }
    } else {
        RequestMode::Texts
    };
    let session = Session::new(SummarizeClient::with_mode(config.summarize_endpoint.clone(), mode));

    let record = match session.run_summarize(&text_a, &text_b).await {
        Ok(record) => record,
        Err(e) => {
            eprintln!("{}", e.user_message());
            std::process::exit(1);
        }
    };

    tokio::fs::create_dir_all(&cli.out)
        .await
        .with_context(|| format!("creating {}", cli.out.display()))?;
    run_exports(&cli, &config, &record).await
}
