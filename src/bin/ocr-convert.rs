//! CLI binary for ocr-convert.
//!
//! A thin shim over the library crate: maps flags (with `OCR_CONVERT_*`
//! environment fallbacks, `.env` honoured) to `RecognitionConfig` /
//! `ServerConfig` and runs one of three subcommands.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use ocr_convert::{
    convert, server, ConversionService, FileStore, OutputFormat, ProgressCallback,
    RecognitionAdapter, RecognitionConfig, RecognitionProgress, ServerConfig, TesseractEngine,
};
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Live progress bar plus one log line per page. Pages may finish out of
/// order when `--concurrency` > 1.
struct CliProgress {
    bar: ProgressBar,
    errors: AtomicUsize,
}

impl CliProgress {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Loading document…");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self {
            bar,
            errors: AtomicUsize::new(0),
        })
    }
}

impl RecognitionProgress for CliProgress {
    fn on_document_start(&self, total_pages: usize) {
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  [{bar:42.green/238}] {pos:>3}/{len} pages  ⏱ {elapsed_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ");
        self.bar.set_length(total_pages as u64);
        self.bar.set_style(style);
        self.bar.set_prefix("Recognising");
    }

    fn on_page_start(&self, page: usize, _total: usize) {
        self.bar.set_message(format!("page {page}"));
    }

    fn on_page_complete(&self, page: usize, total: usize, chars: usize) {
        let mark = if chars == 0 { dim("∅") } else { green("✓") };
        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}  {}",
            mark,
            page,
            total,
            dim(&format!("{chars:>6} chars"))
        ));
        self.bar.inc(1);
    }

    fn on_page_error(&self, page: usize, total: usize, error: &str) {
        self.errors.fetch_add(1, Ordering::SeqCst);
        let msg: String = error.chars().take(80).collect();
        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}  {}",
            red("✗"),
            page,
            total,
            red(&msg)
        ));
        self.bar.inc(1);
    }

    fn on_document_complete(&self, total_pages: usize, pages_with_text: usize) {
        self.bar.finish_and_clear();
        let failed = self.errors.load(Ordering::SeqCst);
        eprintln!(
            "{} {}/{} pages with text{}",
            if pages_with_text == 0 { red("✘") } else { green("✔") },
            bold(&pages_with_text.to_string()),
            total_pages,
            if failed > 0 {
                format!("  ({} failed)", red(&failed.to_string()))
            } else {
                String::new()
            }
        );
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Run the web service on 127.0.0.1:8000
  ocr-convert serve

  # One-shot conversion, output next to the input
  ocr-convert convert scan.pdf --format csv

  # German + English, custom tesseract
  ocr-convert convert letter.png -f txt -o letter.txt --language deu+eng \
      --tesseract-cmd /opt/tesseract/bin/tesseract

  # Is the OCR engine installed?
  ocr-convert check

ENVIRONMENT VARIABLES:
  Every flag has an OCR_CONVERT_* fallback (e.g. OCR_CONVERT_PORT,
  OCR_CONVERT_TESSERACT_CMD). A .env file in the working directory is read
  at startup. RUST_LOG overrides the log filter.

SETUP:
  Debian/Ubuntu:  apt install tesseract-ocr
  macOS:          brew install tesseract
  PDF input additionally needs the pdfium shared library (system-wide or
  --pdfium-lib <dir>).
"#;

/// Extract text from scanned PDFs and images with Tesseract OCR.
#[derive(Parser, Debug)]
#[command(
    name = "ocr-convert",
    version,
    about = "Extract text from scanned PDFs and images as JSON, CSV or TXT",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "OCR_CONVERT_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true, env = "OCR_CONVERT_QUIET")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP upload service.
    Serve(ServeArgs),
    /// Convert one file and write the result to disk.
    Convert(ConvertArgs),
    /// Check that the OCR engine can be started.
    Check(EngineArgs),
}

/// Recognition settings shared by every subcommand.
#[derive(Args, Debug)]
struct EngineArgs {
    /// Tesseract executable (name on PATH or full path).
    #[arg(long, env = "OCR_CONVERT_TESSERACT_CMD", default_value = "tesseract")]
    tesseract_cmd: PathBuf,

    /// Tesseract language(s), e.g. eng or deu+eng.
    #[arg(short, long, env = "OCR_CONVERT_LANGUAGE", default_value = "eng")]
    language: String,

    /// PDF rendering DPI (72–600).
    #[arg(long, env = "OCR_CONVERT_DPI", default_value_t = 300,
          value_parser = clap::value_parser!(u32).range(72..=600))]
    dpi: u32,

    /// Pages recognised at once.
    #[arg(short, long, env = "OCR_CONVERT_CONCURRENCY", default_value_t = 2)]
    concurrency: usize,

    /// Directory holding the pdfium shared library (default: system library).
    #[arg(long, env = "OCR_CONVERT_PDFIUM_LIB")]
    pdfium_lib: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ServeArgs {
    #[command(flatten)]
    engine: EngineArgs,

    #[arg(long, env = "OCR_CONVERT_HOST", default_value = "127.0.0.1")]
    host: String,

    #[arg(short, long, env = "OCR_CONVERT_PORT", default_value_t = 8000)]
    port: u16,

    /// Where uploads are kept while they are processed.
    #[arg(long, env = "OCR_CONVERT_UPLOAD_DIR", default_value = "uploads")]
    upload_dir: PathBuf,

    /// Where converted files wait for download.
    #[arg(long, env = "OCR_CONVERT_OUTPUT_DIR", default_value = "outputs")]
    output_dir: PathBuf,

    /// Maximum upload size in MiB.
    #[arg(long, env = "OCR_CONVERT_MAX_UPLOAD_MB", default_value_t = 50)]
    max_upload_mb: usize,
}

#[derive(Args, Debug)]
struct ConvertArgs {
    #[command(flatten)]
    engine: EngineArgs,

    /// PDF or image to convert.
    input: PathBuf,

    /// Output format: json, csv or txt.
    #[arg(short, long, env = "OCR_CONVERT_FORMAT", default_value = "json")]
    format: String,

    /// Output file (default: input path with the format's extension).
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Disable progress bar.
    #[arg(long, env = "OCR_CONVERT_NO_PROGRESS")]
    no_progress: bool,
}

impl EngineArgs {
    fn to_config(&self, progress: Option<ProgressCallback>) -> Result<RecognitionConfig> {
        let mut builder = RecognitionConfig::builder()
            .tesseract_cmd(&self.tesseract_cmd)
            .language(&self.language)
            .dpi(self.dpi)
            .concurrency(self.concurrency);
        if let Some(ref dir) = self.pdfium_lib {
            builder = builder.pdfium_library_path(dir);
        }
        if let Some(cb) = progress {
            builder = builder.progress_callback(cb);
        }
        builder.build().context("Invalid recognition settings")
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces INFO logs for one-shot conversions.
    let show_progress = matches!(&cli.command, Command::Convert(a) if !a.no_progress) && !cli.quiet;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "ocr_convert=info,tower_http=info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    match cli.command {
        Command::Serve(args) => run_serve(args).await,
        Command::Convert(args) => run_convert(args, show_progress).await,
        Command::Check(args) => run_check(args, cli.quiet).await,
    }
}

async fn run_serve(args: ServeArgs) -> Result<()> {
    let config = ServerConfig {
        host: args.host,
        port: args.port,
        upload_dir: args.upload_dir,
        output_dir: args.output_dir,
        max_upload_bytes: args.max_upload_mb.saturating_mul(1024 * 1024),
    };

    let adapter = RecognitionAdapter::new(args.engine.to_config(None)?);
    if !adapter.is_engine_available().await {
        tracing::warn!(
            "OCR engine '{}' is not available; uploads will fail until it is installed",
            args.engine.tesseract_cmd.display()
        );
    }

    let store = FileStore::open(&config.upload_dir, &config.output_dir)
        .await
        .context("Failed to prepare working directories")?;

    server::serve(&config, ConversionService::new(adapter, store), shutdown_signal())
        .await
        .context("Server failed")
}

async fn run_convert(args: ConvertArgs, show_progress: bool) -> Result<()> {
    let format: OutputFormat = args.format.parse()?;

    let progress: Option<ProgressCallback> = if show_progress {
        Some(CliProgress::new() as Arc<dyn RecognitionProgress>)
    } else {
        None
    };
    let adapter = RecognitionAdapter::new(args.engine.to_config(progress)?);

    let result = adapter
        .process_file(&args.input)
        .await
        .with_context(|| format!("Failed to recognise {}", args.input.display()))?;
    let output = convert(&result, format)?;

    let target = args
        .output
        .unwrap_or_else(|| args.input.with_extension(format.extension()));
    if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    tokio::fs::write(&target, output.bytes())
        .await
        .with_context(|| format!("Failed to write {}", target.display()))?;

    let stats = result.stats();
    eprintln!(
        "{} {} → {}  {}",
        green("✔"),
        args.input.display(),
        bold(&target.display().to_string()),
        dim(&format!(
            "{} pages, {} words, {:.1}% confidence",
            stats.page_count, stats.word_count, stats.mean_confidence
        ))
    );
    Ok(())
}

async fn run_check(args: EngineArgs, quiet: bool) -> Result<()> {
    let config = args.to_config(None)?;
    let engine = TesseractEngine::new(&config);
    match engine.version().await {
        Some(version) => {
            if !quiet {
                println!("{} {}", green("✔"), version);
            }
            Ok(())
        }
        None => bail!(
            "OCR engine '{}' could not be started. Install tesseract-ocr \
             (apt install tesseract-ocr / brew install tesseract) or pass --tesseract-cmd.",
            config.tesseract_cmd.display()
        ),
    }
}

/// Resolve on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, starting graceful shutdown..."),
        _ = terminate => tracing::info!("Received SIGTERM, starting graceful shutdown..."),
    }
}
