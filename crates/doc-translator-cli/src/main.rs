//! Document Translator CLI - translate DOCX, PPTX and PDF files from the
//! command line.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use doc_translator_core::{
    display_name_for_code, lang_for_display_name, ActivityLog, AppConfig, DocTranslator, Error,
    Lang, TranslatorConfig,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "doc-translate")]
#[command(author, version, about = "Translate DOCX, PPTX and PDF documents", long_about = None)]
struct Cli {
    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Translate a document file
    File(FileArgs),
    /// Translate text given on the command line
    Text(TextArgs),
    /// Show recent activity log rows
    Log(LogArgs),
}

#[derive(Args, Debug)]
struct BackendArgs {
    /// Source language code ("auto" lets the backend infer)
    #[arg(short = 's', long, default_value = "auto")]
    source: String,

    /// Target language code
    #[arg(short = 't', long, default_value = "en")]
    target: String,

    /// OpenAI-compatible API base URL
    #[arg(long, env = "OPENAI_API_BASE", default_value = "http://localhost:8080/v1")]
    api_base: String,

    /// API key
    #[arg(long, env = "OPENAI_API_KEY")]
    api_key: Option<String>,

    /// Model name for the OpenAI-compatible API
    #[arg(long, env = "OPENAI_MODEL", default_value = "default_model")]
    model: String,
}

#[derive(Args, Debug)]
struct FileArgs {
    /// Input document (.docx, .pptx or .pdf)
    #[arg(required = true)]
    input: PathBuf,

    /// Directory for the translated output (default: next to the input)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    #[command(flatten)]
    backend: BackendArgs,
}

#[derive(Args, Debug)]
struct TextArgs {
    /// Text to translate
    #[arg(required = true)]
    text: String,

    /// Render the translation as a PDF at this path instead of printing it
    #[arg(long)]
    pdf: Option<PathBuf>,

    #[command(flatten)]
    backend: BackendArgs,
}

#[derive(Args, Debug)]
struct LogArgs {
    /// Number of rows to show, most recent first
    #[arg(short = 'n', long = "lines", default_value_t = 20)]
    lines: usize,
}

fn load_config(cli: &Cli) -> Result<AppConfig> {
    if let Some(config_path) = &cli.config {
        AppConfig::from_file(config_path).context("Failed to load config file")
    } else {
        Ok(AppConfig::load())
    }
}

/// Resolve a target argument (code or display name) against the exposed
/// language table. Unknown targets fail here, before any backend request.
fn resolve_target(input: &str) -> Result<Lang> {
    let input = input.trim();
    if display_name_for_code(input).is_some() {
        return Ok(Lang::new(input));
    }
    lang_for_display_name(input)
        .ok_or_else(|| anyhow::anyhow!(Error::TranslationUnsupportedLanguage(input.to_string())))
}

fn apply_backend_args(config: &mut AppConfig, backend: &BackendArgs) -> Result<()> {
    config.source_lang = Lang::new(&backend.source);
    config.target_lang = resolve_target(&backend.target)?;
    config.translator = TranslatorConfig::new(
        backend.api_base.clone(),
        backend.api_key.clone(),
        backend.model.clone(),
    );
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (before parsing args so env vars are available)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .init();

    let config = load_config(&cli)?;

    match &cli.command {
        Command::File(args) => translate_file(config, args).await,
        Command::Text(args) => translate_text(config, args).await,
        Command::Log(args) => show_log(&config, args),
    }
}

async fn translate_file(mut config: AppConfig, args: &FileArgs) -> Result<()> {
    apply_backend_args(&mut config, &args.backend)?;
    if let Some(dir) = &args.output_dir {
        config.storage.output_dir = Some(dir.clone());
    }

    info!("Translating {}", args.input.display());

    let log_path = config.storage.log_path.clone();
    let target_code = config.target_lang.as_str().to_string();
    let translator = DocTranslator::new(config).context("Failed to initialize translator")?;

    let pb = ProgressBar::new(1);
    // Template is hardcoded and valid, unwrap is safe
    #[allow(clippy::unwrap_used)]
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
            .unwrap()
            .progress_chars("#>-"),
    );

    let pb_cb = pb.clone();
    #[allow(clippy::cast_possible_truncation)]
    let progress = move |done: usize, total: usize| {
        pb_cb.set_length(total as u64);
        pb_cb.set_position(done as u64);
    };

    let result = translator
        .translate_file(&args.input, Some(&progress))
        .await
        .context(format!("Failed to translate {}", args.input.display()))?;

    pb.finish_with_message("Translation complete");

    let file_name = args
        .input
        .file_name()
        .map_or_else(|| "-".to_string(), |n| n.to_string_lossy().to_string());
    ActivityLog::new(log_path)
        .append(
            "cli",
            &file_name,
            &result.detected_source.label(),
            &target_code,
        )
        .context("Failed to append to activity log")?;

    // CLI output is intentional
    #[allow(clippy::print_stdout)]
    {
        println!("Translated document saved to: {}", result.path.display());
        println!(
            "Translated {} units (detected source: {})",
            result.units_translated,
            result.detected_source.label()
        );
    }

    Ok(())
}

async fn translate_text(mut config: AppConfig, args: &TextArgs) -> Result<()> {
    apply_backend_args(&mut config, &args.backend)?;

    let log_path = config.storage.log_path.clone();
    let target_code = config.target_lang.as_str().to_string();
    let source_label = doc_translator_core::detect_lines(&args.text).label();
    let translator = DocTranslator::new(config).context("Failed to initialize translator")?;

    if let Some(pdf_path) = &args.pdf {
        let pdf_bytes = translator
            .translate_text_to_pdf(&args.text)
            .await
            .context("Failed to translate text")?;
        std::fs::write(pdf_path, pdf_bytes)
            .context(format!("Failed to write output: {}", pdf_path.display()))?;

        #[allow(clippy::print_stdout)]
        {
            println!("Translated PDF saved to: {}", pdf_path.display());
        }
    } else {
        let translated = translator
            .translate_text(&args.text)
            .await
            .context("Failed to translate text")?;

        #[allow(clippy::print_stdout)]
        {
            println!("{translated}");
        }
    }

    ActivityLog::new(log_path)
        .append("cli", "-", &source_label, &target_code)
        .context("Failed to append to activity log")?;

    Ok(())
}

fn show_log(config: &AppConfig, args: &LogArgs) -> Result<()> {
    let log = ActivityLog::new(config.storage.log_path.clone());
    let rows = log.read_recent(args.lines).context("Failed to read activity log")?;

    #[allow(clippy::print_stdout)]
    {
        if rows.is_empty() {
            println!("No activity recorded yet");
            return Ok(());
        }

        for row in rows {
            println!(
                "{}  {:<12}  {:<30}  {} -> {}",
                row.timestamp,
                row.activity_type,
                row.file_name,
                row.source_language,
                row.target_language
            );
        }
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn target_accepts_code_and_display_name() {
        assert_eq!(resolve_target("fr").unwrap().as_str(), "fr");
        assert_eq!(resolve_target("French").unwrap().as_str(), "fr");
        assert_eq!(resolve_target(" es ").unwrap().as_str(), "es");
    }

    #[test]
    fn unknown_target_is_rejected_up_front() {
        let err = resolve_target("xx").unwrap_err();
        assert!(err.to_string().contains("unsupported target language"));
    }
}
