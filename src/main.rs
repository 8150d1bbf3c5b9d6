#![allow(clippy::uninlined_format_args)]

use anyhow::{Result, anyhow};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, error, info};
use std::io::Write;
use std::path::PathBuf;

use langpack::app_config::{Config, LogLevel, TranslationProvider};
use langpack::{Controller, TranslateOptions, TranslateOutcome};

/// `--provider` values
#[derive(Debug, Clone, ValueEnum)]
enum CliTranslationProvider {
    #[value(name = "openai")]
    OpenAI,
    Anthropic,
    Ollama,
}

impl From<CliTranslationProvider> for TranslationProvider {
    fn from(cli_provider: CliTranslationProvider) -> Self {
        match cli_provider {
            CliTranslationProvider::OpenAI => TranslationProvider::OpenAI,
            CliTranslationProvider::Anthropic => TranslationProvider::Anthropic,
            CliTranslationProvider::Ollama => TranslationProvider::Ollama,
        }
    }
}

/// `--log-level` values
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => LogLevel::Error,
            CliLogLevel::Warn => LogLevel::Warn,
            CliLogLevel::Info => LogLevel::Info,
            CliLogLevel::Debug => LogLevel::Debug,
            CliLogLevel::Trace => LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Translate the reference locale file into another language
    Translate(TranslateArgs),

    /// Check keys and bundle every language
    Build {
        /// Exit with an error when any language is missing keys
        #[arg(long)]
        deny_missing: bool,
    },

    /// List missing keys per language without building
    Check,

    /// Regenerate the TranslationKeys enum from the reference language
    Keys,

    /// List the language directories
    Languages,

    /// Generate shell completions for langpack
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug)]
struct TranslateArgs {
    /// Target language code (e.g., 'fr', 'pt-BR'); defaults to the config value
    #[arg(value_name = "TARGET")]
    target_language: Option<String>,

    /// Human-readable target language name used in prompts
    #[arg(long)]
    target_name: Option<String>,

    /// Translation provider to use
    #[arg(short, long, value_enum)]
    provider: Option<CliTranslationProvider>,

    /// Model name to use for translation
    #[arg(short, long)]
    model: Option<String>,

    /// Output file (defaults to <source_dir>/<target>/index.ts)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Force overwrite of an existing output file
    #[arg(short, long)]
    force: bool,

    /// Exit with an error when strings still fail a check after the retry pass
    #[arg(long)]
    strict: bool,
}

/// langpack - locale asset pipeline with AI translation
#[derive(Parser, Debug)]
#[command(name = "langpack")]
#[command(version)]
#[command(about = "Translate, check and bundle TypeScript locale files")]
#[command(long_about = "langpack manages a directory of per-language TypeScript locale modules.

EXAMPLES:
    langpack translate fr                      # Translate src/en/index.ts into src/fr/index.ts
    langpack translate de -p anthropic -f      # Use Anthropic and overwrite src/de/index.ts
    langpack translate ptBR --target-name 'Brazilian Portuguese'
    langpack check                             # List missing keys per language
    langpack build --deny-missing              # Bundle every language, fail on missing keys
    langpack keys                              # Regenerate src/types.ts
    langpack completions bash > langpack.bash  # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config. If the config file doesn't exist, a default one
    will be created automatically.

SUPPORTED PROVIDERS:
    openai    - OpenAI API (default, requires OPENAI_API_KEY or api_key)
    anthropic - Anthropic API (requires ANTHROPIC_API_KEY or api_key)
    ollama    - Local Ollama server")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true, default_value = "conf.json")]
    config: PathBuf,

    /// Set logging level
    #[arg(short, long, global = true, value_enum)]
    log_level: Option<CliLogLevel>,
}

/// Colored `HH:MM:SS.mmm` lines on stderr, so stdout stays clean for `languages` and `completions`
struct StderrLogger {
    level: LevelFilter,
}

impl StderrLogger {
    fn install(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(StderrLogger { level }))?;
        log::set_max_level(level);
        Ok(())
    }

    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("\x1B[1;31m", "❌ "),
            Level::Warn => ("\x1B[1;33m", "🚧 "),
            Level::Info => ("\x1B[1;32m", " "),
            Level::Debug => ("\x1B[1;36m", "🔍 "),
            Level::Trace => ("\x1B[1;35m", "📋 "),
        }
    }
}

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let (color, emoji) = Self::style_for_level(record.level());
        let timestamp = chrono::Local::now().format("%H:%M:%S.%3f");
        let mut stderr = std::io::stderr().lock();
        let _ = writeln!(stderr, "{}{} {} {}\x1B[0m", color, timestamp, emoji, record.args());
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Narrowed again once the config is loaded
    StderrLogger::install(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    if let Commands::Completions { shell } = cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(shell, &mut cmd, "langpack", &mut std::io::stdout());
        return Ok(());
    }

    if let Some(level) = &cli.log_level {
        log::set_max_level(LogLevel::from(level.clone()).to_level_filter());
    }

    let mut config = Config::load_or_create(&cli.config)?;
    match &cli.log_level {
        Some(level) => config.log_level = level.clone().into(),
        None => log::set_max_level(config.log_level.to_level_filter()),
    }

    match cli.command {
        Commands::Translate(args) => run_translate(config, args).await,
        Commands::Build { deny_missing } => {
            let controller = Controller::with_config(config)?;
            let summary = controller.run_build().await?;
            if summary.should_fail(deny_missing) {
                return Err(anyhow!("Build failed, see the summary above"));
            }
            Ok(())
        }
        Commands::Check => {
            Controller::with_config(config)?.run_check()?;
            Ok(())
        }
        Commands::Keys => {
            let count = Controller::with_config(config)?.run_keys()?;
            info!("{} keys", count);
            Ok(())
        }
        Commands::Languages => {
            for code in Controller::with_config(config)?.list_languages() {
                println!("{}", code);
            }
            Ok(())
        }
        Commands::Completions { .. } => Ok(()),
    }
}

async fn run_translate(mut config: Config, args: TranslateArgs) -> Result<()> {
    if let Some(provider) = args.provider {
        config.translation.provider = provider.into();
    }
    if let Some(model) = args.model {
        config.translation.active_provider_config_mut().model = model;
    }
    if let Some(target_language) = args.target_language {
        config.target_language = target_language;
        config.target_language_name = String::new();
    }
    if let Some(target_name) = args.target_name {
        config.target_language_name = target_name;
    }

    let controller = Controller::with_config(config)?;
    let options = TranslateOptions {
        force: args.force,
        output: args.output,
        strict: args.strict,
    };

    match controller.run_translate(&options).await {
        Ok(TranslateOutcome::Written { path, unresolved }) => {
            info!("Success: {:?} ({} unresolved)", path, unresolved);
            Ok(())
        }
        Ok(TranslateOutcome::Skipped(_)) => Ok(()),
        Err(e) => {
            error!("Translation failed: {:#}", e);
            Err(e)
        }
    }
}
