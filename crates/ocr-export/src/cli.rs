use std::path::PathBuf;

use clap::parser::ValueSource;
use clap::{ArgMatches, CommandFactory, FromArgMatches, Parser};
use ocr_export_types::DEFAULT_LANGUAGE;

#[derive(Debug, Default)]
pub struct CliSources {
    pub lang_from_cli: bool,
}

impl CliSources {
    fn from_matches(matches: &ArgMatches) -> Self {
        Self {
            lang_from_cli: value_from_cli(matches, "lang"),
        }
    }
}

fn value_from_cli(matches: &ArgMatches, id: &str) -> bool {
    matches
        .value_source(id)
        .is_some_and(|source| matches!(source, ValueSource::CommandLine))
}

pub fn parse_cli() -> (CliArgs, CliSources) {
    let command = CliArgs::command();
    let matches = command.get_matches();
    let args = match CliArgs::from_arg_matches(&matches) {
        Ok(args) => args,
        Err(err) => err.exit(),
    };
    let sources = CliSources::from_matches(&matches);
    (args, sources)
}

#[derive(Debug, Parser)]
#[command(
    name = "ocr-export",
    about = "Export PaddleOCR detection and recognition models to ONNX",
    disable_help_subcommand = true
)]
pub struct CliArgs {
    /// Override the configuration file path
    #[arg(long = "config")]
    pub config: Option<PathBuf>,

    /// Directory receiving the exported graphs and dictionary
    #[arg(short = 'o', long = "output-dir")]
    pub output_dir: Option<PathBuf>,

    /// Pretrained pipeline language (ch, en)
    #[arg(long = "lang", id = "lang", default_value = DEFAULT_LANGUAGE, value_parser = parse_language)]
    pub lang: String,

    /// PaddleOCR model cache root (defaults to ~/.paddleocr/whl)
    #[arg(long = "cache-dir")]
    pub cache_dir: Option<PathBuf>,

    /// Explicit character dictionary file
    #[arg(long = "dictionary")]
    pub dictionary: Option<PathBuf>,

    /// paddle2onnx executable to run
    #[arg(long = "converter")]
    pub converter: Option<PathBuf>,

    /// Convert the detection and recognition models concurrently
    #[arg(long = "parallel")]
    pub parallel: bool,

    /// Fail the run when an exported graph does not verify
    #[arg(long = "strict")]
    pub strict: bool,
}

fn parse_language(value: &str) -> Result<String, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err("language must not be empty".into());
    }
    if !trimmed
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(format!("'{trimmed}' is not a valid language code"));
    }
    Ok(trimmed.to_ascii_lowercase())
}
