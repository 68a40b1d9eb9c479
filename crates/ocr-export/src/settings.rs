use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use ocr_export_converter::Paddle2OnnxConfig;
use ocr_export_provider::{PaddleCacheConfig, PaddleCacheProvider};
use ocr_export_types::DEFAULT_LANGUAGE;
use serde::{Deserialize, Serialize};

use crate::cli::{CliArgs, CliSources};

const DEFAULT_OUTPUT_DIR: &str = "models/paddleocr";
const DEFAULT_EXPECTED_INPUT: &str = "x";

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub(crate) struct FileConfig {
    pub(crate) model: Option<ModelFileConfig>,
    pub(crate) converter: Option<ConverterFileConfig>,
    pub(crate) output: Option<OutputFileConfig>,
    pub(crate) verify: Option<VerifyFileConfig>,
    pub(crate) pipeline: Option<PipelineFileConfig>,
}

#[derive(Debug, Default, Deserialize, Serialize, Clone)]
#[serde(default)]
pub(crate) struct ModelFileConfig {
    pub(crate) lang: Option<String>,
    pub(crate) cache_dir: Option<PathBuf>,
    pub(crate) dictionary: Option<PathBuf>,
    pub(crate) dictionary_dirs: Option<Vec<PathBuf>>,
    pub(crate) python_prefixes: Option<Vec<PathBuf>>,
    pub(crate) use_gpu: Option<bool>,
}

#[derive(Debug, Default, Deserialize, Serialize, Clone)]
#[serde(default)]
pub(crate) struct ConverterFileConfig {
    pub(crate) program: Option<String>,
    pub(crate) args: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize, Serialize, Clone)]
#[serde(default)]
pub(crate) struct OutputFileConfig {
    pub(crate) dir: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize, Serialize, Clone)]
#[serde(default)]
pub(crate) struct VerifyFileConfig {
    pub(crate) expected_inputs: Option<Vec<String>>,
    pub(crate) strict: Option<bool>,
}

#[derive(Debug, Default, Deserialize, Serialize, Clone)]
#[serde(default)]
pub(crate) struct PipelineFileConfig {
    pub(crate) parallel: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct EffectiveSettings {
    pub model: ModelSettings,
    pub converter: ConverterSettings,
    pub output: OutputSettings,
    pub verify: VerifySettings,
    pub pipeline: PipelineSettings,
}

#[derive(Debug)]
pub struct ResolvedSettings {
    pub settings: EffectiveSettings,
    pub config_path: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct ModelSettings {
    pub language: String,
    pub cache_dir: PathBuf,
    pub dictionary: Option<PathBuf>,
    pub dictionary_dirs: Vec<PathBuf>,
    pub python_prefixes: Vec<PathBuf>,
    pub use_gpu: bool,
}

impl ModelSettings {
    pub fn provider(&self) -> PaddleCacheProvider {
        PaddleCacheProvider::new(PaddleCacheConfig {
            cache_dir: self.cache_dir.clone(),
            dictionary: self.dictionary.clone(),
            dictionary_dirs: self.dictionary_dirs.clone(),
            python_prefixes: self.python_prefixes.clone(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct ConverterSettings {
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl ConverterSettings {
    pub fn paddle2onnx(&self) -> Paddle2OnnxConfig {
        Paddle2OnnxConfig {
            program: self.program.clone(),
            launcher_args: self.args.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct OutputSettings {
    pub dir: PathBuf,
}

#[derive(Debug, Clone)]
pub struct VerifySettings {
    pub expected_inputs: Vec<String>,
    pub strict: bool,
}

#[derive(Debug, Clone, Default)]
pub struct PipelineSettings {
    pub parallel: bool,
}

#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    InvalidValue {
        path: Option<PathBuf>,
        field: &'static str,
        value: String,
    },
    NotFound {
        path: PathBuf,
    },
    MissingCacheDir,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io { path, source } => {
                write!(
                    f,
                    "failed to read config file {}: {}",
                    path.display(),
                    source
                )
            }
            ConfigError::Parse { path, source } => {
                write!(
                    f,
                    "failed to parse config file {}: {}",
                    path.display(),
                    source
                )
            }
            ConfigError::InvalidValue { path, field, value } => {
                if let Some(path) = path {
                    write!(
                        f,
                        "invalid value '{}' for '{}' in {}",
                        value,
                        field,
                        path.display()
                    )
                } else {
                    write!(f, "invalid value '{}' for '{}'", value, field)
                }
            }
            ConfigError::NotFound { path } => {
                write!(f, "config file {} does not exist", path.display())
            }
            ConfigError::MissingCacheDir => {
                write!(
                    f,
                    "unable to determine the home directory; set [model] cache_dir or --cache-dir"
                )
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            ConfigError::Parse { source, .. } => Some(source),
            ConfigError::InvalidValue { .. } => None,
            ConfigError::NotFound { .. } => None,
            ConfigError::MissingCacheDir => None,
        }
    }
}

pub fn resolve_settings(
    cli: &CliArgs,
    sources: &CliSources,
) -> Result<ResolvedSettings, ConfigError> {
    let (file, config_path) = load_config(cli.config.as_deref())?;
    merge(cli, sources, file, config_path)
}

fn load_config(path_override: Option<&Path>) -> Result<(FileConfig, Option<PathBuf>), ConfigError> {
    let candidates: Vec<PathBuf> = [project_config_path(), default_config_path()]
        .into_iter()
        .flatten()
        .collect();
    load_config_from(path_override, &candidates)
}

/// An explicit path must exist; otherwise the first existing candidate wins.
fn load_config_from(
    path_override: Option<&Path>,
    candidates: &[PathBuf],
) -> Result<(FileConfig, Option<PathBuf>), ConfigError> {
    if let Some(path) = path_override {
        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.to_path_buf(),
            });
        }
        let config = load_file_config(path)?;
        return Ok((config, Some(path.to_path_buf())));
    }

    for candidate in candidates {
        if candidate.exists() {
            let config = load_file_config(candidate)?;
            return Ok((config, Some(candidate.clone())));
        }
    }
    Ok((FileConfig::default(), None))
}

fn merge(
    cli: &CliArgs,
    sources: &CliSources,
    file: FileConfig,
    config_path: Option<PathBuf>,
) -> Result<ResolvedSettings, ConfigError> {
    let FileConfig {
        model: file_model,
        converter: file_converter,
        output: file_output,
        verify: file_verify,
        pipeline: file_pipeline,
    } = file;

    let model_cfg = file_model.unwrap_or_default();
    let converter_cfg = file_converter.unwrap_or_default();
    let output_cfg = file_output.unwrap_or_default();
    let verify_cfg = file_verify.unwrap_or_default();
    let pipeline_cfg = file_pipeline.unwrap_or_default();

    let language = resolve_language(
        &cli.lang,
        model_cfg.lang,
        !sources.lang_from_cli,
        config_path.as_ref(),
    )?;

    let cache_dir = match cli.cache_dir.clone().or(model_cfg.cache_dir) {
        Some(dir) => dir,
        None => PaddleCacheProvider::default_cache_dir().ok_or(ConfigError::MissingCacheDir)?,
    };

    let model = ModelSettings {
        language,
        cache_dir,
        dictionary: cli.dictionary.clone().or(model_cfg.dictionary),
        dictionary_dirs: model_cfg.dictionary_dirs.unwrap_or_default(),
        python_prefixes: model_cfg
            .python_prefixes
            .unwrap_or_else(PaddleCacheProvider::default_python_prefixes),
        use_gpu: model_cfg.use_gpu.unwrap_or(false),
    };

    let program = resolve_program(
        cli.converter.clone(),
        converter_cfg.program,
        config_path.as_ref(),
    )?;
    let converter = ConverterSettings {
        program,
        args: converter_cfg.args.unwrap_or_default(),
    };

    let output = OutputSettings {
        dir: cli
            .output_dir
            .clone()
            .or(output_cfg.dir)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
    };

    let verify = VerifySettings {
        expected_inputs: resolve_expected_inputs(
            verify_cfg.expected_inputs,
            config_path.as_ref(),
        )?,
        strict: cli.strict || verify_cfg.strict.unwrap_or(false),
    };

    let pipeline = PipelineSettings {
        parallel: cli.parallel || pipeline_cfg.parallel.unwrap_or(false),
    };

    Ok(ResolvedSettings {
        settings: EffectiveSettings {
            model,
            converter,
            output,
            verify,
            pipeline,
        },
        config_path,
    })
}

pub(crate) fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("rs", "ocr-export", "ocr-export")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

pub(crate) fn load_file_config(path: &Path) -> Result<FileConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(config)
}

fn project_config_path() -> Option<PathBuf> {
    env::current_dir().ok().map(|dir| dir.join("config.toml"))
}

fn normalize_string(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

fn resolve_language(
    cli_value: &str,
    file_value: Option<String>,
    use_file: bool,
    config_path: Option<&PathBuf>,
) -> Result<String, ConfigError> {
    if use_file && let Some(value) = file_value {
        return match normalize_string(Some(value.clone())) {
            Some(lang) => Ok(lang.to_ascii_lowercase()),
            None => Err(ConfigError::InvalidValue {
                path: config_path.cloned(),
                field: "model.lang",
                value,
            }),
        };
    }
    if cli_value.is_empty() {
        return Ok(DEFAULT_LANGUAGE.to_string());
    }
    Ok(cli_value.to_string())
}

fn resolve_program(
    cli_value: Option<PathBuf>,
    file_value: Option<String>,
    config_path: Option<&PathBuf>,
) -> Result<PathBuf, ConfigError> {
    if let Some(program) = cli_value {
        if program.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                path: None,
                field: "converter",
                value: String::new(),
            });
        }
        return Ok(program);
    }
    match file_value {
        Some(value) => match normalize_string(Some(value.clone())) {
            Some(program) => Ok(PathBuf::from(program)),
            None => Err(ConfigError::InvalidValue {
                path: config_path.cloned(),
                field: "converter.program",
                value,
            }),
        },
        None => Ok(Paddle2OnnxConfig::default().program),
    }
}

fn resolve_expected_inputs(
    file_value: Option<Vec<String>>,
    config_path: Option<&PathBuf>,
) -> Result<Vec<String>, ConfigError> {
    let Some(names) = file_value else {
        return Ok(vec![DEFAULT_EXPECTED_INPUT.to_string()]);
    };
    let mut normalized = Vec::with_capacity(names.len());
    for name in names {
        match normalize_string(Some(name.clone())) {
            Some(name) => normalized.push(name),
            None => {
                return Err(ConfigError::InvalidValue {
                    path: config_path.cloned(),
                    field: "verify.expected_inputs",
                    value: name,
                });
            }
        }
    }
    Ok(normalized)
}
