use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use ocr_export_converter::{ConversionError, GraphConverter};
use ocr_export_provider::{
    ExtractionError, ModelLocator, ModelProvider, ResolutionError, SymbolExtractor,
    write_symbol_table,
};
use ocr_export_types::{
    ConversionConfig, ModelIdentity, ModelRole, VerificationReport, write_artifact,
};
use ocr_export_verifier::Verifier;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::settings::{ConfigError, EffectiveSettings};

/// Progress events emitted while the export runs.
#[derive(Debug, Clone)]
pub enum ExportEvent {
    Started {
        output_dir: PathBuf,
    },
    ModelLocated {
        role: ModelRole,
        model_dir: PathBuf,
    },
    ConversionStarted {
        role: ModelRole,
    },
    ArtifactWritten {
        role: ModelRole,
        path: PathBuf,
        bytes: usize,
    },
    SymbolsWritten {
        path: PathBuf,
        count: usize,
    },
    StageFailed {
        role: Option<ModelRole>,
        message: String,
    },
    VerificationStarted,
    Verified {
        role: ModelRole,
        report: VerificationReport,
    },
    VerificationSkipped {
        role: ModelRole,
    },
    Completed,
}

pub type EventHandler = Arc<dyn Fn(ExportEvent) + Send + Sync>;

/// A failure that ended one unit of work.
#[derive(Debug, Error)]
pub enum StageError {
    #[error(transparent)]
    Resolution(#[from] ResolutionError),
    #[error(transparent)]
    Conversion(#[from] ConversionError),
    #[error("failed to write {role} artifact {}: {source}", path.display())]
    Write {
        role: ModelRole,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Extraction(#[from] ExtractionError),
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Converter(#[from] ConversionError),
    #[error("failed to create output directory {}: {source}", path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{} export stage(s) failed", failures.len())]
    Stages {
        failures: Vec<StageError>,
        summary: ExportSummary,
    },
    #[error("{} exported graph(s) failed verification", summary.invalid_reports().count())]
    Verification { summary: ExportSummary },
}

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub identity: ModelIdentity,
    pub conversion: ConversionConfig,
    pub output_dir: PathBuf,
    pub expected_inputs: Vec<String>,
    pub parallel: bool,
    pub strict: bool,
}

impl PipelineConfig {
    pub fn new(identity: ModelIdentity, output_dir: PathBuf) -> Self {
        Self {
            identity,
            conversion: ConversionConfig::default(),
            output_dir,
            expected_inputs: Vec::new(),
            parallel: false,
            strict: false,
        }
    }

    pub fn from_settings(settings: &EffectiveSettings) -> Self {
        Self {
            identity: ModelIdentity::new(settings.model.language.clone())
                .with_accelerator(settings.model.use_gpu),
            conversion: ConversionConfig::default(),
            output_dir: settings.output.dir.clone(),
            expected_inputs: settings.verify.expected_inputs.clone(),
            parallel: settings.pipeline.parallel,
            strict: settings.verify.strict,
        }
    }
}

/// What a run produced, including partial results of a failed run.
#[derive(Debug, Clone, Default)]
pub struct ExportSummary {
    pub output_dir: PathBuf,
    pub artifacts: Vec<(ModelRole, PathBuf)>,
    pub symbols: Option<(PathBuf, usize)>,
    pub reports: Vec<(ModelRole, VerificationReport)>,
}

impl ExportSummary {
    pub fn artifact(&self, role: ModelRole) -> Option<&Path> {
        self.artifacts
            .iter()
            .find(|(r, _)| *r == role)
            .map(|(_, path)| path.as_path())
    }

    pub fn report(&self, role: ModelRole) -> Option<&VerificationReport> {
        self.reports
            .iter()
            .find(|(r, _)| *r == role)
            .map(|(_, report)| report)
    }

    pub fn invalid_reports(&self) -> impl Iterator<Item = &VerificationReport> {
        self.reports
            .iter()
            .map(|(_, report)| report)
            .filter(|report| !report.is_valid())
    }

    /// Every file written by the run, graphs first.
    pub fn written_files(&self) -> Vec<&Path> {
        let mut files: Vec<&Path> = self.artifacts.iter().map(|(_, p)| p.as_path()).collect();
        if let Some((path, _)) = &self.symbols {
            files.push(path);
        }
        files
    }
}

pub struct ExportPipeline<'a, P: ?Sized, C> {
    provider: &'a P,
    converter: &'a C,
    config: PipelineConfig,
    on_event: Option<EventHandler>,
}

impl<'a, P, C> ExportPipeline<'a, P, C>
where
    P: ModelProvider + ?Sized,
    C: GraphConverter,
{
    pub fn new(provider: &'a P, converter: &'a C, config: PipelineConfig) -> Self {
        Self {
            provider,
            converter,
            config,
            on_event: None,
        }
    }

    pub fn with_event_handler(mut self, handler: EventHandler) -> Self {
        self.on_event = Some(handler);
        self
    }

    /// Export both graphs and the symbol table, then verify what was written.
    ///
    /// A failing role does not stop the other role or the symbol extraction.
    /// Stage failures are returned together once every unit has run.
    pub async fn run(&self) -> Result<ExportSummary, ExportError> {
        let output_dir = &self.config.output_dir;
        std::fs::create_dir_all(output_dir).map_err(|source| ExportError::OutputDir {
            path: output_dir.clone(),
            source,
        })?;

        info!(
            identity = %self.config.identity,
            provider = self.provider.name(),
            converter = self.converter.name(),
            output_dir = %output_dir.display(),
            "starting export"
        );
        self.emit(ExportEvent::Started {
            output_dir: output_dir.clone(),
        });

        let (detection, recognition) = if self.config.parallel {
            tokio::join!(
                self.export_role(ModelRole::Detection),
                self.export_role(ModelRole::Recognition)
            )
        } else {
            let detection = self.export_role(ModelRole::Detection).await;
            let recognition = self.export_role(ModelRole::Recognition).await;
            (detection, recognition)
        };

        let mut summary = ExportSummary {
            output_dir: output_dir.clone(),
            ..ExportSummary::default()
        };
        let mut failures = Vec::new();
        for (role, result) in [
            (ModelRole::Detection, detection),
            (ModelRole::Recognition, recognition),
        ] {
            match result {
                Ok(path) => summary.artifacts.push((role, path)),
                Err(err) => failures.push(err),
            }
        }

        match self.export_symbols() {
            Ok(written) => summary.symbols = Some(written),
            Err(err) => {
                self.emit(ExportEvent::StageFailed {
                    role: None,
                    message: err.to_string(),
                });
                failures.push(err);
            }
        }

        self.emit(ExportEvent::VerificationStarted);
        let verifier = Verifier::with_expected_inputs(self.config.expected_inputs.iter().cloned());
        for role in ModelRole::ALL {
            let Some(path) = summary.artifact(role) else {
                self.emit(ExportEvent::VerificationSkipped { role });
                continue;
            };
            let report = verifier.verify(path);
            self.emit(ExportEvent::Verified {
                role,
                report: report.clone(),
            });
            summary.reports.push((role, report));
        }

        self.emit(ExportEvent::Completed);

        if !failures.is_empty() {
            warn!(failures = failures.len(), "export finished with failures");
            return Err(ExportError::Stages { failures, summary });
        }
        if self.config.strict && summary.invalid_reports().next().is_some() {
            return Err(ExportError::Verification { summary });
        }
        Ok(summary)
    }

    async fn export_role(&self, role: ModelRole) -> Result<PathBuf, StageError> {
        let result = self.try_export_role(role).await;
        if let Err(err) = &result {
            warn!(%role, error = %err, "export unit failed");
            self.emit(ExportEvent::StageFailed {
                role: Some(role),
                message: err.to_string(),
            });
        }
        result
    }

    async fn try_export_role(&self, role: ModelRole) -> Result<PathBuf, StageError> {
        let handle = ModelLocator::new(self.provider).resolve(&self.config.identity, role)?;
        self.emit(ExportEvent::ModelLocated {
            role,
            model_dir: handle.model_dir().to_path_buf(),
        });

        self.emit(ExportEvent::ConversionStarted { role });
        let bytes = self
            .converter
            .convert(&handle, &self.config.conversion)
            .await?;

        let path = self.config.output_dir.join(handle.artifact_file_name());
        write_artifact(&path, &bytes).map_err(|source| StageError::Write {
            role,
            path: path.clone(),
            source,
        })?;
        debug!(%role, path = %path.display(), bytes = bytes.len(), "artifact written");
        self.emit(ExportEvent::ArtifactWritten {
            role,
            path: path.clone(),
            bytes: bytes.len(),
        });
        Ok(path)
    }

    fn export_symbols(&self) -> Result<(PathBuf, usize), StageError> {
        let table = SymbolExtractor::new(self.provider).extract(&self.config.identity)?;
        let path = write_symbol_table(&table, &self.config.output_dir)?;
        self.emit(ExportEvent::SymbolsWritten {
            path: path.clone(),
            count: table.len(),
        });
        Ok((path, table.len()))
    }

    fn emit(&self, event: ExportEvent) {
        if let Some(handler) = &self.on_event {
            handler(event);
        }
    }
}
