use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use ocr_export::cli::parse_cli;
use ocr_export::pipeline::{ExportError, ExportEvent, ExportPipeline, PipelineConfig};
use ocr_export::progress::{render_event, render_summary};
use ocr_export::settings::resolve_settings;
use ocr_export_converter::Paddle2OnnxConverter;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    init_tracing();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report_error(&err);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .compact()
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::WARN.into())
                .from_env_lossy(),
        )
        .init();
}

async fn run() -> Result<(), ExportError> {
    let (cli, sources) = parse_cli();
    let resolved = resolve_settings(&cli, &sources)?;
    if let Some(path) = &resolved.config_path {
        debug!(path = %path.display(), "loaded config file");
    }
    let settings = resolved.settings;

    let provider = settings.model.provider();
    let converter = Paddle2OnnxConverter::with_config(settings.converter.paddle2onnx())?;
    let config = PipelineConfig::from_settings(&settings);

    let progress = indicatif::ProgressBar::new_spinner();
    progress.set_style(conversion_spinner_style());
    let progress_for_events = progress.clone();
    let handler = Arc::new(move |event: ExportEvent| {
        match &event {
            ExportEvent::ConversionStarted { role } => {
                progress_for_events.set_message(format!("converting {} model", role.label()));
                progress_for_events.enable_steady_tick(Duration::from_millis(120));
            }
            ExportEvent::VerificationStarted => {
                progress_for_events.disable_steady_tick();
                progress_for_events.finish_and_clear();
            }
            _ => {}
        }
        if let Some(line) = render_event(&event) {
            progress_for_events.suspend(|| println!("{line}"));
        }
    });

    let pipeline = ExportPipeline::new(&provider, &converter, config).with_event_handler(handler);
    let result = pipeline.run().await;
    progress.finish_and_clear();

    let summary = result?;
    println!("{}", render_summary(&summary));
    Ok(())
}

fn report_error(err: &ExportError) {
    match err {
        ExportError::Stages { failures, .. } => {
            eprintln!("export failed: {err}");
            for failure in failures {
                eprintln!("  - {failure}");
            }
        }
        ExportError::Verification { summary } => {
            eprintln!("export failed: {err}");
            for report in summary.invalid_reports() {
                eprintln!(
                    "  - {}: {}",
                    report.path().display(),
                    report.failure().unwrap_or("invalid")
                );
            }
        }
        other => eprintln!("export failed: {other}"),
    }
}

fn conversion_spinner_style() -> indicatif::ProgressStyle {
    indicatif::ProgressStyle::with_template("[{elapsed_precise}] {spinner} {msg}")
        .unwrap_or_else(|_| indicatif::ProgressStyle::default_spinner())
}
