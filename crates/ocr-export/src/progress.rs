//! Operator-facing text for pipeline events and the final summary.

use ocr_export_types::{VerificationOutcome, VerificationReport};

use crate::pipeline::{ExportEvent, ExportSummary};

const RULE: &str = "============================================================";

pub fn render_event(event: &ExportEvent) -> Option<String> {
    match event {
        ExportEvent::Started { output_dir } => Some(format!(
            "Exporting PaddleOCR models to ONNX in {}",
            output_dir.display()
        )),
        ExportEvent::ModelLocated { role, model_dir } => Some(format!(
            "{} model path: {}",
            role.label(),
            model_dir.display()
        )),
        ExportEvent::ConversionStarted { .. } => None,
        ExportEvent::ArtifactWritten { role, path, .. } => Some(format!(
            "✓ {} model exported to: {}",
            role.label(),
            path.display()
        )),
        ExportEvent::SymbolsWritten { path, count } => Some(format!(
            "✓ Character dictionary exported to: {}\n  Total characters: {count}",
            path.display()
        )),
        ExportEvent::StageFailed {
            role: Some(role),
            message,
        } => Some(format!("✗ {} model export failed: {message}", role.label())),
        ExportEvent::StageFailed {
            role: None,
            message,
        } => Some(format!("✗ Character dictionary export failed: {message}")),
        ExportEvent::VerificationStarted => Some("\nVerifying exported models...".to_string()),
        ExportEvent::Verified { role, report } => Some(render_report(role.label(), report)),
        ExportEvent::VerificationSkipped { role } => Some(format!(
            "- {} model was not exported, skipping verification",
            role.label()
        )),
        ExportEvent::Completed => None,
    }
}

fn render_report(label: &str, report: &VerificationReport) -> String {
    match report.outcome() {
        VerificationOutcome::Valid { inputs, outputs } => format!(
            "✓ {label} model is valid\n  Inputs: {}\n  Outputs: {}",
            name_list(inputs),
            name_list(outputs)
        ),
        VerificationOutcome::Invalid { reason } => {
            format!("✗ {label} model validation failed: {reason}")
        }
    }
}

fn name_list(names: &[String]) -> String {
    let quoted: Vec<String> = names.iter().map(|name| format!("'{name}'")).collect();
    format!("[{}]", quoted.join(", "))
}

pub fn render_summary(summary: &ExportSummary) -> String {
    let mut lines = vec![
        String::new(),
        RULE.to_string(),
        "Export complete!".to_string(),
        RULE.to_string(),
        format!("Output directory: {}", summary.output_dir.display()),
    ];
    for path in summary.written_files() {
        lines.push(format!("  {}", path.display()));
    }
    if let Some((_, count)) = &summary.symbols {
        lines.push(format!("Total characters: {count}"));
    }
    lines.push(String::new());
    lines.push("Next steps:".to_string());
    lines.push("  1. Upload these files to your model host:".to_string());
    for path in summary.written_files() {
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        lines.push(format!("     - {name}"));
    }
    lines.push("  2. Point the OCR runtime at the uploaded graphs and dictionary".to_string());
    lines.join("\n")
}
