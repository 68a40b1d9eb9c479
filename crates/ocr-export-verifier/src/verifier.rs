use std::path::Path;

use ocr_export_types::VerificationReport;
use tracing::{debug, warn};

use crate::{VerifyError, check_model, load_model};

/// Reloads exported graphs and reports their declared interface.
///
/// Verification never fails the caller: every problem ends up in the
/// returned [`VerificationReport`].
#[derive(Debug, Clone, Default)]
pub struct Verifier {
    expected_inputs: Vec<String>,
}

impl Verifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Require each of `names` among the declared graph inputs.
    pub fn with_expected_inputs<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            expected_inputs: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn verify(&self, path: &Path) -> VerificationReport {
        match self.try_verify(path) {
            Ok((inputs, outputs)) => {
                debug!(path = %path.display(), ?inputs, ?outputs, "graph verified");
                VerificationReport::valid(path.to_path_buf(), inputs, outputs)
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "graph verification failed");
                VerificationReport::invalid(path.to_path_buf(), err.to_string())
            }
        }
    }

    fn try_verify(&self, path: &Path) -> Result<(Vec<String>, Vec<String>), VerifyError> {
        let model = load_model(path)?;
        check_model(&model)?;

        let (inputs, outputs) = match &model.graph {
            Some(graph) => (
                graph.input.iter().map(|v| v.name.clone()).collect::<Vec<_>>(),
                graph.output.iter().map(|v| v.name.clone()).collect::<Vec<_>>(),
            ),
            None => (Vec::new(), Vec::new()),
        };

        if !inputs.is_empty() {
            for expected in &self.expected_inputs {
                if !inputs.contains(expected) {
                    return Err(VerifyError::MissingExpectedInput {
                        expected: expected.clone(),
                        declared: inputs.join(", "),
                    });
                }
            }
        }

        Ok((inputs, outputs))
    }
}
