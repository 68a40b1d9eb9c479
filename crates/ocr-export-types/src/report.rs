use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationOutcome {
    Valid {
        inputs: Vec<String>,
        outputs: Vec<String>,
    },
    Invalid {
        reason: String,
    },
}

/// Result of re-checking one exported graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationReport {
    path: PathBuf,
    outcome: VerificationOutcome,
}

impl VerificationReport {
    /// A valid report needs at least one declared input and one declared
    /// output; anything else is downgraded to `Invalid`.
    pub fn valid(path: PathBuf, inputs: Vec<String>, outputs: Vec<String>) -> Self {
        let outcome = if inputs.is_empty() {
            VerificationOutcome::Invalid {
                reason: "graph declares no inputs".to_string(),
            }
        } else if outputs.is_empty() {
            VerificationOutcome::Invalid {
                reason: "graph declares no outputs".to_string(),
            }
        } else {
            VerificationOutcome::Valid { inputs, outputs }
        };
        Self { path, outcome }
    }

    pub fn invalid(path: PathBuf, reason: impl Into<String>) -> Self {
        Self {
            path,
            outcome: VerificationOutcome::Invalid {
                reason: reason.into(),
            },
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn outcome(&self) -> &VerificationOutcome {
        &self.outcome
    }

    pub fn is_valid(&self) -> bool {
        matches!(self.outcome, VerificationOutcome::Valid { .. })
    }

    pub fn inputs(&self) -> &[String] {
        match &self.outcome {
            VerificationOutcome::Valid { inputs, .. } => inputs,
            VerificationOutcome::Invalid { .. } => &[],
        }
    }

    pub fn outputs(&self) -> &[String] {
        match &self.outcome {
            VerificationOutcome::Valid { outputs, .. } => outputs,
            VerificationOutcome::Invalid { .. } => &[],
        }
    }

    pub fn failure(&self) -> Option<&str> {
        match &self.outcome {
            VerificationOutcome::Valid { .. } => None,
            VerificationOutcome::Invalid { reason } => Some(reason),
        }
    }
}
