//! Consumption predictor backed by an external scoring process.
//!
//! Contract: the process reads `{"inputs": [[f64, ...], ...]}` on stdin and
//! writes `{"predictions": [f64, ...]}` on stdout, one prediction per input
//! row, exiting with status 0.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, warn};

use super::{ConsumptionPredictor, FeatureName, FeatureRow, ForecastError, DEFAULT_FEATURES};
use crate::domain::round_half_up;

#[derive(Debug, Serialize)]
struct ScoringRequest {
    inputs: Vec<Vec<f64>>,
}

#[derive(Debug, Deserialize)]
struct ScoringResponse {
    predictions: Vec<f64>,
}

#[derive(Debug, Clone)]
pub struct ExternalProcessPredictor {
    program: String,
    args: Vec<String>,
    features: Vec<FeatureName>,
    working_dir: Option<PathBuf>,
}

impl ExternalProcessPredictor {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            features: DEFAULT_FEATURES.to_vec(),
            working_dir: None,
        }
    }

    pub fn with_features(mut self, features: Vec<FeatureName>) -> Self {
        self.features = features;
        self
    }

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    fn failure(message: impl Into<String>) -> ForecastError {
        ForecastError::ExternalPredictor(message.into())
    }
}

#[async_trait]
impl ConsumptionPredictor for ExternalProcessPredictor {
    fn name(&self) -> &'static str {
        "external"
    }

    async fn predict(&self, rows: &[FeatureRow]) -> Result<Vec<f64>, ForecastError> {
        let payload = serde_json::to_vec(&ScoringRequest {
            inputs: rows.iter().map(|r| r.to_vector(&self.features)).collect(),
        })
        .map_err(|e| Self::failure(format!("encoding feature vectors failed: {e}")))?;

        debug!(program = %self.program, rows = rows.len(), "invoking external predictor");

        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &self.working_dir {
            command.current_dir(dir);
        }

        let mut child = command
            .spawn()
            .map_err(|e| Self::failure(format!("failed to start {}: {e}", self.program)))?;

        if let Some(mut stdin) = child.stdin.take() {
            match stdin.write_all(&payload).await {
                Ok(()) => {}
                // the child exited without reading; its status and stderr tell why
                Err(e) if e.kind() == ErrorKind::BrokenPipe => {
                    debug!(program = %self.program, "predictor closed stdin early");
                }
                Err(e) => {
                    return Err(Self::failure(format!("writing to predictor stdin failed: {e}")));
                }
            }
            // dropping stdin closes the pipe so the child sees EOF
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| Self::failure(format!("waiting for predictor failed: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let message = if stderr.is_empty() {
                match output.status.code() {
                    Some(code) => format!("exit code {code}"),
                    None => "terminated by signal".to_string(),
                }
            } else {
                stderr
            };
            warn!(program = %self.program, %message, "external predictor failed");
            return Err(Self::failure(message));
        }

        let response: ScoringResponse = serde_json::from_slice(&output.stdout)
            .map_err(|e| Self::failure(format!("malformed predictor output: {e}")))?;

        if response.predictions.len() != rows.len() {
            return Err(Self::failure(format!(
                "expected {} predictions, got {}",
                rows.len(),
                response.predictions.len()
            )));
        }
        if response.predictions.iter().any(|p| !p.is_finite()) {
            return Err(Self::failure("predictor returned a non-finite value"));
        }

        Ok(response.predictions.into_iter().map(round_half_up).collect())
    }
}
