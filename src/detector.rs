//! The top-level check: load, classify, decide, and collapse every failure
//! into a `false` verdict.
//!
//! The policy is fail-open. Any error while loading the model or reading the
//! image is written to the error log and the image is reported as safe.

use anyhow::{Context, Error, Result};
use chrono::Utc;
use std::fs;
use std::path::Path;

use crate::engine::Engine;
use crate::onnx_engine::OnnxEngine;
use crate::preprocess;
use crate::types::Prediction;

/// Overwritten with the failure detail of the last failed check.
pub const ERROR_LOG_PATH: &str = "error.log";

/// Result of one check. The boolean verdict is derived from it.
#[derive(Debug)]
pub enum CheckOutcome {
    Classified(Prediction),
    Failed(Error),
}

impl CheckOutcome {
    /// Failed checks count as safe.
    pub fn is_nsfw(&self) -> bool {
        match self {
            CheckOutcome::Classified(prediction) => prediction.is_nsfw(),
            CheckOutcome::Failed(_) => false,
        }
    }

    pub fn prediction(&self) -> Option<&Prediction> {
        match self {
            CheckOutcome::Classified(prediction) => Some(prediction),
            CheckOutcome::Failed(_) => None,
        }
    }

    pub fn error(&self) -> Option<&Error> {
        match self {
            CheckOutcome::Classified(_) => None,
            CheckOutcome::Failed(err) => Some(err),
        }
    }

    /// The two stdout lines callers grep for `NSFW Check Result: True`.
    ///
    /// Never includes the image path, which is caller-controlled; the full
    /// error chain goes to the error log instead.
    pub fn report(&self) -> String {
        let first = match self {
            CheckOutcome::Classified(prediction) => format!("NSFW Predictions: {prediction}"),
            CheckOutcome::Failed(err) => format!("NSFW Check Failed: {}", failure_summary(err)),
        };
        format!("{first}\nNSFW Check Result: {}", verdict_label(self.is_nsfw()))
    }
}

/// Root cause of `err` on a single line. Context layers are dropped since
/// they name the image.
fn failure_summary(err: &Error) -> String {
    err.root_cause()
        .to_string()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn verdict_label(is_nsfw: bool) -> &'static str {
    if is_nsfw { "True" } else { "False" }
}

/// Preprocess the image at `image_path` and run it through `engine`.
pub fn classify_image<E: Engine>(engine: &E, image_path: &Path) -> Result<Prediction> {
    let input = preprocess::load_image(image_path)?;
    engine.classify(input)
}

/// Load a model with `load_model`, classify the image, and capture any
/// failure in the outcome instead of returning it.
pub fn check_image<E, L>(load_model: L, image_path: &Path) -> CheckOutcome
where
    E: Engine,
    L: FnOnce() -> Result<E>,
{
    let result = load_model().and_then(|engine| classify_image(&engine, image_path));

    match result {
        Ok(prediction) => {
            match prediction.flagged_class() {
                Some(class) => tracing::warn!(
                    %class,
                    probability = prediction.probability(class),
                    "Image flagged as NSFW"
                ),
                None => tracing::info!("Image is safe"),
            }
            CheckOutcome::Classified(prediction)
        }
        Err(err) => {
            tracing::error!(error = %failure_summary(&err), "NSFW check failed");
            CheckOutcome::Failed(err)
        }
    }
}

/// Replace the contents of `log_path` with the details of `err`.
pub fn write_error_log(log_path: &Path, image_path: &Path, err: &Error) -> Result<()> {
    let contents = format!(
        "[{}] NSFW check failed for {}\n{err:?}\n",
        Utc::now().to_rfc3339(),
        image_path.display()
    );
    fs::write(log_path, contents)
        .with_context(|| format!("Failed to write error log {}", log_path.display()))
}

/// The full check as run by the CLI and the server: a fresh model load from
/// `model_path`, classification, and on failure an overwritten error log.
pub fn run_check(model_path: &Path, image_path: &Path, error_log: &Path) -> CheckOutcome {
    let outcome = check_image(|| OnnxEngine::load(model_path), image_path);

    if let CheckOutcome::Failed(err) = &outcome {
        if let Err(log_err) = write_error_log(error_log, image_path, err) {
            tracing::error!(error = %format!("{log_err:#}"), "Could not record failure");
        }
    }

    outcome
}
