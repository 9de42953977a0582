use anyhow::{Context, Result, bail};
use std::path::Path;
use tract_onnx::prelude::*;

use crate::engine::Engine;
use crate::preprocess::{IMAGE_SIZE, ImageTensor};
use crate::types::{NUM_CLASSES, Prediction};

/// Where the pretrained MobileNetV2 classifier lives, relative to the
/// working directory.
pub const DEFAULT_MODEL_PATH: &str = "./models/nsfw_mobilenet2.224x224.onnx";

pub type Model = TypedRunnableModel<TypedModel>;

/// The Keras MobileNetV2 NSFW model exported to ONNX. Its last layer is a
/// softmax, so outputs are used as probabilities directly.
pub struct OnnxEngine {
    plan: Model,
}

/// Load the classifier from [`DEFAULT_MODEL_PATH`].
pub fn load_model() -> Result<OnnxEngine> {
    OnnxEngine::load(DEFAULT_MODEL_PATH)
}

impl OnnxEngine {
    #[tracing::instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            let keras = path.with_extension("h5");
            if keras.is_file() {
                bail!(
                    "Model file {} does not exist, but the Keras artifact {} does. \
                     Convert it to ONNX (e.g. with tf2onnx) and save it as {}.",
                    path.display(),
                    keras.display(),
                    path.display()
                );
            }
            bail!("Model file {} does not exist.", path.display());
        }

        tracing::info!("Loading NSFW model");
        let plan = tract_onnx::onnx()
            .model_for_path(path)
            .and_then(|model| {
                model.with_input_fact(0, f32::fact([1, IMAGE_SIZE, IMAGE_SIZE, 3]).into())
            })
            .and_then(|model| model.into_optimized())
            .and_then(|model| model.into_runnable())
            .with_context(|| format!("Failed to load model {}", path.display()))?;
        tracing::info!("NSFW model loaded");

        Ok(Self { plan })
    }
}

impl Engine for OnnxEngine {
    #[tracing::instrument(skip_all)]
    fn classify(&self, input: ImageTensor) -> Result<Prediction> {
        let outputs = self
            .plan
            .run(tvec!(Tensor::from(input).into()))
            .context("Inference failed")?;

        let output = outputs
            .first()
            .context("Model produced no output")?
            .to_array_view::<f32>()
            .context("Model output is not f32")?;

        if output.shape() != [1, NUM_CLASSES] {
            bail!(
                "Expected model output of shape [1, {NUM_CLASSES}], got {:?}",
                output.shape()
            );
        }

        let probs: Vec<f32> = output.iter().copied().collect();
        let prediction = Prediction::from_slice(&probs)?;
        tracing::debug!(probs = ?prediction.probs(), "Inference complete");

        Ok(prediction)
    }
}
