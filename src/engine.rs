use crate::preprocess::ImageTensor;
use crate::types::Prediction;
use anyhow::Result;

/// A loaded classifier that can score one preprocessed image.
pub trait Engine {
    fn classify(&self, input: ImageTensor) -> Result<Prediction>;
}
