pub mod config;
pub mod detector;
pub mod engine;
pub mod logging;
pub mod onnx_engine;
pub mod preprocess;
pub mod server;
pub mod types;

pub use detector::{CheckOutcome, check_image, classify_image, run_check};
pub use engine::Engine;
pub use onnx_engine::{OnnxEngine, load_model};
pub use types::{NsfwClass, Prediction};
