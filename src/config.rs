use clap::Parser;
use std::path::PathBuf;

use crate::detector::ERROR_LOG_PATH;
use crate::onnx_engine::DEFAULT_MODEL_PATH;

/// Decide whether an image should be flagged as NSFW.
#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CheckConfig {
    /// Image to classify
    pub image_path: PathBuf,

    /// Pretrained classifier (ONNX)
    #[arg(long, default_value = DEFAULT_MODEL_PATH)]
    pub model_path: PathBuf,

    /// File overwritten with the error details when the check fails
    #[arg(long, default_value = ERROR_LOG_PATH)]
    pub error_log: PathBuf,
}

/// HTTP front end for NSFW checks.
#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct ServerConfig {
    /// Server host to bind to
    #[arg(long, env = "HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Server port to bind to
    #[arg(long, env = "PORT", default_value = "8000")]
    pub port: u16,

    /// Pretrained classifier (ONNX), reloaded for every check
    #[arg(long, env = "MODEL_PATH", default_value = DEFAULT_MODEL_PATH)]
    pub model_path: PathBuf,

    /// File overwritten with the error details when a check fails
    #[arg(long, env = "ERROR_LOG", default_value = ERROR_LOG_PATH)]
    pub error_log: PathBuf,

    /// Emit logs as JSON
    #[arg(long, env = "LOG_JSON")]
    pub log_json: bool,
}

impl ServerConfig {
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_defaults() {
        let config = CheckConfig::try_parse_from(["nsfw-check", "upload.jpg"]).unwrap();
        assert_eq!(config.image_path, PathBuf::from("upload.jpg"));
        assert_eq!(config.model_path, PathBuf::from(DEFAULT_MODEL_PATH));
        assert_eq!(config.error_log, PathBuf::from("error.log"));
    }

    #[test]
    fn check_requires_an_image() {
        assert!(CheckConfig::try_parse_from(["nsfw-check"]).is_err());
    }

    #[test]
    fn check_overrides() {
        let config = CheckConfig::try_parse_from([
            "nsfw-check",
            "--model-path",
            "/srv/model.onnx",
            "--error-log",
            "/tmp/nsfw.log",
            "upload.png",
        ])
        .unwrap();
        assert_eq!(config.model_path, PathBuf::from("/srv/model.onnx"));
        assert_eq!(config.error_log, PathBuf::from("/tmp/nsfw.log"));
        assert_eq!(config.image_path, PathBuf::from("upload.png"));
    }

    #[test]
    fn server_address() {
        let config =
            ServerConfig::try_parse_from(["nsfw-server", "--host", "0.0.0.0", "--port", "9100"])
                .unwrap();
        assert_eq!(config.server_address(), "0.0.0.0:9100");
        assert!(!config.log_json);
    }
}
