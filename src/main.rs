use clap::Parser;

use nsfw_check::config::CheckConfig;
use nsfw_check::{detector, logging};

// Exits 0 whatever the verdict; callers read the report on stdout.
fn main() {
    logging::init(false);

    let config = CheckConfig::parse();
    tracing::debug!(model_path = %config.model_path.display(), "Starting NSFW check");

    let outcome = detector::run_check(&config.model_path, &config.image_path, &config.error_log);
    println!("{}", outcome.report());
}
