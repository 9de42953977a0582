use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "warn,nsfw_check=info";

/// Install the global subscriber. Logs go to stderr so stdout only carries
/// the check report.
pub fn init(json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}
