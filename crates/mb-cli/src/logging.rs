use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber.
///
/// Events go to stderr so stdout carries only the timing report. The level
/// defaults to `warn` and can be raised with `RUST_LOG`, e.g.
/// `RUST_LOG=mb_harness=debug` to trace every worker launch and join.
pub fn init() {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy();
    // A subscriber may already be installed (e.g. by a test harness).
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
