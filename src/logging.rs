use std::io;
use tracing::Level;
use tracing_appender::rolling;
use tracing_subscriber::filter::FilterFn;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

const DEFAULT_CONSOLE_FILTER: &str = "info,web_request=warn,bot=info";
const DEFAULT_FILE_FILTER: &str = "info,web_request=debug,bot=debug";

pub fn configure_logging() {
    // The HTML parser complains about markup it re-serializes; that noise is useless here
    let custom_filter = FilterFn::new(|metadata| {
        !(metadata.level() == &Level::WARN && metadata.target().starts_with("html5ever"))
    });

    // Console goes to stderr so the run report on stdout stays readable
    let console_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_CONSOLE_FILTER));
    let console_log = fmt::layer()
        .with_writer(io::stderr)
        .with_filter(console_filter)
        .with_filter(custom_filter);

    let file_appender = rolling::daily("logs", "tgscout.log");
    let file_log = fmt::layer()
        .with_ansi(false)
        .with_writer(file_appender)
        .with_filter(EnvFilter::new(DEFAULT_FILE_FILTER));

    // A second init (e.g. from a test harness) is not an error worth dying over
    let _ = tracing_subscriber::Registry::default()
        .with(console_log)
        .with(file_log)
        .try_init();
}
