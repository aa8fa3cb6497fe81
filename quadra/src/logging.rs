// Logging for the quadra solver pool
//
// Built on the `tracing` ecosystem. Output goes to stderr so that reports
// written to stdout stay machine-readable.
//
// # Usage Examples
//
// ```rust
// use quadra::logging;
//
// // INFO level, human-readable output
// logging::init_default();
//
// // Or with custom settings
// let config = logging::LogConfig {
//     level: tracing::Level::DEBUG,
//     json_format: true,
//     ..Default::default()
// };
// logging::init(config);
// ```
//
// Every coordinator run opens a `run` span carrying its run id; worker
// lifecycle events are emitted with `log_worker!` inside it.

use std::io;
use std::sync::Once;

use tracing::{Level, Subscriber};
use tracing_subscriber::{filter::LevelFilter, fmt, prelude::*, EnvFilter};

/// Logging configuration.
///
/// # Examples
///
/// ```rust
/// use quadra::logging::LogConfig;
/// use tracing::Level;
///
/// let config = LogConfig {
///     level: Level::DEBUG,
///     target_filters: Some("quadra::pool::worker=trace".to_string()),
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Minimum log level to display
    pub level: Level,
    /// Whether to use JSON format for logs
    pub json_format: bool,
    /// Whether to include file and line information
    pub show_file_line: bool,
    /// Whether to include thread name/id
    pub show_thread_info: bool,
    /// Whether to include timestamps
    pub show_time: bool,
    /// Target filter expressions (format: "target=level,target2=level2,...")
    pub target_filters: Option<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            json_format: false,
            show_file_line: false,
            show_thread_info: true,
            show_time: true,
            target_filters: None,
        }
    }
}

static INIT: Once = Once::new();

/// Installs the global subscriber. Only the first call takes effect.
///
/// `RUST_LOG` directives are honoured in addition to `config.level`.
pub fn init(config: LogConfig) {
    INIT.call_once(|| {
        let mut env_filter = EnvFilter::from_default_env()
            .add_directive(LevelFilter::from_level(config.level).into());

        if let Some(filters) = &config.target_filters {
            for filter in filters.split(',') {
                if let Ok(directive) = filter.parse() {
                    env_filter = env_filter.add_directive(directive);
                }
            }
        }

        let registry = tracing_subscriber::registry().with(env_filter);

        let subscriber: Box<dyn Subscriber + Send + Sync> = if config.json_format {
            Box::new(
                registry.with(
                    fmt::layer()
                        .json()
                        .flatten_event(true)
                        .with_writer(io::stderr)
                        .with_thread_names(config.show_thread_info),
                ),
            )
        } else {
            let text = fmt::layer()
                .with_writer(io::stderr)
                .with_ansi(atty::is(atty::Stream::Stderr))
                .with_file(config.show_file_line)
                .with_line_number(config.show_file_line)
                .with_thread_names(config.show_thread_info)
                .with_thread_ids(config.show_thread_info);
            if config.show_time {
                Box::new(registry.with(text))
            } else {
                Box::new(registry.with(text.without_time()))
            }
        };

        set_global_subscriber(subscriber);
    });
}

fn set_global_subscriber<S>(subscriber: S)
where
    S: Subscriber + Send + Sync + 'static,
{
    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Error setting global tracing subscriber: {}", err);
    }
}

/// INFO level, human-readable output.
pub fn init_default() {
    init(LogConfig::default());
}

/// DEBUG level with file/line information and per-equation worker traces.
pub fn init_development() {
    init(LogConfig {
        level: Level::DEBUG,
        json_format: false,
        show_file_line: true,
        show_thread_info: true,
        show_time: true,
        target_filters: Some("quadra=debug,quadra::pool::worker=trace".to_string()),
    });
}

/// Initialize logging for testing
///
/// Only warnings and errors, no thread information and no timestamps to
/// keep test output compact.
///
/// ```rust
/// #[test]
/// fn my_test() {
///     quadra::logging::init_test();
///     // ...
/// }
/// ```
pub fn init_test() {
    init(LogConfig {
        level: Level::WARN,
        json_format: false,
        show_file_line: true,
        show_thread_info: false,
        show_time: false,
        target_filters: None,
    });
}

/// Create the span for one coordinator run
///
/// # Examples
///
/// ```rust
/// let run_id = uuid::Uuid::new_v4();
/// let span = quadra::run_span!(run_id);
/// let _guard = span.enter();
///
/// // With additional fields
/// let span = quadra::run_span!(run_id, workers = 10, total = 3000);
/// ```
#[macro_export]
macro_rules! run_span {
    ($run_id:expr) => {
        tracing::info_span!("run", run_id = %$run_id)
    };
    ($run_id:expr, $($fields:tt)*) => {
        tracing::info_span!("run", run_id = %$run_id, $($fields)*)
    };
}

/// Log worker lifecycle events
///
/// # Examples
///
/// ```rust
/// quadra::log_worker!(3, "started");
/// quadra::log_worker!(3, "stopped", processed = 300);
/// ```
#[macro_export]
macro_rules! log_worker {
    ($worker:expr, $event:expr) => {
        tracing::debug!(worker = $worker, event = $event)
    };
    ($worker:expr, $event:expr, $($fields:tt)*) => {
        tracing::debug!(worker = $worker, event = $event, $($fields)*)
    };
}

pub use tracing::{debug, error, info, trace, warn};
