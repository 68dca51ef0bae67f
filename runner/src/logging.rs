use crate::config::ConfigErrors;
use std::{
    fmt,
    fs::{self, File, OpenOptions},
    path::{Path, PathBuf},
    sync::Mutex,
};
use tracing::{dispatcher::DefaultGuard, Dispatch, Event, Subscriber};
use tracing_subscriber::{
    filter::LevelFilter,
    fmt::{
        format::Writer,
        time::{FormatTime, SystemTime},
        FmtContext, FormatEvent, FormatFields,
    },
    registry::LookupSpan,
    EnvFilter,
};


/// Event layout: `|<time>|<target>|<LEVEL>`, then the message on its own line and a blank line
///
/// Multi line messages stay readable in a log file that is shared with the job output.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlockFormat;

impl<S, N> FormatEvent<S, N> for BlockFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let metadata = event.metadata();

        write!(writer, "|")?;
        SystemTime.format_time(&mut writer)?;
        writeln!(writer, "|{}|{}", metadata.target(), metadata.level())?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)?;
        writeln!(writer)
    }
}

/// Logging setup of one job session
///
/// Nothing is installed until [`LogContext::enter`] is called, and the previous default is
/// restored once the returned scope is dropped.
#[derive(Clone)]
pub struct LogContext {
    dispatch: Dispatch,
    log_file: Option<PathBuf>,
}

/// Active logging scope, see [`LogContext::enter`]
#[must_use = "logging is restored as soon as the scope is dropped"]
pub struct LogScope {
    _guard: DefaultGuard,
}

fn env_filter(verbose: bool) -> EnvFilter {
    let level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };

    EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy()
}

/// Open `path` for appending, creating missing parent directories
pub fn open_log_file(path: &Path) -> Result<File, ConfigErrors> {
    let to_error = |source| ConfigErrors::LogFile {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(to_error)?;
    }

    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(to_error)
}

impl LogContext {
    /// Log into `log_file` if given, to stderr otherwise
    pub fn new(verbose: bool, log_file: Option<&Path>) -> Result<Self, ConfigErrors> {
        let builder = tracing_subscriber::fmt()
            .with_env_filter(env_filter(verbose))
            .with_ansi(false)
            .event_format(BlockFormat);

        let dispatch = match log_file {
            Some(path) => {
                let file = open_log_file(path)?;
                Dispatch::new(builder.with_writer(Mutex::new(file)).finish())
            }
            None => Dispatch::new(builder.with_writer(std::io::stderr).finish()),
        };

        Ok(Self {
            dispatch,
            log_file: log_file.map(Path::to_path_buf),
        })
    }

    pub fn log_file(&self) -> Option<&Path> {
        self.log_file.as_deref()
    }

    /// Make this context the default for the current thread until the scope is dropped
    pub fn enter(&self) -> LogScope {
        LogScope {
            _guard: tracing::dispatcher::set_default(&self.dispatch),
        }
    }
}

impl fmt::Debug for LogContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogContext")
            .field("log_file", &self.log_file)
            .finish_non_exhaustive()
    }
}
