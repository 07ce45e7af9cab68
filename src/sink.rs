use std::fmt;
use std::sync::Arc;

/// A line-oriented destination for trace output.
///
/// The engine writes one human-readable line per external invocation and per
/// file operation. Nothing it writes is needed for correctness.
pub trait LogSink: Send + Sync {
    fn line(&self, line: &str);
}

/// Drops every line.
pub struct Discard;

impl LogSink for Discard {
    fn line(&self, _line: &str) {}
}

/// Forwards every line to `tracing` at info level under the `toolbox` target.
pub struct TracingSink;

impl LogSink for TracingSink {
    fn line(&self, line: &str) {
        tracing::info!(target: "toolbox", "{}", line);
    }
}

/// Cheap, cloneable handle around a [`LogSink`]. Defaults to [`Discard`].
#[derive(Clone)]
pub struct Logger(Arc<dyn LogSink>);

impl Logger {
    pub fn new<S: LogSink + 'static>(sink: S) -> Self {
        Logger(Arc::new(sink))
    }

    pub fn tracing() -> Self {
        Logger::new(TracingSink)
    }

    pub fn log(&self, line: impl AsRef<str>) {
        self.0.line(line.as_ref());
    }
}

impl Default for Logger {
    fn default() -> Self {
        Logger::new(Discard)
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Logger")
    }
}

impl<S: LogSink + ?Sized> LogSink for Arc<S> {
    fn line(&self, line: &str) {
        (**self).line(line)
    }
}
