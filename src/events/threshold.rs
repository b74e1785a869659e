use std::sync::Arc;
use std::time::Duration;

use crate::errors::{DriverError, Result};
use crate::events::hook::{Describe, InterceptionHook};
use crate::events::invocation::Invocation;

/// Destination for [`ThresholdLogger`] lines. Must be safe to call from
/// several threads at once.
pub trait LogSink: Send + Sync {
    fn trace(&self, message: &str);

    fn info(&self, message: &str);

    fn error(&self, message: &str);
}

/// Sends lines to `tracing` under the `driver_interceptor::events` target
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn trace(&self, message: &str) {
        tracing::trace!(target: "driver_interceptor::events", "{}", message);
    }

    fn info(&self, message: &str) {
        tracing::info!(target: "driver_interceptor::events", "{}", message);
    }

    fn error(&self, message: &str) {
        tracing::error!(target: "driver_interceptor::events", "{}", message);
    }
}

/// Logs slow calls and every failure.
///
/// A trace line goes out before each call. After a successful call an info
/// line is written only when the call took longer than the threshold. Failed
/// calls always produce an error line.
pub struct ThresholdLogger {
    threshold: Duration,
    max_rendered_items: Option<usize>,
    sink: Arc<dyn LogSink>,
}

impl ThresholdLogger {
    pub fn new(threshold: Duration, sink: Arc<dyn LogSink>) -> Self {
        Self {
            threshold,
            max_rendered_items: None,
            sink,
        }
    }

    pub fn with_tracing(threshold: Duration) -> Self {
        Self::new(threshold, Arc::new(TracingSink))
    }

    /// Cap how many collection entries an info line shows
    pub fn with_max_rendered_items(mut self, max_items: usize) -> Self {
        self.max_rendered_items = Some(max_items);
        self
    }

    pub fn threshold(&self) -> Duration {
        self.threshold
    }

    fn elapsed(invocation: &Invocation) -> Duration {
        invocation.mark_complete();
        invocation.elapsed().unwrap_or_default()
    }
}

impl std::fmt::Debug for ThresholdLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThresholdLogger")
            .field("threshold", &self.threshold)
            .field("max_rendered_items", &self.max_rendered_items)
            .finish()
    }
}

impl InterceptionHook for ThresholdLogger {
    fn on_before(&self, invocation: &Invocation) -> Result<()> {
        self.sink.trace(&format!(
            "{}({}) on {}",
            invocation.name(),
            invocation.render_params(),
            invocation.source()
        ));
        Ok(())
    }

    fn on_after_success(&self, invocation: &Invocation, result: &dyn Describe) -> Result<()> {
        let elapsed = Self::elapsed(invocation);
        if elapsed > self.threshold {
            self.sink.info(&format!(
                "{}({}) took {:?} on {} -> {}",
                invocation.name(),
                invocation.render_params(),
                elapsed,
                invocation.source(),
                result.describe().render(self.max_rendered_items)
            ));
        }
        Ok(())
    }

    fn on_after_failure(&self, invocation: &Invocation, error: &DriverError) {
        let elapsed = Self::elapsed(invocation);
        self.sink.error(&format!(
            "{}({}) failed after {:?} on {}: {}",
            invocation.name(),
            invocation.render_params(),
            elapsed,
            invocation.source(),
            error
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::invocation::{Source, SourceKind};
    use crate::events::operation::DriverCall;
    use crate::testing::{CapturingSink, LogLevel};
    use std::thread;

    fn logger(threshold: Duration) -> (Arc<dyn InterceptionHook>, Arc<CapturingSink>) {
        let sink = Arc::new(CapturingSink::new());
        let hook: Arc<dyn InterceptionHook> = Arc::new(ThresholdLogger::new(threshold, sink.clone()));
        (hook, sink)
    }

    fn handles_call() -> Invocation {
        Invocation::new(
            Source::new(SourceKind::Driver, "session-1"),
            DriverCall::GetWindowHandles,
        )
        .unwrap()
    }

    #[test]
    fn test_fast_call_is_not_logged_at_info() {
        let (hook, sink) = logger(Duration::from_secs(60));

        hook.execute(handles_call(), || Ok(vec!["w1".to_string()]))
            .unwrap();

        assert_eq!(sink.count(LogLevel::Trace), 1);
        assert_eq!(sink.count(LogLevel::Info), 0);
    }

    #[test]
    fn test_slow_call_is_logged_once() {
        let (hook, sink) = logger(Duration::from_millis(1));

        hook.execute(handles_call(), || {
            thread::sleep(Duration::from_millis(10));
            Ok(vec!["w1".to_string(), "w2".to_string()])
        })
        .unwrap();

        let info = sink.lines(LogLevel::Info);
        assert_eq!(info.len(), 1);
        assert!(info[0].starts_with("driver.getWindowHandles() took"));
        assert!(info[0].contains("driver[session-1]"));
        assert!(info[0].ends_with("-> size=2 [w1, w2]"));
    }

    #[test]
    fn test_failure_ignores_threshold() {
        let (hook, sink) = logger(Duration::from_secs(3600));

        let result: Result<Vec<String>> =
            hook.execute(handles_call(), || Err(DriverError::Timeout("gone".to_string())));

        assert!(result.is_err());
        assert_eq!(sink.count(LogLevel::Info), 0);
        let errors = sink.lines(LogLevel::Error);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("driver.getWindowHandles() failed after"));
        assert!(errors[0].ends_with("Timeout: gone"));
    }

    #[test]
    fn test_rendered_items_cap() {
        let sink = Arc::new(CapturingSink::new());
        let hook: Arc<dyn InterceptionHook> = Arc::new(
            ThresholdLogger::new(Duration::ZERO, sink.clone()).with_max_rendered_items(1),
        );

        hook.execute(handles_call(), || {
            thread::sleep(Duration::from_millis(1));
            Ok(vec!["w1".to_string(), "w2".to_string(), "w3".to_string()])
        })
        .unwrap();

        assert!(sink.lines(LogLevel::Info)[0].ends_with("-> size=3 [w1, ...2 more]"));
    }
}
