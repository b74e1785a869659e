use chrono::{DateTime, Local};
use serde_json::Value;
use std::fmt;
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use crate::errors::{DriverError, Result};
use crate::events::operation::Operation;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    Driver,
    Element,
    TargetLocator,
    Navigation,
    Alert,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Driver => f.write_str("driver"),
            SourceKind::Element => f.write_str("element"),
            SourceKind::TargetLocator => f.write_str("targetLocator"),
            SourceKind::Navigation => f.write_str("navigation"),
            SourceKind::Alert => f.write_str("alert"),
        }
    }
}

/// Identity of the un-decorated object a call targets
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Source {
    kind: SourceKind,
    id: String,
}

impl Source {
    pub fn new(kind: SourceKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }

    pub fn kind(&self) -> SourceKind {
        self.kind
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.kind, self.id)
    }
}

/// One intercepted call.
///
/// Identity and parameters are fixed at construction. The end of the call is
/// a write-once slot, so the first [`Invocation::mark_complete`] wins and the
/// elapsed time can never move after a hook has read it.
#[derive(Debug)]
pub struct Invocation {
    source: Source,
    operation: Operation,
    params: Vec<Value>,
    started_at: DateTime<Local>,
    start: Instant,
    end: OnceLock<Instant>,
}

impl Invocation {
    pub fn new(source: Source, operation: impl Into<Operation>) -> Result<Self> {
        if source.id.trim().is_empty() {
            return Err(DriverError::invalid_argument(format!(
                "{} source must have an id",
                source.kind
            )));
        }
        let operation = operation.into();
        let params = operation.params();
        Ok(Self {
            source,
            operation,
            params,
            started_at: Local::now(),
            start: Instant::now(),
            end: OnceLock::new(),
        })
    }

    pub fn source(&self) -> &Source {
        &self.source
    }

    pub fn operation(&self) -> &Operation {
        &self.operation
    }

    pub fn name(&self) -> &'static str {
        self.operation.name()
    }

    pub fn params(&self) -> &[Value] {
        &self.params
    }

    /// Wall-clock time the record was created
    pub fn started_at(&self) -> DateTime<Local> {
        self.started_at
    }

    pub fn is_complete(&self) -> bool {
        self.end.get().is_some()
    }

    /// Stamp the end time. Later calls keep the first stamp.
    pub fn mark_complete(&self) {
        let _ = self.end.set(Instant::now());
    }

    /// `None` until [`Invocation::mark_complete`] has been called
    pub fn elapsed(&self) -> Option<Duration> {
        self.end
            .get()
            .map(|end| end.saturating_duration_since(self.start))
    }

    /// Parameters joined for log lines
    pub fn render_params(&self) -> String {
        self.params
            .iter()
            .map(|p| match p {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}
