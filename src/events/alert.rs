use std::fmt;
use std::sync::Arc;

use crate::driver::Alert;
use crate::errors::Result;
use crate::events::hook::InterceptionHook;
use crate::events::invocation::{Invocation, Source, SourceKind};
use crate::events::operation::AlertCall;

pub struct EventFiringAlert {
    delegate: Box<dyn Alert>,
    hook: Arc<dyn InterceptionHook>,
}

impl EventFiringAlert {
    pub fn new(delegate: Box<dyn Alert>, hook: Arc<dyn InterceptionHook>) -> Self {
        Self { delegate, hook }
    }

    fn record(&self, call: AlertCall) -> Result<Invocation> {
        Invocation::new(Source::new(SourceKind::Alert, self.delegate.id()), call)
    }
}

impl fmt::Debug for EventFiringAlert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventFiringAlert")
            .field("delegate", &self.delegate)
            .finish_non_exhaustive()
    }
}

impl Alert for EventFiringAlert {
    fn id(&self) -> &str {
        self.delegate.id()
    }

    fn dismiss(&self) -> Result<()> {
        let record = self.record(AlertCall::Dismiss)?;
        self.hook.execute(record, || self.delegate.dismiss())
    }

    fn accept(&self) -> Result<()> {
        let record = self.record(AlertCall::Accept)?;
        self.hook.execute(record, || self.delegate.accept())
    }

    fn text(&self) -> Result<String> {
        let record = self.record(AlertCall::GetText)?;
        self.hook.execute(record, || self.delegate.text())
    }

    fn send_keys(&self, keys: &str) -> Result<()> {
        let record = self.record(AlertCall::SendKeys {
            keys: keys.to_string(),
        })?;
        self.hook.execute(record, || self.delegate.send_keys(keys))
    }
}
