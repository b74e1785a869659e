use std::fmt;
use std::sync::Arc;
use url::Url;

use crate::driver::Navigation;
use crate::errors::Result;
use crate::events::hook::InterceptionHook;
use crate::events::invocation::{Invocation, Source, SourceKind};
use crate::events::operation::NavigationCall;

pub struct EventFiringNavigation {
    delegate: Box<dyn Navigation>,
    hook: Arc<dyn InterceptionHook>,
}

impl EventFiringNavigation {
    pub fn new(delegate: Box<dyn Navigation>, hook: Arc<dyn InterceptionHook>) -> Self {
        Self { delegate, hook }
    }

    fn record(&self, call: NavigationCall) -> Result<Invocation> {
        Invocation::new(Source::new(SourceKind::Navigation, self.delegate.id()), call)
    }
}

impl fmt::Debug for EventFiringNavigation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventFiringNavigation")
            .field("delegate", &self.delegate)
            .finish_non_exhaustive()
    }
}

impl Navigation for EventFiringNavigation {
    fn id(&self) -> &str {
        self.delegate.id()
    }

    fn back(&self) -> Result<()> {
        let record = self.record(NavigationCall::Back)?;
        self.hook.execute(record, || self.delegate.back())
    }

    fn forward(&self) -> Result<()> {
        let record = self.record(NavigationCall::Forward)?;
        self.hook.execute(record, || self.delegate.forward())
    }

    fn to(&self, url: &str) -> Result<()> {
        let record = self.record(NavigationCall::To {
            url: url.to_string(),
        })?;
        self.hook.execute(record, || self.delegate.to(url))
    }

    fn to_url(&self, url: &Url) -> Result<()> {
        let record = self.record(NavigationCall::To {
            url: url.to_string(),
        })?;
        self.hook.execute(record, || self.delegate.to_url(url))
    }

    fn refresh(&self) -> Result<()> {
        let record = self.record(NavigationCall::Refresh)?;
        self.hook.execute(record, || self.delegate.refresh())
    }
}
