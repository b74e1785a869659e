use std::fmt;
use std::sync::Arc;

use crate::driver::{Alert, TargetLocator, WebDriver, WebElement};
use crate::errors::Result;
use crate::events::alert::EventFiringAlert;
use crate::events::hook::InterceptionHook;
use crate::events::invocation::{Invocation, Source, SourceKind};
use crate::events::operation::TargetLocatorCall;
use crate::events::{decorate_driver, decorate_element};
use crate::types::{FrameRef, WindowType};

/// Every context switch hands back a driver view wrapped with the same hook,
/// so instrumentation follows the caller into frames and windows.
pub struct EventFiringTargetLocator {
    delegate: Box<dyn TargetLocator>,
    hook: Arc<dyn InterceptionHook>,
}

impl EventFiringTargetLocator {
    pub fn new(delegate: Box<dyn TargetLocator>, hook: Arc<dyn InterceptionHook>) -> Self {
        Self { delegate, hook }
    }

    fn record(&self, call: TargetLocatorCall) -> Result<Invocation> {
        Invocation::new(
            Source::new(SourceKind::TargetLocator, self.delegate.id()),
            call,
        )
    }

    fn switch<F>(&self, call: TargetLocatorCall, work: F) -> Result<Box<dyn WebDriver>>
    where
        F: FnOnce() -> Result<Box<dyn WebDriver>>,
    {
        let record = self.record(call)?;
        self.hook
            .execute(record, || work().map(|driver| decorate_driver(driver, &self.hook)))
    }
}

impl fmt::Debug for EventFiringTargetLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventFiringTargetLocator")
            .field("delegate", &self.delegate)
            .finish_non_exhaustive()
    }
}

impl TargetLocator for EventFiringTargetLocator {
    fn id(&self) -> &str {
        self.delegate.id()
    }

    fn frame_by_index(&self, index: usize) -> Result<Box<dyn WebDriver>> {
        self.switch(
            TargetLocatorCall::Frame {
                frame: FrameRef::Index(index),
            },
            || self.delegate.frame_by_index(index),
        )
    }

    fn frame_by_name(&self, name_or_id: &str) -> Result<Box<dyn WebDriver>> {
        self.switch(
            TargetLocatorCall::Frame {
                frame: FrameRef::NameOrId(name_or_id.to_string()),
            },
            || self.delegate.frame_by_name(name_or_id),
        )
    }

    fn frame_by_element(&self, element: &dyn WebElement) -> Result<Box<dyn WebDriver>> {
        self.switch(
            TargetLocatorCall::Frame {
                frame: FrameRef::Element(element.id().to_string()),
            },
            || self.delegate.frame_by_element(element),
        )
    }

    fn parent_frame(&self) -> Result<Box<dyn WebDriver>> {
        self.switch(TargetLocatorCall::ParentFrame, || {
            self.delegate.parent_frame()
        })
    }

    fn window(&self, name_or_handle: &str) -> Result<Box<dyn WebDriver>> {
        self.switch(
            TargetLocatorCall::Window {
                name: name_or_handle.to_string(),
            },
            || self.delegate.window(name_or_handle),
        )
    }

    fn new_window(&self, kind: WindowType) -> Result<Box<dyn WebDriver>> {
        self.switch(TargetLocatorCall::NewWindow { kind }, || {
            self.delegate.new_window(kind)
        })
    }

    fn default_content(&self) -> Result<Box<dyn WebDriver>> {
        self.switch(TargetLocatorCall::DefaultContent, || {
            self.delegate.default_content()
        })
    }

    fn active_element(&self) -> Result<Box<dyn WebElement>> {
        let record = self.record(TargetLocatorCall::ActiveElement)?;
        self.hook.execute(record, || {
            self.delegate
                .active_element()
                .map(|element| decorate_element(element, &self.hook))
        })
    }

    // Not intercepted itself; calls on the alert are.
    fn alert(&self) -> Result<Box<dyn Alert>> {
        let alert = self.delegate.alert()?;
        Ok(Box::new(EventFiringAlert::new(alert, Arc::clone(&self.hook))))
    }
}
