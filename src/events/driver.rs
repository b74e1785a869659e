use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use crate::driver::{Navigation, Options, TargetLocator, WebDriver, WebElement};
use crate::errors::Result;
use crate::events::hook::InterceptionHook;
use crate::events::invocation::{Invocation, Source, SourceKind};
use crate::events::navigation::EventFiringNavigation;
use crate::events::operation::DriverCall;
use crate::events::target_locator::EventFiringTargetLocator;
use crate::events::{decorate_element, decorate_elements};
use crate::types::{By, Capabilities, InputAction, OutputType, Screenshot};

/// Root decorator. Routes every driver operation through the hook and wraps
/// whatever driver-control object comes back.
pub struct EventFiringDriver {
    delegate: Box<dyn WebDriver>,
    hook: Arc<dyn InterceptionHook>,
}

impl EventFiringDriver {
    pub fn new(delegate: Box<dyn WebDriver>, hook: Arc<dyn InterceptionHook>) -> Self {
        Self { delegate, hook }
    }

    pub fn wrap<D: WebDriver + 'static>(driver: D, hook: Arc<dyn InterceptionHook>) -> Self {
        Self::new(Box::new(driver), hook)
    }

    pub fn hook(&self) -> &Arc<dyn InterceptionHook> {
        &self.hook
    }

    pub fn wrapped_driver(&self) -> &dyn WebDriver {
        self.delegate.as_ref()
    }

    fn record(&self, call: DriverCall) -> Result<Invocation> {
        Invocation::new(Source::new(SourceKind::Driver, self.delegate.id()), call)
    }
}

impl fmt::Debug for EventFiringDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventFiringDriver")
            .field("delegate", &self.delegate)
            .finish_non_exhaustive()
    }
}

impl WebDriver for EventFiringDriver {
    fn id(&self) -> &str {
        self.delegate.id()
    }

    fn get(&self, url: &str) -> Result<()> {
        let record = self.record(DriverCall::Get {
            url: url.to_string(),
        })?;
        self.hook.execute(record, || self.delegate.get(url))
    }

    fn current_url(&self) -> Result<String> {
        let record = self.record(DriverCall::GetCurrentUrl)?;
        self.hook.execute(record, || self.delegate.current_url())
    }

    fn title(&self) -> Result<String> {
        let record = self.record(DriverCall::GetTitle)?;
        self.hook.execute(record, || self.delegate.title())
    }

    fn find_elements(&self, by: &By) -> Result<Vec<Box<dyn WebElement>>> {
        let record = self.record(DriverCall::FindElements { by: by.clone() })?;
        self.hook.execute(record, || {
            self.delegate
                .find_elements(by)
                .map(|elements| decorate_elements(elements, &self.hook))
        })
    }

    fn find_element(&self, by: &By) -> Result<Box<dyn WebElement>> {
        let record = self.record(DriverCall::FindElement { by: by.clone() })?;
        self.hook.execute(record, || {
            self.delegate
                .find_element(by)
                .map(|element| decorate_element(element, &self.hook))
        })
    }

    fn page_source(&self) -> Result<String> {
        let record = self.record(DriverCall::GetPageSource)?;
        self.hook.execute(record, || self.delegate.page_source())
    }

    fn close(&self) -> Result<()> {
        let record = self.record(DriverCall::Close)?;
        self.hook.execute(record, || self.delegate.close())
    }

    fn quit(&self) -> Result<()> {
        let record = self.record(DriverCall::Quit)?;
        self.hook.execute(record, || self.delegate.quit())
    }

    fn window_handles(&self) -> Result<Vec<String>> {
        let record = self.record(DriverCall::GetWindowHandles)?;
        self.hook.execute(record, || self.delegate.window_handles())
    }

    fn window_handle(&self) -> Result<String> {
        let record = self.record(DriverCall::GetWindowHandle)?;
        self.hook.execute(record, || self.delegate.window_handle())
    }

    // Not intercepted itself; only calls on the returned locator are.
    fn switch_to(&self) -> Box<dyn TargetLocator> {
        Box::new(EventFiringTargetLocator::new(
            self.delegate.switch_to(),
            Arc::clone(&self.hook),
        ))
    }

    fn navigate(&self) -> Box<dyn Navigation> {
        Box::new(EventFiringNavigation::new(
            self.delegate.navigate(),
            Arc::clone(&self.hook),
        ))
    }

    fn manage(&self) -> Box<dyn Options> {
        self.delegate.manage()
    }

    fn capabilities(&self) -> Capabilities {
        self.delegate.capabilities()
    }

    fn execute_script(&self, script: &str, args: &[Value]) -> Result<Value> {
        let record = self.record(DriverCall::ExecuteScript {
            script: script.to_string(),
            args: args.to_vec(),
        })?;
        self.hook
            .execute(record, || self.delegate.execute_script(script, args))
    }

    fn execute_async_script(&self, script: &str, args: &[Value]) -> Result<Value> {
        let record = self.record(DriverCall::ExecuteAsyncScript {
            script: script.to_string(),
            args: args.to_vec(),
        })?;
        self.hook
            .execute(record, || self.delegate.execute_async_script(script, args))
    }

    fn screenshot_as(&self, output: OutputType) -> Result<Screenshot> {
        let record = self.record(DriverCall::GetScreenshotAs { output })?;
        self.hook
            .execute(record, || self.delegate.screenshot_as(output))
    }

    fn perform(&self, actions: &[InputAction]) -> Result<()> {
        let record = self.record(DriverCall::Perform {
            actions: actions.to_vec(),
        })?;
        self.hook.execute(record, || self.delegate.perform(actions))
    }

    fn reset_input_state(&self) -> Result<()> {
        let record = self.record(DriverCall::ResetInputState)?;
        self.hook
            .execute(record, || self.delegate.reset_input_state())
    }
}
