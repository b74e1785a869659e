use std::fmt;
use std::sync::Arc;

use crate::driver::WebElement;
use crate::errors::Result;
use crate::events::hook::InterceptionHook;
use crate::events::invocation::{Invocation, Source, SourceKind};
use crate::events::operation::ElementCall;
use crate::events::{decorate_element, decorate_elements};
use crate::types::{By, Coordinates, Dimension, OutputType, Point, Rect, Screenshot};

pub struct EventFiringElement {
    delegate: Box<dyn WebElement>,
    hook: Arc<dyn InterceptionHook>,
}

impl EventFiringElement {
    pub fn new(delegate: Box<dyn WebElement>, hook: Arc<dyn InterceptionHook>) -> Self {
        Self { delegate, hook }
    }

    pub fn hook(&self) -> &Arc<dyn InterceptionHook> {
        &self.hook
    }

    pub fn wrapped_element(&self) -> &dyn WebElement {
        self.delegate.as_ref()
    }

    fn record(&self, call: ElementCall) -> Result<Invocation> {
        Invocation::new(Source::new(SourceKind::Element, self.delegate.id()), call)
    }
}

/// Same underlying element and the same hook instance
impl PartialEq for EventFiringElement {
    fn eq(&self, other: &Self) -> bool {
        self.delegate.id() == other.delegate.id() && Arc::ptr_eq(&self.hook, &other.hook)
    }
}

impl fmt::Debug for EventFiringElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventFiringElement")
            .field("delegate", &self.delegate)
            .finish_non_exhaustive()
    }
}

impl WebElement for EventFiringElement {
    fn id(&self) -> &str {
        self.delegate.id()
    }

    fn click(&self) -> Result<()> {
        let record = self.record(ElementCall::Click)?;
        self.hook.execute(record, || self.delegate.click())
    }

    fn submit(&self) -> Result<()> {
        let record = self.record(ElementCall::Submit)?;
        self.hook.execute(record, || self.delegate.submit())
    }

    fn send_keys(&self, keys: &str) -> Result<()> {
        let record = self.record(ElementCall::SendKeys {
            keys: keys.to_string(),
        })?;
        self.hook.execute(record, || self.delegate.send_keys(keys))
    }

    fn clear(&self) -> Result<()> {
        let record = self.record(ElementCall::Clear)?;
        self.hook.execute(record, || self.delegate.clear())
    }

    fn tag_name(&self) -> Result<String> {
        let record = self.record(ElementCall::GetTagName)?;
        self.hook.execute(record, || self.delegate.tag_name())
    }

    fn attribute(&self, name: &str) -> Result<Option<String>> {
        let record = self.record(ElementCall::GetAttribute {
            name: name.to_string(),
        })?;
        self.hook.execute(record, || self.delegate.attribute(name))
    }

    fn is_selected(&self) -> Result<bool> {
        let record = self.record(ElementCall::IsSelected)?;
        self.hook.execute(record, || self.delegate.is_selected())
    }

    fn is_enabled(&self) -> Result<bool> {
        let record = self.record(ElementCall::IsEnabled)?;
        self.hook.execute(record, || self.delegate.is_enabled())
    }

    fn text(&self) -> Result<String> {
        let record = self.record(ElementCall::GetText)?;
        self.hook.execute(record, || self.delegate.text())
    }

    fn find_elements(&self, by: &By) -> Result<Vec<Box<dyn WebElement>>> {
        let record = self.record(ElementCall::FindElements { by: by.clone() })?;
        self.hook.execute(record, || {
            self.delegate
                .find_elements(by)
                .map(|elements| decorate_elements(elements, &self.hook))
        })
    }

    fn find_element(&self, by: &By) -> Result<Box<dyn WebElement>> {
        let record = self.record(ElementCall::FindElement { by: by.clone() })?;
        self.hook.execute(record, || {
            self.delegate
                .find_element(by)
                .map(|element| decorate_element(element, &self.hook))
        })
    }

    fn is_displayed(&self) -> Result<bool> {
        let record = self.record(ElementCall::IsDisplayed)?;
        self.hook.execute(record, || self.delegate.is_displayed())
    }

    fn location(&self) -> Result<Point> {
        let record = self.record(ElementCall::GetLocation)?;
        self.hook.execute(record, || self.delegate.location())
    }

    fn size(&self) -> Result<Dimension> {
        let record = self.record(ElementCall::GetSize)?;
        self.hook.execute(record, || self.delegate.size())
    }

    fn rect(&self) -> Result<Rect> {
        let record = self.record(ElementCall::GetRect)?;
        self.hook.execute(record, || self.delegate.rect())
    }

    fn css_value(&self, name: &str) -> Result<String> {
        let record = self.record(ElementCall::GetCssValue {
            name: name.to_string(),
        })?;
        self.hook.execute(record, || self.delegate.css_value(name))
    }

    fn screenshot_as(&self, output: OutputType) -> Result<Screenshot> {
        let record = self.record(ElementCall::GetScreenshotAs { output })?;
        self.hook
            .execute(record, || self.delegate.screenshot_as(output))
    }

    // Outside the operation vocabulary: plain pass-through
    fn coordinates(&self) -> Coordinates {
        self.delegate.coordinates()
    }
}
