//! Call interception for driver-control objects.
//!
//! Wrap a driver once with [`EventFiringDriver`] and every object reached
//! through it (elements, frames, windows, navigation, alerts) comes back
//! wrapped as well, all reporting to the same [`InterceptionHook`].
//!
//! ```rust,ignore
//! let hook = Arc::new(ThresholdLogger::with_tracing(Duration::from_millis(200)));
//! let driver = EventFiringDriver::new(Box::new(chrome), hook);
//! let rows = driver.find_elements(&By::css("table tr"))?;
//! rows[1].click()?; // logged as element.click
//! ```

pub mod alert;
pub mod driver;
pub mod element;
pub mod hook;
pub mod invocation;
pub mod navigation;
pub mod operation;
pub mod target_locator;
pub mod threshold;

pub use alert::EventFiringAlert;
pub use driver::EventFiringDriver;
pub use element::EventFiringElement;
pub use hook::{Describe, Description, InterceptionHook};
pub use invocation::{Invocation, Source, SourceKind};
pub use navigation::EventFiringNavigation;
pub use operation::{AlertCall, DriverCall, ElementCall, NavigationCall, Operation, TargetLocatorCall};
pub use target_locator::EventFiringTargetLocator;
pub use threshold::{LogSink, ThresholdLogger, TracingSink};

use std::sync::Arc;

use crate::driver::{WebDriver, WebElement};

pub(crate) fn decorate_driver(
    driver: Box<dyn WebDriver>,
    hook: &Arc<dyn InterceptionHook>,
) -> Box<dyn WebDriver> {
    Box::new(EventFiringDriver::new(driver, Arc::clone(hook)))
}

pub(crate) fn decorate_element(
    element: Box<dyn WebElement>,
    hook: &Arc<dyn InterceptionHook>,
) -> Box<dyn WebElement> {
    Box::new(EventFiringElement::new(element, Arc::clone(hook)))
}

pub(crate) fn decorate_elements(
    elements: Vec<Box<dyn WebElement>>,
    hook: &Arc<dyn InterceptionHook>,
) -> Vec<Box<dyn WebElement>> {
    elements
        .into_iter()
        .map(|element| decorate_element(element, hook))
        .collect()
}
