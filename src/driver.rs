//! Driver-control primitives.
//!
//! These traits are the operation surface both real backends and the
//! event-firing decorators implement. Anything returned from a call that is
//! itself a live browser handle comes back boxed, so a decorator can hand out
//! a decorated handle in its place.

use serde_json::Value;
use std::fmt;
use url::Url;

use crate::errors::{DriverError, Result};
use crate::types::{
    By, Capabilities, Coordinates, Dimension, InputAction, OutputType, Point, Rect, Screenshot,
    Timeouts, WindowType,
};

pub trait WebDriver: Send + Sync + fmt::Debug {
    /// Stable identifier of this driver view (session, window and frame)
    fn id(&self) -> &str;

    fn get(&self, url: &str) -> Result<()>;

    fn current_url(&self) -> Result<String>;

    fn title(&self) -> Result<String>;

    fn find_elements(&self, by: &By) -> Result<Vec<Box<dyn WebElement>>>;

    fn find_element(&self, by: &By) -> Result<Box<dyn WebElement>>;

    fn page_source(&self) -> Result<String>;

    /// Close the current window
    fn close(&self) -> Result<()>;

    /// End the session
    fn quit(&self) -> Result<()>;

    fn window_handles(&self) -> Result<Vec<String>>;

    fn window_handle(&self) -> Result<String>;

    fn switch_to(&self) -> Box<dyn TargetLocator>;

    fn navigate(&self) -> Box<dyn Navigation>;

    fn manage(&self) -> Box<dyn Options>;

    fn capabilities(&self) -> Capabilities {
        Capabilities::none("unknown")
    }

    // Capability operations. Backends without the capability keep the
    // default and report it as unsupported.

    fn execute_script(&self, _script: &str, _args: &[Value]) -> Result<Value> {
        Err(DriverError::unsupported("executeScript"))
    }

    fn execute_async_script(&self, _script: &str, _args: &[Value]) -> Result<Value> {
        Err(DriverError::unsupported("executeAsyncScript"))
    }

    fn screenshot_as(&self, _output: OutputType) -> Result<Screenshot> {
        Err(DriverError::unsupported("getScreenshotAs"))
    }

    fn perform(&self, _actions: &[InputAction]) -> Result<()> {
        Err(DriverError::unsupported("perform"))
    }

    fn reset_input_state(&self) -> Result<()> {
        Err(DriverError::unsupported("resetInputState"))
    }
}

pub trait WebElement: Send + Sync + fmt::Debug {
    /// Backend-internal element id
    fn id(&self) -> &str;

    fn click(&self) -> Result<()>;

    fn submit(&self) -> Result<()>;

    fn send_keys(&self, keys: &str) -> Result<()>;

    fn clear(&self) -> Result<()>;

    fn tag_name(&self) -> Result<String>;

    fn attribute(&self, name: &str) -> Result<Option<String>>;

    fn is_selected(&self) -> Result<bool>;

    fn is_enabled(&self) -> Result<bool>;

    fn text(&self) -> Result<String>;

    fn find_elements(&self, by: &By) -> Result<Vec<Box<dyn WebElement>>>;

    fn find_element(&self, by: &By) -> Result<Box<dyn WebElement>>;

    fn is_displayed(&self) -> Result<bool>;

    fn location(&self) -> Result<Point>;

    fn size(&self) -> Result<Dimension>;

    fn rect(&self) -> Result<Rect>;

    fn css_value(&self, name: &str) -> Result<String>;

    fn screenshot_as(&self, output: OutputType) -> Result<Screenshot>;

    fn coordinates(&self) -> Coordinates;
}

/// Switches the browsing context. Every switch yields a driver view bound to
/// the new context.
pub trait TargetLocator: Send + Sync + fmt::Debug {
    fn id(&self) -> &str;

    fn frame_by_index(&self, index: usize) -> Result<Box<dyn WebDriver>>;

    fn frame_by_name(&self, name_or_id: &str) -> Result<Box<dyn WebDriver>>;

    fn frame_by_element(&self, element: &dyn WebElement) -> Result<Box<dyn WebDriver>>;

    fn parent_frame(&self) -> Result<Box<dyn WebDriver>>;

    fn window(&self, name_or_handle: &str) -> Result<Box<dyn WebDriver>>;

    fn new_window(&self, kind: WindowType) -> Result<Box<dyn WebDriver>>;

    fn default_content(&self) -> Result<Box<dyn WebDriver>>;

    fn active_element(&self) -> Result<Box<dyn WebElement>>;

    fn alert(&self) -> Result<Box<dyn Alert>>;
}

pub trait Navigation: Send + Sync + fmt::Debug {
    fn id(&self) -> &str;

    fn back(&self) -> Result<()>;

    fn forward(&self) -> Result<()>;

    fn to(&self, url: &str) -> Result<()>;

    fn to_url(&self, url: &Url) -> Result<()>;

    fn refresh(&self) -> Result<()>;
}

pub trait Alert: Send + Sync + fmt::Debug {
    fn id(&self) -> &str;

    fn dismiss(&self) -> Result<()>;

    fn accept(&self) -> Result<()>;

    fn text(&self) -> Result<String>;

    fn send_keys(&self, keys: &str) -> Result<()>;
}

/// Session configuration. Not part of the instrumented surface.
pub trait Options: Send + Sync + fmt::Debug {
    fn timeouts(&self) -> Result<Timeouts>;

    fn set_timeouts(&self, timeouts: Timeouts) -> Result<()>;
}
