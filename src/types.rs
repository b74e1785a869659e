use base64::Engine;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::errors::{DriverError, Result};

/// Element locating strategy
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum By {
    Css(String),
    XPath(String),
    Id(String),
    Name(String),
    ClassName(String),
    TagName(String),
    LinkText(String),
    PartialLinkText(String),
}

impl By {
    pub fn css(selector: impl Into<String>) -> Self {
        By::Css(selector.into())
    }

    pub fn xpath(expression: impl Into<String>) -> Self {
        By::XPath(expression.into())
    }

    pub fn id(id: impl Into<String>) -> Self {
        By::Id(id.into())
    }

    /// W3C strategy name
    pub fn strategy(&self) -> &'static str {
        match self {
            By::Css(_) => "css selector",
            By::XPath(_) => "xpath",
            By::Id(_) => "id",
            By::Name(_) => "name",
            By::ClassName(_) => "class name",
            By::TagName(_) => "tag name",
            By::LinkText(_) => "link text",
            By::PartialLinkText(_) => "partial link text",
        }
    }

    pub fn value(&self) -> &str {
        match self {
            By::Css(v)
            | By::XPath(v)
            | By::Id(v)
            | By::Name(v)
            | By::ClassName(v)
            | By::TagName(v)
            | By::LinkText(v)
            | By::PartialLinkText(v) => v,
        }
    }
}

impl fmt::Display for By {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "By.{}: {}", self.strategy(), self.value())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Dimension {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn location(&self) -> Point {
        Point {
            x: self.x,
            y: self.y,
        }
    }

    pub fn size(&self) -> Dimension {
        Dimension {
            width: self.width,
            height: self.height,
        }
    }
}

/// Where an element sits, relative to the page and to the viewport
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Coordinates {
    pub on_page: Point,
    pub in_viewport: Point,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputType {
    Bytes,
    Base64,
}

impl fmt::Display for OutputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputType::Bytes => f.write_str("BYTES"),
            OutputType::Base64 => f.write_str("BASE64"),
        }
    }
}

/// PNG screenshot in the requested output type
#[derive(Clone, PartialEq, Eq)]
pub enum Screenshot {
    Bytes(Vec<u8>),
    Base64(String),
}

impl Screenshot {
    pub fn encode(png: Vec<u8>, output: OutputType) -> Self {
        match output {
            OutputType::Bytes => Screenshot::Bytes(png),
            OutputType::Base64 => {
                Screenshot::Base64(base64::engine::general_purpose::STANDARD.encode(png))
            }
        }
    }

    pub fn into_bytes(self) -> Result<Vec<u8>> {
        match self {
            Screenshot::Bytes(bytes) => Ok(bytes),
            Screenshot::Base64(data) => base64::engine::general_purpose::STANDARD
                .decode(data)
                .map_err(|e| DriverError::Screenshot(e.to_string())),
        }
    }
}

// Payloads can be megabytes; only the size goes into logs
impl fmt::Debug for Screenshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Screenshot::Bytes(bytes) => write!(f, "Screenshot::Bytes({} bytes)", bytes.len()),
            Screenshot::Base64(data) => write!(f, "Screenshot::Base64({} chars)", data.len()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowType {
    Tab,
    Window,
}

impl fmt::Display for WindowType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WindowType::Tab => f.write_str("tab"),
            WindowType::Window => f.write_str("window"),
        }
    }
}

/// Frame selector as it appears in a record
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameRef {
    Index(usize),
    NameOrId(String),
    Element(String),
}

/// Low-level input step for `perform`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputAction {
    KeyPress(String),
    Type(String),
    MoveTo(Point),
    Click(Point),
    Pause(Duration),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeouts {
    pub implicit_wait: Duration,
    pub page_load: Duration,
    pub script: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            implicit_wait: Duration::ZERO,
            page_load: Duration::from_secs(300),
            script: Duration::from_secs(30),
        }
    }
}

/// What a backend can do beyond the base driver surface
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    pub browser_name: String,
    pub supports_javascript: bool,
    pub supports_screenshots: bool,
    pub supports_actions: bool,
}

impl Capabilities {
    pub fn none(browser_name: impl Into<String>) -> Self {
        Self {
            browser_name: browser_name.into(),
            supports_javascript: false,
            supports_screenshots: false,
            supports_actions: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_by_display() {
        assert_eq!(By::css("div.row").to_string(), "By.css selector: div.row");
        assert_eq!(
            By::LinkText("Next".to_string()).to_string(),
            "By.link text: Next"
        );
    }

    #[test]
    fn test_screenshot_base64_decodes_back() {
        let shot = Screenshot::encode(vec![0x89, b'P', b'N', b'G'], OutputType::Base64);
        assert_eq!(shot, Screenshot::Base64("iVBORw==".to_string()));
        assert_eq!(shot.into_bytes().unwrap(), vec![0x89, b'P', b'N', b'G']);
    }

    #[test]
    fn test_screenshot_debug_hides_payload() {
        let shot = Screenshot::Bytes(vec![0; 2048]);
        assert_eq!(format!("{:?}", shot), "Screenshot::Bytes(2048 bytes)");
    }

    #[test]
    fn test_rect_parts() {
        let rect = Rect {
            x: 1.0,
            y: 2.0,
            width: 30.0,
            height: 40.0,
        };
        assert_eq!(rect.location(), Point { x: 1.0, y: 2.0 });
        assert_eq!(
            rect.size(),
            Dimension {
                width: 30.0,
                height: 40.0
            }
        );
    }
}
