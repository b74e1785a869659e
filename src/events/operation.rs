use serde_json::{json, Value};
use std::fmt;

use crate::types::{By, FrameRef, InputAction, OutputType, WindowType};

/// Every intercepted call, named by the closed operation vocabulary.
///
/// The dotted names returned by [`Operation::name`] are an external contract
/// used for log correlation and must not change.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    Driver(DriverCall),
    Element(ElementCall),
    TargetLocator(TargetLocatorCall),
    Navigation(NavigationCall),
    Alert(AlertCall),
}

#[derive(Debug, Clone, PartialEq)]
pub enum DriverCall {
    Get { url: String },
    GetCurrentUrl,
    GetTitle,
    FindElements { by: By },
    FindElement { by: By },
    GetPageSource,
    Close,
    Quit,
    GetWindowHandles,
    GetWindowHandle,
    ExecuteScript { script: String, args: Vec<Value> },
    ExecuteAsyncScript { script: String, args: Vec<Value> },
    GetScreenshotAs { output: OutputType },
    Perform { actions: Vec<InputAction> },
    ResetInputState,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ElementCall {
    Click,
    Submit,
    SendKeys { keys: String },
    Clear,
    GetTagName,
    GetAttribute { name: String },
    IsSelected,
    IsEnabled,
    GetText,
    FindElements { by: By },
    FindElement { by: By },
    IsDisplayed,
    GetLocation,
    GetSize,
    GetRect,
    GetCssValue { name: String },
    GetScreenshotAs { output: OutputType },
}

#[derive(Debug, Clone, PartialEq)]
pub enum TargetLocatorCall {
    Frame { frame: FrameRef },
    ParentFrame,
    Window { name: String },
    NewWindow { kind: WindowType },
    DefaultContent,
    ActiveElement,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NavigationCall {
    Back,
    Forward,
    To { url: String },
    Refresh,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AlertCall {
    Dismiss,
    Accept,
    GetText,
    SendKeys { keys: String },
}

impl Operation {
    /// The full vocabulary, in declaration order
    pub const NAMES: [&'static str; 46] = [
        "driver.get",
        "driver.getCurrentUrl",
        "driver.getTitle",
        "driver.findElements",
        "driver.findElement",
        "driver.getPageSource",
        "driver.close",
        "driver.quit",
        "driver.getWindowHandles",
        "driver.getWindowHandle",
        "driver.executeScript",
        "driver.executeAsyncScript",
        "driver.getScreenshotAs",
        "driver.perform",
        "driver.resetInputState",
        "element.click",
        "element.submit",
        "element.sendKeys",
        "element.clear",
        "element.getTagName",
        "element.getAttribute",
        "element.isSelected",
        "element.isEnabled",
        "element.getText",
        "element.findElements",
        "element.findElement",
        "element.isDisplayed",
        "element.getLocation",
        "element.getSize",
        "element.getRect",
        "element.getCssValue",
        "element.getScreenshotAs",
        "targetLocator.frame",
        "targetLocator.parentFrame",
        "targetLocator.window",
        "targetLocator.newWindow",
        "targetLocator.defaultContent",
        "targetLocator.activeElement",
        "navigation.back",
        "navigation.forward",
        "navigation.to",
        "navigation.refresh",
        "alert.dismiss",
        "alert.accept",
        "alert.getText",
        "alert.sendKeys",
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Operation::Driver(call) => match call {
                DriverCall::Get { .. } => "driver.get",
                DriverCall::GetCurrentUrl => "driver.getCurrentUrl",
                DriverCall::GetTitle => "driver.getTitle",
                DriverCall::FindElements { .. } => "driver.findElements",
                DriverCall::FindElement { .. } => "driver.findElement",
                DriverCall::GetPageSource => "driver.getPageSource",
                DriverCall::Close => "driver.close",
                DriverCall::Quit => "driver.quit",
                DriverCall::GetWindowHandles => "driver.getWindowHandles",
                DriverCall::GetWindowHandle => "driver.getWindowHandle",
                DriverCall::ExecuteScript { .. } => "driver.executeScript",
                DriverCall::ExecuteAsyncScript { .. } => "driver.executeAsyncScript",
                DriverCall::GetScreenshotAs { .. } => "driver.getScreenshotAs",
                DriverCall::Perform { .. } => "driver.perform",
                DriverCall::ResetInputState => "driver.resetInputState",
            },
            Operation::Element(call) => match call {
                ElementCall::Click => "element.click",
                ElementCall::Submit => "element.submit",
                ElementCall::SendKeys { .. } => "element.sendKeys",
                ElementCall::Clear => "element.clear",
                ElementCall::GetTagName => "element.getTagName",
                ElementCall::GetAttribute { .. } => "element.getAttribute",
                ElementCall::IsSelected => "element.isSelected",
                ElementCall::IsEnabled => "element.isEnabled",
                ElementCall::GetText => "element.getText",
                ElementCall::FindElements { .. } => "element.findElements",
                ElementCall::FindElement { .. } => "element.findElement",
                ElementCall::IsDisplayed => "element.isDisplayed",
                ElementCall::GetLocation => "element.getLocation",
                ElementCall::GetSize => "element.getSize",
                ElementCall::GetRect => "element.getRect",
                ElementCall::GetCssValue { .. } => "element.getCssValue",
                ElementCall::GetScreenshotAs { .. } => "element.getScreenshotAs",
            },
            Operation::TargetLocator(call) => match call {
                TargetLocatorCall::Frame { .. } => "targetLocator.frame",
                TargetLocatorCall::ParentFrame => "targetLocator.parentFrame",
                TargetLocatorCall::Window { .. } => "targetLocator.window",
                TargetLocatorCall::NewWindow { .. } => "targetLocator.newWindow",
                TargetLocatorCall::DefaultContent => "targetLocator.defaultContent",
                TargetLocatorCall::ActiveElement => "targetLocator.activeElement",
            },
            Operation::Navigation(call) => match call {
                NavigationCall::Back => "navigation.back",
                NavigationCall::Forward => "navigation.forward",
                NavigationCall::To { .. } => "navigation.to",
                NavigationCall::Refresh => "navigation.refresh",
            },
            Operation::Alert(call) => match call {
                AlertCall::Dismiss => "alert.dismiss",
                AlertCall::Accept => "alert.accept",
                AlertCall::GetText => "alert.getText",
                AlertCall::SendKeys { .. } => "alert.sendKeys",
            },
        }
    }

    /// Call arguments in order, for diagnostics. Empty for no-arg calls.
    pub fn params(&self) -> Vec<Value> {
        match self {
            Operation::Driver(call) => match call {
                DriverCall::Get { url } => vec![json!(url)],
                DriverCall::FindElements { by } | DriverCall::FindElement { by } => {
                    vec![json!(by.to_string())]
                }
                DriverCall::ExecuteScript { script, args }
                | DriverCall::ExecuteAsyncScript { script, args } => {
                    vec![json!(script), Value::Array(args.clone())]
                }
                DriverCall::GetScreenshotAs { output } => vec![json!(output.to_string())],
                DriverCall::Perform { actions } => {
                    vec![serde_json::to_value(actions).unwrap_or(Value::Null)]
                }
                DriverCall::GetCurrentUrl
                | DriverCall::GetTitle
                | DriverCall::GetPageSource
                | DriverCall::Close
                | DriverCall::Quit
                | DriverCall::GetWindowHandles
                | DriverCall::GetWindowHandle
                | DriverCall::ResetInputState => Vec::new(),
            },
            Operation::Element(call) => match call {
                ElementCall::SendKeys { keys } => vec![json!(keys)],
                ElementCall::GetAttribute { name } | ElementCall::GetCssValue { name } => {
                    vec![json!(name)]
                }
                ElementCall::FindElements { by } | ElementCall::FindElement { by } => {
                    vec![json!(by.to_string())]
                }
                ElementCall::GetScreenshotAs { output } => vec![json!(output.to_string())],
                ElementCall::Click
                | ElementCall::Submit
                | ElementCall::Clear
                | ElementCall::GetTagName
                | ElementCall::IsSelected
                | ElementCall::IsEnabled
                | ElementCall::GetText
                | ElementCall::IsDisplayed
                | ElementCall::GetLocation
                | ElementCall::GetSize
                | ElementCall::GetRect => Vec::new(),
            },
            Operation::TargetLocator(call) => match call {
                TargetLocatorCall::Frame { frame } => match frame {
                    FrameRef::Index(index) => vec![json!(index)],
                    FrameRef::NameOrId(name) => vec![json!(name)],
                    FrameRef::Element(id) => vec![json!(format!("element {}", id))],
                },
                TargetLocatorCall::Window { name } => vec![json!(name)],
                TargetLocatorCall::NewWindow { kind } => vec![json!(kind.to_string())],
                TargetLocatorCall::ParentFrame
                | TargetLocatorCall::DefaultContent
                | TargetLocatorCall::ActiveElement => Vec::new(),
            },
            Operation::Navigation(call) => match call {
                NavigationCall::To { url } => vec![json!(url)],
                NavigationCall::Back | NavigationCall::Forward | NavigationCall::Refresh => {
                    Vec::new()
                }
            },
            Operation::Alert(call) => match call {
                AlertCall::SendKeys { keys } => vec![json!(keys)],
                AlertCall::Dismiss | AlertCall::Accept | AlertCall::GetText => Vec::new(),
            },
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<DriverCall> for Operation {
    fn from(call: DriverCall) -> Self {
        Operation::Driver(call)
    }
}

impl From<ElementCall> for Operation {
    fn from(call: ElementCall) -> Self {
        Operation::Element(call)
    }
}

impl From<TargetLocatorCall> for Operation {
    fn from(call: TargetLocatorCall) -> Self {
        Operation::TargetLocator(call)
    }
}

impl From<NavigationCall> for Operation {
    fn from(call: NavigationCall) -> Self {
        Operation::Navigation(call)
    }
}

impl From<AlertCall> for Operation {
    fn from(call: AlertCall) -> Self {
        Operation::Alert(call)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_vocabulary_is_unique() {
        let unique: HashSet<_> = Operation::NAMES.iter().collect();
        assert_eq!(unique.len(), Operation::NAMES.len());
    }

    #[test]
    fn test_names_come_from_vocabulary() {
        let samples: Vec<Operation> = vec![
            DriverCall::Get {
                url: "https://example.com".to_string(),
            }
            .into(),
            DriverCall::ResetInputState.into(),
            ElementCall::GetCssValue {
                name: "color".to_string(),
            }
            .into(),
            TargetLocatorCall::Frame {
                frame: FrameRef::Index(0),
            }
            .into(),
            NavigationCall::Refresh.into(),
            AlertCall::SendKeys {
                keys: "yes".to_string(),
            }
            .into(),
        ];
        for operation in samples {
            assert!(Operation::NAMES.contains(&operation.name()));
        }
    }

    #[test]
    fn test_params_preserve_order() {
        let operation: Operation = DriverCall::ExecuteScript {
            script: "return arguments[0] + arguments[1]".to_string(),
            args: vec![json!(1), json!(2)],
        }
        .into();
        assert_eq!(
            operation.params(),
            vec![
                json!("return arguments[0] + arguments[1]"),
                json!([1, 2])
            ]
        );
    }

    #[test]
    fn test_no_arg_calls_have_empty_params() {
        assert!(Operation::from(ElementCall::Click).params().is_empty());
        assert!(Operation::from(NavigationCall::Back).params().is_empty());
    }

    #[test]
    fn test_find_params_render_locator() {
        let operation: Operation = ElementCall::FindElement {
            by: By::css("li.item"),
        }
        .into();
        assert_eq!(operation.name(), "element.findElement");
        assert_eq!(operation.params(), vec![json!("By.css selector: li.item")]);
    }
}
