//! In-memory driver primitives and recording hooks for exercising
//! interception without a browser.

use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;
use std::time::Duration;
use url::Url;
use uuid::Uuid;

use crate::driver::{Alert, Navigation, Options, TargetLocator, WebDriver, WebElement};
use crate::errors::{DriverError, Result};
use crate::events::{Describe, InterceptionHook, Invocation, LogSink, Source};
use crate::types::{
    By, Capabilities, Coordinates, Dimension, InputAction, OutputType, Point, Rect, Screenshot,
    Timeouts, WindowType,
};

const FAKE_PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Element content served by a [`ScriptedBrowser`]
#[derive(Debug, Clone)]
pub struct ElementSpec {
    id: String,
    tag_name: String,
    text: String,
    attributes: HashMap<String, String>,
    css: HashMap<String, String>,
    rect: Rect,
    selected: bool,
    enabled: bool,
    displayed: bool,
    children: Vec<(By, ElementSpec)>,
}

impl ElementSpec {
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            tag_name: tag_name.into(),
            text: String::new(),
            attributes: HashMap::new(),
            css: HashMap::new(),
            rect: Rect::default(),
            selected: false,
            enabled: true,
            displayed: true,
            children: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn with_css(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.css.insert(name.into(), value.into());
        self
    }

    pub fn with_rect(mut self, rect: Rect) -> Self {
        self.rect = rect;
        self
    }

    pub fn with_child(mut self, by: By, child: ElementSpec) -> Self {
        self.children.push((by, child));
        self
    }

    pub fn selected(mut self) -> Self {
        self.selected = true;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.displayed = false;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Scope {
    Document(Option<String>),
    Element(String),
}

#[derive(Debug)]
struct BrowserState {
    session_id: String,
    windows: Vec<String>,
    frames: Vec<String>,
    history: Vec<String>,
    history_index: usize,
    titles: HashMap<String, String>,
    page_source: String,
    elements: HashMap<String, ElementSpec>,
    locators: Vec<(Scope, By, String)>,
    active_element: Option<String>,
    alert: Option<String>,
    prompt_input: Option<String>,
    script_result: Value,
    timeouts: Timeouts,
    failures: HashMap<String, VecDeque<DriverError>>,
    delays: HashMap<String, Duration>,
    calls: Vec<String>,
    quit: bool,
}

#[derive(Debug, Clone)]
struct Shared(Arc<Mutex<BrowserState>>);

impl Shared {
    /// Journal the call, apply any scripted delay, then any scripted failure
    fn begin(&self, operation: &str, target: &str) -> Result<()> {
        let (delay, failure) = {
            let mut state = lock(&self.0);
            state.calls.push(format!("{} {}", operation, target));
            let delay = state.delays.get(operation).copied();
            let failure = state
                .failures
                .get_mut(operation)
                .and_then(|queue| queue.pop_front());
            (delay, failure)
        };
        if let Some(delay) = delay {
            thread::sleep(delay);
        }
        match failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn state(&self) -> MutexGuard<'_, BrowserState> {
        lock(&self.0)
    }

    fn find_all(&self, scope: &Scope, by: &By) -> Vec<Box<dyn WebElement>> {
        let state = self.state();
        state
            .locators
            .iter()
            .filter(|(s, b, _)| s == scope && b == by)
            .map(|(_, _, id)| {
                Box::new(ScriptedElement {
                    id: id.clone(),
                    shared: self.clone(),
                }) as Box<dyn WebElement>
            })
            .collect()
    }

    fn register(&self, scope: Scope, by: By, spec: ElementSpec) {
        let mut state = self.state();
        Self::insert(&mut state, scope, by, spec);
    }

    fn insert(state: &mut BrowserState, scope: Scope, by: By, mut spec: ElementSpec) {
        let children = std::mem::take(&mut spec.children);
        let id = spec.id.clone();
        state.elements.insert(id.clone(), spec);
        state.locators.push((scope, by, id.clone()));
        for (child_by, child) in children {
            Self::insert(state, Scope::Element(id.clone()), child_by, child);
        }
    }
}

/// Scriptable stand-in for a browser session.
///
/// Content, failures and delays are configured up front; drivers handed out
/// by [`ScriptedBrowser::driver`] serve them and journal every call they
/// receive.
#[derive(Debug, Clone)]
pub struct ScriptedBrowser {
    shared: Shared,
}

impl Default for ScriptedBrowser {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedBrowser {
    pub fn new() -> Self {
        let window = Uuid::new_v4().to_string();
        let state = BrowserState {
            session_id: Uuid::new_v4().to_string(),
            windows: vec![window],
            frames: Vec::new(),
            history: vec!["about:blank".to_string()],
            history_index: 0,
            titles: HashMap::new(),
            page_source: "<html><body></body></html>".to_string(),
            elements: HashMap::new(),
            locators: Vec::new(),
            active_element: None,
            alert: None,
            prompt_input: None,
            script_result: Value::Null,
            timeouts: Timeouts::default(),
            failures: HashMap::new(),
            delays: HashMap::new(),
            calls: Vec::new(),
            quit: false,
        };
        Self {
            shared: Shared(Arc::new(Mutex::new(state))),
        }
    }

    /// Driver bound to the first window, top-level document
    pub fn driver(&self) -> ScriptedDriver {
        let window = self
            .shared
            .state()
            .windows
            .first()
            .cloned()
            .unwrap_or_default();
        ScriptedDriver::new(self.shared.clone(), window, Vec::new())
    }

    pub fn add_element(&self, by: By, spec: ElementSpec) -> &Self {
        self.shared.register(Scope::Document(None), by, spec);
        self
    }

    pub fn add_frame(&self, name: impl Into<String>) -> &Self {
        self.shared.state().frames.push(name.into());
        self
    }

    pub fn add_frame_element(&self, frame: &str, by: By, spec: ElementSpec) -> &Self {
        self.shared
            .register(Scope::Document(Some(frame.to_string())), by, spec);
        self
    }

    pub fn set_title(&self, url: impl Into<String>, title: impl Into<String>) -> &Self {
        self.shared.state().titles.insert(url.into(), title.into());
        self
    }

    pub fn set_page_source(&self, html: impl Into<String>) -> &Self {
        self.shared.state().page_source = html.into();
        self
    }

    pub fn set_script_result(&self, value: Value) -> &Self {
        self.shared.state().script_result = value;
        self
    }

    pub fn raise_alert(&self, text: impl Into<String>) -> &Self {
        let mut state = self.shared.state();
        state.alert = Some(text.into());
        state.prompt_input = None;
        self
    }

    /// Make the next call to `operation` fail with `error`
    pub fn fail_next(&self, operation: &str, error: DriverError) -> &Self {
        self.shared
            .state()
            .failures
            .entry(operation.to_string())
            .or_default()
            .push_back(error);
        self
    }

    /// Make every call to `operation` take at least `delay`
    pub fn delay(&self, operation: &str, delay: Duration) -> &Self {
        self.shared
            .state()
            .delays
            .insert(operation.to_string(), delay);
        self
    }

    /// Calls the primitives received, as `"<operation> <target id>"`
    pub fn calls(&self) -> Vec<String> {
        self.shared.state().calls.clone()
    }

    pub fn prompt_input(&self) -> Option<String> {
        self.shared.state().prompt_input.clone()
    }

    pub fn alert_open(&self) -> bool {
        self.shared.state().alert.is_some()
    }

    pub fn is_quit(&self) -> bool {
        self.shared.state().quit
    }

    pub fn element_attribute(&self, id: &str, name: &str) -> Option<String> {
        self.shared
            .state()
            .elements
            .get(id)
            .and_then(|spec| spec.attributes.get(name).cloned())
    }
}

#[derive(Debug, Clone)]
pub struct ScriptedDriver {
    id: String,
    window: String,
    frames: Vec<String>,
    shared: Shared,
}

impl ScriptedDriver {
    fn new(shared: Shared, window: String, frames: Vec<String>) -> Self {
        let session = shared.state().session_id.clone();
        let mut id = format!("{}/{}", session, window);
        for frame in &frames {
            id.push('/');
            id.push_str(frame);
        }
        Self {
            id,
            window,
            frames,
            shared,
        }
    }

    pub fn frames(&self) -> &[String] {
        &self.frames
    }

    fn scope(&self) -> Scope {
        Scope::Document(self.frames.last().cloned())
    }

    fn push_history(&self, url: &str) -> Result<()> {
        Url::parse(url).map_err(|e| DriverError::Navigation(format!("{}: {}", url, e)))?;
        let mut state = self.shared.state();
        let index = state.history_index + 1;
        state.history.truncate(index);
        state.history.push(url.to_string());
        state.history_index = index;
        Ok(())
    }
}

impl WebDriver for ScriptedDriver {
    fn id(&self) -> &str {
        &self.id
    }

    fn get(&self, url: &str) -> Result<()> {
        self.shared.begin("driver.get", &self.id)?;
        self.push_history(url)
    }

    fn current_url(&self) -> Result<String> {
        self.shared.begin("driver.getCurrentUrl", &self.id)?;
        let state = self.shared.state();
        Ok(state.history[state.history_index].clone())
    }

    fn title(&self) -> Result<String> {
        self.shared.begin("driver.getTitle", &self.id)?;
        let state = self.shared.state();
        let url = &state.history[state.history_index];
        Ok(state.titles.get(url).cloned().unwrap_or_default())
    }

    fn find_elements(&self, by: &By) -> Result<Vec<Box<dyn WebElement>>> {
        self.shared.begin("driver.findElements", &self.id)?;
        Ok(self.shared.find_all(&self.scope(), by))
    }

    fn find_element(&self, by: &By) -> Result<Box<dyn WebElement>> {
        self.shared.begin("driver.findElement", &self.id)?;
        self.shared
            .find_all(&self.scope(), by)
            .into_iter()
            .next()
            .ok_or_else(|| DriverError::NoSuchElement(by.to_string()))
    }

    fn page_source(&self) -> Result<String> {
        self.shared.begin("driver.getPageSource", &self.id)?;
        Ok(self.shared.state().page_source.clone())
    }

    fn close(&self) -> Result<()> {
        self.shared.begin("driver.close", &self.id)?;
        self.shared.state().windows.retain(|w| w != &self.window);
        Ok(())
    }

    fn quit(&self) -> Result<()> {
        self.shared.begin("driver.quit", &self.id)?;
        let mut state = self.shared.state();
        state.quit = true;
        state.windows.clear();
        Ok(())
    }

    fn window_handles(&self) -> Result<Vec<String>> {
        self.shared.begin("driver.getWindowHandles", &self.id)?;
        Ok(self.shared.state().windows.clone())
    }

    fn window_handle(&self) -> Result<String> {
        self.shared.begin("driver.getWindowHandle", &self.id)?;
        Ok(self.window.clone())
    }

    fn switch_to(&self) -> Box<dyn TargetLocator> {
        Box::new(ScriptedTargetLocator {
            driver: self.clone(),
        })
    }

    fn navigate(&self) -> Box<dyn Navigation> {
        Box::new(ScriptedNavigation {
            driver: self.clone(),
        })
    }

    fn manage(&self) -> Box<dyn Options> {
        Box::new(ScriptedOptions {
            shared: self.shared.clone(),
        })
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            browser_name: "scripted".to_string(),
            supports_javascript: true,
            supports_screenshots: true,
            supports_actions: true,
        }
    }

    fn execute_script(&self, _script: &str, _args: &[Value]) -> Result<Value> {
        self.shared.begin("driver.executeScript", &self.id)?;
        Ok(self.shared.state().script_result.clone())
    }

    fn execute_async_script(&self, _script: &str, _args: &[Value]) -> Result<Value> {
        self.shared.begin("driver.executeAsyncScript", &self.id)?;
        Ok(self.shared.state().script_result.clone())
    }

    fn screenshot_as(&self, output: OutputType) -> Result<Screenshot> {
        self.shared.begin("driver.getScreenshotAs", &self.id)?;
        Ok(Screenshot::encode(FAKE_PNG.to_vec(), output))
    }

    fn perform(&self, actions: &[InputAction]) -> Result<()> {
        self.shared.begin("driver.perform", &self.id)?;
        for action in actions {
            if let InputAction::Pause(duration) = action {
                thread::sleep(*duration);
            }
        }
        Ok(())
    }

    fn reset_input_state(&self) -> Result<()> {
        self.shared.begin("driver.resetInputState", &self.id)
    }
}

/// Driver that only has the base surface; capability calls are unsupported
#[derive(Debug, Clone)]
pub struct BareDriver(pub ScriptedDriver);

impl WebDriver for BareDriver {
    fn id(&self) -> &str {
        self.0.id()
    }

    fn get(&self, url: &str) -> Result<()> {
        self.0.get(url)
    }

    fn current_url(&self) -> Result<String> {
        self.0.current_url()
    }

    fn title(&self) -> Result<String> {
        self.0.title()
    }

    fn find_elements(&self, by: &By) -> Result<Vec<Box<dyn WebElement>>> {
        self.0.find_elements(by)
    }

    fn find_element(&self, by: &By) -> Result<Box<dyn WebElement>> {
        self.0.find_element(by)
    }

    fn page_source(&self) -> Result<String> {
        self.0.page_source()
    }

    fn close(&self) -> Result<()> {
        self.0.close()
    }

    fn quit(&self) -> Result<()> {
        self.0.quit()
    }

    fn window_handles(&self) -> Result<Vec<String>> {
        self.0.window_handles()
    }

    fn window_handle(&self) -> Result<String> {
        self.0.window_handle()
    }

    fn switch_to(&self) -> Box<dyn TargetLocator> {
        self.0.switch_to()
    }

    fn navigate(&self) -> Box<dyn Navigation> {
        self.0.navigate()
    }

    fn manage(&self) -> Box<dyn Options> {
        self.0.manage()
    }
}

#[derive(Debug, Clone)]
pub struct ScriptedElement {
    id: String,
    shared: Shared,
}

impl ScriptedElement {
    fn read<T>(&self, operation: &str, read: impl FnOnce(&ElementSpec) -> T) -> Result<T> {
        self.shared.begin(operation, &self.id)?;
        let state = self.shared.state();
        state
            .elements
            .get(&self.id)
            .map(read)
            .ok_or_else(|| DriverError::StaleElementReference(self.id.clone()))
    }

    fn write(&self, operation: &str, write: impl FnOnce(&mut ElementSpec)) -> Result<()> {
        self.shared.begin(operation, &self.id)?;
        let mut state = self.shared.state();
        state
            .elements
            .get_mut(&self.id)
            .map(write)
            .ok_or_else(|| DriverError::StaleElementReference(self.id.clone()))
    }
}

impl WebElement for ScriptedElement {
    fn id(&self) -> &str {
        &self.id
    }

    fn click(&self) -> Result<()> {
        self.write("element.click", |spec| {
            if spec.attributes.get("type").map(String::as_str) == Some("checkbox") {
                spec.selected = !spec.selected;
            }
        })?;
        self.shared.state().active_element = Some(self.id.clone());
        Ok(())
    }

    fn submit(&self) -> Result<()> {
        self.write("element.submit", |_| {})
    }

    fn send_keys(&self, keys: &str) -> Result<()> {
        self.write("element.sendKeys", |spec| {
            spec.attributes
                .entry("value".to_string())
                .or_default()
                .push_str(keys);
        })
    }

    fn clear(&self) -> Result<()> {
        self.write("element.clear", |spec| {
            spec.attributes.insert("value".to_string(), String::new());
        })
    }

    fn tag_name(&self) -> Result<String> {
        self.read("element.getTagName", |spec| spec.tag_name.clone())
    }

    fn attribute(&self, name: &str) -> Result<Option<String>> {
        self.read("element.getAttribute", |spec| {
            spec.attributes.get(name).cloned()
        })
    }

    fn is_selected(&self) -> Result<bool> {
        self.read("element.isSelected", |spec| spec.selected)
    }

    fn is_enabled(&self) -> Result<bool> {
        self.read("element.isEnabled", |spec| spec.enabled)
    }

    fn text(&self) -> Result<String> {
        self.read("element.getText", |spec| spec.text.clone())
    }

    fn find_elements(&self, by: &By) -> Result<Vec<Box<dyn WebElement>>> {
        self.shared.begin("element.findElements", &self.id)?;
        Ok(self
            .shared
            .find_all(&Scope::Element(self.id.clone()), by))
    }

    fn find_element(&self, by: &By) -> Result<Box<dyn WebElement>> {
        self.shared.begin("element.findElement", &self.id)?;
        self.shared
            .find_all(&Scope::Element(self.id.clone()), by)
            .into_iter()
            .next()
            .ok_or_else(|| DriverError::NoSuchElement(by.to_string()))
    }

    fn is_displayed(&self) -> Result<bool> {
        self.read("element.isDisplayed", |spec| spec.displayed)
    }

    fn location(&self) -> Result<Point> {
        self.read("element.getLocation", |spec| spec.rect.location())
    }

    fn size(&self) -> Result<Dimension> {
        self.read("element.getSize", |spec| spec.rect.size())
    }

    fn rect(&self) -> Result<Rect> {
        self.read("element.getRect", |spec| spec.rect)
    }

    fn css_value(&self, name: &str) -> Result<String> {
        self.read("element.getCssValue", |spec| {
            spec.css.get(name).cloned().unwrap_or_default()
        })
    }

    fn screenshot_as(&self, output: OutputType) -> Result<Screenshot> {
        self.read("element.getScreenshotAs", |_| {
            Screenshot::encode(FAKE_PNG.to_vec(), output)
        })
    }

    fn coordinates(&self) -> Coordinates {
        let state = self.shared.state();
        let location = state
            .elements
            .get(&self.id)
            .map(|spec| spec.rect.location())
            .unwrap_or_default();
        Coordinates {
            on_page: location,
            in_viewport: location,
        }
    }
}

#[derive(Debug)]
pub struct ScriptedTargetLocator {
    driver: ScriptedDriver,
}

impl ScriptedTargetLocator {
    fn enter_frame(&self, name: String) -> Box<dyn WebDriver> {
        let mut frames = self.driver.frames.clone();
        frames.push(name);
        Box::new(ScriptedDriver::new(
            self.driver.shared.clone(),
            self.driver.window.clone(),
            frames,
        ))
    }
}

impl TargetLocator for ScriptedTargetLocator {
    fn id(&self) -> &str {
        self.driver.id()
    }

    fn frame_by_index(&self, index: usize) -> Result<Box<dyn WebDriver>> {
        self.driver.shared.begin("targetLocator.frame", self.id())?;
        let name = self
            .driver
            .shared
            .state()
            .frames
            .get(index)
            .cloned()
            .ok_or_else(|| DriverError::NoSuchFrame(index.to_string()))?;
        Ok(self.enter_frame(name))
    }

    fn frame_by_name(&self, name_or_id: &str) -> Result<Box<dyn WebDriver>> {
        self.driver.shared.begin("targetLocator.frame", self.id())?;
        let known = self
            .driver
            .shared
            .state()
            .frames
            .iter()
            .any(|f| f == name_or_id);
        if !known {
            return Err(DriverError::NoSuchFrame(name_or_id.to_string()));
        }
        Ok(self.enter_frame(name_or_id.to_string()))
    }

    fn frame_by_element(&self, element: &dyn WebElement) -> Result<Box<dyn WebDriver>> {
        self.driver.shared.begin("targetLocator.frame", self.id())?;
        let name = {
            let state = self.driver.shared.state();
            let spec = state
                .elements
                .get(element.id())
                .ok_or_else(|| DriverError::StaleElementReference(element.id().to_string()))?;
            if spec.tag_name != "iframe" && spec.tag_name != "frame" {
                return Err(DriverError::NoSuchFrame(element.id().to_string()));
            }
            spec.attributes
                .get("name")
                .cloned()
                .unwrap_or_else(|| element.id().to_string())
        };
        Ok(self.enter_frame(name))
    }

    fn parent_frame(&self) -> Result<Box<dyn WebDriver>> {
        self.driver
            .shared
            .begin("targetLocator.parentFrame", self.id())?;
        let mut frames = self.driver.frames.clone();
        frames.pop();
        Ok(Box::new(ScriptedDriver::new(
            self.driver.shared.clone(),
            self.driver.window.clone(),
            frames,
        )))
    }

    fn window(&self, name_or_handle: &str) -> Result<Box<dyn WebDriver>> {
        self.driver.shared.begin("targetLocator.window", self.id())?;
        let known = self
            .driver
            .shared
            .state()
            .windows
            .iter()
            .any(|w| w == name_or_handle);
        if !known {
            return Err(DriverError::NoSuchWindow(name_or_handle.to_string()));
        }
        Ok(Box::new(ScriptedDriver::new(
            self.driver.shared.clone(),
            name_or_handle.to_string(),
            Vec::new(),
        )))
    }

    fn new_window(&self, _kind: WindowType) -> Result<Box<dyn WebDriver>> {
        self.driver
            .shared
            .begin("targetLocator.newWindow", self.id())?;
        let handle = Uuid::new_v4().to_string();
        self.driver.shared.state().windows.push(handle.clone());
        Ok(Box::new(ScriptedDriver::new(
            self.driver.shared.clone(),
            handle,
            Vec::new(),
        )))
    }

    fn default_content(&self) -> Result<Box<dyn WebDriver>> {
        self.driver
            .shared
            .begin("targetLocator.defaultContent", self.id())?;
        Ok(Box::new(ScriptedDriver::new(
            self.driver.shared.clone(),
            self.driver.window.clone(),
            Vec::new(),
        )))
    }

    fn active_element(&self) -> Result<Box<dyn WebElement>> {
        self.driver
            .shared
            .begin("targetLocator.activeElement", self.id())?;
        let active = self.driver.shared.state().active_element.clone();
        let id = active.ok_or_else(|| DriverError::NoSuchElement("active element".to_string()))?;
        Ok(Box::new(ScriptedElement {
            id,
            shared: self.driver.shared.clone(),
        }))
    }

    fn alert(&self) -> Result<Box<dyn Alert>> {
        if self.driver.shared.state().alert.is_none() {
            return Err(DriverError::NoAlertPresent);
        }
        Ok(Box::new(ScriptedAlert {
            id: format!("{}/alert", self.driver.id),
            shared: self.driver.shared.clone(),
        }))
    }
}

#[derive(Debug)]
pub struct ScriptedNavigation {
    driver: ScriptedDriver,
}

impl Navigation for ScriptedNavigation {
    fn id(&self) -> &str {
        self.driver.id()
    }

    fn back(&self) -> Result<()> {
        self.driver.shared.begin("navigation.back", self.id())?;
        let mut state = self.driver.shared.state();
        state.history_index = state.history_index.saturating_sub(1);
        Ok(())
    }

    fn forward(&self) -> Result<()> {
        self.driver.shared.begin("navigation.forward", self.id())?;
        let mut state = self.driver.shared.state();
        if state.history_index + 1 < state.history.len() {
            state.history_index += 1;
        }
        Ok(())
    }

    fn to(&self, url: &str) -> Result<()> {
        self.driver.shared.begin("navigation.to", self.id())?;
        self.driver.push_history(url)
    }

    fn to_url(&self, url: &Url) -> Result<()> {
        self.driver.shared.begin("navigation.to", self.id())?;
        self.driver.push_history(url.as_str())
    }

    fn refresh(&self) -> Result<()> {
        self.driver.shared.begin("navigation.refresh", self.id())
    }
}

#[derive(Debug)]
pub struct ScriptedAlert {
    id: String,
    shared: Shared,
}

impl ScriptedAlert {
    fn close(&self) -> Result<()> {
        let mut state = self.shared.state();
        state
            .alert
            .take()
            .map(|_| ())
            .ok_or(DriverError::NoAlertPresent)
    }
}

impl Alert for ScriptedAlert {
    fn id(&self) -> &str {
        &self.id
    }

    fn dismiss(&self) -> Result<()> {
        self.shared.begin("alert.dismiss", &self.id)?;
        self.shared.state().prompt_input = None;
        self.close()
    }

    fn accept(&self) -> Result<()> {
        self.shared.begin("alert.accept", &self.id)?;
        self.close()
    }

    fn text(&self) -> Result<String> {
        self.shared.begin("alert.getText", &self.id)?;
        self.shared
            .state()
            .alert
            .clone()
            .ok_or(DriverError::NoAlertPresent)
    }

    fn send_keys(&self, keys: &str) -> Result<()> {
        self.shared.begin("alert.sendKeys", &self.id)?;
        let mut state = self.shared.state();
        if state.alert.is_none() {
            return Err(DriverError::NoAlertPresent);
        }
        state.prompt_input = Some(keys.to_string());
        Ok(())
    }
}

#[derive(Debug)]
pub struct ScriptedOptions {
    shared: Shared,
}

impl Options for ScriptedOptions {
    fn timeouts(&self) -> Result<Timeouts> {
        Ok(self.shared.state().timeouts)
    }

    fn set_timeouts(&self, timeouts: Timeouts) -> Result<()> {
        self.shared.state().timeouts = timeouts;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Before,
    Success,
    Failure,
}

/// One hook callback as seen by [`RecordingHook`]
#[derive(Debug, Clone)]
pub struct HookEvent {
    pub phase: Phase,
    pub name: &'static str,
    pub source: Source,
    pub params: Vec<Value>,
    pub elapsed: Option<Duration>,
    pub detail: Option<String>,
    pub error: Option<DriverError>,
}

/// Hook that remembers every callback it receives
#[derive(Debug, Default)]
pub struct RecordingHook {
    events: Mutex<Vec<HookEvent>>,
}

impl RecordingHook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<HookEvent> {
        lock(&self.events).clone()
    }

    /// `"before element.click"`, `"success element.click"`, ...
    pub fn timeline(&self) -> Vec<String> {
        lock(&self.events)
            .iter()
            .map(|event| {
                let phase = match event.phase {
                    Phase::Before => "before",
                    Phase::Success => "success",
                    Phase::Failure => "failure",
                };
                format!("{} {}", phase, event.name)
            })
            .collect()
    }

    pub fn count(&self, phase: Phase) -> usize {
        lock(&self.events)
            .iter()
            .filter(|event| event.phase == phase)
            .count()
    }

    pub fn clear(&self) {
        lock(&self.events).clear();
    }

    fn push(
        &self,
        phase: Phase,
        invocation: &Invocation,
        detail: Option<String>,
        error: Option<DriverError>,
    ) {
        lock(&self.events).push(HookEvent {
            phase,
            name: invocation.name(),
            source: invocation.source().clone(),
            params: invocation.params().to_vec(),
            elapsed: invocation.elapsed(),
            detail,
            error,
        });
    }
}

impl InterceptionHook for RecordingHook {
    fn on_before(&self, invocation: &Invocation) -> Result<()> {
        self.push(Phase::Before, invocation, None, None);
        Ok(())
    }

    fn on_after_success(&self, invocation: &Invocation, result: &dyn Describe) -> Result<()> {
        self.push(
            Phase::Success,
            invocation,
            Some(result.describe().to_string()),
            None,
        );
        Ok(())
    }

    fn on_after_failure(&self, invocation: &Invocation, error: &DriverError) {
        self.push(Phase::Failure, invocation, None, Some(error.clone()));
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Info,
    Error,
}

/// Log sink that keeps every line in memory
#[derive(Debug, Default)]
pub struct CapturingSink {
    lines: Mutex<Vec<(LogLevel, String)>>,
}

impl CapturingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> Vec<(LogLevel, String)> {
        lock(&self.lines).clone()
    }

    pub fn lines(&self, level: LogLevel) -> Vec<String> {
        lock(&self.lines)
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, line)| line.clone())
            .collect()
    }

    pub fn count(&self, level: LogLevel) -> usize {
        lock(&self.lines).iter().filter(|(l, _)| *l == level).count()
    }
}

impl LogSink for CapturingSink {
    fn trace(&self, message: &str) {
        lock(&self.lines).push((LogLevel::Trace, message.to_string()));
    }

    fn info(&self, message: &str) {
        lock(&self.lines).push((LogLevel::Info, message.to_string()));
    }

    fn error(&self, message: &str) {
        lock(&self.lines).push((LogLevel::Error, message.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_find_and_children() {
        let browser = ScriptedBrowser::new();
        browser.add_element(
            By::css("ul"),
            ElementSpec::new("ul")
                .with_child(By::css("li"), ElementSpec::new("li").with_text("one"))
                .with_child(By::css("li"), ElementSpec::new("li").with_text("two")),
        );
        let driver = browser.driver();

        let list = driver.find_element(&By::css("ul")).unwrap();
        let items = list.find_elements(&By::css("li")).unwrap();
        let texts: Vec<String> = items.iter().map(|i| i.text().unwrap()).collect();
        assert_eq!(texts, vec!["one", "two"]);
    }

    #[test]
    fn test_missing_element_is_not_found() {
        let driver = ScriptedBrowser::new().driver();
        let err = driver.find_element(&By::id("nope")).unwrap_err();
        assert_eq!(err, DriverError::NoSuchElement("By.id: nope".to_string()));
    }

    #[test]
    fn test_fail_next_is_one_shot() {
        let browser = ScriptedBrowser::new();
        browser.fail_next("driver.getTitle", DriverError::Timeout("slow".to_string()));
        let driver = browser.driver();

        assert!(driver.title().is_err());
        assert!(driver.title().is_ok());
    }

    #[test]
    fn test_history_navigation() {
        let browser = ScriptedBrowser::new();
        let driver = browser.driver();
        driver.get("https://a.example/").unwrap();
        driver.get("https://b.example/").unwrap();

        driver.navigate().back().unwrap();
        assert_eq!(driver.current_url().unwrap(), "https://a.example/");
        driver.navigate().forward().unwrap();
        assert_eq!(driver.current_url().unwrap(), "https://b.example/");
    }

    #[test]
    fn test_bare_driver_lacks_capabilities() {
        let driver = BareDriver(ScriptedBrowser::new().driver());
        assert_eq!(
            driver.execute_script("return 1", &[]).unwrap_err(),
            DriverError::Unsupported("executeScript".to_string())
        );
    }
}
