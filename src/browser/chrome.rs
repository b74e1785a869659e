use headless_chrome::protocol::cdp::types::Event;
use headless_chrome::protocol::cdp::{Page, Target};
use headless_chrome::{Browser, LaunchOptions, Tab};
use serde_json::Value;
use std::collections::HashMap;
use std::ffi::OsStr;
use std::fmt;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};
use url::Url;
use uuid::Uuid;

use crate::browser::dialog::DialogSlot;
use crate::browser::scripts::{self, FrameSelector};
use crate::config::BrowserConfig;
use crate::driver::{Alert, Navigation, Options, TargetLocator, WebDriver, WebElement};
use crate::errors::{DriverError, Result};
use crate::types::{
    By, Capabilities, Coordinates, Dimension, InputAction, OutputType, Point, Rect, Screenshot,
    Timeouts, WindowType,
};

const POLL_INTERVAL: Duration = Duration::from_millis(50);
const NAVIGATION_SETTLE: Duration = Duration::from_millis(100);

/// State shared by every view onto one browser session
struct Session {
    browser: Browser,
    prefix: String,
    timeouts: Mutex<Timeouts>,
    dialogs: Mutex<HashMap<String, Arc<DialogSlot>>>,
}

impl Session {
    fn timeouts(&self) -> Timeouts {
        *self.timeouts.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn tabs(&self) -> Vec<Arc<Tab>> {
        self.browser
            .get_tabs()
            .lock()
            .map(|tabs| tabs.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    /// Top-level context for `tab`, watching its dialogs from the first call
    fn open(self: &Arc<Self>, tab: Arc<Tab>) -> Result<Context> {
        let handle = tab.get_target_id().to_string();
        let mut dialogs = self
            .dialogs
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let dialog = match dialogs.get(&handle) {
            Some(slot) => slot.clone(),
            None => {
                let slot = Arc::new(DialogSlot::new());
                let listener = slot.clone();
                tab.add_event_listener(Arc::new(move |event: &Event| listener.observe(event)))
                    .map_err(DriverError::from_any_error)?;
                dialogs.insert(handle, slot.clone());
                slot
            }
        };
        Ok(Context {
            session: self.clone(),
            tab,
            frames: vec![],
            dialog,
        })
    }

    fn forget(&self, handle: &str) {
        self.dialogs
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(handle);
    }
}

/// One tab plus a frame path inside it
#[derive(Clone)]
struct Context {
    session: Arc<Session>,
    tab: Arc<Tab>,
    frames: Vec<FrameSelector>,
    dialog: Arc<DialogSlot>,
}

impl Context {
    fn handle(&self) -> String {
        self.tab.get_target_id().to_string()
    }

    fn view_id(&self) -> String {
        let mut id = self.handle();
        for hop in &self.frames {
            match hop {
                FrameSelector::Index(index) => id.push_str(&format!("/{}", index)),
                FrameSelector::Name(name) => id.push_str(&format!("/{}", name)),
                FrameSelector::Element(element) => id.push_str(&format!("/{}", element)),
            }
        }
        id
    }

    fn with_frames(&self, frames: Vec<FrameSelector>) -> Self {
        Self {
            session: self.session.clone(),
            tab: self.tab.clone(),
            frames,
            dialog: self.dialog.clone(),
        }
    }

    fn blocked(&self) -> Result<()> {
        match self.dialog.current() {
            Some(dialog) => Err(DriverError::UnexpectedAlertOpen(dialog.message)),
            None => Ok(()),
        }
    }

    /// Evaluate on a helper thread so a dialog opened by the script does not
    /// hold the caller. The thread finishes once the dialog is answered.
    fn evaluate(&self, script: &str, await_promise: bool) -> Result<Value> {
        self.blocked()?;
        let (tx, rx) = mpsc::channel();
        let tab = self.tab.clone();
        let script = script.to_string();
        thread::spawn(move || {
            let _ = tx.send(tab.evaluate(&script, await_promise));
        });
        loop {
            match rx.recv_timeout(POLL_INTERVAL) {
                Ok(remote) => {
                    let remote = remote.map_err(|e| DriverError::JavaScript(e.to_string()))?;
                    return scripts::unwrap_envelope(remote.value);
                }
                Err(RecvTimeoutError::Timeout) => self.blocked()?,
                Err(RecvTimeoutError::Disconnected) => {
                    return Err(DriverError::JavaScript(
                        "evaluation ended without a result".to_string(),
                    ))
                }
            }
        }
    }

    /// Like [`Context::evaluate`], but a dialog opened by the script counts
    /// as completion and yields `null`
    fn evaluate_until_dialog(&self, script: &str, await_promise: bool) -> Result<Value> {
        self.blocked()?;
        match self.evaluate(script, await_promise) {
            Err(DriverError::UnexpectedAlertOpen(message)) => {
                tracing::debug!(target_id = %self.handle(), %message, "script raised a dialog");
                Ok(Value::Null)
            }
            other => other,
        }
    }

    fn wrapped(&self, body: &str) -> String {
        scripts::wrap(&self.frames, &self.session.prefix, body)
    }

    fn run(&self, body: &str) -> Result<Value> {
        self.evaluate(&self.wrapped(body), false)
    }

    fn run_top(&self, body: &str) -> Result<Value> {
        self.evaluate(&scripts::wrap(&[], &self.session.prefix, body), false)
    }

    fn navigate_to(&self, url: &str) -> Result<()> {
        self.blocked()?;
        self.tab
            .navigate_to(url)
            .map_err(|e| DriverError::Navigation(e.to_string()))?;
        self.settle()
    }

    fn navigate_by_script(&self, body: &str) -> Result<()> {
        self.evaluate_until_dialog(&scripts::wrap(&[], &self.session.prefix, body), false)?;
        thread::sleep(NAVIGATION_SETTLE);
        self.settle()
    }

    /// Wait for the load to finish. A dialog raised while loading (including
    /// beforeunload) ends the wait and is left open for the alert API.
    fn settle(&self) -> Result<()> {
        if self.dialog.is_open() {
            return Ok(());
        }
        match self.tab.wait_until_navigated() {
            Ok(_) => Ok(()),
            Err(_) if self.dialog.is_open() => Ok(()),
            Err(e) => Err(DriverError::Navigation(e.to_string())),
        }
    }

    /// Element ids matching `by`, polling until the implicit wait runs out
    fn find_ids(&self, by: &By, root_expr: &str) -> Result<Vec<String>> {
        let body = scripts::find_body(by, root_expr)?;
        let deadline = Instant::now() + self.session.timeouts().implicit_wait;
        loop {
            let found: Vec<String> = serde_json::from_value(self.run(&body)?)?;
            if !found.is_empty() || Instant::now() >= deadline {
                return Ok(found);
            }
            thread::sleep(POLL_INTERVAL);
        }
    }

    fn elements(&self, ids: Vec<String>) -> Vec<Box<dyn WebElement>> {
        ids.into_iter()
            .map(|id| Box::new(ChromeElement::new(id, self.clone())) as Box<dyn WebElement>)
            .collect()
    }

    fn first_element(&self, by: &By, root_expr: &str) -> Result<Box<dyn WebElement>> {
        let id = self
            .find_ids(by, root_expr)?
            .into_iter()
            .next()
            .ok_or_else(|| DriverError::NoSuchElement(by.to_string()))?;
        Ok(Box::new(ChromeElement::new(id, self.clone())))
    }

    fn capture(&self, clip: Option<Page::Viewport>, output: OutputType) -> Result<Screenshot> {
        let png = self
            .tab
            .capture_screenshot(Page::CaptureScreenshotFormatOption::Png, None, clip, true)
            .map_err(|e| DriverError::Screenshot(e.to_string()))?;
        Ok(Screenshot::encode(png, output))
    }

    fn driver(self) -> Box<dyn WebDriver> {
        Box::new(ChromeDriver::from_context(self))
    }
}

/// `Target.createTarget` parameters for a new blank tab or window
fn create_target(kind: WindowType) -> Target::CreateTarget {
    Target::CreateTarget {
        url: "about:blank".to_string(),
        left: None,
        top: None,
        width: None,
        height: None,
        window_state: None,
        browser_context_id: None,
        enable_begin_frame_control: None,
        new_window: Some(kind == WindowType::Window),
        background: None,
        for_tab: None,
        hidden: None,
    }
}

/// A [`WebDriver`] backed by a headless Chrome tab.
///
/// Page interaction goes through injected JavaScript. Found elements are kept
/// in a registry on the top window and addressed by id. JavaScript dialogs are
/// watched through the protocol and answered through [`Alert`].
pub struct ChromeDriver {
    id: String,
    ctx: Context,
}

impl ChromeDriver {
    /// Launch a browser and open its first tab
    pub fn launch(config: &BrowserConfig) -> Result<Self> {
        let window_size_arg = format!(
            "--window-size={},{}",
            config.viewport.width, config.viewport.height
        );

        let user_agent_arg = config
            .user_agent
            .as_ref()
            .map(|ua| format!("--user-agent={}", ua));

        let mut args = vec![
            OsStr::new("--no-sandbox"),
            OsStr::new("--disable-dev-shm-usage"),
            OsStr::new(&window_size_arg),
        ];

        if let Some(ref ua_arg) = user_agent_arg {
            args.push(OsStr::new(ua_arg));
        }

        if config.disable_images {
            args.push(OsStr::new("--blink-settings=imagesEnabled=false"));
        }

        for arg in &config.args {
            args.push(OsStr::new(arg));
        }

        let launch_options = LaunchOptions::default_builder()
            .headless(config.headless)
            .args(args)
            .build()
            .map_err(|e| DriverError::LaunchFailed(e.to_string()))?;

        let browser =
            Browser::new(launch_options).map_err(|e| DriverError::LaunchFailed(e.to_string()))?;

        let tab = browser
            .new_tab()
            .map_err(|e| DriverError::LaunchFailed(e.to_string()))?;
        tab.set_default_timeout(config.timeout());

        let timeouts = Timeouts {
            page_load: config.timeout(),
            ..Timeouts::default()
        };

        tracing::debug!(target_id = %tab.get_target_id(), "chrome session started");

        let session = Arc::new(Session {
            browser,
            prefix: Uuid::new_v4().to_string(),
            timeouts: Mutex::new(timeouts),
            dialogs: Mutex::new(HashMap::new()),
        });

        Ok(Self::from_context(session.open(tab)?))
    }

    fn from_context(ctx: Context) -> Self {
        Self {
            id: ctx.view_id(),
            ctx,
        }
    }

    fn tabs(&self) -> Vec<Arc<Tab>> {
        self.ctx.session.tabs()
    }
}

impl fmt::Debug for ChromeDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChromeDriver")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

impl WebDriver for ChromeDriver {
    fn id(&self) -> &str {
        &self.id
    }

    fn get(&self, url: &str) -> Result<()> {
        self.ctx.navigate_to(url)
    }

    fn current_url(&self) -> Result<String> {
        Ok(self.ctx.tab.get_url())
    }

    fn title(&self) -> Result<String> {
        let title = self.ctx.run_top("return window.top.document.title;")?;
        Ok(title.as_str().unwrap_or("").to_string())
    }

    fn find_elements(&self, by: &By) -> Result<Vec<Box<dyn WebElement>>> {
        let ids = self.ctx.find_ids(by, "doc")?;
        Ok(self.ctx.elements(ids))
    }

    fn find_element(&self, by: &By) -> Result<Box<dyn WebElement>> {
        self.ctx.first_element(by, "doc")
    }

    fn page_source(&self) -> Result<String> {
        let html = self.ctx.run("return doc.documentElement.outerHTML;")?;
        Ok(html.as_str().unwrap_or("").to_string())
    }

    fn close(&self) -> Result<()> {
        self.ctx
            .tab
            .close(true)
            .map_err(DriverError::from_any_error)?;
        self.ctx.session.forget(&self.ctx.handle());
        Ok(())
    }

    fn quit(&self) -> Result<()> {
        for tab in self.tabs() {
            tab.close(false)
                .map_err(DriverError::from_any_error)?;
            self.ctx.session.forget(tab.get_target_id());
        }
        tracing::debug!(session = %self.ctx.session.prefix, "chrome session closed");
        Ok(())
    }

    fn window_handles(&self) -> Result<Vec<String>> {
        Ok(self
            .tabs()
            .iter()
            .map(|tab| tab.get_target_id().to_string())
            .collect())
    }

    fn window_handle(&self) -> Result<String> {
        Ok(self.ctx.handle())
    }

    fn switch_to(&self) -> Box<dyn TargetLocator> {
        Box::new(ChromeTargetLocator {
            id: self.id.clone(),
            ctx: self.ctx.clone(),
        })
    }

    fn navigate(&self) -> Box<dyn Navigation> {
        Box::new(ChromeNavigation {
            id: self.id.clone(),
            ctx: self.ctx.clone(),
        })
    }

    fn manage(&self) -> Box<dyn Options> {
        Box::new(ChromeOptions {
            ctx: self.ctx.clone(),
        })
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            browser_name: "chrome".to_string(),
            supports_javascript: true,
            supports_screenshots: true,
            supports_actions: true,
        }
    }

    fn execute_script(&self, script: &str, args: &[Value]) -> Result<Value> {
        let body = scripts::user_script(script, args);
        self.ctx.evaluate_until_dialog(&self.ctx.wrapped(&body), false)
    }

    fn execute_async_script(&self, script: &str, args: &[Value]) -> Result<Value> {
        let timeout = self.ctx.session.timeouts().script;
        let wrapped = scripts::wrap_async(
            &self.ctx.frames,
            &self.ctx.session.prefix,
            script,
            args,
            timeout.as_millis() as u64,
        );
        self.ctx.evaluate_until_dialog(&wrapped, true)
    }

    fn screenshot_as(&self, output: OutputType) -> Result<Screenshot> {
        self.ctx.capture(None, output)
    }

    fn perform(&self, actions: &[InputAction]) -> Result<()> {
        for action in actions {
            match action {
                InputAction::KeyPress(key) => {
                    self.ctx
                        .tab
                        .press_key(key)
                        .map_err(DriverError::from_any_error)?;
                }
                InputAction::Type(text) => {
                    self.ctx
                        .tab
                        .type_str(text)
                        .map_err(DriverError::from_any_error)?;
                }
                InputAction::Pause(duration) => thread::sleep(*duration),
                InputAction::MoveTo(_) | InputAction::Click(_) => {
                    return Err(DriverError::unsupported("perform: pointer actions"));
                }
            }
        }
        Ok(())
    }

    fn reset_input_state(&self) -> Result<()> {
        // Keys are pressed and released within one action, nothing stays held.
        Ok(())
    }
}

pub struct ChromeElement {
    id: String,
    ctx: Context,
}

impl ChromeElement {
    fn new(id: String, ctx: Context) -> Self {
        Self { id, ctx }
    }

    fn body(&self, body: &str) -> String {
        format!("var el = {}; {}", scripts::element_root(&self.id), body)
    }

    fn run(&self, body: &str) -> Result<Value> {
        self.ctx.run(&self.body(body))
    }

    /// For actions whose page handlers may open a dialog
    fn trigger(&self, body: &str) -> Result<()> {
        let script = self.ctx.wrapped(&self.body(body));
        self.ctx.evaluate_until_dialog(&script, false).map(|_| ())
    }

    fn string(&self, body: &str) -> Result<String> {
        Ok(self.run(body)?.as_str().unwrap_or("").to_string())
    }

    fn bool(&self, body: &str) -> Result<bool> {
        Ok(self.run(body)?.as_bool().unwrap_or(false))
    }
}

impl fmt::Debug for ChromeElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChromeElement")
            .field("id", &self.id)
            .field("frames", &self.ctx.frames)
            .finish_non_exhaustive()
    }
}

impl WebElement for ChromeElement {
    fn id(&self) -> &str {
        &self.id
    }

    fn click(&self) -> Result<()> {
        self.trigger(
            "el.scrollIntoView({ block: 'center' }); if (el.focus) el.focus(); el.click(); return null;",
        )
    }

    fn submit(&self) -> Result<()> {
        self.trigger(
            r#"
            var form = el.form || el.closest('form');
            if (!form) fail('invalid argument', 'element is not inside a form');
            if (form.requestSubmit) form.requestSubmit(); else form.submit();
            return null;
            "#,
        )
    }

    fn send_keys(&self, keys: &str) -> Result<()> {
        self.run(&format!(
            r#"
            var keys = {};
            if (el.focus) el.focus();
            if ('value' in el) el.value += keys;
            else if (el.isContentEditable) el.textContent += keys;
            else fail('invalid argument', 'element does not accept text');
            el.dispatchEvent(new Event('input', {{ bubbles: true }}));
            el.dispatchEvent(new Event('change', {{ bubbles: true }}));
            return null;
            "#,
            scripts::js_string(keys)
        ))?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.run(
            r#"
            if ('value' in el) el.value = '';
            else if (el.isContentEditable) el.textContent = '';
            el.dispatchEvent(new Event('input', { bubbles: true }));
            el.dispatchEvent(new Event('change', { bubbles: true }));
            return null;
            "#,
        )?;
        Ok(())
    }

    fn tag_name(&self) -> Result<String> {
        self.string("return el.tagName.toLowerCase();")
    }

    fn attribute(&self, name: &str) -> Result<Option<String>> {
        let value = self.run(&format!(
            "return el.getAttribute({});",
            scripts::js_string(name)
        ))?;
        Ok(value.as_str().map(str::to_string))
    }

    fn is_selected(&self) -> Result<bool> {
        self.bool("return !!(el.checked || el.selected);")
    }

    fn is_enabled(&self) -> Result<bool> {
        self.bool("return !el.disabled;")
    }

    fn text(&self) -> Result<String> {
        self.string("return el.innerText || el.textContent || '';")
    }

    fn find_elements(&self, by: &By) -> Result<Vec<Box<dyn WebElement>>> {
        let ids = self.ctx.find_ids(by, &scripts::element_root(&self.id))?;
        Ok(self.ctx.elements(ids))
    }

    fn find_element(&self, by: &By) -> Result<Box<dyn WebElement>> {
        self.ctx.first_element(by, &scripts::element_root(&self.id))
    }

    fn is_displayed(&self) -> Result<bool> {
        self.bool(
            r#"
            var style = win.getComputedStyle(el);
            var box = el.getBoundingClientRect();
            return style.display !== 'none' && style.visibility !== 'hidden' && box.width > 0 && box.height > 0;
            "#,
        )
    }

    fn location(&self) -> Result<Point> {
        Ok(self.rect()?.location())
    }

    fn size(&self) -> Result<Dimension> {
        Ok(self.rect()?.size())
    }

    fn rect(&self) -> Result<Rect> {
        let value = self.run(
            r#"
            var box = el.getBoundingClientRect();
            return { x: box.left + win.scrollX, y: box.top + win.scrollY, width: box.width, height: box.height };
            "#,
        )?;
        Ok(serde_json::from_value(value)?)
    }

    fn css_value(&self, name: &str) -> Result<String> {
        self.string(&format!(
            "return win.getComputedStyle(el).getPropertyValue({});",
            scripts::js_string(name)
        ))
    }

    fn screenshot_as(&self, output: OutputType) -> Result<Screenshot> {
        // Clip coordinates are relative to the top document, not the frame.
        let rect: Rect = serde_json::from_value(self.run(scripts::PAGE_RECT)?)?;
        let clip = Page::Viewport {
            x: rect.x,
            y: rect.y,
            width: rect.width,
            height: rect.height,
            scale: 1.0,
        };
        self.ctx.capture(Some(clip), output)
    }

    fn coordinates(&self) -> Coordinates {
        let value = self.run(
            r#"
            var box = el.getBoundingClientRect();
            return {
                on_page: { x: box.left + win.scrollX, y: box.top + win.scrollY },
                in_viewport: { x: box.left, y: box.top }
            };
            "#,
        );
        let coordinates = value.and_then(|value| {
            serde_json::from_value::<Coordinates>(value).map_err(DriverError::from)
        });
        match coordinates {
            Ok(coordinates) => coordinates,
            Err(e) => {
                tracing::debug!(element = %self.id, error = %e, "coordinates unavailable");
                Coordinates::default()
            }
        }
    }
}

struct ChromeTargetLocator {
    id: String,
    ctx: Context,
}

impl ChromeTargetLocator {
    fn enter(&self, hop: FrameSelector) -> Result<Box<dyn WebDriver>> {
        let mut frames = self.ctx.frames.clone();
        frames.push(hop);
        let ctx = self.ctx.with_frames(frames);
        // Resolving the path fails with "no such frame" when a hop is missing.
        ctx.run("return true;")?;
        Ok(ctx.driver())
    }

    /// Match a target id first, then `window.name`
    fn find_window(&self, name_or_handle: &str) -> Result<Option<Context>> {
        let session = &self.ctx.session;
        let tabs = session.tabs();
        if let Some(tab) = tabs
            .iter()
            .find(|tab| tab.get_target_id().as_str() == name_or_handle)
        {
            return session.open(tab.clone()).map(Some);
        }
        for tab in tabs {
            let ctx = session.open(tab)?;
            match ctx.run_top("return window.name;") {
                Ok(Value::String(name)) if name == name_or_handle => return Ok(Some(ctx)),
                Ok(_) => {}
                Err(e) => {
                    tracing::debug!(target_id = %ctx.handle(), error = %e, "window name unavailable");
                }
            }
        }
        Ok(None)
    }
}

impl fmt::Debug for ChromeTargetLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChromeTargetLocator")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

impl TargetLocator for ChromeTargetLocator {
    fn id(&self) -> &str {
        &self.id
    }

    fn frame_by_index(&self, index: usize) -> Result<Box<dyn WebDriver>> {
        self.enter(FrameSelector::Index(index))
    }

    fn frame_by_name(&self, name_or_id: &str) -> Result<Box<dyn WebDriver>> {
        self.enter(FrameSelector::Name(name_or_id.to_string()))
    }

    fn frame_by_element(&self, element: &dyn WebElement) -> Result<Box<dyn WebDriver>> {
        self.enter(FrameSelector::Element(element.id().to_string()))
    }

    fn parent_frame(&self) -> Result<Box<dyn WebDriver>> {
        let mut frames = self.ctx.frames.clone();
        frames.pop();
        Ok(self.ctx.with_frames(frames).driver())
    }

    fn window(&self, name_or_handle: &str) -> Result<Box<dyn WebDriver>> {
        let ctx = self
            .find_window(name_or_handle)?
            .ok_or_else(|| DriverError::NoSuchWindow(name_or_handle.to_string()))?;
        Ok(ctx.driver())
    }

    fn new_window(&self, kind: WindowType) -> Result<Box<dyn WebDriver>> {
        let tab = self
            .ctx
            .session
            .browser
            .new_tab_with_options(create_target(kind))
            .map_err(DriverError::from_any_error)?;
        tracing::debug!(kind = %kind, target_id = %tab.get_target_id(), "opened window");
        Ok(self.ctx.session.open(tab)?.driver())
    }

    fn default_content(&self) -> Result<Box<dyn WebDriver>> {
        Ok(self.ctx.with_frames(vec![]).driver())
    }

    fn active_element(&self) -> Result<Box<dyn WebElement>> {
        let id = self.ctx.run(
            "var el = doc.activeElement; if (!el) fail('no such element', 'no active element'); return register(el);",
        )?;
        let id: String = serde_json::from_value(id)?;
        Ok(Box::new(ChromeElement::new(id, self.ctx.clone())))
    }

    fn alert(&self) -> Result<Box<dyn Alert>> {
        let grace = self.ctx.session.timeouts().implicit_wait.max(POLL_INTERVAL);
        if self.ctx.dialog.wait(grace).is_none() {
            return Err(DriverError::NoAlertPresent);
        }
        Ok(Box::new(ChromeAlert {
            id: format!("{}/alert", self.ctx.handle()),
            ctx: self.ctx.clone(),
        }))
    }
}

struct ChromeNavigation {
    id: String,
    ctx: Context,
}

impl fmt::Debug for ChromeNavigation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChromeNavigation")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

impl Navigation for ChromeNavigation {
    fn id(&self) -> &str {
        &self.id
    }

    fn back(&self) -> Result<()> {
        self.ctx
            .navigate_by_script("window.top.history.back(); return null;")
    }

    fn forward(&self) -> Result<()> {
        self.ctx
            .navigate_by_script("window.top.history.forward(); return null;")
    }

    fn to(&self, url: &str) -> Result<()> {
        self.ctx.navigate_to(url)
    }

    fn to_url(&self, url: &Url) -> Result<()> {
        self.ctx.navigate_to(url.as_str())
    }

    fn refresh(&self) -> Result<()> {
        self.ctx
            .navigate_by_script("window.top.location.reload(); return null;")
    }
}

struct ChromeAlert {
    id: String,
    ctx: Context,
}

impl ChromeAlert {
    fn answer(&self, accept: bool) -> Result<()> {
        let dialog = self.ctx.dialog.current().ok_or(DriverError::NoAlertPresent)?;
        self.ctx
            .tab
            .call_method(dialog.answer(accept))
            .map_err(DriverError::from_any_error)?;
        self.ctx.dialog.close();
        Ok(())
    }
}

impl fmt::Debug for ChromeAlert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChromeAlert")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

impl Alert for ChromeAlert {
    fn id(&self) -> &str {
        &self.id
    }

    fn dismiss(&self) -> Result<()> {
        self.answer(false)
    }

    fn accept(&self) -> Result<()> {
        self.answer(true)
    }

    fn text(&self) -> Result<String> {
        self.ctx
            .dialog
            .current()
            .map(|dialog| dialog.message)
            .ok_or(DriverError::NoAlertPresent)
    }

    fn send_keys(&self, keys: &str) -> Result<()> {
        self.ctx.dialog.send_keys(keys)
    }
}

struct ChromeOptions {
    ctx: Context,
}

impl fmt::Debug for ChromeOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChromeOptions")
            .field("timeouts", &self.ctx.session.timeouts())
            .finish()
    }
}

impl Options for ChromeOptions {
    fn timeouts(&self) -> Result<Timeouts> {
        Ok(self.ctx.session.timeouts())
    }

    fn set_timeouts(&self, timeouts: Timeouts) -> Result<()> {
        self.ctx.tab.set_default_timeout(timeouts.page_load);
        *self
            .ctx
            .session
            .timeouts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = timeouts;
        Ok(())
    }
}
