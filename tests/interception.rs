// Integration tests for the event-firing decorators
//
// Everything here runs against the scripted backend from
// `driver_interceptor::testing`, so no browser is needed.

use driver_interceptor::events::{EventFiringElement, SourceKind};
use driver_interceptor::testing::{BareDriver, ElementSpec, Phase, RecordingHook, ScriptedBrowser};
use driver_interceptor::{
    By, DriverError, EventFiringDriver, InputAction, OutputType, Timeouts, WebDriver, WebElement,
    WindowType,
};
use serde_json::json;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn table_page() -> (ScriptedBrowser, Vec<String>) {
    let browser = ScriptedBrowser::new();
    let rows: Vec<ElementSpec> = (1..=3)
        .map(|n| ElementSpec::new("tr").with_text(format!("row {}", n)))
        .collect();
    let ids = rows.iter().map(|row| row.id().to_string()).collect();
    for row in rows {
        browser.add_element(By::css("table tr"), row);
    }
    (browser, ids)
}

fn is_decorated(value: &dyn std::fmt::Debug) -> bool {
    format!("{:?}", value).starts_with("EventFiring")
}

#[test]
fn test_click_on_found_element_is_reported_once() {
    let (browser, ids) = table_page();
    let hook = Arc::new(RecordingHook::new());
    let driver = EventFiringDriver::wrap(browser.driver(), hook.clone());

    let rows = driver.find_elements(&By::css("table tr")).unwrap();
    assert_eq!(rows.len(), 3);
    hook.clear();

    rows[1].click().unwrap();

    assert_eq!(hook.timeline(), vec!["before element.click", "success element.click"]);
    let events = hook.events();
    assert_eq!(events[0].source.kind(), SourceKind::Element);
    assert_eq!(events[0].source.id(), ids[1]);
    assert!(events[0].params.is_empty());
    assert!(events[0].elapsed.is_none());
    assert!(events[1].elapsed.is_some());
    assert_eq!(events[1].detail.as_deref(), Some("()"));
}

#[test]
fn test_find_elements_result_is_described() {
    let (browser, ids) = table_page();
    let hook = Arc::new(RecordingHook::new());
    let driver = EventFiringDriver::wrap(browser.driver(), hook.clone());

    driver.find_elements(&By::css("table tr")).unwrap();

    let success = &hook.events()[1];
    assert_eq!(success.phase, Phase::Success);
    assert_eq!(success.name, "driver.findElements");
    assert_eq!(success.params, vec![json!("By.css selector: table tr")]);
    let detail = success.detail.clone().unwrap();
    assert!(detail.starts_with("size=3 ["));
    assert!(detail.contains(&ids[2]));
}

#[test]
fn test_not_found_error_passes_through_unchanged() {
    let browser = ScriptedBrowser::new();
    let hook = Arc::new(RecordingHook::new());
    let driver = EventFiringDriver::wrap(browser.driver(), hook.clone());
    let undecorated = browser.driver().find_element(&By::id("missing")).unwrap_err();

    let err = driver.find_element(&By::id("missing")).unwrap_err();

    assert_eq!(err, undecorated);
    assert_eq!(hook.timeline(), vec!["before driver.findElement", "failure driver.findElement"]);
    assert_eq!(hook.events()[1].error, Some(err));
}

#[test]
fn test_results_match_undecorated_driver() {
    let browser = ScriptedBrowser::new();
    browser
        .set_title("https://example.com/", "Example Domain")
        .set_page_source("<html><body><h1>Example</h1></body></html>")
        .add_element(
            By::id("name"),
            ElementSpec::new("input")
                .with_attribute("type", "text")
                .with_css("color", "rgb(0, 0, 0)"),
        );
    let plain = browser.driver();
    let driver = EventFiringDriver::wrap(browser.driver(), Arc::new(RecordingHook::new()));

    driver.get("https://example.com/").unwrap();
    assert_eq!(driver.title().unwrap(), plain.title().unwrap());
    assert_eq!(driver.current_url().unwrap(), plain.current_url().unwrap());
    assert_eq!(driver.page_source().unwrap(), plain.page_source().unwrap());
    assert_eq!(driver.window_handle().unwrap(), plain.window_handle().unwrap());

    let field = driver.find_element(&By::id("name")).unwrap();
    let raw = plain.find_element(&By::id("name")).unwrap();
    field.send_keys("ada").unwrap();
    assert_eq!(field.attribute("value").unwrap(), Some("ada".to_string()));
    assert_eq!(field.attribute("value").unwrap(), raw.attribute("value").unwrap());
    assert_eq!(field.css_value("color").unwrap(), "rgb(0, 0, 0)");
    assert_eq!(field.coordinates(), raw.coordinates());
    assert_eq!(field.id(), raw.id());
    assert_eq!(driver.id(), plain.id());
}

#[test]
fn test_coordinates_and_id_are_not_recorded() {
    let (browser, _) = table_page();
    let hook = Arc::new(RecordingHook::new());
    let driver = EventFiringDriver::wrap(browser.driver(), hook.clone());
    let row = driver.find_element(&By::css("table tr")).unwrap();
    hook.clear();

    let _ = row.coordinates();
    let _ = row.id();
    let _ = driver.id();
    let _ = driver.capabilities();

    assert!(hook.events().is_empty());
}

#[test]
fn test_manage_is_neither_wrapped_nor_recorded() {
    let browser = ScriptedBrowser::new();
    let hook = Arc::new(RecordingHook::new());
    let driver = EventFiringDriver::wrap(browser.driver(), hook.clone());

    let options = driver.manage();
    assert!(format!("{:?}", options).starts_with("ScriptedOptions"));

    let timeouts = Timeouts {
        implicit_wait: Duration::from_millis(250),
        ..options.timeouts().unwrap()
    };
    options.set_timeouts(timeouts).unwrap();

    assert_eq!(browser.driver().manage().timeouts().unwrap(), timeouts);
    assert!(hook.events().is_empty());
}

#[test]
fn test_nested_finds_stay_decorated() {
    let browser = ScriptedBrowser::new();
    browser.add_element(
        By::css("form"),
        ElementSpec::new("form").with_child(
            By::css("fieldset"),
            ElementSpec::new("fieldset")
                .with_child(By::Name("email".to_string()), ElementSpec::new("input")),
        ),
    );
    let hook = Arc::new(RecordingHook::new());
    let driver = EventFiringDriver::wrap(browser.driver(), hook.clone());

    let form = driver.find_element(&By::css("form")).unwrap();
    let fieldset = form.find_elements(&By::css("fieldset")).unwrap().remove(0);
    let email = fieldset.find_element(&By::Name("email".to_string())).unwrap();
    assert!(is_decorated(&email));
    hook.clear();

    email.clear().unwrap();

    assert_eq!(hook.timeline(), vec!["before element.clear", "success element.clear"]);
}

#[test]
fn test_frame_switch_returns_decorated_driver() {
    let browser = ScriptedBrowser::new();
    browser.add_frame("editor").add_frame_element(
        "editor",
        By::css("textarea"),
        ElementSpec::new("textarea"),
    );
    let hook = Arc::new(RecordingHook::new());
    let driver = EventFiringDriver::wrap(browser.driver(), hook.clone());

    let frame = driver.switch_to().frame_by_name("editor").unwrap();
    assert!(is_decorated(&frame));

    let area = frame.find_element(&By::css("textarea")).unwrap();
    area.send_keys("hello").unwrap();

    assert_eq!(
        hook.timeline(),
        vec![
            "before targetLocator.frame",
            "success targetLocator.frame",
            "before driver.findElement",
            "success driver.findElement",
            "before element.sendKeys",
            "success element.sendKeys",
        ]
    );
    let events = hook.events();
    assert_eq!(events[0].params, vec![json!("editor")]);
    assert!(events[2].source.id().ends_with("/editor"));
}

#[test]
fn test_frame_by_index_and_parent() {
    let browser = ScriptedBrowser::new();
    browser.add_frame("left").add_frame("right");
    let hook = Arc::new(RecordingHook::new());
    let driver = EventFiringDriver::wrap(browser.driver(), hook.clone());

    let right = driver.switch_to().frame_by_index(1).unwrap();
    assert!(right.id().ends_with("/right"));
    let top = right.switch_to().parent_frame().unwrap();
    assert_eq!(top.id(), driver.id());
    let top = top.switch_to().default_content().unwrap();
    assert!(is_decorated(&top));

    let err = driver.switch_to().frame_by_index(7).unwrap_err();
    assert_eq!(err, DriverError::NoSuchFrame("7".to_string()));
    assert_eq!(hook.count(Phase::Failure), 1);
}

#[test]
fn test_frame_by_element_uses_element_identity() {
    let browser = ScriptedBrowser::new();
    let iframe = ElementSpec::new("iframe").with_attribute("name", "preview");
    browser
        .add_element(By::css("iframe"), iframe)
        .add_frame("preview")
        .add_frame_element("preview", By::css("p"), ElementSpec::new("p").with_text("inside"));
    let hook = Arc::new(RecordingHook::new());
    let driver = EventFiringDriver::wrap(browser.driver(), hook.clone());

    let holder = driver.find_element(&By::css("iframe")).unwrap();
    let frame = driver.switch_to().frame_by_element(holder.as_ref()).unwrap();
    let text = frame.find_element(&By::css("p")).unwrap().text().unwrap();

    assert_eq!(text, "inside");
    let switch = hook
        .events()
        .into_iter()
        .find(|event| event.name == "targetLocator.frame")
        .unwrap();
    assert_eq!(switch.params, vec![json!(format!("element {}", holder.id()))]);
}

#[test]
fn test_new_window_and_window_switch_are_decorated() {
    let browser = ScriptedBrowser::new();
    let hook = Arc::new(RecordingHook::new());
    let driver = EventFiringDriver::wrap(browser.driver(), hook.clone());
    let first = driver.window_handle().unwrap();

    let second = driver.switch_to().new_window(WindowType::Tab).unwrap();
    assert!(is_decorated(&second));
    let handles = driver.window_handles().unwrap();
    assert_eq!(handles.len(), 2);

    let back = second.switch_to().window(&first).unwrap();
    assert_eq!(back.window_handle().unwrap(), first);

    let err = driver.switch_to().window("no-such-handle").unwrap_err();
    assert_eq!(err, DriverError::NoSuchWindow("no-such-handle".to_string()));
    assert!(hook
        .timeline()
        .contains(&"before targetLocator.newWindow".to_string()));
}

#[test]
fn test_active_element_is_intercepted_and_decorated() {
    let browser = ScriptedBrowser::new();
    let checkbox = ElementSpec::new("input").with_attribute("type", "checkbox");
    let checkbox_id = checkbox.id().to_string();
    browser.add_element(By::id("agree"), checkbox);
    let hook = Arc::new(RecordingHook::new());
    let driver = EventFiringDriver::wrap(browser.driver(), hook.clone());

    driver.find_element(&By::id("agree")).unwrap().click().unwrap();
    hook.clear();

    let active = driver.switch_to().active_element().unwrap();
    assert!(is_decorated(&active));
    assert_eq!(active.id(), checkbox_id);
    assert!(active.is_selected().unwrap());

    assert_eq!(
        hook.timeline(),
        vec![
            "before targetLocator.activeElement",
            "success targetLocator.activeElement",
            "before element.isSelected",
            "success element.isSelected",
        ]
    );
}

#[test]
fn test_alert_lookup_is_silent_but_alert_calls_are_recorded() {
    let browser = ScriptedBrowser::new();
    browser.raise_alert("Your name?");
    let hook = Arc::new(RecordingHook::new());
    let driver = EventFiringDriver::wrap(browser.driver(), hook.clone());

    let alert = driver.switch_to().alert().unwrap();
    assert!(is_decorated(&alert));
    assert!(hook.events().is_empty());

    assert_eq!(alert.text().unwrap(), "Your name?");
    alert.send_keys("Ada").unwrap();
    alert.accept().unwrap();

    assert_eq!(browser.prompt_input(), Some("Ada".to_string()));
    assert!(!browser.alert_open());
    assert_eq!(
        hook.timeline(),
        vec![
            "before alert.getText",
            "success alert.getText",
            "before alert.sendKeys",
            "success alert.sendKeys",
            "before alert.accept",
            "success alert.accept",
        ]
    );
    assert_eq!(hook.events()[0].source.kind(), SourceKind::Alert);
}

#[test]
fn test_dismiss_through_decorator_discards_prompt_text() {
    let browser = ScriptedBrowser::new();
    browser.raise_alert("Delete everything?");
    let hook = Arc::new(RecordingHook::new());
    let driver = EventFiringDriver::wrap(browser.driver(), hook.clone());

    let alert = driver.switch_to().alert().unwrap();
    alert.send_keys("yes").unwrap();
    alert.dismiss().unwrap();

    assert!(!browser.alert_open());
    assert_eq!(browser.prompt_input(), None);
    assert_eq!(
        hook.timeline(),
        vec![
            "before alert.sendKeys",
            "success alert.sendKeys",
            "before alert.dismiss",
            "success alert.dismiss",
        ]
    );
    assert_eq!(hook.events()[2].source.kind(), SourceKind::Alert);

    let err = alert.dismiss().unwrap_err();
    assert_eq!(err, DriverError::NoAlertPresent);
    assert_eq!(
        hook.timeline()[4..],
        ["before alert.dismiss", "failure alert.dismiss"]
    );
}

#[test]
fn test_missing_alert_is_reported_by_lookup() {
    let browser = ScriptedBrowser::new();
    let hook = Arc::new(RecordingHook::new());
    let driver = EventFiringDriver::wrap(browser.driver(), hook.clone());

    let err = driver.switch_to().alert().unwrap_err();

    assert_eq!(err, DriverError::NoAlertPresent);
    assert!(hook.events().is_empty());
}

#[test]
fn test_navigation_calls_are_recorded() {
    let browser = ScriptedBrowser::new();
    let hook = Arc::new(RecordingHook::new());
    let driver = EventFiringDriver::wrap(browser.driver(), hook.clone());

    let navigation = driver.navigate();
    navigation.to("https://example.com/a").unwrap();
    navigation
        .to_url(&url::Url::parse("https://example.com/b").unwrap())
        .unwrap();
    navigation.back().unwrap();
    navigation.refresh().unwrap();

    assert_eq!(driver.current_url().unwrap(), "https://example.com/a");
    let names: Vec<&str> = hook
        .events()
        .iter()
        .filter(|event| event.phase == Phase::Before)
        .map(|event| event.name)
        .collect();
    assert_eq!(
        names,
        vec![
            "navigation.to",
            "navigation.to",
            "navigation.back",
            "navigation.refresh",
            "driver.getCurrentUrl",
        ]
    );
    assert_eq!(hook.events()[2].params, vec![json!("https://example.com/b")]);
}

#[test]
fn test_capability_calls_are_intercepted() {
    let browser = ScriptedBrowser::new();
    browser.set_script_result(json!({ "ready": true }));
    let hook = Arc::new(RecordingHook::new());
    let driver = EventFiringDriver::wrap(browser.driver(), hook.clone());

    let value = driver
        .execute_script("return arguments[0];", &[json!(1), json!("two")])
        .unwrap();
    assert_eq!(value, json!({ "ready": true }));
    let shot = driver.screenshot_as(OutputType::Base64).unwrap();
    assert!(!shot.into_bytes().unwrap().is_empty());
    driver
        .perform(&[InputAction::KeyPress("Enter".to_string())])
        .unwrap();
    driver.reset_input_state().unwrap();

    let events = hook.events();
    assert_eq!(events[0].name, "driver.executeScript");
    assert_eq!(
        events[0].params,
        vec![json!("return arguments[0];"), json!([1, "two"])]
    );
    assert_eq!(hook.count(Phase::Success), 4);
}

#[test]
fn test_missing_capability_is_unsupported_not_hidden() {
    let browser = ScriptedBrowser::new();
    let hook = Arc::new(RecordingHook::new());
    let driver = EventFiringDriver::wrap(BareDriver(browser.driver()), hook.clone());

    let err = driver.execute_script("return 1;", &[]).unwrap_err();
    assert_eq!(err, DriverError::unsupported("executeScript"));
    let err = driver.screenshot_as(OutputType::Bytes).unwrap_err();
    assert_eq!(err, DriverError::unsupported("getScreenshotAs"));

    assert_eq!(hook.count(Phase::Failure), 2);
    assert!(!driver.capabilities().supports_javascript);
}

#[test]
fn test_scripted_failure_reaches_hook_and_caller() {
    let (browser, _) = table_page();
    browser.fail_next(
        "element.click",
        DriverError::StaleElementReference("gone".to_string()),
    );
    let hook = Arc::new(RecordingHook::new());
    let driver = EventFiringDriver::wrap(browser.driver(), hook.clone());
    let row = driver.find_element(&By::css("table tr")).unwrap();

    let err = row.click().unwrap_err();
    assert_eq!(err, DriverError::StaleElementReference("gone".to_string()));
    row.click().unwrap();

    assert_eq!(hook.count(Phase::Failure), 1);
    assert_eq!(hook.count(Phase::Success), 2);
}

#[test]
fn test_element_equality_follows_delegate_and_hook() {
    let (browser, _) = table_page();
    let plain = browser.driver();
    let hook: Arc<dyn driver_interceptor::InterceptionHook> = Arc::new(RecordingHook::new());
    let other: Arc<dyn driver_interceptor::InterceptionHook> = Arc::new(RecordingHook::new());

    let first = EventFiringElement::new(plain.find_element(&By::css("table tr")).unwrap(), hook.clone());
    let again = EventFiringElement::new(plain.find_element(&By::css("table tr")).unwrap(), hook.clone());
    let rows = plain.find_elements(&By::css("table tr")).unwrap();
    let second = EventFiringElement::new(rows.into_iter().nth(1).unwrap(), hook.clone());
    let foreign = EventFiringElement::new(plain.find_element(&By::css("table tr")).unwrap(), other);

    assert_eq!(first, again);
    assert_ne!(first, second);
    assert_ne!(first, foreign);
    assert_eq!(first.wrapped_element().id(), again.wrapped_element().id());
}

#[test]
fn test_shared_hook_across_threads() {
    let (browser, _) = table_page();
    let hook = Arc::new(RecordingHook::new());
    let driver = EventFiringDriver::wrap(browser.driver(), hook.clone());

    thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                for row in driver.find_elements(&By::css("table tr")).unwrap() {
                    row.text().unwrap();
                }
            });
        }
    });

    assert_eq!(hook.count(Phase::Before), 4 * (1 + 3));
    assert_eq!(hook.count(Phase::Before), hook.count(Phase::Success));
}

#[test]
fn test_scripted_delay_shows_in_elapsed() {
    let browser = ScriptedBrowser::new();
    browser.delay("driver.get", Duration::from_millis(20));
    let hook = Arc::new(RecordingHook::new());
    let driver = EventFiringDriver::wrap(browser.driver(), hook.clone());

    driver.get("https://example.com/").unwrap();

    let elapsed = hook.events()[1].elapsed.unwrap();
    assert!(elapsed >= Duration::from_millis(20));
}
