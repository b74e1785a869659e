//! JavaScript sources run inside the page by the Chrome backend.
//!
//! Every script is wrapped so that it returns a JSON string envelope:
//! `{"ok": value}` on success or `{"error": kind, "message": text}` on
//! failure, where `kind` is a W3C error code. That keeps page exceptions from
//! surfacing as opaque protocol errors.

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::OnceLock;

use crate::errors::{DriverError, Result};
use crate::types::By;

/// One hop in a frame path, resolved from the top window on every script
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameSelector {
    Index(usize),
    Name(String),
    Element(String),
}

/// Shared helpers: element registry on the top window, `fail`, and the
/// document of the current frame in `doc` / `win`.
fn prelude(frames: &[FrameSelector], id_prefix: &str) -> String {
    let path = serde_json::to_string(frames).unwrap_or_else(|_| "[]".to_string());
    let prefix = js_string(id_prefix);
    format!(
        r#"
        function fail(kind, message) {{
            var e = new Error(message);
            e.kind = kind;
            throw e;
        }}
        var reg = window.top.__di_elements || (window.top.__di_elements = {{ seq: 0, map: {{}} }});
        function register(el) {{
            for (var key in reg.map) {{
                if (reg.map[key] === el) return key;
            }}
            reg.seq += 1;
            var id = {prefix} + ':' + reg.seq;
            reg.map[id] = el;
            return id;
        }}
        function lookup(id) {{
            var el = reg.map[id];
            if (!el || !el.isConnected) fail('stale element reference', id);
            return el;
        }}
        var win = window.top;
        var path = {path};
        for (var i = 0; i < path.length; i++) {{
            var hop = path[i], next = null;
            if (hop.index !== undefined) {{
                next = win.frames[hop.index] || null;
            }} else if (hop.name !== undefined) {{
                var frames = win.document.querySelectorAll('iframe, frame');
                for (var j = 0; j < frames.length; j++) {{
                    if (frames[j].name === hop.name || frames[j].id === hop.name) {{
                        next = frames[j].contentWindow;
                        break;
                    }}
                }}
            }} else if (hop.element !== undefined) {{
                var holder = reg.map[hop.element];
                next = holder ? holder.contentWindow : null;
            }}
            if (!next) fail('no such frame', JSON.stringify(hop));
            win = next;
        }}
        var doc = win.document;
        "#
    )
}

/// Wrap `body` (a function body that may `return`) in the envelope
pub fn wrap(frames: &[FrameSelector], id_prefix: &str, body: &str) -> String {
    format!(
        r#"(function() {{
            try {{
                {prelude}
                var result = (function() {{ {body} }})();
                return JSON.stringify({{ ok: result === undefined ? null : result }});
            }} catch (e) {{
                return JSON.stringify({{ error: e.kind || 'javascript error', message: String(e && e.message || e) }});
            }}
        }})()"#,
        prelude = prelude(frames, id_prefix),
        body = body
    )
}

/// Wrap a user script for async execution. The script gets the callback as
/// its last argument and the returned promise resolves to the envelope.
pub fn wrap_async(
    frames: &[FrameSelector],
    id_prefix: &str,
    script: &str,
    args: &[Value],
    timeout_ms: u64,
) -> String {
    let args = serde_json::to_string(args).unwrap_or_else(|_| "[]".to_string());
    format!(
        r#"(function() {{
            try {{
                {prelude}
                return new Promise(function(resolve, reject) {{
                    var timer = setTimeout(function() {{ reject({{ kind: 'script timeout', message: 'async script did not call back within {timeout_ms}ms' }}); }}, {timeout_ms});
                    var done = function(value) {{ clearTimeout(timer); resolve(value); }};
                    new win.Function({script}).apply(null, {args}.concat([done]));
                }}).then(function(value) {{
                    return JSON.stringify({{ ok: value === undefined ? null : value }});
                }}, function(e) {{
                    return JSON.stringify({{ error: e.kind || 'javascript error', message: String(e && e.message || e) }});
                }});
            }} catch (e) {{
                return JSON.stringify({{ error: e.kind || 'javascript error', message: String(e && e.message || e) }});
            }}
        }})()"#,
        prelude = prelude(frames, id_prefix),
        script = js_string(script),
        args = args,
        timeout_ms = timeout_ms
    )
}

/// Body running a user script synchronously in the current frame
pub fn user_script(script: &str, args: &[Value]) -> String {
    let args = serde_json::to_string(args).unwrap_or_else(|_| "[]".to_string());
    format!(
        "return new win.Function({}).apply(null, {});",
        js_string(script),
        args
    )
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    ok: Option<Value>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Turn an evaluated envelope back into a value or a driver error
pub fn unwrap_envelope(raw: Option<Value>) -> Result<Value> {
    let text = match raw {
        Some(Value::String(text)) => text,
        other => {
            return Err(DriverError::JavaScript(format!(
                "unexpected script result: {:?}",
                other
            )))
        }
    };
    let envelope: Envelope = serde_json::from_str(&text)?;
    match envelope.error {
        None => Ok(envelope.ok.unwrap_or(Value::Null)),
        Some(kind) => {
            let message = envelope.message.unwrap_or_default();
            Err(match kind.as_str() {
                "no such element" => DriverError::NoSuchElement(message),
                "stale element reference" => DriverError::StaleElementReference(message),
                "no such frame" => DriverError::NoSuchFrame(message),
                "invalid argument" => DriverError::InvalidArgument(message),
                "script timeout" => DriverError::Timeout(message),
                _ => DriverError::JavaScript(message),
            })
        }
    }
}

/// JSON string literal, which is also a valid JS string literal
pub fn js_string(value: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "\"\"".to_string())
}

fn css_identifier() -> &'static Regex {
    static IDENT: OnceLock<Regex> = OnceLock::new();
    IDENT.get_or_init(|| {
        Regex::new(r"^-?[_a-zA-Z][_a-zA-Z0-9-]*$").expect("identifier pattern is valid")
    })
}

/// JS expression for every match of `by` below `root`, as an array
pub fn locate_all(by: &By) -> Result<String> {
    let expr = match by {
        By::Css(selector) => format!(
            "Array.prototype.slice.call(root.querySelectorAll({}))",
            js_string(selector)
        ),
        By::TagName(tag) => format!(
            "Array.prototype.slice.call(root.querySelectorAll({}))",
            js_string(tag)
        ),
        By::Id(id) => {
            let selector = if css_identifier().is_match(id) {
                format!("#{}", id)
            } else {
                format!("[id={}]", js_string(id))
            };
            format!(
                "Array.prototype.slice.call(root.querySelectorAll({}))",
                js_string(&selector)
            )
        }
        By::Name(name) => format!(
            "Array.prototype.slice.call(root.querySelectorAll({}))",
            js_string(&format!("[name={}]", js_string(name)))
        ),
        By::ClassName(class) => {
            if !css_identifier().is_match(class) {
                return Err(DriverError::invalid_argument(format!(
                    "compound class names are not permitted: {}",
                    class
                )));
            }
            format!(
                "Array.prototype.slice.call(root.querySelectorAll({}))",
                js_string(&format!(".{}", class))
            )
        }
        By::XPath(expression) => format!(
            r#"(function() {{
                var snapshot = doc.evaluate({}, root, null, XPathResult.ORDERED_NODE_SNAPSHOT_TYPE, null);
                var found = [];
                for (var k = 0; k < snapshot.snapshotLength; k++) found.push(snapshot.snapshotItem(k));
                return found;
            }})()"#,
            js_string(expression)
        ),
        By::LinkText(text) => format!(
            "Array.prototype.slice.call(root.querySelectorAll('a')).filter(function(a) {{ return a.innerText.trim() === {}; }})",
            js_string(text)
        ),
        By::PartialLinkText(text) => format!(
            "Array.prototype.slice.call(root.querySelectorAll('a')).filter(function(a) {{ return a.innerText.indexOf({}) !== -1; }})",
            js_string(text)
        ),
    };
    Ok(expr)
}

/// Body that registers every match and returns their ids. `root_expr` is
/// `doc` or a registry lookup.
pub fn find_body(by: &By, root_expr: &str) -> Result<String> {
    Ok(format!(
        "var root = {}; return {}.map(register);",
        root_expr,
        locate_all(by)?
    ))
}

pub fn element_root(id: &str) -> String {
    format!("lookup({})", js_string(id))
}

/// Element box in top-document coordinates, summing the offsets of every
/// enclosing frame element
pub const PAGE_RECT: &str = r#"
    var box = el.getBoundingClientRect();
    var x = box.left, y = box.top, w = win;
    while (w !== window.top) {
        var holder = w.frameElement;
        if (!holder) fail('no such frame', 'frame is not reachable from the top window');
        var outer = holder.getBoundingClientRect();
        x += outer.left + holder.clientLeft;
        y += outer.top + holder.clientTop;
        w = w.parent;
    }
    return { x: x + window.top.scrollX, y: y + window.top.scrollY, width: box.width, height: box.height };
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_envelope_ok() {
        let raw = Some(Value::String(r#"{"ok":["a","b"]}"#.to_string()));
        assert_eq!(unwrap_envelope(raw).unwrap(), json!(["a", "b"]));
    }

    #[test]
    fn test_envelope_null_result() {
        let raw = Some(Value::String(r#"{"ok":null}"#.to_string()));
        assert_eq!(unwrap_envelope(raw).unwrap(), Value::Null);
    }

    #[test]
    fn test_envelope_error_kinds() {
        let stale = Some(Value::String(
            r#"{"error":"stale element reference","message":"s:3"}"#.to_string(),
        ));
        assert_eq!(
            unwrap_envelope(stale).unwrap_err(),
            DriverError::StaleElementReference("s:3".to_string())
        );

        let frame = Some(Value::String(
            r#"{"error":"no such frame","message":"{\"index\":4}"}"#.to_string(),
        ));
        assert_eq!(
            unwrap_envelope(frame).unwrap_err(),
            DriverError::NoSuchFrame(r#"{"index":4}"#.to_string())
        );

        let thrown = Some(Value::String(
            r#"{"error":"javascript error","message":"x is not defined"}"#.to_string(),
        ));
        assert_eq!(
            unwrap_envelope(thrown).unwrap_err(),
            DriverError::JavaScript("x is not defined".to_string())
        );
    }

    #[test]
    fn test_envelope_rejects_non_string() {
        assert!(matches!(
            unwrap_envelope(Some(json!(3))),
            Err(DriverError::JavaScript(_))
        ));
    }

    #[test]
    fn test_id_locator_uses_hash_for_identifiers() {
        let js = locate_all(&By::id("main")).unwrap();
        assert!(js.contains(r##"querySelectorAll("#main")"##));

        let js = locate_all(&By::id("2col")).unwrap();
        assert!(js.contains(r#"[id=\"2col\"]"#));
    }

    #[test]
    fn test_compound_class_name_rejected() {
        let err = locate_all(&By::ClassName("btn primary".to_string())).unwrap_err();
        assert!(matches!(err, DriverError::InvalidArgument(_)));
    }

    #[test]
    fn test_strings_are_escaped() {
        assert_eq!(js_string(r#"it's "quoted""#), r#""it's \"quoted\"""#);
        let body = find_body(&By::css(r#"a[title="x"]"#), "doc").unwrap();
        assert!(body.contains(r#"querySelectorAll("a[title=\"x\"]")"#));
    }

    #[test]
    fn test_frame_path_is_embedded() {
        let script = wrap(
            &[FrameSelector::Index(1), FrameSelector::Name("nav".to_string())],
            "s",
            "return doc.title;",
        );
        assert!(script.contains(r#"[{"index":1},{"name":"nav"}]"#));
        assert!(script.contains("return doc.title;"));
    }

    #[test]
    fn test_page_rect_adds_enclosing_frame_offsets() {
        let script = wrap(&[FrameSelector::Index(0)], "s", PAGE_RECT);
        assert!(script.contains("w.frameElement"));
        assert!(script.contains("x += outer.left + holder.clientLeft"));
        assert!(script.contains("w = w.parent"));
        assert!(script.contains("window.top.scrollY"));
    }
}
