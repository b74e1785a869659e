use serde_json::Value;
use std::fmt;

use crate::driver::{Alert, WebDriver, WebElement};
use crate::errors::{DriverError, Result};
use crate::events::invocation::Invocation;
use crate::types::{Dimension, Point, Rect, Screenshot};

/// Policy invoked around every decorated call.
///
/// One hook instance is shared by every decorator in a session and may be
/// called from several threads and re-entrantly (a call whose real work
/// issues further decorated calls). Implementations must not keep a
/// "current call" field; anything stateful has to be append-only and
/// thread-safe.
pub trait InterceptionHook: Send + Sync {
    /// Runs before the real operation. An error aborts the call: the real
    /// operation never runs and no after-callback fires.
    fn on_before(&self, _invocation: &Invocation) -> Result<()> {
        Ok(())
    }

    /// Runs after the real operation returned. An error here replaces the
    /// result the caller would have received.
    fn on_after_success(&self, _invocation: &Invocation, _result: &dyn Describe) -> Result<()> {
        Ok(())
    }

    /// Runs after the real operation failed. The error is re-raised to the
    /// caller unchanged once this returns.
    fn on_after_failure(&self, _invocation: &Invocation, _error: &DriverError) {}
}

impl dyn InterceptionHook {
    /// Run `work` between the hook's callbacks.
    ///
    /// Order is fixed: before, work, mark complete, then after-success or
    /// after-failure. Everything runs on the calling thread.
    pub fn execute<T, F>(&self, invocation: Invocation, work: F) -> Result<T>
    where
        T: Describe,
        F: FnOnce() -> Result<T>,
    {
        self.on_before(&invocation)?;
        match work() {
            Ok(value) => {
                invocation.mark_complete();
                self.on_after_success(&invocation, &value)?;
                Ok(value)
            }
            Err(err) => {
                invocation.mark_complete();
                self.on_after_failure(&invocation, &err);
                Err(err)
            }
        }
    }
}

/// Shape of a call result as hooks see it
#[derive(Debug, Clone, PartialEq)]
pub enum Description {
    Unit,
    Scalar(String),
    Sequence(Vec<Description>),
    Map(Vec<(String, Description)>),
}

impl Description {
    /// Collections render as their size followed by their contents. With a
    /// cap, only the first `max_items` entries of each collection are shown.
    pub fn render(&self, max_items: Option<usize>) -> String {
        match self {
            Description::Unit => "()".to_string(),
            Description::Scalar(value) => value.clone(),
            Description::Sequence(items) => {
                let shown = max_items.unwrap_or(items.len()).min(items.len());
                let mut parts: Vec<String> = items[..shown]
                    .iter()
                    .map(|item| item.render(max_items))
                    .collect();
                if shown < items.len() {
                    parts.push(format!("...{} more", items.len() - shown));
                }
                format!("size={} [{}]", items.len(), parts.join(", "))
            }
            Description::Map(entries) => {
                let shown = max_items.unwrap_or(entries.len()).min(entries.len());
                let mut parts: Vec<String> = entries[..shown]
                    .iter()
                    .map(|(key, value)| format!("{}={}", key, value.render(max_items)))
                    .collect();
                if shown < entries.len() {
                    parts.push(format!("...{} more", entries.len() - shown));
                }
                format!("size={} {{{}}}", entries.len(), parts.join(", "))
            }
        }
    }
}

impl fmt::Display for Description {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(None))
    }
}

/// Result types that can be shown to a hook
pub trait Describe {
    fn describe(&self) -> Description;
}

impl Describe for () {
    fn describe(&self) -> Description {
        Description::Unit
    }
}

impl Describe for String {
    fn describe(&self) -> Description {
        Description::Scalar(self.clone())
    }
}

impl Describe for bool {
    fn describe(&self) -> Description {
        Description::Scalar(self.to_string())
    }
}

impl<T: Describe> Describe for Option<T> {
    fn describe(&self) -> Description {
        match self {
            Some(value) => value.describe(),
            None => Description::Scalar("null".to_string()),
        }
    }
}

impl<T: Describe> Describe for Vec<T> {
    fn describe(&self) -> Description {
        Description::Sequence(self.iter().map(Describe::describe).collect())
    }
}

impl Describe for Value {
    fn describe(&self) -> Description {
        match self {
            Value::Array(items) => {
                Description::Sequence(items.iter().map(Describe::describe).collect())
            }
            Value::Object(map) => Description::Map(
                map.iter()
                    .map(|(key, value)| (key.clone(), value.describe()))
                    .collect(),
            ),
            Value::String(s) => Description::Scalar(s.clone()),
            other => Description::Scalar(other.to_string()),
        }
    }
}

impl Describe for Point {
    fn describe(&self) -> Description {
        Description::Scalar(format!("({}, {})", self.x, self.y))
    }
}

impl Describe for Dimension {
    fn describe(&self) -> Description {
        Description::Scalar(format!("{}x{}", self.width, self.height))
    }
}

impl Describe for Rect {
    fn describe(&self) -> Description {
        Description::Scalar(format!(
            "({}, {}) {}x{}",
            self.x, self.y, self.width, self.height
        ))
    }
}

impl Describe for Screenshot {
    fn describe(&self) -> Description {
        Description::Scalar(format!("{:?}", self))
    }
}

impl Describe for Box<dyn WebElement> {
    fn describe(&self) -> Description {
        Description::Scalar(format!("element[{}]", self.id()))
    }
}

impl Describe for Box<dyn WebDriver> {
    fn describe(&self) -> Description {
        Description::Scalar(format!("driver[{}]", self.id()))
    }
}

impl Describe for Box<dyn Alert> {
    fn describe(&self) -> Description {
        Description::Scalar(format!("alert[{}]", self.id()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::invocation::{Source, SourceKind};
    use crate::events::operation::ElementCall;
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct OrderHook {
        calls: Mutex<Vec<String>>,
        fail_before: bool,
        fail_after: bool,
    }

    impl InterceptionHook for OrderHook {
        fn on_before(&self, invocation: &Invocation) -> Result<()> {
            assert!(!invocation.is_complete());
            self.calls.lock().unwrap().push("before".to_string());
            if self.fail_before {
                return Err(DriverError::invalid_argument("rejected"));
            }
            Ok(())
        }

        fn on_after_success(&self, invocation: &Invocation, result: &dyn Describe) -> Result<()> {
            assert!(invocation.elapsed().is_some());
            self.calls
                .lock()
                .unwrap()
                .push(format!("success {}", result.describe()));
            if self.fail_after {
                return Err(DriverError::Chrome("hook failed".to_string()));
            }
            Ok(())
        }

        fn on_after_failure(&self, invocation: &Invocation, error: &DriverError) {
            assert!(invocation.elapsed().is_some());
            self.calls.lock().unwrap().push(format!("failure {}", error));
        }
    }

    fn record() -> Invocation {
        Invocation::new(Source::new(SourceKind::Element, "el-7"), ElementCall::GetText).unwrap()
    }

    fn calls(hook: &OrderHook) -> Vec<String> {
        hook.calls.lock().unwrap().clone()
    }

    #[test]
    fn test_success_order() {
        let hook = Arc::new(OrderHook::default());
        let shared: Arc<dyn InterceptionHook> = hook.clone();

        let result = shared.execute(record(), || {
            hook.calls.lock().unwrap().push("work".to_string());
            Ok("hello".to_string())
        });

        assert_eq!(result.unwrap(), "hello");
        assert_eq!(calls(&hook), vec!["before", "work", "success hello"]);
    }

    #[test]
    fn test_failure_is_reraised_unchanged() {
        let hook = Arc::new(OrderHook::default());
        let shared: Arc<dyn InterceptionHook> = hook.clone();
        let expected = DriverError::NoSuchElement("#gone".to_string());

        let result: Result<String> = shared.execute(record(), || Err(expected.clone()));

        assert_eq!(result.unwrap_err(), expected);
        assert_eq!(
            calls(&hook),
            vec!["before", "failure No such element: #gone"]
        );
    }

    #[test]
    fn test_before_failure_skips_work() {
        let hook = Arc::new(OrderHook {
            fail_before: true,
            ..Default::default()
        });
        let shared: Arc<dyn InterceptionHook> = hook.clone();
        let mut ran = false;

        let result: Result<()> = shared.execute(record(), || {
            ran = true;
            Ok(())
        });

        assert!(matches!(result, Err(DriverError::InvalidArgument(_))));
        assert!(!ran);
        assert_eq!(calls(&hook), vec!["before"]);
    }

    #[test]
    fn test_after_success_error_replaces_result() {
        let hook = Arc::new(OrderHook {
            fail_after: true,
            ..Default::default()
        });
        let shared: Arc<dyn InterceptionHook> = hook.clone();

        let result = shared.execute(record(), || Ok(true));

        assert_eq!(
            result.unwrap_err(),
            DriverError::Chrome("hook failed".to_string())
        );
    }

    #[test]
    fn test_collections_render_size_and_contents() {
        let handles = vec!["w1".to_string(), "w2".to_string()];
        assert_eq!(handles.describe().to_string(), "size=2 [w1, w2]");

        let value = json!({"a": 1, "b": [true, false]});
        assert_eq!(
            value.describe().to_string(),
            "size=2 {a=1, b=size=2 [true, false]}"
        );
    }

    #[test]
    fn test_render_cap() {
        let items: Vec<String> = (0..5).map(|i| i.to_string()).collect();
        assert_eq!(
            items.describe().render(Some(2)),
            "size=5 [0, 1, ...3 more]"
        );
    }
}
