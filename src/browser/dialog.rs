//! JavaScript dialogs seen through the DevTools protocol.
//!
//! Chrome reports `Page.javascriptDialogOpening` while the page is blocked
//! inside `alert`, `confirm`, `prompt` or a beforeunload prompt, and answers
//! come back through `Page.handleJavaScriptDialog`. A [`DialogSlot`] is
//! registered once per tab and holds the dialog that is currently open.

use headless_chrome::protocol::cdp::types::Event;
use headless_chrome::protocol::cdp::Page;
use std::sync::{Condvar, Mutex};
use std::time::{Duration, Instant};

use crate::errors::{DriverError, Result};

/// The dialog a tab is blocked on
#[derive(Debug, Clone, PartialEq)]
pub struct PendingDialog {
    pub kind: Page::DialogType,
    pub message: String,
    pub default_prompt: Option<String>,
    pub prompt_text: Option<String>,
}

impl PendingDialog {
    pub fn is_prompt(&self) -> bool {
        self.kind == Page::DialogType::Prompt
    }

    /// Protocol call that closes this dialog
    pub fn answer(&self, accept: bool) -> Page::HandleJavaScriptDialog {
        let prompt_text = if accept && self.is_prompt() {
            self.prompt_text
                .clone()
                .or_else(|| self.default_prompt.clone())
        } else {
            None
        };
        Page::HandleJavaScriptDialog {
            accept,
            prompt_text,
        }
    }
}

#[derive(Debug, Default)]
pub struct DialogSlot {
    pending: Mutex<Option<PendingDialog>>,
    changed: Condvar,
}

impl DialogSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tab event listener body
    pub fn observe(&self, event: &Event) {
        match event {
            Event::PageJavascriptDialogOpening(opening) => {
                let params = &opening.params;
                tracing::debug!(kind = ?params.Type, message = %params.message, "dialog opened");
                self.set(Some(PendingDialog {
                    kind: params.Type.clone(),
                    message: params.message.clone(),
                    default_prompt: params.default_prompt.clone(),
                    prompt_text: None,
                }));
            }
            Event::PageJavascriptDialogClosed(_) => self.set(None),
            _ => {}
        }
    }

    pub fn current(&self) -> Option<PendingDialog> {
        self.lock().clone()
    }

    pub fn is_open(&self) -> bool {
        self.lock().is_some()
    }

    /// The open dialog, waiting up to `timeout` for one to appear
    pub fn wait(&self, timeout: Duration) -> Option<PendingDialog> {
        let deadline = Instant::now() + timeout;
        let mut pending = self.lock();
        loop {
            if let Some(dialog) = pending.as_ref() {
                return Some(dialog.clone());
            }
            let left = deadline.saturating_duration_since(Instant::now());
            if left.is_zero() {
                return None;
            }
            pending = match self.changed.wait_timeout(pending, left) {
                Ok((guard, _)) => guard,
                Err(poisoned) => poisoned.into_inner().0,
            };
        }
    }

    /// Text typed into the open prompt, sent when it is accepted
    pub fn send_keys(&self, keys: &str) -> Result<()> {
        let mut pending = self.lock();
        let dialog = pending.as_mut().ok_or(DriverError::NoAlertPresent)?;
        if !dialog.is_prompt() {
            return Err(DriverError::invalid_argument(format!(
                "{:?} dialogs do not accept text",
                dialog.kind
            )));
        }
        dialog.prompt_text = Some(keys.to_string());
        Ok(())
    }

    /// Clear the slot once a dialog has been answered
    pub fn close(&self) {
        self.set(None);
    }

    fn set(&self, dialog: Option<PendingDialog>) {
        *self.lock() = dialog;
        self.changed.notify_all();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<PendingDialog>> {
        self.pending
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
