pub mod chrome;
pub mod dialog;
pub mod scripts;

pub use chrome::{ChromeDriver, ChromeElement};
pub use dialog::{DialogSlot, PendingDialog};
pub use scripts::FrameSelector;
