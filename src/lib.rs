#[cfg(feature = "chrome")]
pub mod browser;
pub mod config;
pub mod driver;
pub mod errors;
pub mod events;
pub mod testing;
pub mod types;

#[cfg(feature = "chrome")]
pub use browser::ChromeDriver;
pub use config::{BrowserConfig, Config, InterceptionConfig, Viewport};
pub use driver::{Alert, Navigation, Options, TargetLocator, WebDriver, WebElement};
pub use errors::{DriverError, Result};
pub use events::{
    Describe, Description, EventFiringDriver, EventFiringElement, InterceptionHook, Invocation,
    LogSink, Operation, ThresholdLogger, TracingSink,
};
pub use types::*;
