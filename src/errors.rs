use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DriverError {
    #[error("No such element: {0}")]
    NoSuchElement(String),

    #[error("Stale element reference: {0}")]
    StaleElementReference(String),

    #[error("No such frame: {0}")]
    NoSuchFrame(String),

    #[error("No such window: {0}")]
    NoSuchWindow(String),

    #[error("No alert present")]
    NoAlertPresent,

    #[error("Unexpected alert open: {0}")]
    UnexpectedAlertOpen(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("JavaScript execution failed: {0}")]
    JavaScript(String),

    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Navigation failed: {0}")]
    Navigation(String),

    #[error("Screenshot failed: {0}")]
    Screenshot(String),

    #[error("Browser launch failed: {0}")]
    LaunchFailed(String),

    #[error("Chrome error: {0}")]
    Chrome(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("Anyhow error: {0}")]
    Anyhow(String),
}

pub type Result<T> = std::result::Result<T, DriverError>;

impl From<serde_json::Error> for DriverError {
    fn from(err: serde_json::Error) -> Self {
        DriverError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for DriverError {
    fn from(err: std::io::Error) -> Self {
        DriverError::Io(err.to_string())
    }
}

// headless_chrome reports everything as anyhow::Error
impl From<anyhow::Error> for DriverError {
    fn from(err: anyhow::Error) -> Self {
        DriverError::Anyhow(err.to_string())
    }
}

impl DriverError {
    pub fn from_any_error<E: std::fmt::Display>(err: E) -> Self {
        DriverError::Chrome(err.to_string())
    }

    pub fn unsupported(operation: impl Into<String>) -> Self {
        DriverError::Unsupported(operation.into())
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        DriverError::InvalidArgument(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anyhow_conversion_keeps_message() {
        let err: DriverError = anyhow::anyhow!("target closed").into();
        assert_eq!(err, DriverError::Anyhow("target closed".to_string()));
    }

    #[test]
    fn test_display() {
        let err = DriverError::NoSuchElement("#missing".to_string());
        assert_eq!(err.to_string(), "No such element: #missing");
        assert_eq!(
            DriverError::unsupported("driver.perform").to_string(),
            "Unsupported operation: driver.perform"
        );
    }
}
