use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("Failed to launch Chrome: {0}")]
    LaunchFailed(String),

    #[error("Navigation failed: {0}")]
    Navigation(String),

    #[error("Script evaluation failed: {0}")]
    Evaluation(String),

    #[error("Element no longer attached to the page: {0}")]
    StaleElement(String),

    #[error("Screenshot failed: {0}")]
    Screenshot(String),

    #[error("CDP error: {0}")]
    Cdp(#[from] chromiumoxide::error::CdpError),

    #[error("Other error: {0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, ProbeError>;
