use thiserror::Error;

/// Console error vocabulary.
///
/// Validation errors are local precondition failures and never reach the
/// network. Submission errors carry the server-provided message when one
/// exists, otherwise a status-derived one. Template-load failures are
/// degraded to a logged warning by the editor, so they normally stop at the
/// gateway seam.
#[derive(Debug, Error)]
pub enum ConsoleError {
    #[error("{0}")]
    Validation(String),

    #[error("submission failed: {0}")]
    Submission(String),

    #[error("template load failed: {0}")]
    TemplateLoad(String),
}

impl ConsoleError {
    pub fn validation(message: impl Into<String>) -> Self {
        ConsoleError::Validation(message.into())
    }

    pub fn submission(message: impl Into<String>) -> Self {
        ConsoleError::Submission(message.into())
    }

    pub fn template_load(message: impl Into<String>) -> Self {
        ConsoleError::TemplateLoad(message.into())
    }
}
