use thiserror::Error;

/// Everything that can go wrong between a `change` event and a delivered
/// preview. The `Display` strings are the messages handed to `on_error` (or
/// the console, when no error callback is registered).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PreviewError {
    #[error("a configuration object with fileElement is required")]
    MissingFileElement,
    #[error("fileElement is not a valid selector or element")]
    InvalidFileElement,
    #[error("unsupported image format")]
    UnsupportedFormat,
    #[error("your browser does not support asynchronous file reading")]
    ReaderUnavailable,
    #[error("error reading file data")]
    ReadFailed,
}
