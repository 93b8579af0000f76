use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("XML error: {0}")]
    Xml(String),
    #[error("output is not UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
}
