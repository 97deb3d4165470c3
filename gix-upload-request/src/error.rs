//! Error types for building and encoding upload-requests

use bstr::BString;

/// Result type alias for upload-request operations
pub type Result<T> = std::result::Result<T, Error>;

/// The error returned by [`Encoder::encode()`](crate::encode::Encoder::encode()) and
/// [`UploadRequest::validate()`](crate::UploadRequest::validate()).
///
/// Variants produced before any I/O took place guarantee that nothing was written to the sink.
/// Variants produced by a failing sink name the line that could not be written, with the
/// sink's error as their source.
#[derive(Debug, thiserror::Error)]
#[allow(missing_docs)]
pub enum Error {
    #[error("empty wants provided")]
    EmptyWants,
    #[error("invalid deepen-not reference {name:?}: {reason}")]
    InvalidReference { name: BString, reason: &'static str },
    #[error("missing capability {capability}")]
    MissingCapability { capability: &'static str },
    #[error("capabilities {first} and {second} are mutually exclusive")]
    ConflictingCapabilities { first: &'static str, second: &'static str },
    #[error("encoding first want line")]
    FirstWant { source: std::io::Error },
    #[error("encoding want {id}")]
    Want { id: String, source: std::io::Error },
    #[error("encoding shallow {id}")]
    Shallow { id: String, source: std::io::Error },
    #[error("encoding depth {depth}")]
    Depth { depth: String, source: std::io::Error },
    #[error("encoding flush")]
    Flush { source: std::io::Error },
}

impl Error {
    /// Return `true` if the sink failed, as opposed to the request being rejected before any I/O.
    pub fn is_io(&self) -> bool {
        self.io_error().is_some()
    }

    /// The error of the sink, if the sink failed.
    pub fn io_error(&self) -> Option<&std::io::Error> {
        match self {
            Error::FirstWant { source }
            | Error::Want { source, .. }
            | Error::Shallow { source, .. }
            | Error::Depth { source, .. }
            | Error::Flush { source } => Some(source),
            Error::EmptyWants
            | Error::InvalidReference { .. }
            | Error::MissingCapability { .. }
            | Error::ConflictingCapabilities { .. } => None,
        }
    }
}
