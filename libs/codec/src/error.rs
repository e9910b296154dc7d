//! Codec-level errors.
//!
//! Diagnostic context mirrors what operators need when the legacy schema
//! drifts: the offending operation name, the element that failed to decode,
//! the byte offset of malformed XML.

use thiserror::Error;

/// Result type alias for codec operations
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors produced by the rules layer.
#[derive(Debug, Error)]
pub enum CodecError {
    /// Operation name has no entry in the static ordering table.
    ///
    /// This is a configuration error: it indicates code/schema drift, is
    /// never retried, and should fail the call outright.
    #[error("unknown legacy operation '{operation}': no entry in the ordering table")]
    UnknownOperation {
        /// The name that was looked up
        operation: String,
    },

    /// Response XML could not be read into a value tree.
    #[error("malformed XML at byte {position}: {message}")]
    MalformedXml {
        /// Byte offset the reader stopped at
        position: u64,
        /// Underlying reader message
        message: String,
    },

    /// XML writing failed while serializing an ordered parameter tree.
    #[error("failed to write XML element '{element}': {message}")]
    XmlWrite {
        /// Element being written
        element: String,
        /// Underlying writer message
        message: String,
    },

    /// A decoded packet tree does not match the expected wire shape.
    #[error("malformed signed-document packet: {message}")]
    MalformedPacket {
        /// What failed to decode
        message: String,
    },
}
