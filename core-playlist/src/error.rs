use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlaylistError {
    #[error("Unexpected end of stream while reading {context}")]
    UnexpectedEof { context: &'static str },

    #[error("Malformed length prefix in binary playlist")]
    MalformedVarint,

    #[error("Missing end-of-stream terminator in binary playlist")]
    MissingTerminator,

    #[error("Invalid UTF-8 in path record: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PlaylistError>;
