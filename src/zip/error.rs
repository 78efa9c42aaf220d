use std::io;

/// Errors raised while reading a ZIP container.
#[derive(Debug, thiserror::Error)]
pub enum ZipError {
    #[error("not a valid ZIP file")]
    NotAZip,

    #[error("invalid {0}")]
    InvalidHeader(&'static str),

    #[error("invalid ZIP64 format")]
    InvalidZip64,

    #[error("archive is truncated")]
    Truncated,

    #[error("unsupported compression method: {0}")]
    UnsupportedCompression(u16),

    #[error("corrupt deflate stream: {0}")]
    Inflate(#[source] io::Error),

    #[error("checksum mismatch for '{0}'")]
    ChecksumMismatch(String),

    #[error(transparent)]
    Io(io::Error),
}

impl From<io::Error> for ZipError {
    fn from(err: io::Error) -> Self {
        // Short reads inside a header mean the record runs past the data we have
        if err.kind() == io::ErrorKind::UnexpectedEof {
            ZipError::Truncated
        } else {
            ZipError::Io(err)
        }
    }
}

pub type Result<T> = std::result::Result<T, ZipError>;
