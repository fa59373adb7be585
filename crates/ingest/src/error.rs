//! Error types produced by the ingest crate.
//!
//! Every variant carries the path it concerns, so a corpus load can report
//! per-file failures without losing track of which file failed.
//!
//! | Error | Description |
//! |-------|-------------|
//! | [`Io`](IngestError::Io) | The file or directory could not be read |
//! | [`Decode`](IngestError::Decode) | The file is not a well-formed WAV |
//! | [`UnsupportedFormat`](IngestError::UnsupportedFormat) | WAV layout this crate cannot convert |
//! | [`EmptyAudio`](IngestError::EmptyAudio) | The file holds zero sample frames |
//! | [`TooLarge`](IngestError::TooLarge) | File exceeds the configured size limit |
//! | [`NotADirectory`](IngestError::NotADirectory) | Corpus root is not a directory |
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors that can occur while loading audio.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum IngestError {
    #[error("i/o error reading {}: {message}", path.display())]
    Io { path: PathBuf, message: String },

    #[error("failed to decode {}: {message}", path.display())]
    Decode { path: PathBuf, message: String },

    #[error("unsupported audio format in {}: {detail}", path.display())]
    UnsupportedFormat { path: PathBuf, detail: String },

    #[error("{} contains no audio samples", path.display())]
    EmptyAudio { path: PathBuf },

    #[error("{} is {bytes} bytes, above the {limit} byte limit", path.display())]
    TooLarge { path: PathBuf, bytes: u64, limit: u64 },

    #[error("{} is not a directory", path.display())]
    NotADirectory { path: PathBuf },
}

impl IngestError {
    /// Path of the file or directory the error concerns.
    pub fn path(&self) -> &Path {
        match self {
            IngestError::Io { path, .. }
            | IngestError::Decode { path, .. }
            | IngestError::UnsupportedFormat { path, .. }
            | IngestError::EmptyAudio { path }
            | IngestError::TooLarge { path, .. }
            | IngestError::NotADirectory { path } => path,
        }
    }

    pub(crate) fn io(path: &Path, err: std::io::Error) -> Self {
        IngestError::Io {
            path: path.to_path_buf(),
            message: err.to_string(),
        }
    }

    /// Map a hound error onto the matching variant.
    pub(crate) fn wav(path: &Path, err: hound::Error) -> Self {
        let path = path.to_path_buf();
        match err {
            hound::Error::IoError(e) => IngestError::Io {
                path,
                message: e.to_string(),
            },
            hound::Error::Unsupported => IngestError::UnsupportedFormat {
                path,
                detail: "unsupported wav feature".into(),
            },
            other => IngestError::Decode {
                path,
                message: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_file() {
        let err = IngestError::EmptyAudio {
            path: PathBuf::from("songs/quiet.wav"),
        };
        assert_eq!(err.to_string(), "songs/quiet.wav contains no audio samples");
        assert_eq!(err.path(), Path::new("songs/quiet.wav"));
    }

    #[test]
    fn hound_errors_are_classified() {
        let path = Path::new("x.wav");
        assert!(matches!(
            IngestError::wav(path, hound::Error::Unsupported),
            IngestError::UnsupportedFormat { .. }
        ));
        assert!(matches!(
            IngestError::wav(path, hound::Error::FormatError("no RIFF tag found")),
            IngestError::Decode { .. }
        ));
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        assert!(matches!(
            IngestError::wav(path, hound::Error::IoError(io)),
            IngestError::Io { .. }
        ));
    }
}
