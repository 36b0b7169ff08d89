use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to read corpus file '{path}'")]
    ReadCorpus {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse corpus file '{path}': {message}")]
    ParseCorpus { path: PathBuf, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Walkdir error: {0}")]
    WalkDir(#[from] walkdir::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Reads and parses one corpus file, keeping the path in the error.
pub fn load_corpus(path: &std::path::Path) -> Result<rexlite_corpus::CorpusFile> {
    rexlite_corpus::parse_file(path).map_err(|e| match e {
        rexlite_corpus::ParseError::Io(source) => Error::ReadCorpus {
            path: path.to_path_buf(),
            source,
        },
        other => Error::ParseCorpus {
            path: path.to_path_buf(),
            message: other.to_string(),
        },
    })
}
