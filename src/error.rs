/// Level loading errors.
///
/// Only resource failures live here. Refused moves are plain `false`,
/// and malformed records are recovered in the loader with a warning.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LevelError {
    #[error("cannot read level file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("level {name} has no header line")]
    MissingHeader { name: String },

    #[error("level {name}: bad header {line:?}, expected \"width,height\"")]
    BadHeader { name: String, line: String },

    #[error("no built-in level {0}")]
    NoSuchLevel(usize),
}

pub type Result<T> = std::result::Result<T, LevelError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_names_the_file() {
        let err = LevelError::Io {
            path: PathBuf::from("res/levels/3.lvl"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        let msg = err.to_string();
        assert!(msg.contains("res/levels/3.lvl"));
        assert!(msg.contains("gone"));
    }

    #[test]
    fn bad_header_quotes_the_line() {
        let err = LevelError::BadHeader { name: "0".into(), line: "ten,6".into() };
        assert!(err.to_string().contains("\"ten,6\""));
    }
}
