use std::path::PathBuf;

use thiserror::Error;

pub type DigitizeResult<T> = Result<T, DigitizeError>;

/// Failures that abort a digitize run.
///
/// Degenerate regions and needle overflow are not represented here: both are
/// absorbed into the generated pattern and show up in the metrics instead.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum DigitizeError {
    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed manifest: {0}")]
    Manifest(String),

    #[error("region {index} is stitched as fill but has no angleDeg")]
    MissingAngle { index: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("encoder error: {0}")]
    Encode(String),

    #[error("render error: {0}")]
    Render(String),
}

impl DigitizeError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_are_stable() {
        assert!(DigitizeError::Manifest("x".to_string())
            .to_string()
            .starts_with("malformed manifest:"));
        assert!(DigitizeError::InvalidConfig("x".to_string())
            .to_string()
            .starts_with("invalid configuration:"));
        assert_eq!(
            DigitizeError::MissingAngle { index: 3 }.to_string(),
            "region 3 is stitched as fill but has no angleDeg"
        );
    }

    #[test]
    fn io_error_names_the_path() {
        let err = DigitizeError::io(
            "/tmp/missing.json",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        let text = err.to_string();
        assert!(text.contains("/tmp/missing.json"));
        assert!(text.contains("gone"));
    }
}
