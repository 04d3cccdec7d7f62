//! Configuration files
//!
//! Settings load from TOML or RON; the format follows the file extension.

use serde::{de::DeserializeOwned, Serialize};
use std::path::{Path, PathBuf};

mod viewer;

pub use viewer::ViewerConfig;

/// Supported on-disk formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// `.toml`
    Toml,
    /// `.ron`
    Ron,
}

impl ConfigFormat {
    /// Pick the format from a path's extension
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Ok(Self::Toml),
            Some("ron") => Ok(Self::Ron),
            _ => Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
        }
    }

    /// Parse `text` in this format
    pub fn parse<T: DeserializeOwned>(self, text: &str) -> Result<T, String> {
        match self {
            Self::Toml => toml::from_str(text).map_err(|e| e.to_string()),
            Self::Ron => ron::from_str(text).map_err(|e| e.to_string()),
        }
    }

    /// Render `value` in this format
    pub fn render<T: Serialize>(self, value: &T) -> Result<String, String> {
        match self {
            Self::Toml => toml::to_string_pretty(value).map_err(|e| e.to_string()),
            Self::Ron => ron::ser::to_string_pretty(value, ron::ser::PrettyConfig::default())
                .map_err(|e| e.to_string()),
        }
    }
}

/// A settings struct stored in a file
pub trait Config: Serialize + DeserializeOwned + Default {
    /// Read and parse `path`
    fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let format = ConfigFormat::from_path(path)?;
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        format.parse(&text).map_err(|message| ConfigError::Parse {
            path: path.to_path_buf(),
            message,
        })
    }

    /// Serialize and write to `path`
    fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let text = ConfigFormat::from_path(path)?
            .render(self)
            .map_err(ConfigError::Serialize)?;
        std::fs::write(path, text).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// The file could not be read or written
    #[error("cannot access {}: {source}", path.display())]
    Io {
        /// File involved
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// The file is not valid for its format
    #[error("cannot parse {}: {message}", path.display())]
    Parse {
        /// File involved
        path: PathBuf,
        /// Parser message
        message: String,
    },

    /// The settings could not be rendered
    #[error("cannot serialize settings: {0}")]
    Serialize(String),

    /// The extension names no supported format
    #[error("unsupported config format: {}", .0.display())]
    UnsupportedFormat(PathBuf),

    /// A field holds a value the viewer cannot run with
    #[error("invalid value for `{field}`: {reason}")]
    Invalid {
        /// Offending field name
        field: &'static str,
        /// Why the value was rejected
        reason: String,
    },
}
