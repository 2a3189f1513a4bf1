//! TOML file parsing with typed errors.
//!
//! Read failures become [`DepforgeError::FileSystem`] and syntax or shape
//! errors become [`DepforgeError::ConfigParse`], both naming the file.
//!
//! ```rust,no_run
//! use depforge::config::parse_config;
//! use serde::Deserialize;
//! use std::path::Path;
//!
//! #[derive(Deserialize)]
//! struct Settings {
//!     name: String,
//! }
//!
//! # fn example() -> anyhow::Result<()> {
//! let settings: Settings = parse_config(Path::new("settings.toml"))?;
//! println!("{}", settings.name);
//! # Ok(())
//! # }
//! ```

use anyhow::Result;
use std::path::Path;

use crate::core::DepforgeError;

/// Reads `path` and deserializes it as TOML into `T`.
///
/// No caching: every call reads the file again.
pub fn parse_config<T>(path: &Path) -> Result<T>
where
    T: serde::de::DeserializeOwned,
{
    let content =
        std::fs::read_to_string(path).map_err(|e| DepforgeError::fs("read config file", path, e))?;
    parse_config_str(&content, path)
}

/// Deserializes TOML `content` that was read from `path`.
pub fn parse_config_str<T>(content: &str, path: &Path) -> Result<T>
where
    T: serde::de::DeserializeOwned,
{
    toml::from_str(content).map_err(|e| {
        DepforgeError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        }
        .into()
    })
}
