//! Organizer configuration.
//!
//! The configuration names the folder to watch and the ordered mapping of
//! destination folders to file extensions. It is read from a YAML document and
//! validated once at startup; nothing in it changes while the organizer runs.
//!
//! # Configuration File Format
//!
//! ```yaml
//! source_folder: ~/Downloads
//! destinations:
//!   images: [.jpg, .jpeg, .png]
//!   docs: [.pdf, .docx]
//!   /srv/archive: [.zip]
//! ```
//!
//! Destination names may be relative (to the source folder) or absolute.
//! Extensions are matched case-insensitively; a missing leading dot is added.

use crate::file_category::{Destination, DestinationMap};
use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default configuration file, relative to the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";

/// Errors that can occur while loading the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file not found at the specified path.
    #[error("configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// The file exists but could not be read.
    #[error("failed to read configuration {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Invalid YAML syntax or a missing/mistyped field.
    #[error("invalid configuration: {0}")]
    Parse(#[from] serde_yaml::Error),
    /// Well-formed YAML whose values fail validation.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Validated organizer configuration.
#[derive(Debug, Clone)]
pub struct OrganizerConfig {
    /// Folder to scan and watch, with `~` already expanded.
    pub source_folder: PathBuf,
    /// Destinations in priority order.
    pub destinations: DestinationMap,
}

/// Shape of the configuration document before validation.
#[derive(Debug, Deserialize)]
struct RawConfig {
    source_folder: String,
    destinations: RawDestinations,
}

/// Destinations exactly as written, in document order.
#[derive(Debug)]
struct RawDestinations(Vec<(String, Vec<String>)>);

impl<'de> Deserialize<'de> for RawDestinations {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct RawDestinationsVisitor;

        impl<'de> Visitor<'de> for RawDestinationsVisitor {
            type Value = RawDestinations;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a mapping of folder names to lists of extensions")
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries: Vec<(String, Vec<String>)> = Vec::new();
                while let Some((name, extensions)) =
                    access.next_entry::<String, Vec<String>>()?
                {
                    if entries.iter().any(|(existing, _)| *existing == name) {
                        return Err(de::Error::custom(format!(
                            "duplicate destination '{}'",
                            name
                        )));
                    }
                    entries.push((name, extensions));
                }
                Ok(RawDestinations(entries))
            }
        }

        deserializer.deserialize_map(RawDestinationsVisitor)
    }
}

impl OrganizerConfig {
    /// Load and validate configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotFound` if the file does not exist,
    /// `ConfigError::Io` if it cannot be read, `ConfigError::Parse` if the YAML
    /// is malformed or a field is missing, and `ConfigError::Invalid` if the
    /// values fail validation.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_yaml_str(&content)
    }

    /// Parse and validate configuration from YAML text.
    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = serde_yaml::from_str(content)?;
        Self::validate(raw)
    }

    fn validate(raw: RawConfig) -> Result<Self, ConfigError> {
        let source = raw.source_folder.trim();
        if source.is_empty() {
            return Err(ConfigError::Invalid(
                "'source_folder' must not be empty".to_string(),
            ));
        }

        if raw.destinations.0.is_empty() {
            return Err(ConfigError::Invalid(
                "'destinations' must name at least one folder".to_string(),
            ));
        }

        let mut destinations = DestinationMap::new();
        for (name, extensions) in raw.destinations.0 {
            if name.trim().is_empty() {
                return Err(ConfigError::Invalid(
                    "destination folder names must not be empty".to_string(),
                ));
            }
            if let Some(blank) = extensions.iter().position(|ext| ext.trim().is_empty()) {
                return Err(ConfigError::Invalid(format!(
                    "destination '{}' has a blank extension at position {}",
                    name, blank
                )));
            }
            destinations.push(Destination::new(name, &extensions));
        }

        Ok(Self {
            source_folder: expand_home(Path::new(source)),
            destinations,
        })
    }
}

/// Expands a leading `~` to the current user's home directory.
///
/// Paths that do not start with `~`, or a `~user` form, are returned unchanged.
/// If the home directory cannot be determined the path is also left as-is.
pub fn expand_home(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    match dirs::home_dir() {
        Some(home) if rest.as_os_str().is_empty() => home,
        Some(home) => home.join(rest),
        None => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
source_folder: /tmp/inbox
destinations:
  images: [.jpg, .png]
  docs: [.pdf]
"#;

    #[test]
    fn test_parse_valid_config() {
        let config = OrganizerConfig::from_yaml_str(SAMPLE).unwrap();
        assert_eq!(config.source_folder, PathBuf::from("/tmp/inbox"));
        assert_eq!(config.destinations.len(), 2);
        assert_eq!(config.destinations.classify(".JPG"), Some("images"));
        assert_eq!(config.destinations.classify(".pdf"), Some("docs"));
    }

    #[test]
    fn test_destination_order_is_preserved() {
        let yaml = r#"
source_folder: /tmp/inbox
destinations:
  zeta: [.pdf]
  alpha: [.pdf, .txt]
  middle: [.md]
"#;
        let config = OrganizerConfig::from_yaml_str(yaml).unwrap();
        let names: Vec<_> = config.destinations.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["zeta", "alpha", "middle"]);
        assert_eq!(config.destinations.classify(".pdf"), Some("zeta"));
    }

    #[test]
    fn test_extensions_are_normalized() {
        let yaml = r#"
source_folder: /tmp/inbox
destinations:
  docs: [PDF, .DOCX]
"#;
        let config = OrganizerConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.destinations.classify(".pdf"), Some("docs"));
        assert_eq!(config.destinations.classify(".docx"), Some("docs"));
    }

    #[test]
    fn test_missing_source_folder_is_rejected() {
        let yaml = "destinations:\n  docs: [.pdf]\n";
        let result = OrganizerConfig::from_yaml_str(yaml);
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_missing_destinations_is_rejected() {
        let yaml = "source_folder: /tmp/inbox\n";
        let result = OrganizerConfig::from_yaml_str(yaml);
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_malformed_destinations_are_rejected() {
        let yaml = "source_folder: /tmp/inbox\ndestinations: [.pdf, .jpg]\n";
        let result = OrganizerConfig::from_yaml_str(yaml);
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_empty_destinations_are_rejected() {
        let yaml = "source_folder: /tmp/inbox\ndestinations: {}\n";
        let result = OrganizerConfig::from_yaml_str(yaml);
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_blank_source_folder_is_rejected() {
        let yaml = "source_folder: \"  \"\ndestinations:\n  docs: [.pdf]\n";
        let result = OrganizerConfig::from_yaml_str(yaml);
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_blank_extension_is_rejected() {
        let yaml = "source_folder: /tmp/inbox\ndestinations:\n  docs: [.pdf, \"\"]\n";
        let result = OrganizerConfig::from_yaml_str(yaml);
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_duplicate_destination_is_rejected() {
        let yaml = "source_folder: /tmp/inbox\ndestinations:\n  docs: [.pdf]\n  docs: [.txt]\n";
        let result = OrganizerConfig::from_yaml_str(yaml);
        assert!(result.is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let result = OrganizerConfig::load(Path::new("/non/existent/config.yaml"));
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_expand_home() {
        let plain = Path::new("/var/data");
        assert_eq!(expand_home(plain), PathBuf::from("/var/data"));

        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home(Path::new("~")), home);
            assert_eq!(expand_home(Path::new("~/Downloads")), home.join("Downloads"));
        }
    }

    #[test]
    fn test_source_folder_home_is_expanded() {
        let Some(home) = dirs::home_dir() else {
            return;
        };
        let yaml = "source_folder: ~/Downloads\ndestinations:\n  docs: [.pdf]\n";
        let config = OrganizerConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.source_folder, home.join("Downloads"));
    }
}
