//! TOML registry manifests.
//!
//! A manifest lists the discriminator assignments for an application so they
//! can live next to its other configuration:
//!
//! ```toml
//! width = "one_byte"
//! default_discriminator = 0
//!
//! [[types]]
//! name = "Group"
//! discriminator = 0
//!
//! [[types]]
//! name = "Person"
//! discriminator = 15
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::identifier::DiscriminatorWidth;
use crate::registry::RegistryBuilder;
use crate::IdError;

/// A single `[[types]]` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ManifestEntry {
    pub name: String,
    pub discriminator: u32,
}

/// Parsed registry manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegistryManifest {
    #[serde(default)]
    pub width: DiscriminatorWidth,

    #[serde(default)]
    pub default_discriminator: u32,

    #[serde(default)]
    pub types: Vec<ManifestEntry>,
}

impl RegistryManifest {
    pub fn from_toml_str(contents: &str) -> Result<Self, IdError> {
        toml::from_str(contents).map_err(|e| IdError::InvalidManifest(e.to_string()))
    }

    pub fn from_path(path: &Path) -> Result<Self, IdError> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            IdError::InvalidManifest(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&contents)
    }

    /// Runs every entry through [`RegistryBuilder::register`].
    pub fn into_builder(self) -> Result<RegistryBuilder, IdError> {
        let mut builder = RegistryBuilder::new(self.width);
        builder.default_discriminator(self.default_discriminator)?;
        for entry in self.types {
            builder.register(entry.discriminator, entry.name)?;
        }
        Ok(builder)
    }
}

impl RegistryBuilder {
    /// Builds a registry from a TOML manifest.
    pub fn from_manifest_str(contents: &str) -> Result<Self, IdError> {
        RegistryManifest::from_toml_str(contents)?.into_builder()
    }
}
