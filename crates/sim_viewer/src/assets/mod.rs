//! Asset lookup for terrain and entity models
//!
//! Assets are described by small TOML descriptors named after the asset
//! (`<name>.toml` or `<name>/<name>.toml`) inside one of the configured
//! search directories. Referenced files are resolved relative to the
//! descriptor; files that do not exist are reported as absent so callers
//! can degrade the visual instead of failing.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::foundation::math::Vec3;

/// Asset lookup errors
#[derive(Debug, Error)]
pub enum AssetError {
    /// No descriptor for the name in any search directory
    #[error("asset '{0}' not found in search paths")]
    NotFound(String),

    /// Descriptor could not be read
    #[error("failed to read asset descriptor {path}: {source}")]
    Io {
        /// Descriptor path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Descriptor is not valid TOML for an asset
    #[error("failed to parse asset descriptor {path}: {message}")]
    Parse {
        /// Descriptor path
        path: PathBuf,
        /// Parser message
        message: String,
    },
}

/// Files and placement for a terrain
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TerrainAssets {
    /// Texture image, if present on disk
    pub texture_file: Option<PathBuf>,
    /// Terrain mesh, if present on disk
    pub mesh_file: Option<PathBuf>,
    /// Offset subtracted from the terrain vertices
    pub translate: Vec3,
}

/// Files and fixed rotation for an entity model
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelAssets {
    /// Model mesh, if present on disk
    pub model_file: Option<PathBuf>,
    /// Texture image, if present on disk
    pub texture_file: Option<PathBuf>,
    /// X/Y/Z rotation in degrees applied to the model
    pub rotate: Vec3,
}

/// Resolves asset names to files
pub trait AssetLocator {
    /// Find the files for a terrain
    fn locate_terrain(&self, name: &str) -> Result<TerrainAssets, AssetError>;

    /// Find the files for an entity model
    fn locate_model(&self, name: &str) -> Result<ModelAssets, AssetError>;
}

/// On-disk asset descriptor
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AssetDescriptor {
    /// Texture image path
    pub texture: Option<PathBuf>,
    /// Mesh path
    pub mesh: Option<PathBuf>,
    /// Terrain translation
    pub translate: [f64; 3],
    /// Model rotation in degrees
    pub rotate: [f64; 3],
}

/// [`AssetLocator`] searching a list of directories
#[derive(Debug, Clone, Default)]
pub struct FileSearch {
    search_paths: Vec<PathBuf>,
}

impl FileSearch {
    /// Create a locator over `search_paths`, searched in order
    pub fn new(search_paths: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        Self {
            search_paths: search_paths.into_iter().map(Into::into).collect(),
        }
    }

    /// First descriptor file for `name`, if any
    pub fn find_descriptor(&self, name: &str) -> Option<PathBuf> {
        let file_name = format!("{}.toml", name);
        self.search_paths.iter().find_map(|dir| {
            [dir.join(&file_name), dir.join(name).join(&file_name)]
                .into_iter()
                .find(|candidate| candidate.is_file())
        })
    }

    /// Read and parse the descriptor for `name`
    pub fn load_descriptor(&self, name: &str) -> Result<(PathBuf, AssetDescriptor), AssetError> {
        let path = self
            .find_descriptor(name)
            .ok_or_else(|| AssetError::NotFound(name.to_string()))?;
        let contents = std::fs::read_to_string(&path).map_err(|source| AssetError::Io {
            path: path.clone(),
            source,
        })?;
        let descriptor = toml::from_str(&contents).map_err(|e| AssetError::Parse {
            path: path.clone(),
            message: e.to_string(),
        })?;
        Ok((path, descriptor))
    }
}

/// Resolve `file` against the descriptor directory, keeping it only if it exists
fn resolve_existing(descriptor_path: &Path, file: Option<&PathBuf>) -> Option<PathBuf> {
    let file = file?;
    let resolved = if file.is_absolute() {
        file.clone()
    } else {
        descriptor_path.parent().unwrap_or_else(|| Path::new(".")).join(file)
    };
    if resolved.is_file() {
        Some(resolved)
    } else {
        log::warn!("Asset file {} does not exist", resolved.display());
        None
    }
}

impl AssetLocator for FileSearch {
    fn locate_terrain(&self, name: &str) -> Result<TerrainAssets, AssetError> {
        let (path, descriptor) = self.load_descriptor(name)?;
        Ok(TerrainAssets {
            texture_file: resolve_existing(&path, descriptor.texture.as_ref()),
            mesh_file: resolve_existing(&path, descriptor.mesh.as_ref()),
            translate: Vec3::from(descriptor.translate),
        })
    }

    fn locate_model(&self, name: &str) -> Result<ModelAssets, AssetError> {
        let (path, descriptor) = self.load_descriptor(name)?;
        Ok(ModelAssets {
            model_file: resolve_existing(&path, descriptor.mesh.as_ref()),
            texture_file: resolve_existing(&path, descriptor.texture.as_ref()),
            rotate: Vec3::from(descriptor.rotate),
        })
    }
}
