//! On-disk image tensor store
//!
//! The regression path addresses samples by identifier; each identifier maps
//! to a pre-decoded `.npy` tensor under a fixed directory. A batch of ids is
//! loaded and stacked along a new leading axis.

use crate::{Error, Result};
use ndarray::{ArrayD, Axis};
use ndarray_npy::read_npy;
use std::path::{Path, PathBuf};

/// Default image tensor directory
pub const DEFAULT_IMAGE_DIR: &str = "./img_npy";

/// Directory of `<id>.npy` image tensors
#[derive(Debug, Clone)]
pub struct ImageStore {
    dir: PathBuf,
}

impl ImageStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of one sample's tensor file
    pub fn path(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{id}.npy"))
    }

    /// Load one sample's image tensor
    pub fn load(&self, id: &str) -> Result<ArrayD<f32>> {
        let path = self.path(id);
        if !path.exists() {
            return Err(Error::ImageNotFound(path));
        }
        read_npy(&path).map_err(|e| Error::Image(format!("{}: {e}", path.display())))
    }

    /// Load a batch of ids, stacked along a new leading axis in id order
    pub fn load_batch(&self, ids: &[String]) -> Result<ArrayD<f32>> {
        if ids.is_empty() {
            return Err(Error::InvalidParameter(
                "cannot stack an empty image batch".into(),
            ));
        }
        let images: Vec<ArrayD<f32>> = ids.iter().map(|id| self.load(id)).collect::<Result<_>>()?;

        let shape = images[0].shape().to_vec();
        for image in &images {
            if image.shape() != shape.as_slice() {
                return Err(Error::ShapeMismatch {
                    expected: shape,
                    got: image.shape().to_vec(),
                });
            }
        }

        let views: Vec<_> = images.iter().map(|img| img.view()).collect();
        ndarray::stack(Axis(0), &views).map_err(|e| Error::Image(e.to_string()))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl Default for ImageStore {
    fn default() -> Self {
        Self::new(DEFAULT_IMAGE_DIR)
    }
}
