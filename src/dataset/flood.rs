use std::path::{Path, PathBuf};

use image::imageops::{self, FilterType};
use thiserror::Error;

use burn::data::dataset::transform::{Mapper, MapperDataset};
use burn::data::dataset::{Dataset, InMemDataset};

use crate::model::INPUT_SIZE;

/// Extension the flood corpus uses for aerial images.
pub const IMAGE_EXTENSION: &str = "jpg";
/// Extension the flood corpus uses for ground-truth masks.
pub const MASK_EXTENSION: &str = "png";

#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("I/O error: `{0}`")]
    IOError(String),

    #[error("found {images} images but {masks} masks; directories must pair one-to-one")]
    CountMismatch { images: usize, masks: usize },

    #[error("no `.{IMAGE_EXTENSION}` images found in {0:?}")]
    EmptyDataset(PathBuf),
}

/// Filesystem coordinates of one (image, mask) pair.
#[derive(Debug, Clone)]
pub struct FloodItemRaw {
    pub image_path: PathBuf,
    pub mask_path: PathBuf,
}

/// A decoded sample, resized to the network input size but not yet
/// normalized: `image` is RGB row-major HWC bytes, `mask` raw grayscale
/// bytes. Normalization and binarization happen in the batcher.
#[derive(Debug, Clone)]
pub struct FloodItem {
    pub image: Vec<u8>,
    pub mask: Vec<u8>,
}

struct LoadFloodItem;

impl Mapper<FloodItemRaw, FloodItem> for LoadFloodItem {
    fn map(&self, item: &FloodItemRaw) -> FloodItem {
        let size = INPUT_SIZE as u32;

        // A corrupt file must abort the run, never degrade into a zero
        // tensor; the dataloader has no per-sample recovery path.
        let image = image::open(&item.image_path)
            .unwrap_or_else(|e| panic!("failed to decode image {:?}: {e}", item.image_path));
        let image = imageops::resize(&image.into_rgb8(), size, size, FilterType::Triangle);

        let mask = image::open(&item.mask_path)
            .unwrap_or_else(|e| panic!("failed to decode mask {:?}: {e}", item.mask_path));
        let mask = imageops::resize(&mask.into_luma8(), size, size, FilterType::Nearest);

        FloodItem {
            image: image.into_raw(),
            mask: mask.into_raw(),
        }
    }
}

type FloodDatasetMapper = MapperDataset<InMemDataset<FloodItemRaw>, LoadFloodItem, FloodItemRaw>;

/// An ordered, fixed-length collection of (image, mask) pairs backed by two
/// parallel directories. Pairing is positional over the sorted file listings.
pub struct FloodDataset {
    dataset: FloodDatasetMapper,
}

impl Dataset<FloodItem> for FloodDataset {
    fn get(&self, index: usize) -> Option<FloodItem> {
        self.dataset.get(index)
    }

    fn len(&self) -> usize {
        self.dataset.len()
    }
}

impl FloodDataset {
    /// Create a dataset from an images directory (`.jpg`) and a masks
    /// directory (`.png`). Counts must match; sorted filename order
    /// establishes which mask belongs to which image.
    pub fn from_dirs<P: AsRef<Path>>(images_dir: P, masks_dir: P) -> Result<Self, DatasetError> {
        let images_dir = images_dir.as_ref();
        let masks_dir = masks_dir.as_ref();

        let image_files = list_sorted(images_dir, IMAGE_EXTENSION)?;
        let mask_files = list_sorted(masks_dir, MASK_EXTENSION)?;

        if image_files.is_empty() {
            return Err(DatasetError::EmptyDataset(images_dir.to_path_buf()));
        }

        if image_files.len() != mask_files.len() {
            return Err(DatasetError::CountMismatch {
                images: image_files.len(),
                masks: mask_files.len(),
            });
        }

        let items = image_files
            .into_iter()
            .zip(mask_files)
            .map(|(image_path, mask_path)| {
                if image_path.file_stem() != mask_path.file_stem() {
                    // Positional pairing survives a naming-scheme divergence
                    // silently; surface it so mis-paired corpora get caught.
                    tracing::warn!(
                        image = %image_path.display(),
                        mask = %mask_path.display(),
                        "image and mask stems differ; verify directory pairing"
                    );
                }

                FloodItemRaw {
                    image_path,
                    mask_path,
                }
            })
            .collect::<Vec<_>>();

        let dataset = InMemDataset::new(items);
        let dataset = MapperDataset::new(dataset, LoadFloodItem);

        Ok(Self { dataset })
    }
}

fn list_sorted(dir: &Path, extension: &str) -> Result<Vec<PathBuf>, DatasetError> {
    if !dir.is_dir() {
        return Err(DatasetError::IOError(format!(
            "directory does not exist: {dir:?}"
        )));
    }

    let mut files = Vec::new();

    for entry in
        std::fs::read_dir(dir).map_err(|e| DatasetError::IOError(format!("{dir:?}: {e}")))?
    {
        let entry = entry.map_err(|e| DatasetError::IOError(format!("{dir:?}: {e}")))?;
        let path = entry.path();

        if path.is_file()
            && path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
        {
            files.push(path);
        }
    }

    files.sort();

    Ok(files)
}
