mod batcher;
mod flood;

pub use batcher::{FloodBatch, FloodBatcher, MASK_BINARY_THRESHOLD};
pub use flood::{DatasetError, FloodDataset, FloodItem, FloodItemRaw};
