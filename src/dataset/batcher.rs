use burn::{data::dataloader::batcher::Batcher, prelude::*};
use derive_new::new;

use crate::dataset::FloodItem;
use crate::model::INPUT_SIZE;

/// Grayscale mask values strictly above this are flooded pixels.
pub const MASK_BINARY_THRESHOLD: u8 = 127;

/// Stacks decoded samples into normalized channel-first tensors.
#[derive(Clone, new)]
pub struct FloodBatcher<B: Backend> {
    device: B::Device,
}

#[derive(Clone, Debug)]
pub struct FloodBatch<B: Backend> {
    /// `[batch, 3, 256, 256]`, values in [0, 1].
    pub images: Tensor<B, 4>,
    /// `[batch, 1, 256, 256]`, values exactly 0.0 or 1.0.
    pub masks: Tensor<B, 4>,
}

impl<B: Backend> Batcher<FloodItem, FloodBatch<B>> for FloodBatcher<B> {
    fn batch(&self, items: Vec<FloodItem>) -> FloodBatch<B> {
        let batch_size = items.len();
        let size = INPUT_SIZE;

        let mut images = Vec::with_capacity(batch_size);
        let mut masks = Vec::with_capacity(batch_size);

        for item in items {
            let mut image_data = Vec::with_capacity(3 * size * size);

            for c in 0..3 {
                for y in 0..size {
                    for x in 0..size {
                        let idx = (y * size + x) * 3 + c;
                        image_data.push(item.image[idx] as f32 / 255.0);
                    }
                }
            }

            let image_tensor = Tensor::<B, 3>::from_data(
                TensorData::new(image_data, Shape::new([3, size, size]))
                    .convert::<B::FloatElem>(),
                &self.device,
            );

            let mask_data: Vec<f32> = item
                .mask
                .iter()
                .map(|&v| if v > MASK_BINARY_THRESHOLD { 1.0 } else { 0.0 })
                .collect();

            let mask_tensor = Tensor::<B, 3>::from_data(
                TensorData::new(mask_data, Shape::new([1, size, size])).convert::<B::FloatElem>(),
                &self.device,
            );

            images.push(image_tensor);
            masks.push(mask_tensor);
        }

        let images: Tensor<B, 4> = Tensor::stack::<4>(images, 0);
        let masks: Tensor<B, 4> = Tensor::stack::<4>(masks, 0);

        FloodBatch { images, masks }
    }
}
