use std::marker::PhantomData;

use burn::prelude::*;

/// Configuration to create a [BinaryCrossEntropyLoss] using the
/// [init function](BinaryCrossEntropyLossConfig::init).
#[derive(Config, Debug)]
pub struct BinaryCrossEntropyLossConfig {
    /// Probabilities are clamped to `[epsilon, 1 - epsilon]` before the log
    /// so an exactly-saturated sigmoid cannot produce an infinite loss.
    /// Must stay above single-precision machine epsilon or the upper clamp
    /// rounds back to 1.0.
    #[config(default = 1e-7)]
    pub epsilon: f32,
}

impl BinaryCrossEntropyLossConfig {
    pub fn init<B: Backend>(&self, _device: &B::Device) -> BinaryCrossEntropyLoss<B> {
        self.assertions();
        BinaryCrossEntropyLoss {
            epsilon: self.epsilon,
            _b: PhantomData,
        }
    }

    fn assertions(&self) {
        assert!(
            (0.0..0.5).contains(&self.epsilon),
            "Epsilon must be in [0, 0.5). Got {}",
            self.epsilon
        );
    }
}

/// Binary cross-entropy between a predicted per-pixel probability map and a
/// binary ground-truth mask, averaged over all pixels and batch elements.
///
/// Predictions are expected to already be probabilities (the network applies
/// its own sigmoid), not logits.
#[derive(Module, Debug)]
pub struct BinaryCrossEntropyLoss<B: Backend> {
    pub epsilon: f32,
    _b: PhantomData<B>,
}

impl<B: Backend> BinaryCrossEntropyLoss<B> {
    /// # Shapes
    ///
    /// - predictions: `[batch_size, 1, height, width]`, values in [0, 1]
    /// - targets: `[batch_size, 1, height, width]`, values 0.0 or 1.0
    pub fn forward(&self, predictions: Tensor<B, 4>, targets: Tensor<B, 4>) -> Tensor<B, 1> {
        Self::assertions(&predictions, &targets);

        let probs = predictions.clamp(self.epsilon, 1.0 - self.epsilon);

        let log_likelihood = targets.clone() * probs.clone().log()
            + (targets.ones_like() - targets) * (probs.ones_like() - probs).log();

        log_likelihood.mean().neg()
    }

    fn assertions(predictions: &Tensor<B, 4>, targets: &Tensor<B, 4>) {
        let pred_dims = predictions.dims();
        let target_dims = targets.dims();

        assert_eq!(
            pred_dims, target_dims,
            "Shape mismatch: predictions {:?} vs targets {:?}",
            pred_dims, target_dims
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray<f32>;

    #[test]
    fn confident_correct_predictions_have_near_zero_loss() {
        let device = Default::default();
        let loss_fn = BinaryCrossEntropyLossConfig::new().init::<TestBackend>(&device);

        let targets = Tensor::<TestBackend, 4>::from_data(
            TensorData::from([[[[1.0f32, 0.0], [0.0, 1.0]]]]),
            &device,
        );

        let loss = loss_fn
            .forward(targets.clone(), targets)
            .into_scalar()
            .elem::<f64>();

        assert!(loss.abs() < 1e-4, "loss should vanish, got {loss}");
    }

    #[test]
    fn maximally_uncertain_predictions_cost_ln_two() {
        let device = Default::default();
        let loss_fn = BinaryCrossEntropyLossConfig::new().init::<TestBackend>(&device);

        let predictions = Tensor::<TestBackend, 4>::full([2, 1, 4, 4], 0.5, &device);
        let targets = Tensor::<TestBackend, 4>::ones([2, 1, 4, 4], &device);

        let loss = loss_fn
            .forward(predictions, targets)
            .into_scalar()
            .elem::<f64>();

        assert!(
            (loss - std::f64::consts::LN_2).abs() < 1e-5,
            "p=0.5 everywhere must cost ln 2, got {loss}"
        );
    }

    #[test]
    fn saturated_predictions_stay_finite() {
        let device = Default::default();
        let loss_fn = BinaryCrossEntropyLossConfig::new().init::<TestBackend>(&device);

        let predictions = Tensor::<TestBackend, 4>::ones([1, 1, 2, 2], &device);
        let targets = Tensor::<TestBackend, 4>::zeros([1, 1, 2, 2], &device);

        let loss = loss_fn
            .forward(predictions, targets)
            .into_scalar()
            .elem::<f64>();

        assert!(loss.is_finite(), "clamping must keep the loss finite");
        assert!(loss > 1.0, "a fully wrong prediction must cost heavily");
    }
}
