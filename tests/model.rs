use burn::backend::NdArray;
use burn::module::Module;
use burn::prelude::*;
use burn::record::CompactRecorder;
use burn::tensor::Distribution;

use floodseg::UNetConfig;
use floodseg::model::{ConvBlockConfig, DecoderBlockConfig};

type TestBackend = NdArray<f32>;

fn test_dir(name: &str) -> std::path::PathBuf {
    let dir = std::env::temp_dir().join(format!("floodseg-model-{}-{name}", std::process::id()));
    std::fs::create_dir_all(&dir).expect("temp dir should be writable");
    dir
}

#[test]
fn output_spatial_dims_match_input_for_sizes_divisible_by_16() {
    let device = Default::default();
    let model = UNetConfig::new()
        .with_base_channels(4)
        .init::<TestBackend>(&device);

    for size in [16, 32, 64] {
        let input = Tensor::<TestBackend, 4>::random(
            [2, 3, size, size],
            Distribution::Uniform(0.0, 1.0),
            &device,
        );

        let output = model.forward(input);

        assert_eq!(output.dims(), [2, 1, size, size]);
    }
}

#[test]
fn output_values_stay_in_sigmoid_range() {
    let device = Default::default();
    let model = UNetConfig::new()
        .with_base_channels(4)
        .init::<TestBackend>(&device);

    let input = Tensor::<TestBackend, 4>::random(
        [1, 3, 32, 32],
        Distribution::Uniform(0.0, 1.0),
        &device,
    );

    let output = model.forward(input);

    let min = output.clone().min().into_scalar().elem::<f32>();
    let max = output.max().into_scalar().elem::<f32>();

    assert!(min >= 0.0, "sigmoid output must be non-negative, got {min}");
    assert!(max <= 1.0, "sigmoid output must not exceed 1, got {max}");
}

#[test]
fn decoder_stages_double_channels_at_concatenation() {
    let device = Default::default();

    // Each decoder stage upsamples to `filters` channels, concatenates a
    // skip feature of the same channel count (doubling to `inputs`), and
    // restores `filters` channels. Mirrors the four stages at base 2.
    for (inputs, filters) in [(32, 16), (16, 8), (8, 4), (4, 2)] {
        let block = DecoderBlockConfig::new(
            inputs,
            filters,
            ConvBlockConfig::new(inputs, filters),
        )
        .init::<TestBackend>(&device);

        let bottom = Tensor::<TestBackend, 4>::random(
            [1, inputs, 4, 4],
            Distribution::Uniform(0.0, 1.0),
            &device,
        );
        let skip = Tensor::<TestBackend, 4>::random(
            [1, filters, 8, 8],
            Distribution::Uniform(0.0, 1.0),
            &device,
        );

        let output = block.forward(bottom, skip);

        assert_eq!(output.dims(), [1, filters, 8, 8]);
    }
}

#[test]
fn checkpoint_round_trips_through_the_recorder() {
    let device = Default::default();
    let dir = test_dir("roundtrip");

    let model = UNetConfig::new()
        .with_base_channels(4)
        .init::<TestBackend>(&device);

    let input = Tensor::<TestBackend, 4>::random(
        [1, 3, 32, 32],
        Distribution::Uniform(0.0, 1.0),
        &device,
    );

    let expected = model.forward(input.clone()).into_data();

    model
        .clone()
        .save_file(dir.join("model"), &CompactRecorder::new())
        .expect("checkpoint should save");

    let restored = UNetConfig::new()
        .with_base_channels(4)
        .init::<TestBackend>(&device)
        .load_file(dir.join("model"), &CompactRecorder::new(), &device)
        .expect("checkpoint should load into a matching architecture");

    let actual = restored.forward(input).into_data();
    expected.assert_approx_eq(&actual, 5);

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn checkpoint_with_mismatched_shapes_is_rejected() {
    let device = Default::default();
    let dir = test_dir("mismatch");

    UNetConfig::new()
        .with_base_channels(4)
        .init::<TestBackend>(&device)
        .save_file(dir.join("model"), &CompactRecorder::new())
        .expect("checkpoint should save");

    let result = UNetConfig::new()
        .with_base_channels(8)
        .init::<TestBackend>(&device)
        .load_file(dir.join("model"), &CompactRecorder::new(), &device);

    assert!(
        result.is_err(),
        "loading a 4-channel checkpoint into an 8-channel network must fail"
    );

    std::fs::remove_dir_all(&dir).ok();
}
