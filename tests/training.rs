use burn::backend::{Autodiff, NdArray};

use image::{GrayImage, Rgb, RgbImage};

use floodseg::{FloodPredictor, TrainingConfig, UNetConfig, training};

type TrainingBackend = Autodiff<NdArray<f32>>;

#[test]
fn one_epoch_run_writes_a_servable_checkpoint() {
    let root = std::env::temp_dir().join(format!("floodseg-training-{}", std::process::id()));
    let images = root.join("images");
    let masks = root.join("masks");
    let artifacts = root.join("artifacts");

    std::fs::create_dir_all(&images).expect("temp dir should be writable");
    std::fs::create_dir_all(&masks).expect("temp dir should be writable");

    for (stem, color, mask_value) in [("a", [0u8, 0, 255], 255u8), ("b", [120, 120, 120], 0)] {
        RgbImage::from_pixel(16, 16, Rgb(color))
            .save(images.join(format!("{stem}.jpg")))
            .expect("fixture image should save");
        GrayImage::from_pixel(16, 16, image::Luma([mask_value]))
            .save(masks.join(format!("{stem}.png")))
            .expect("fixture mask should save");
    }

    let device = Default::default();
    let config = TrainingConfig::new(UNetConfig::new().with_base_channels(2))
        .with_num_epochs(1)
        .with_batch_size(2)
        .with_num_workers(1);

    training::train::<TrainingBackend>(&artifacts, &images, &masks, &config, &device)
        .expect("training over a valid fixture set should succeed");

    // Checkpoint exists only after the final epoch and must be servable.
    assert!(artifacts.join("model.json").is_file());

    let predictor = FloodPredictor::<NdArray<f32>>::from_checkpoint(&artifacts, &device)
        .expect("trained checkpoint should load for inference");

    let prediction = predictor.predict(&image::DynamicImage::ImageRgb8(RgbImage::new(32, 32)));
    assert_eq!(prediction.mask.dimensions(), (32, 32));

    std::fs::remove_dir_all(&root).ok();
}

#[test]
fn training_fails_fast_on_a_broken_dataset() {
    let root = std::env::temp_dir().join(format!("floodseg-training-bad-{}", std::process::id()));
    let images = root.join("images");
    let masks = root.join("masks");

    std::fs::create_dir_all(&images).expect("temp dir should be writable");
    std::fs::create_dir_all(&masks).expect("temp dir should be writable");

    RgbImage::from_pixel(16, 16, Rgb([1, 2, 3]))
        .save(images.join("a.jpg"))
        .expect("fixture image should save");

    let device = Default::default();
    let config = TrainingConfig::new(UNetConfig::new().with_base_channels(2)).with_num_epochs(1);

    let result = training::train::<TrainingBackend>(
        &root.join("artifacts"),
        &images,
        &masks,
        &config,
        &device,
    );

    assert!(matches!(result, Err(training::TrainingError::Dataset(_))));

    std::fs::remove_dir_all(&root).ok();
}
