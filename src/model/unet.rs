use burn::{
    nn::conv::{Conv2d, Conv2dConfig},
    prelude::*,
};

use nn::Sigmoid;

use super::blocks::{
    ConvBlock, ConvBlockConfig, DecoderBlock, DecoderBlockConfig, EncoderBlock, EncoderBlockConfig,
};

/// Spatial size the flood network is trained and served at. Any input whose
/// side length is divisible by 16 survives the four pool/upsample pairs, but
/// checkpointed weights assume this size.
pub const INPUT_SIZE: usize = 256;

/// Symmetric encoder-decoder with skip connections mapping an RGB tensor to
/// a per-pixel flood probability map.
#[derive(Module, Debug)]
pub struct UNet<B: Backend> {
    encoder_block_1: EncoderBlock<B>,
    encoder_block_2: EncoderBlock<B>,
    encoder_block_3: EncoderBlock<B>,
    encoder_block_4: EncoderBlock<B>,
    bottleneck: ConvBlock<B>,
    decoder_block_1: DecoderBlock<B>,
    decoder_block_2: DecoderBlock<B>,
    decoder_block_3: DecoderBlock<B>,
    decoder_block_4: DecoderBlock<B>,
    conv_1x1: Conv2d<B>,
}

#[derive(Config, Debug)]
pub struct UNetConfig {
    #[config(default = "3")]
    input_channels: usize,
    #[config(default = "64")]
    base_channels: usize,
    #[config(default = "1")]
    output_channels: usize,
}

impl UNetConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> UNet<B> {
        UNet {
            encoder_block_1: EncoderBlockConfig::new(ConvBlockConfig::new(
                self.input_channels,
                self.base_channels,
            ))
            .init(device),
            encoder_block_2: EncoderBlockConfig::new(ConvBlockConfig::new(
                self.base_channels,
                self.base_channels * 2,
            ))
            .init(device),
            encoder_block_3: EncoderBlockConfig::new(ConvBlockConfig::new(
                self.base_channels * 2,
                self.base_channels * 4,
            ))
            .init(device),
            encoder_block_4: EncoderBlockConfig::new(ConvBlockConfig::new(
                self.base_channels * 4,
                self.base_channels * 8,
            ))
            .init(device),
            bottleneck: ConvBlockConfig::new(self.base_channels * 8, self.base_channels * 16)
                .init(device),
            decoder_block_1: DecoderBlockConfig::new(
                self.base_channels * 16,
                self.base_channels * 8,
                ConvBlockConfig::new(self.base_channels * 16, self.base_channels * 8),
            )
            .init(device),
            decoder_block_2: DecoderBlockConfig::new(
                self.base_channels * 8,
                self.base_channels * 4,
                ConvBlockConfig::new(self.base_channels * 8, self.base_channels * 4),
            )
            .init(device),
            decoder_block_3: DecoderBlockConfig::new(
                self.base_channels * 4,
                self.base_channels * 2,
                ConvBlockConfig::new(self.base_channels * 4, self.base_channels * 2),
            )
            .init(device),
            decoder_block_4: DecoderBlockConfig::new(
                self.base_channels * 2,
                self.base_channels,
                ConvBlockConfig::new(self.base_channels * 2, self.base_channels),
            )
            .init(device),
            conv_1x1: Conv2dConfig::new([self.base_channels, self.output_channels], [1, 1])
                .init(device),
        }
    }
}

impl<B: Backend> UNet<B> {
    /// Maps `[batch, 3, S, S]` to `[batch, 1, S, S]` probabilities in [0, 1].
    /// S must be divisible by 16.
    pub fn forward(&self, images: Tensor<B, 4>) -> Tensor<B, 4> {
        let x = images;

        let (x, skip_features_1) = self.encoder_block_1.forward(x);
        let (x, skip_features_2) = self.encoder_block_2.forward(x);
        let (x, skip_features_3) = self.encoder_block_3.forward(x);
        let (x, skip_features_4) = self.encoder_block_4.forward(x);

        let x = self.bottleneck.forward(x);

        let x = self.decoder_block_1.forward(x, skip_features_4);
        let x = self.decoder_block_2.forward(x, skip_features_3);
        let x = self.decoder_block_3.forward(x, skip_features_2);
        let x = self.decoder_block_4.forward(x, skip_features_1);

        let x = self.conv_1x1.forward(x);

        Sigmoid::new().forward(x)
    }
}
