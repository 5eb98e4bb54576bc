use log::debug;

use crate::{
    configs::{
        Activation, ActivationKind, FilmParams, FilmSlot, FilmSlotParams, Head1x1Config,
        LayerConfig, LrSchedulerConfig, ModelConfig, NetConfig, OptimizerConfig, WaveNetConfig,
        load_demonet_config,
    },
    error::{Result, VariantError},
    variant::Variant,
};

const BOTTLENECK: usize = 2;
const GROUPS_INPUT: usize = 2;
/// `groups_input` is only ever set on this layer.
const GROUPS_INPUT_LAYER: usize = 1;
const PER_LAYER_ACTIVATIONS: [ActivationKind; 2] = [ActivationKind::Tanh, ActivationKind::Relu];

/// Derives variant configurations from a base configuration.
///
/// The base is never handed out mutably: every derivation works on its own clone.
#[derive(Debug, Clone)]
pub struct VariantBuilder {
    base: ModelConfig,
}

impl VariantBuilder {
    /// Creates a new `VariantBuilder`.
    ///
    /// # Arguments
    /// * `base` - The configuration every variant but `condition_dsp` is derived from.
    ///
    /// # Returns
    /// A new `VariantBuilder` instance.
    pub fn new(base: ModelConfig) -> Self {
        Self { base }
    }

    /// Creates a `VariantBuilder` over the demonet configuration on disk.
    ///
    /// # Errors
    /// Returns a `VariantError` if the demonet file cannot be loaded.
    pub fn load() -> Result<Self> {
        load_demonet_config().map(Self::new)
    }

    pub fn base(&self) -> &ModelConfig {
        &self.base
    }

    /// Builds the configuration for a variant identifier such as `film_conv_pre_film`.
    ///
    /// # Errors
    /// Returns an invalid-argument `VariantError` if the identifier is not recognized.
    pub fn config_for_id(&self, id: &str) -> Result<ModelConfig> {
        let variant = id.parse::<Variant>()?;
        self.config_for_variant(&variant)
    }

    /// Builds the configuration for a variant.
    ///
    /// # Arguments
    /// * `variant` - Which single mutation to apply.
    ///
    /// # Returns
    /// A freshly owned configuration, or an error if the mutation cannot be applied
    /// to the base. No configuration is returned on error.
    pub fn config_for_variant(&self, variant: &Variant) -> Result<ModelConfig> {
        debug!(variant:% = variant; "deriving config");

        let mut config = self.base.clone();
        let layers = config.layers_mut();

        match *variant {
            Variant::ConditionDsp => return Ok(condition_dsp_config()),
            Variant::Base => {}
            Variant::Activation(activation) => apply_activation(layers, activation)?,
            Variant::Bottleneck => apply_bottleneck(layers),
            Variant::GroupsInput => apply_groups_input(layers, variant)?,
            Variant::Head1x1 => apply_head1x1(layers, variant)?,
            Variant::PerLayerActivations => apply_per_layer_activations(layers, variant)?,
            Variant::Film(slot) => apply_film(layers, slot, variant)?,
        }

        Ok(config)
    }
}

/// Loads the demonet base and derives the configuration for `id`.
///
/// # Errors
/// Returns a `VariantError` if the base cannot be loaded or the identifier is invalid.
pub fn get_config_for_variant(id: &str) -> Result<ModelConfig> {
    VariantBuilder::load()?.config_for_id(id)
}

fn require_layers(layers: &[LayerConfig], needed: usize, variant: &Variant) -> Result<()> {
    if layers.len() < needed {
        return Err(VariantError::TooFewLayers {
            variant: variant.id(),
            needed,
            got: layers.len(),
        });
    }
    Ok(())
}

fn head1x1(out_channels: usize) -> Head1x1Config {
    Head1x1Config {
        active: true,
        out_channels,
        groups: 1,
    }
}

fn apply_activation(layers: &mut [LayerConfig], activation: Activation) -> Result<()> {
    if !activation.is_loadmodel_supported() {
        return Err(VariantError::UnsupportedActivation(activation.to_string()));
    }

    for layer in layers {
        layer.activation = activation;
    }
    Ok(())
}

fn apply_bottleneck(layers: &mut [LayerConfig]) {
    for layer in layers {
        layer.bottleneck = Some(BOTTLENECK);
    }
}

fn apply_groups_input(layers: &mut [LayerConfig], variant: &Variant) -> Result<()> {
    require_layers(layers, GROUPS_INPUT_LAYER + 1, variant)?;
    layers[GROUPS_INPUT_LAYER].groups_input = Some(GROUPS_INPUT);
    Ok(())
}

fn apply_head1x1(layers: &mut [LayerConfig], variant: &Variant) -> Result<()> {
    require_layers(layers, 1, variant)?;

    let out_channels = layers[0].head_size;
    for layer in layers {
        layer.head_1x1_config = Some(head1x1(out_channels));
    }
    Ok(())
}

fn apply_per_layer_activations(layers: &mut [LayerConfig], variant: &Variant) -> Result<()> {
    require_layers(layers, PER_LAYER_ACTIVATIONS.len(), variant)?;

    for (layer, kind) in layers.iter_mut().zip(PER_LAYER_ACTIVATIONS) {
        layer.activation = kind.into();
    }
    Ok(())
}

fn apply_film(layers: &mut [LayerConfig], slot: FilmSlot, variant: &Variant) -> Result<()> {
    require_layers(layers, 1, variant)?;

    let head_size = layers[0].head_size;
    for layer in layers {
        layer.film_params = Some(FilmParams::from([(slot, FilmSlotParams::enabled())]));
        if slot == FilmSlot::Head1x1PostFilm {
            layer.head_1x1_config = Some(head1x1(head_size));
        }
    }
    Ok(())
}

fn single_layer_wavenet(
    condition_size: usize,
    head_size: usize,
    condition_dsp: Option<NetConfig>,
) -> NetConfig {
    NetConfig::WaveNet(WaveNetConfig {
        layers_configs: vec![LayerConfig::new(
            1,
            condition_size,
            head_size,
            2,
            2,
            vec![1],
            ActivationKind::Tanh.into(),
        )],
        head_scale: 1.0,
        condition_dsp: condition_dsp.map(Box::new),
    })
}

/// An outer WaveNet whose conditioning input is produced by an inner WaveNet.
///
/// The inner network's head size (2) matches the outer network's condition size.
fn condition_dsp_config() -> ModelConfig {
    let inner = single_layer_wavenet(1, 2, None);

    ModelConfig {
        net: single_layer_wavenet(2, 1, Some(inner)),
        optimizer: OptimizerConfig { lr: 0.004 },
        lr_scheduler: LrSchedulerConfig::ExponentialLr { gamma: 0.993 },
    }
}
