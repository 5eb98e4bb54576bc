use serde::{Deserialize, Serialize};

use super::{Activation, FilmParams};

/// Settings for the optional 1x1 convolution applied to a layer's head output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Head1x1Config {
    pub active: bool,
    pub out_channels: usize,
    pub groups: usize,
}

/// One layer array of a WaveNet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LayerConfig {
    pub input_size: usize,
    pub condition_size: usize,
    pub head_size: usize,
    pub channels: usize,
    pub kernel_size: usize,
    pub dilations: Vec<usize>,
    pub activation: Activation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gated: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub head_bias: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bottleneck: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub groups_input: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub head_1x1_config: Option<Head1x1Config>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub film_params: Option<FilmParams>,
}

impl LayerConfig {
    /// A layer with only the mandatory fields set.
    pub fn new(
        input_size: usize,
        condition_size: usize,
        head_size: usize,
        channels: usize,
        kernel_size: usize,
        dilations: Vec<usize>,
        activation: Activation,
    ) -> Self {
        Self {
            input_size,
            condition_size,
            head_size,
            channels,
            kernel_size,
            dilations,
            activation,
            gated: None,
            head_bias: None,
            bottleneck: None,
            groups_input: None,
            head_1x1_config: None,
            film_params: None,
        }
    }
}

/// Body of a `WaveNet` network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WaveNetConfig {
    pub layers_configs: Vec<LayerConfig>,
    pub head_scale: f64,
    /// Inner network whose output feeds this network's conditioning input.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition_dsp: Option<Box<NetConfig>>,
}

/// A network, tagged by its `name` with its settings under `config`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "name", content = "config")]
pub enum NetConfig {
    WaveNet(WaveNetConfig),
}

impl NetConfig {
    pub fn name(&self) -> &'static str {
        match self {
            Self::WaveNet(_) => "WaveNet",
        }
    }

    pub fn wavenet(&self) -> &WaveNetConfig {
        match self {
            Self::WaveNet(config) => config,
        }
    }

    pub fn wavenet_mut(&mut self) -> &mut WaveNetConfig {
        match self {
            Self::WaveNet(config) => config,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OptimizerConfig {
    pub lr: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "class", content = "kwargs")]
pub enum LrSchedulerConfig {
    #[serde(rename = "ExponentialLR")]
    ExponentialLr { gamma: f64 },
}

/// The shape of the network a configuration describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topology {
    /// One WaveNet fed directly by the input signal.
    Single,
    /// An outer WaveNet conditioned on the output of an inner one.
    Conditioned,
}

/// Everything the trainer needs to build and optimize a model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelConfig {
    pub net: NetConfig,
    pub optimizer: OptimizerConfig,
    pub lr_scheduler: LrSchedulerConfig,
}

impl ModelConfig {
    pub fn topology(&self) -> Topology {
        match self.net.wavenet().condition_dsp {
            Some(_) => Topology::Conditioned,
            None => Topology::Single,
        }
    }

    pub fn layers(&self) -> &[LayerConfig] {
        &self.net.wavenet().layers_configs
    }

    pub fn layers_mut(&mut self) -> &mut Vec<LayerConfig> {
        &mut self.net.wavenet_mut().layers_configs
    }

    /// Serializes into the JSON document the trainer reads.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
