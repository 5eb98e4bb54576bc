mod activation;
mod film;
mod load;
mod model;

pub use activation::{
    Activation, ActivationKind, LOADMODEL_ACTIVATIONS, PairedActivation, PairingStrategy,
    find_loadmodel_activation,
};
pub use film::{FilmParams, FilmSlot, FilmSlotParams};
pub use load::{DEMONET_CONFIG_PATH, load_config, load_demonet_config, parse_config};
pub use model::{
    Head1x1Config, LayerConfig, LrSchedulerConfig, ModelConfig, NetConfig, OptimizerConfig,
    Topology, WaveNetConfig,
};
