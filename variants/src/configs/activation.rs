use std::fmt;

use serde::{Deserialize, Serialize};

/// A single activation function, named the way the trainer and the loader spell it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivationKind {
    Tanh,
    Hardtanh,
    #[serde(rename = "ReLU")]
    Relu,
    #[serde(rename = "LeakyReLU")]
    LeakyRelu,
    #[serde(rename = "PReLU")]
    Prelu,
    Sigmoid,
    #[serde(rename = "SiLU")]
    Silu,
    Hardswish,
    LeakyHardtanh,
    Softsign,
    /// Only implemented by the native core, the trainer cannot build it.
    Fasttanh,
}

impl ActivationKind {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Tanh => "Tanh",
            Self::Hardtanh => "Hardtanh",
            Self::Relu => "ReLU",
            Self::LeakyRelu => "LeakyReLU",
            Self::Prelu => "PReLU",
            Self::Sigmoid => "Sigmoid",
            Self::Silu => "SiLU",
            Self::Hardswish => "Hardswish",
            Self::LeakyHardtanh => "LeakyHardtanh",
            Self::Softsign => "Softsign",
            Self::Fasttanh => "Fasttanh",
        }
    }
}

/// How a paired activation combines its two halves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PairingStrategy {
    PairBlend,
    PairMultiply,
}

impl PairingStrategy {
    pub const fn name(self) -> &'static str {
        match self {
            Self::PairBlend => "PairBlend",
            Self::PairMultiply => "PairMultiply",
        }
    }
}

/// A composite activation built from two plain ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairedActivation {
    pub name: PairingStrategy,
    pub primary: ActivationKind,
    pub secondary: ActivationKind,
}

/// The `activation` field of a layer: a plain name or a composite record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Activation {
    Named(ActivationKind),
    Paired(PairedActivation),
}

impl Activation {
    /// The name used in variant identifiers: the plain name, or the pairing strategy.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Named(kind) => kind.name(),
            Self::Paired(pair) => pair.name.name(),
        }
    }

    /// Whether the loader accepts this activation on the export path.
    pub fn is_loadmodel_supported(&self) -> bool {
        LOADMODEL_ACTIVATIONS.contains(self)
    }
}

impl From<ActivationKind> for Activation {
    fn from(kind: ActivationKind) -> Self {
        Self::Named(kind)
    }
}

impl fmt::Display for Activation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(kind) => f.write_str(kind.name()),
            Self::Paired(pair) => write!(
                f,
                "{}({}, {})",
                pair.name.name(),
                pair.primary.name(),
                pair.secondary.name()
            ),
        }
    }
}

const fn paired(name: PairingStrategy) -> Activation {
    Activation::Paired(PairedActivation {
        name,
        primary: ActivationKind::Tanh,
        secondary: ActivationKind::Sigmoid,
    })
}

/// Activations both the trainer and the native loader implement, in test order.
///
/// `Fasttanh` is left out: it only exists in the native core, so the trainer
/// cannot build a model that uses it.
pub const LOADMODEL_ACTIVATIONS: [Activation; 12] = [
    Activation::Named(ActivationKind::Tanh),
    Activation::Named(ActivationKind::Hardtanh),
    Activation::Named(ActivationKind::Relu),
    Activation::Named(ActivationKind::LeakyRelu),
    Activation::Named(ActivationKind::Prelu),
    Activation::Named(ActivationKind::Sigmoid),
    Activation::Named(ActivationKind::Silu),
    Activation::Named(ActivationKind::Hardswish),
    Activation::Named(ActivationKind::LeakyHardtanh),
    Activation::Named(ActivationKind::Softsign),
    paired(PairingStrategy::PairBlend),
    paired(PairingStrategy::PairMultiply),
];

/// Looks up a loader-supported activation by the name used in variant identifiers.
pub fn find_loadmodel_activation(name: &str) -> Option<Activation> {
    LOADMODEL_ACTIVATIONS
        .iter()
        .find(|a| a.name() == name)
        .copied()
}
