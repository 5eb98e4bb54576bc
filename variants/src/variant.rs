use std::{fmt, str::FromStr};

use crate::{
    configs::{Activation, FilmSlot, LOADMODEL_ACTIVATIONS, find_loadmodel_activation},
    error::VariantError,
};

const ACTIVATION_PREFIX: &str = "activation_";
const FILM_PREFIX: &str = "film_";

/// A request for one structural mutation of the base configuration.
///
/// Parsed from and rendered to identifiers such as `activation_ReLU` or
/// `film_conv_pre_film`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    /// The base configuration, unchanged.
    Base,
    /// Every layer uses the given activation.
    Activation(Activation),
    /// Every layer gets a bottleneck of width 2.
    Bottleneck,
    /// Layer 1 alone gets a grouped input convolution with 2 groups.
    GroupsInput,
    /// Every layer gets an active 1x1 head convolution.
    Head1x1,
    /// Layers 0 and 1 use `Tanh` and `ReLU` respectively.
    PerLayerActivations,
    /// A separate conditioned dual-network configuration.
    ConditionDsp,
    /// Every layer enables FiLM at the given slot.
    Film(FilmSlot),
}

impl Variant {
    /// Every valid variant, in the order the parameterized tests run them.
    pub fn all() -> Vec<Variant> {
        let mut all = vec![Variant::Base];
        all.extend(LOADMODEL_ACTIVATIONS.into_iter().map(Variant::Activation));
        all.extend([
            Variant::Bottleneck,
            Variant::GroupsInput,
            Variant::Head1x1,
            Variant::PerLayerActivations,
            Variant::ConditionDsp,
        ]);
        all.extend(FilmSlot::ALL.into_iter().map(Variant::Film));
        all
    }

    /// The identifier string of this variant.
    pub fn id(&self) -> String {
        self.to_string()
    }
}

/// Identifiers of every valid variant, in enumeration order.
pub fn all_variant_ids() -> Vec<String> {
    Variant::all().iter().map(Variant::id).collect()
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Base => f.write_str("base"),
            Self::Activation(activation) => write!(f, "{ACTIVATION_PREFIX}{}", activation.name()),
            Self::Bottleneck => f.write_str("bottleneck"),
            Self::GroupsInput => f.write_str("groups_input"),
            Self::Head1x1 => f.write_str("head1x1"),
            Self::PerLayerActivations => f.write_str("per_layer_activations"),
            Self::ConditionDsp => f.write_str("condition_dsp"),
            Self::Film(slot) => write!(f, "{FILM_PREFIX}{slot}"),
        }
    }
}

impl FromStr for Variant {
    type Err = VariantError;

    fn from_str(id: &str) -> Result<Self, Self::Err> {
        let variant = match id {
            "base" => Self::Base,
            "bottleneck" => Self::Bottleneck,
            "groups_input" => Self::GroupsInput,
            "head1x1" => Self::Head1x1,
            "per_layer_activations" => Self::PerLayerActivations,
            "condition_dsp" => Self::ConditionDsp,
            _ => {
                if let Some(name) = id.strip_prefix(ACTIVATION_PREFIX) {
                    let activation = find_loadmodel_activation(name)
                        .ok_or_else(|| VariantError::UnknownActivation(id.to_string()))?;
                    Self::Activation(activation)
                } else if let Some(slot) = id.strip_prefix(FILM_PREFIX) {
                    let slot = slot
                        .parse::<FilmSlot>()
                        .map_err(|()| VariantError::UnknownFilmSlot(slot.to_string()))?;
                    Self::Film(slot)
                } else {
                    return Err(VariantError::UnknownVariant(id.to_string()));
                }
            }
        };

        Ok(variant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enumeration_order() {
        let ids = all_variant_ids();
        assert_eq!(ids.len(), 1 + 12 + 5 + 8);
        assert_eq!(ids[0], "base");
        assert_eq!(ids[1], "activation_Tanh");
        assert_eq!(ids[11], "activation_PairBlend");
        assert_eq!(ids[12], "activation_PairMultiply");
        assert_eq!(
            &ids[13..18],
            [
                "bottleneck",
                "groups_input",
                "head1x1",
                "per_layer_activations",
                "condition_dsp"
            ]
        );
        assert_eq!(ids[18], "film_conv_pre_film");
        assert_eq!(ids[25], "film_head1x1_post_film");
    }

    #[test]
    fn ids_are_unique() {
        let mut ids = all_variant_ids();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), Variant::all().len());
    }

    #[test]
    fn parse_inverts_display() {
        for variant in Variant::all() {
            assert_eq!(variant.id().parse::<Variant>().unwrap(), variant);
        }
    }

    #[test]
    fn unknown_activation_suffix() {
        let err = "activation_DoesNotExist".parse::<Variant>().unwrap_err();
        assert!(matches!(err, VariantError::UnknownActivation(_)));
        assert!(err.is_invalid_argument());

        let err = "activation_Fasttanh".parse::<Variant>().unwrap_err();
        assert!(matches!(err, VariantError::UnknownActivation(_)));
    }

    #[test]
    fn unknown_film_slot() {
        let err = "film_no_such_slot".parse::<Variant>().unwrap_err();
        assert!(matches!(err, VariantError::UnknownFilmSlot(ref s) if s == "no_such_slot"));
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn unknown_identifiers() {
        for id in ["totally_unknown", "", "Base", "activation", "film", "head1x1 "] {
            let err = id.parse::<Variant>().unwrap_err();
            assert!(err.is_invalid_argument(), "{id:?} should be rejected");
        }
    }
}
