use std::{collections::BTreeMap, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// A named point in a WaveNet layer where feature-wise linear modulation is injected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilmSlot {
    ConvPreFilm,
    ConvPostFilm,
    InputMixinPreFilm,
    InputMixinPostFilm,
    ActivationPreFilm,
    ActivationPostFilm,
    Layer1x1PostFilm,
    Head1x1PostFilm,
}

impl FilmSlot {
    /// Every slot, in the order the tests enumerate them.
    pub const ALL: [FilmSlot; 8] = [
        Self::ConvPreFilm,
        Self::ConvPostFilm,
        Self::InputMixinPreFilm,
        Self::InputMixinPostFilm,
        Self::ActivationPreFilm,
        Self::ActivationPostFilm,
        Self::Layer1x1PostFilm,
        Self::Head1x1PostFilm,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ConvPreFilm => "conv_pre_film",
            Self::ConvPostFilm => "conv_post_film",
            Self::InputMixinPreFilm => "input_mixin_pre_film",
            Self::InputMixinPostFilm => "input_mixin_post_film",
            Self::ActivationPreFilm => "activation_pre_film",
            Self::ActivationPostFilm => "activation_post_film",
            Self::Layer1x1PostFilm => "layer1x1_post_film",
            Self::Head1x1PostFilm => "head1x1_post_film",
        }
    }
}

impl fmt::Display for FilmSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilmSlot {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|slot| slot.as_str() == s)
            .ok_or(())
    }
}

/// Settings for a single FiLM slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FilmSlotParams {
    pub active: bool,
    pub shift: bool,
    pub groups: usize,
}

impl FilmSlotParams {
    /// Active, with shift, ungrouped.
    pub const fn enabled() -> Self {
        Self {
            active: true,
            shift: true,
            groups: 1,
        }
    }
}

/// The `film_params` record of a layer, keyed by slot.
pub type FilmParams = BTreeMap<FilmSlot, FilmSlotParams>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serde_names_match_as_str() {
        for slot in FilmSlot::ALL {
            let json = serde_json::to_string(&slot).unwrap();
            assert_eq!(json, format!("\"{}\"", slot.as_str()));
        }
    }

    #[test]
    fn parses_every_slot_name() {
        for slot in FilmSlot::ALL {
            assert_eq!(slot.as_str().parse::<FilmSlot>(), Ok(slot));
        }
        assert!("no_such_slot".parse::<FilmSlot>().is_err());
    }

    #[test]
    fn film_params_serialize_keyed_by_slot() {
        let params = FilmParams::from([(FilmSlot::Layer1x1PostFilm, FilmSlotParams::enabled())]);
        assert_eq!(
            serde_json::to_value(&params).unwrap(),
            serde_json::json!({"layer1x1_post_film": {"active": true, "shift": true, "groups": 1}})
        );
    }
}
