use std::{collections::HashMap, error::Error, fmt};

use variants::Variant;

/// Relative and absolute tolerance for elementwise comparison.
///
/// An element passes when `|actual - expected| <= atol + rtol * |expected|`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerance {
    pub rtol: f32,
    pub atol: f32,
}

impl Tolerance {
    pub const fn new(rtol: f32, atol: f32) -> Self {
        Self { rtol, atol }
    }

    fn accepts(&self, actual: f32, expected: f32) -> bool {
        (actual - expected).abs() <= self.atol + self.rtol * expected.abs()
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::new(1e-5, 1e-6)
    }
}

/// Why two signals were judged different.
#[derive(Debug, Clone, PartialEq)]
pub enum Mismatch {
    Shape {
        expected: usize,
        actual: usize,
    },
    Values {
        max_abs_diff: f32,
        worst_index: usize,
        tolerance: Tolerance,
    },
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Shape { expected, actual } => {
                write!(f, "shape mismatch: expected {expected}, got {actual}")
            }
            Self::Values {
                max_abs_diff,
                worst_index,
                tolerance,
            } => write!(
                f,
                "numerical mismatch: max |diff| = {max_abs_diff} at sample {worst_index} \
                 (rtol={}, atol={})",
                tolerance.rtol, tolerance.atol
            ),
        }
    }
}

impl Error for Mismatch {}

/// Compares two flat signals sample by sample.
///
/// # Errors
/// A `Mismatch` describing the length difference, or the largest absolute
/// difference if any sample is out of tolerance. NaN never passes.
pub fn compare(actual: &[f32], expected: &[f32], tolerance: Tolerance) -> Result<(), Mismatch> {
    if actual.len() != expected.len() {
        return Err(Mismatch::Shape {
            expected: expected.len(),
            actual: actual.len(),
        });
    }

    let mut failed = false;
    let mut worst = (0, 0.0f32);
    for (i, (&a, &e)) in actual.iter().zip(expected).enumerate() {
        let diff = (a - e).abs();
        if !tolerance.accepts(a, e) {
            failed = true;
        }
        if diff > worst.1 || (diff.is_nan() && !worst.1.is_nan()) {
            worst = (i, diff);
        }
    }

    if failed {
        return Err(Mismatch::Values {
            max_abs_diff: worst.1,
            worst_index: worst.0,
            tolerance,
        });
    }
    Ok(())
}

/// The tolerance to use for each variant.
///
/// Variants without an override use the default.
#[derive(Debug, Clone)]
pub struct ToleranceTable {
    default: Tolerance,
    overrides: HashMap<String, Tolerance>,
}

impl ToleranceTable {
    /// A table with only a default.
    pub fn uniform(default: Tolerance) -> Self {
        Self {
            default,
            overrides: HashMap::new(),
        }
    }

    pub fn with_override(mut self, variant: &Variant, tolerance: Tolerance) -> Self {
        self.overrides.insert(variant.id(), tolerance);
        self
    }

    pub fn for_variant(&self, variant: &Variant) -> Tolerance {
        self.overrides
            .get(&variant.id())
            .copied()
            .unwrap_or(self.default)
    }
}

impl Default for ToleranceTable {
    /// The default tolerance, loosened where the two implementations are known
    /// to drift apart slightly.
    fn default() -> Self {
        use variants::configs::{Activation, FilmSlot, LOADMODEL_ACTIVATIONS};

        let loose = Tolerance::new(1e-4, 1e-5);
        let mut table = Self::uniform(Tolerance::default())
            // Two chained networks accumulate rounding in both.
            .with_override(&Variant::ConditionDsp, loose);

        // The paired activations evaluate two transcendental functions per sample.
        for activation in LOADMODEL_ACTIVATIONS {
            if let Activation::Paired(_) = activation {
                table = table.with_override(&Variant::Activation(activation), loose);
            }
        }
        for slot in [FilmSlot::ActivationPreFilm, FilmSlot::ActivationPostFilm] {
            table = table.with_override(&Variant::Film(slot), loose);
        }
        table
    }
}
