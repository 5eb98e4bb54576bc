use std::path::Path;

use harness::{
    compare, npy, run_loadmodel, run_render, wav, CoreTools, ExportedModel, Exporter,
    HarnessError, ToleranceTable, SAMPLE_RATE,
};
use log::{debug, info};
use variants::{Variant, VariantBuilder};

use crate::error::ConformanceError;

pub type Result<T> = std::result::Result<T, ConformanceError>;

/// File stem of every exported model.
pub const MODEL_BASENAME: &str = "model";

/// The two things checked for each variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Check {
    /// The core's `loadmodel` accepts the exported model.
    LoadModel,
    /// The core's `render` reproduces the trainer's snapshot outputs.
    Agreement,
}

/// Checks exported variants against the native core.
pub struct Conformance<E> {
    exporter: E,
    tools: CoreTools,
    builder: VariantBuilder,
    tolerances: ToleranceTable,
}

impl<E: Exporter> Conformance<E> {
    /// Creates a new `Conformance` checker.
    ///
    /// # Arguments
    /// * `exporter` - Builds and exports a model from a configuration.
    /// * `tools` - The core's executables.
    /// * `builder` - Derives the configuration of each variant.
    pub fn new(exporter: E, tools: CoreTools, builder: VariantBuilder) -> Self {
        Self {
            exporter,
            tools,
            builder,
            tolerances: ToleranceTable::default(),
        }
    }

    pub fn with_tolerances(mut self, tolerances: ToleranceTable) -> Self {
        self.tolerances = tolerances;
        self
    }

    pub fn tools(&self) -> &CoreTools {
        &self.tools
    }

    /// Why `check` cannot run with the tools at hand, if it cannot.
    pub fn skip_reason(&self, check: Check) -> Option<String> {
        let (tool, present) = match check {
            Check::LoadModel => ("loadmodel", self.tools.loadmodel().is_some()),
            Check::Agreement => ("render", self.tools.render().is_some()),
        };

        (!present).then(|| {
            format!(
                "NeuralAmpModelerCore not present or {tool} tool not built (looked in {})",
                self.tools.core_dir().display()
            )
        })
    }

    /// Runs `check` for `variant`.
    pub async fn run(&self, check: Check, variant: &Variant) -> Result<()> {
        match check {
            Check::LoadModel => self.check_loadmodel(variant).await,
            Check::Agreement => self.check_numerical_agreement(variant).await,
        }
    }

    /// Exports `variant` and asserts that `loadmodel` can load the result.
    ///
    /// # Errors
    /// Any export failure, or `ToolFailed` with loadmodel's captured output.
    pub async fn check_loadmodel(&self, variant: &Variant) -> Result<()> {
        let config = self.builder.config_for_variant(variant)?;
        let dir = tempfile::tempdir()?;

        let exported = self
            .exporter
            .export(&config, dir.path(), MODEL_BASENAME, false)
            .await?;

        run_loadmodel(&self.tools, &exported.model)
            .await?
            .ensure_success(format!("loadmodel for {variant}"))?;

        info!("loadmodel accepted {variant}");
        Ok(())
    }

    /// Exports `variant` with a snapshot, renders the snapshot inputs through the
    /// core and compares the result with the snapshot outputs.
    ///
    /// # Errors
    /// Any export or render failure, or `Disagreement` if the outputs differ by
    /// more than the variant's tolerance.
    pub async fn check_numerical_agreement(&self, variant: &Variant) -> Result<()> {
        let config = self.builder.config_for_variant(variant)?;
        let dir = tempfile::tempdir()?;

        let exported = self
            .exporter
            .export(&config, dir.path(), MODEL_BASENAME, true)
            .await?;

        let (expected, actual) = self.render_snapshot(dir.path(), &exported, variant).await?;

        let tolerance = self.tolerances.for_variant(variant);
        compare(&actual, &expected, tolerance).map_err(|mismatch| {
            ConformanceError::Disagreement {
                variant: variant.id(),
                mismatch,
            }
        })?;

        info!("{variant}: core matches trainer on {} samples", actual.len());
        Ok(())
    }

    /// Returns the trainer's expected outputs and the core's rendered outputs.
    async fn render_snapshot(
        &self,
        dir: &Path,
        exported: &ExportedModel,
        variant: &Variant,
    ) -> Result<(Vec<f32>, Vec<f32>)> {
        let snapshot = exported
            .snapshot
            .as_ref()
            .ok_or_else(|| HarnessError::MissingArtifact(dir.join("test_inputs.npy")))?;

        let inputs = npy::read_f32(&snapshot.inputs)?;
        let expected = npy::read_f32(&snapshot.outputs)?;
        debug!(inputs = inputs.len(), outputs = expected.len(); "read snapshot");

        let input_wav = dir.join("input.wav");
        let output_wav = dir.join("output.wav");
        wav::write_mono(&input_wav, &inputs, SAMPLE_RATE)?;

        run_render(&self.tools, &exported.model, &input_wav, &output_wav)
            .await?
            .ensure_success(format!("render for {variant}"))?;

        let (actual, _) = wav::read_mono(&output_wav)?;
        Ok((expected, actual))
    }
}
