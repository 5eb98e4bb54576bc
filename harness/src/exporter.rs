use std::{
    env,
    ffi::OsString,
    path::{Path, PathBuf},
    time::Duration,
};

use log::info;
use variants::configs::ModelConfig;

use crate::{
    error::{HarnessError, Result},
    process::run_tool,
};

/// Names the command that builds a model from a config and exports it.
pub const EXPORTER_ENV: &str = "NAM_EXPORTER";

/// Sample rate stamped on every exported model.
pub const SAMPLE_RATE: u32 = 48_000;

const EXPORT_TIMEOUT: Duration = Duration::from_secs(120);

/// Paired input/output arrays written next to a model by a snapshot export.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub inputs: PathBuf,
    pub outputs: PathBuf,
}

/// The files produced by one export.
#[derive(Debug, Clone)]
pub struct ExportedModel {
    pub model: PathBuf,
    pub snapshot: Option<Snapshot>,
}

impl ExportedModel {
    /// Checks the expected files of an export into `outdir` under `basename`.
    ///
    /// # Errors
    /// `MissingArtifact` naming the first file that is not there.
    pub fn locate(outdir: &Path, basename: &str, include_snapshot: bool) -> Result<Self> {
        let model = existing(outdir.join(format!("{basename}.nam")))?;

        let snapshot = if include_snapshot {
            Some(Snapshot {
                inputs: existing(outdir.join("test_inputs.npy"))?,
                outputs: existing(outdir.join("test_outputs.npy"))?,
            })
        } else {
            None
        };

        Ok(Self { model, snapshot })
    }
}

fn existing(path: PathBuf) -> Result<PathBuf> {
    if path.exists() {
        Ok(path)
    } else {
        Err(HarnessError::MissingArtifact(path))
    }
}

/// Builds a trainable model from a configuration and exports it to the `.nam` format.
#[allow(unused)]
#[trait_variant::make(Exporter: Send)]
pub trait LocalExporter {
    /// Should build the model described by `config` at [`SAMPLE_RATE`] and write
    /// `<outdir>/<basename>.nam`.
    ///
    /// # Arguments
    /// * `config` - The model configuration.
    /// * `outdir` - An existing directory to export into.
    /// * `basename` - File stem of the exported model.
    /// * `include_snapshot` - Also write `test_inputs.npy` and `test_outputs.npy`.
    async fn export(
        &self,
        config: &ModelConfig,
        outdir: &Path,
        basename: &str,
        include_snapshot: bool,
    ) -> Result<ExportedModel>;
}

/// Exports by running an external command.
///
/// The command receives
/// `--config <file> --outdir <dir> --basename <name> --sample-rate 48000 [--include-snapshot]`,
/// where `<file>` is the configuration serialized next to the model.
#[derive(Debug, Clone)]
pub struct CommandExporter {
    program: PathBuf,
    prefix_args: Vec<OsString>,
}

impl CommandExporter {
    /// Creates a new `CommandExporter`.
    ///
    /// # Arguments
    /// * `program` - The executable to run.
    /// * `prefix_args` - Arguments placed before the export arguments, e.g. a script path.
    pub fn new(program: impl Into<PathBuf>, prefix_args: Vec<OsString>) -> Self {
        Self {
            program: program.into(),
            prefix_args,
        }
    }

    /// Reads the exporter command from `NAM_EXPORTER`.
    ///
    /// The value is split on whitespace: the first word is the program, the rest
    /// are prefix arguments. There is no quoting, so a program or script whose
    /// path contains a space must be reached through a wrapper script or built
    /// with [`CommandExporter::new`]. Returns `None` if the variable is unset or blank.
    pub fn from_env() -> Option<Self> {
        let value = env::var(EXPORTER_ENV).ok()?;
        Self::parse(&value)
    }

    fn parse(value: &str) -> Option<Self> {
        let mut words = value.split_whitespace();
        let program = words.next()?;
        Some(Self::new(program, words.map(OsString::from).collect()))
    }

    fn args(
        &self,
        config_path: &Path,
        outdir: &Path,
        basename: &str,
        include_snapshot: bool,
    ) -> Vec<OsString> {
        let mut args = self.prefix_args.clone();
        args.extend([
            OsString::from("--config"),
            config_path.as_os_str().to_owned(),
            OsString::from("--outdir"),
            outdir.as_os_str().to_owned(),
            OsString::from("--basename"),
            OsString::from(basename),
            OsString::from("--sample-rate"),
            OsString::from(SAMPLE_RATE.to_string()),
        ]);
        if include_snapshot {
            args.push("--include-snapshot".into());
        }
        args
    }
}

impl Exporter for CommandExporter {
    async fn export(
        &self,
        config: &ModelConfig,
        outdir: &Path,
        basename: &str,
        include_snapshot: bool,
    ) -> Result<ExportedModel> {
        let config_path = outdir.join(format!("{basename}.config.json"));
        tokio::fs::write(&config_path, config.to_json_pretty()?).await?;

        let args = self.args(&config_path, outdir, basename, include_snapshot);
        info!("exporting {basename} into {}", outdir.display());

        run_tool(&self.program, args, EXPORT_TIMEOUT)
            .await?
            .ensure_success("export")?;

        ExportedModel::locate(outdir, basename, include_snapshot)
    }
}
