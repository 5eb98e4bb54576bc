//! Drives the conformance checks end to end against stand-in core tools.
//!
//! `loadmodel` checks that the model file exists and names a WaveNet; `render`
//! copies its input to its output, so the stand-in core behaves like an
//! identity model.

#![cfg(unix)]

use std::{
    fs,
    os::unix::fs::PermissionsExt,
    path::{Path, PathBuf},
    sync::OnceLock,
};

use harness::{CoreTools, ExportedModel, Exporter, HarnessError, Snapshot};
use tempfile::TempDir;
use variants::{configs::ModelConfig, Variant, VariantBuilder};
use wavenet_conformance::{Check, Conformance, ConformanceError};

struct FakeCores {
    working: TempDir,
    broken: TempDir,
}

const LOADMODEL: &str = r#"#!/bin/sh
test -f "$1" || { echo "no model at $1" >&2; exit 1; }
grep -q WaveNet "$1" || { echo "not a WaveNet" >&2; exit 2; }
echo "loaded $1"
"#;

const RENDER: &str = r#"#!/bin/sh
cp "$2" "$3"
"#;

const BROKEN: &str = r#"#!/bin/sh
echo "unsupported architecture" >&2
exit 1
"#;

fn install(core_dir: &Path, name: &str, script: &str) {
    let tools = core_dir.join("build").join("tools");
    fs::create_dir_all(&tools).unwrap();
    let exe = tools.join(name);
    fs::write(&exe, script).unwrap();
    fs::set_permissions(&exe, fs::Permissions::from_mode(0o755)).unwrap();
}

/// Every script is written before any test spawns a process.
fn cores() -> &'static FakeCores {
    static CORES: OnceLock<FakeCores> = OnceLock::new();
    CORES.get_or_init(|| {
        let working = tempfile::tempdir().unwrap();
        install(working.path(), "loadmodel", LOADMODEL);
        install(working.path(), "render", RENDER);

        let broken = tempfile::tempdir().unwrap();
        install(broken.path(), "loadmodel", BROKEN);
        install(broken.path(), "render", BROKEN);

        FakeCores { working, broken }
    })
}

fn write_npy(path: &Path, values: &[f32]) {
    let mut header = format!(
        "{{'descr': '<f4', 'fortran_order': False, 'shape': ({},), }}",
        values.len()
    );
    header.push('\n');

    let mut bytes = b"\x93NUMPY\x01\x00".to_vec();
    bytes.extend((header.len() as u16).to_le_bytes());
    bytes.extend(header.as_bytes());
    bytes.extend(values.iter().flat_map(|v| v.to_le_bytes()));
    fs::write(path, bytes).unwrap();
}

/// Writes the configuration as the "model" and a snapshot whose outputs are
/// the inputs scaled by `gain`.
struct MockExporter {
    gain: f32,
}

impl Exporter for MockExporter {
    async fn export(
        &self,
        config: &ModelConfig,
        outdir: &Path,
        basename: &str,
        include_snapshot: bool,
    ) -> harness::Result<ExportedModel> {
        let model = outdir.join(format!("{basename}.nam"));
        fs::write(&model, config.to_json_pretty()?)?;

        let snapshot = include_snapshot.then(|| {
            let inputs: Vec<f32> = (0..256).map(|i| (i as f32 * 0.05).sin() * 0.5).collect();
            let outputs: Vec<f32> = inputs.iter().map(|x| x * self.gain).collect();

            let snapshot = Snapshot {
                inputs: outdir.join("test_inputs.npy"),
                outputs: outdir.join("test_outputs.npy"),
            };
            write_npy(&snapshot.inputs, &inputs);
            write_npy(&snapshot.outputs, &outputs);
            snapshot
        });

        Ok(ExportedModel { model, snapshot })
    }
}

fn conformance(core_dir: &Path, gain: f32) -> Conformance<MockExporter> {
    Conformance::new(
        MockExporter { gain },
        CoreTools::at(core_dir),
        VariantBuilder::load().unwrap(),
    )
}

#[tokio::test]
async fn every_variant_loads() {
    let conformance = conformance(cores().working.path(), 1.0);
    assert_eq!(conformance.skip_reason(Check::LoadModel), None);

    for variant in Variant::all() {
        conformance
            .check_loadmodel(&variant)
            .await
            .unwrap_or_else(|e| panic!("{variant}: {e}"));
    }
}

#[tokio::test]
async fn identity_render_agrees_with_identity_snapshot() {
    let conformance = conformance(cores().working.path(), 1.0);
    assert_eq!(conformance.skip_reason(Check::Agreement), None);

    for variant in [Variant::Base, Variant::ConditionDsp, Variant::Head1x1] {
        conformance
            .run(Check::Agreement, &variant)
            .await
            .unwrap_or_else(|e| panic!("{variant}: {e}"));
    }
}

#[tokio::test]
async fn disagreement_reports_max_difference() {
    let conformance = conformance(cores().working.path(), 2.0);

    let err = conformance
        .check_numerical_agreement(&Variant::Base)
        .await
        .unwrap_err();

    match &err {
        ConformanceError::Disagreement { variant, .. } => assert_eq!(variant, "base"),
        other => panic!("unexpected {other}"),
    }
    assert!(err.to_string().contains("max |diff|"), "{err}");
}

#[tokio::test]
async fn failing_loadmodel_surfaces_captured_output() {
    let conformance = conformance(cores().broken.path(), 1.0);

    let err = conformance
        .check_loadmodel(&Variant::Bottleneck)
        .await
        .unwrap_err();

    match err {
        ConformanceError::Harness(HarnessError::ToolFailed { context, stderr, .. }) => {
            assert_eq!(context, "loadmodel for bottleneck");
            assert!(stderr.contains("unsupported architecture"));
        }
        other => panic!("unexpected {other}"),
    }
}

#[tokio::test]
async fn missing_tools_are_skipped_not_failed() {
    let absent = PathBuf::from("/definitely/not/a/checkout");
    let conformance = conformance(&absent, 1.0);

    let reason = conformance.skip_reason(Check::LoadModel).unwrap();
    assert!(reason.contains("loadmodel"), "{reason}");
    assert!(conformance.skip_reason(Check::Agreement).is_some());
}

#[tokio::test]
async fn invalid_variant_fails_before_export() {
    let conformance = conformance(cores().working.path(), 1.0);
    let variant = Variant::Activation(variants::configs::ActivationKind::Fasttanh.into());

    let err = conformance.check_loadmodel(&variant).await.unwrap_err();
    assert!(matches!(err, ConformanceError::Config(ref e) if e.is_invalid_argument()));
}
