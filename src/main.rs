use std::{env, process::ExitCode};

use anyhow::{bail, Context};
use harness::{CommandExporter, CoreTools, EXPORTER_ENV};
use log::{error, info, warn};
use variants::{Variant, VariantBuilder};
use wavenet_conformance::{Check, Conformance};

const USAGE: &str = "usage: wavenet-conformance <list | show VARIANT | loadmodel VARIANT|all | agree VARIANT|all>";

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    let builder = VariantBuilder::load().context("loading demonet config")?;

    match args.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
        ["list"] => {
            for variant in Variant::all() {
                println!("{variant}");
            }
            Ok(ExitCode::SUCCESS)
        }
        ["show", id] => {
            let config = builder.config_for_id(id)?;
            println!("{}", config.to_json_pretty()?);
            Ok(ExitCode::SUCCESS)
        }
        ["loadmodel", target] => run_checks(builder, Check::LoadModel, target).await,
        ["agree", target] => run_checks(builder, Check::Agreement, target).await,
        _ => bail!("{USAGE}"),
    }
}

fn select(target: &str) -> anyhow::Result<Vec<Variant>> {
    if target == "all" {
        return Ok(Variant::all());
    }
    Ok(vec![target.parse()?])
}

async fn run_checks(builder: VariantBuilder, check: Check, target: &str) -> anyhow::Result<ExitCode> {
    let variants = select(target)?;

    let Some(exporter) = CommandExporter::from_env() else {
        warn!("skipping: {EXPORTER_ENV} is not set");
        return Ok(ExitCode::SUCCESS);
    };

    let conformance = Conformance::new(exporter, CoreTools::shared().clone(), builder);
    if let Some(reason) = conformance.skip_reason(check) {
        warn!("skipping: {reason}");
        return Ok(ExitCode::SUCCESS);
    }

    let mut failed = 0;
    for variant in &variants {
        match conformance.run(check, variant).await {
            Ok(()) => info!("ok: {variant}"),
            Err(e) => {
                error!("FAILED {variant}: {e}");
                failed += 1;
            }
        }
    }

    info!("{} passed, {failed} failed", variants.len() - failed);
    Ok(if failed == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
