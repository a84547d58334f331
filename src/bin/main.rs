mod opt;

use std::fs::read_to_string;

use crate::opt::Opt;

use anyhow::{Context, Result};
use clap::Parser;
use corrjet::{prelude::*, GIT_BRANCH, GIT_REV, VERSION};
use env_logger::Env;
use log::{debug, info};

fn main() -> Result<()> {
    let args = argfile::expand_args_from(
        std::env::args_os(),
        argfile::parse_fromfile,
        argfile::PREFIX,
    )
    .with_context(|| "Failed to read argument file")?;
    let opt = Opt::parse_from(args).validate()?;

    let env = Env::default().filter_or("CORRJET_LOG", &opt.loglevel);
    env_logger::init_from_env(env);

    rayon::ThreadPoolBuilder::new()
        .num_threads(opt.threads)
        .build_global()?;

    if let (Some(rev), Some(branch)) = (GIT_REV, GIT_BRANCH) {
        info!("corrjet {VERSION} rev {rev} ({branch})");
    } else {
        info!("corrjet {VERSION}");
    }

    debug!("settings: {:#?}", opt);

    let config = load_config(&opt)?;
    debug!("configuration: {:#?}", config);
    let pipeline = Pipeline::new(config).context("Invalid configuration")?;

    let events: Vec<RawEvent> = CombinedReader::from_files(&opt.infiles)?
        .collect::<Result<Vec<_>, _>>()?;
    info!("Read {} events", events.len());

    let mut writer = FileWriter::builder()
        .filename(opt.outfile.clone())
        .format(opt.outformat.into())
        .compression(opt.compression)
        .build()
        .open()?;

    let progress = ProgressBar::new(events.len() as u64, "events processed:");
    let qa = if opt.threads == 1 {
        let mut driver = EventDriver::new(pipeline);
        driver.run(&events, &mut writer, &progress)?;
        driver.finish()
    } else {
        let (records, qa) = pipeline.par_records(&events, &progress);
        for record in &records {
            writer.write_record(record)?;
        }
        writer.finish()?;
        qa.dump_info();
        qa
    };
    info!(
        "Wrote {} records to {:?}",
        qa.records(View::Truth).committed + qa.records(View::Detector).committed,
        opt.outfile
    );
    info!("done");
    Ok(())
}

fn load_config(opt: &Opt) -> Result<Config> {
    let mut config = if let Some(path) = &opt.config {
        let yaml = read_to_string(path)
            .with_context(|| format!("Failed to read configuration from {path:?}"))?;
        Config::from_yaml(&yaml)
            .with_context(|| format!("Failed to load configuration from {path:?}"))?
    } else {
        Config::default()
    };
    let jet = &mut config.jet;
    if let Some(algorithm) = opt.jet.jetalgorithm {
        jet.definition.algorithm = algorithm;
    }
    if let Some(radius) = opt.jet.jetradius {
        jet.definition.radius = radius;
    }
    if let Some(scheme) = opt.jet.recombination {
        jet.definition.scheme = scheme;
    }
    if let Some(jet_type) = opt.jet.jettype {
        jet.jet_type = jet_type;
    }
    if opt.no_truth {
        config.is_mc = false;
    }
    Ok(config)
}
