use anyhow::{Context, Result};
use clap::Parser;
use std::process;
use whistlecount::args::Cli;
use whistlecount::config::FileConfig;
use whistlecount::detector::Session;
use whistlecount::{audio, energy};

fn main() {
    env_logger::init();
    if let Err(e) = run() {
        log::error!("Error: {:#}", e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let file_config = match &cli.config {
        Some(path) => FileConfig::load(path)
            .with_context(|| format!("Failed to load config file: {}", path))?,
        None => match FileConfig::default_path() {
            Some(path) if path.exists() => {
                log::info!("Using config file {}", path.display());
                FileConfig::load(&path)
                    .with_context(|| format!("Failed to load config file: {}", path.display()))?
            }
            _ => FileConfig::default(),
        },
    };

    let (detector_config, envelope_config) = cli.resolve(&file_config);
    let mut session = Session::new(detector_config).context("Invalid detector configuration")?;
    envelope_config
        .validate()
        .context("Invalid envelope configuration")?;

    let decoded = audio::decode(&cli.input)
        .with_context(|| format!("Failed to load audio from {}", cli.input))?;
    if decoded.samples.is_empty() {
        log::warn!("No audio samples decoded; nothing to count");
        println!("0");
        return Ok(());
    }
    log::info!(
        "Analyzing {:.1}s of audio at {}Hz",
        decoded.duration_secs(),
        decoded.sample_rate
    );

    let frames = energy::envelope(&decoded.samples, decoded.sample_rate, &envelope_config)
        .context("Failed to extract energy envelope")?;

    for frame in frames {
        if let Some(event) = session.push(frame).context("Invalid energy stream")? {
            if cli.events {
                println!("{:.2} {:.2} {:.2}", event.start, event.end, event.duration());
            }
        }
    }
    if let Some(event) = session.finish() {
        if cli.events {
            println!("{:.2} {:.2} {:.2}", event.start, event.end, event.duration());
        }
    }

    println!("{}", session.count());
    Ok(())
}
