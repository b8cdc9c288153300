use anyhow::{bail, Context, Result};
use phonedle_core::normalizer::{load_filter, Normalizer, NormalizerConfig};
use phonedle_core::persistence::save_json;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use tracing::info;

const USAGE: &str = "Usage: build_dict --source <cmudict> --output <dictionary.json> [--filter <words.txt>] [--bail-on-error]";

struct Args {
    source: PathBuf,
    output: PathBuf,
    filter: Option<PathBuf>,
    bail_on_error: bool,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Args> {
    let mut source = None;
    let mut output = None;
    let mut filter = None;
    let mut bail_on_error = false;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--source" => source = Some(PathBuf::from(args.next().context("--source needs a value")?)),
            "--output" => output = Some(PathBuf::from(args.next().context("--output needs a value")?)),
            "--filter" => filter = Some(PathBuf::from(args.next().context("--filter needs a value")?)),
            "--bail-on-error" => bail_on_error = true,
            "-h" | "--help" => bail!(USAGE),
            other => bail!("Unknown argument '{other}'\n{USAGE}"),
        }
    }

    let Some(source) = source else { bail!("--source is required\n{USAGE}") };
    let Some(output) = output else { bail!("--output is required\n{USAGE}") };
    Ok(Args {
        source,
        output,
        filter,
        bail_on_error,
    })
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let args = parse_args(std::env::args().skip(1))?;

    let filter = match &args.filter {
        Some(path) => {
            info!("Loading filter file {}...", path.display());
            let file = File::open(path).with_context(|| format!("Failed to open filter file {}", path.display()))?;
            Some(load_filter(BufReader::new(file))?)
        }
        None => None,
    };

    let mut normalizer = Normalizer::new(NormalizerConfig {
        strict: args.bail_on_error,
        filter,
    });

    info!("Parsing dictionary {}...", args.source.display());
    let source = File::open(&args.source)
        .with_context(|| format!("Failed to open source dictionary {}", args.source.display()))?;
    normalizer
        .read(BufReader::new(source))
        .context("Failed to normalize source dictionary")?;

    let stats = normalizer.stats();
    let entries = normalizer.entries().len();
    info!(
        "Parsed {} pronunciations ({} skipped, {} filtered)",
        stats.pronunciations, stats.skipped, stats.filtered
    );

    info!("Writing final output...");
    save_json(&args.output, &normalizer.into_asset())
        .with_context(|| format!("Failed to write {}", args.output.display()))?;
    info!("File successfully written ({} entries)", entries);

    Ok(())
}
