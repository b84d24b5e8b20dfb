use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use naip_scraper::core::catalog::CompositeFilter;
use naip_scraper::{commands, FetchOptions, NaipScraper};

#[derive(Parser)]
#[clap(name = "naip-scraper")]
#[clap(about = "Download NAIP imagery archives from the USDA NRCS Box folder")]
#[clap(version = env!("CARGO_PKG_VERSION"))]
#[clap(after_help = "\
Examples:
  naip-scraper --year 2021 --state ms    Download MS imagery for 2021
  naip-scraper --state ms                Download MS imagery for all years
  naip-scraper --year 2021               Download all states for 2021
  naip-scraper --force                   Download everything without confirmation
  naip-scraper --list-years              List all available years
  naip-scraper --list-years ms           List years available for MS
  naip-scraper --list-states 2021        List states available for 2021
  naip-scraper --no-unzip --year 2021    Download 2021 imagery but keep the zips")]
struct Cli {
    /// Year to download (all available years if omitted)
    #[clap(long)]
    year: Option<u16>,

    /// State abbreviation to download (all available states if omitted)
    #[clap(long)]
    state: Option<String>,

    /// Output directory for downloaded files
    #[clap(long, short, default_value = "data")]
    output: PathBuf,

    /// List available years, optionally for one state, and exit
    #[clap(long, value_name = "STATE")]
    list_years: Option<Option<String>>,

    /// List available states, optionally for one year, and exit
    #[clap(long, value_name = "YEAR")]
    list_states: Option<Option<u16>>,

    /// Do not extract downloaded zip archives
    #[clap(long)]
    no_unzip: bool,

    /// Overwrite files already present in the output directory
    #[clap(long)]
    overwrite: bool,

    /// Skip the confirmation prompt for bulk downloads
    #[clap(long)]
    force: bool,

    /// Download only CIR composites (<state>_c folders)
    #[clap(long, conflicts_with = "rgb_only")]
    cir_only: bool,

    /// Download only RGB composites (<state>_n folders)
    #[clap(long, conflicts_with = "cir_only")]
    rgb_only: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let composites = if cli.cir_only {
        CompositeFilter::CirOnly
    } else if cli.rgb_only {
        CompositeFilter::RgbOnly
    } else {
        CompositeFilter::All
    };

    let options = FetchOptions {
        output_dir: cli.output,
        unzip: !cli.no_unzip,
        overwrite: cli.overwrite,
        composites,
    };

    let result = run(cli.year, cli.state, cli.list_years, cli.list_states, cli.force, options);

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }

    Ok(())
}

fn run(
    year: Option<u16>,
    state: Option<String>,
    list_years: Option<Option<String>>,
    list_states: Option<Option<u16>>,
    force: bool,
    options: FetchOptions,
) -> naip_scraper::error::Result<()> {
    let mut scraper = NaipScraper::new(options)?;

    if let Some(state_filter) = list_years {
        return commands::list::list_years(&mut scraper, state_filter.as_deref());
    }

    if let Some(year_filter) = list_states {
        return commands::list::list_states(&mut scraper, year_filter);
    }

    commands::download::download_selection(&mut scraper, year, state.as_deref(), force)
}
