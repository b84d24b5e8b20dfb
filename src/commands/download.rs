use crate::core::fetch::PageFetcher;
use crate::core::scraper::NaipScraper;
use crate::error::{NaipError, Result};
use dialoguer::Confirm;

/// Outcome of a sequential batch run.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub completed: Vec<(u16, String)>,
    pub failed: Vec<(u16, String, String)>,
}

/// Expand the user's year/state filters, confirm bulk selections, and drive
/// the downloader over the resulting pairs.
///
/// Individual pair failures are reported in the summary and do not halt the
/// rest of the batch; the command only errors when every pair failed.
pub fn download_selection<F: PageFetcher>(
    scraper: &mut NaipScraper<F>,
    year: Option<u16>,
    state: Option<&str>,
    force: bool,
) -> Result<()> {
    let pairs = scraper.expand_selection(year, state)?;

    if pairs.is_empty() {
        println!("No matching NAIP imagery found.");
        return Ok(());
    }

    if pairs.len() > 1 && !force {
        if year.is_none() && state.is_none() {
            println!("WARNING: You are about to download ALL available NAIP imagery.");
            println!("This can be a very large amount of data and take a long time.");
        } else {
            println!("This selection expands to {} year/state pairs.", pairs.len());
        }
        let proceed = Confirm::new()
            .with_prompt("Proceed with bulk download?")
            .default(false)
            .interact()?;
        if !proceed {
            println!("Download cancelled.");
            return Ok(());
        }
    }

    println!("Output directory: {}", scraper.output_dir().display());

    let outcome = run_batch(&pairs, |(pair_year, pair_state)| {
        scraper.download(*pair_year, pair_state)
    });

    println!();
    println!(
        "Completed {} of {} downloads",
        outcome.completed.len(),
        pairs.len()
    );
    for (failed_year, failed_state, message) in &outcome.failed {
        println!("  failed: {failed_year} {failed_state}: {message}");
    }

    if outcome.completed.is_empty() && !outcome.failed.is_empty() {
        return Err(NaipError::BatchFailed {
            count: outcome.failed.len(),
        });
    }

    Ok(())
}

/// Run `download` over each pair in order, continuing past failures and
/// accumulating the outcome.
pub fn run_batch(
    pairs: &[(u16, String)],
    mut download: impl FnMut(&(u16, String)) -> Result<()>,
) -> BatchOutcome {
    let mut outcome = BatchOutcome::default();
    for pair in pairs {
        match download(pair) {
            Ok(()) => outcome.completed.push(pair.clone()),
            Err(e) => {
                println!("Error downloading {} {}: {e}", pair.0, pair.1);
                outcome.failed.push((pair.0, pair.1.clone(), e.to_string()));
            }
        }
    }
    outcome
}
