use crate::core::fetch::PageFetcher;
use crate::core::scraper::NaipScraper;
use crate::error::Result;

/// Print the available years, optionally restricted to one state.
pub fn list_years<F: PageFetcher>(
    scraper: &mut NaipScraper<F>,
    state: Option<&str>,
) -> Result<()> {
    match state {
        Some(state) => {
            let years = scraper.available_years_for_state(state)?;
            if years.is_empty() {
                println!("No years found for state {}", state.to_uppercase());
            } else {
                println!("Available years for {}:", state.to_uppercase());
                for year in years {
                    println!("  {year}");
                }
            }
        }
        None => {
            let years = scraper.available_years()?;
            if years.is_empty() {
                println!("No years found");
            } else {
                println!("Available years:");
                for year in years {
                    println!("  {year}");
                }
            }
        }
    }
    Ok(())
}

/// Print the available states, optionally restricted to one year.
pub fn list_states<F: PageFetcher>(
    scraper: &mut NaipScraper<F>,
    year: Option<u16>,
) -> Result<()> {
    let states = scraper.available_states(year)?;
    if states.is_empty() {
        match year {
            Some(year) => println!("No states found for year {year}"),
            None => println!("No states found"),
        }
        return Ok(());
    }

    match year {
        Some(year) => println!("Available states for {year}:"),
        None => println!("Available states:"),
    }
    for state in states {
        println!("  {state}");
    }
    Ok(())
}
