use crate::core::catalog::{ArchiveEntry, Catalog, CompositeFilter};
use crate::core::download::Downloader;
use crate::core::fetch::{HttpFetcher, PageFetcher};
use crate::core::states;
use crate::error::Result;
use crate::utils::fs;
use std::path::{Path, PathBuf};

/// Options for a scraper instance.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub output_dir: PathBuf,
    pub unzip: bool,
    pub overwrite: bool,
    pub composites: CompositeFilter,
}

impl Default for FetchOptions {
    fn default() -> Self {
        FetchOptions {
            output_dir: PathBuf::from("data"),
            unzip: true,
            overwrite: false,
            composites: CompositeFilter::All,
        }
    }
}

/// Programmatic entry point: discovers NAIP archives through the catalog and
/// downloads them under the configured output directory.
pub struct NaipScraper<F = HttpFetcher> {
    catalog: Catalog<F>,
    downloader: Downloader,
    options: FetchOptions,
}

impl NaipScraper<HttpFetcher> {
    pub fn new(options: FetchOptions) -> Result<Self> {
        Self::with_fetcher(options, HttpFetcher::new()?)
    }
}

impl<F: PageFetcher> NaipScraper<F> {
    /// Build a scraper over a custom page fetcher. Tests inject a
    /// fixture-backed fetcher here.
    pub fn with_fetcher(options: FetchOptions, fetcher: F) -> Result<Self> {
        Ok(Self {
            catalog: Catalog::new(fetcher),
            downloader: Downloader::new()?,
            options,
        })
    }

    pub fn output_dir(&self) -> &Path {
        &self.options.output_dir
    }

    /// All available years, most recent first.
    pub fn available_years(&mut self) -> Result<Vec<u16>> {
        self.catalog.years()
    }

    /// Years for which the given state has imagery.
    pub fn available_years_for_state(&mut self, state: &str) -> Result<Vec<u16>> {
        let code = states::validate(state)?;
        self.catalog.years_for_state(&code)
    }

    /// States available for a year, or across all years when `year` is None.
    pub fn available_states(&mut self, year: Option<u16>) -> Result<Vec<String>> {
        match year {
            Some(year) => self.catalog.states_for_year(year),
            None => self.catalog.all_states(),
        }
    }

    /// Resolve the download URL of the primary archive for a (year, state)
    /// pair.
    pub fn download_url(&mut self, year: u16, state: &str) -> Result<String> {
        let code = states::validate(state)?;
        self.catalog.download_url(year, &code, self.options.composites)
    }

    /// Cross the user's filters with the catalog into concrete
    /// (year, state) pairs.
    ///
    /// Validation failures and unknown pairs surface here, before any
    /// download starts.
    pub fn expand_selection(
        &mut self,
        year: Option<u16>,
        state: Option<&str>,
    ) -> Result<Vec<(u16, String)>> {
        match (year, state) {
            (Some(year), Some(state)) => {
                let code = states::validate(state)?;
                // Resolving the pair now turns a bad selection into a fatal
                // error before anything is written.
                self.catalog.archives(year, &code, self.options.composites)?;
                Ok(vec![(year, code)])
            }
            (Some(year), None) => {
                let year_states = self.catalog.states_for_year(year)?;
                Ok(year_states.into_iter().map(|s| (year, s)).collect())
            }
            (None, Some(state)) => {
                let code = states::validate(state)?;
                let years = self.catalog.years_for_state(&code)?;
                Ok(years.into_iter().map(|y| (y, code.clone())).collect())
            }
            (None, None) => {
                let mut pairs = Vec::new();
                for year in self.catalog.years()? {
                    match self.catalog.states_for_year(year) {
                        Ok(year_states) => {
                            pairs.extend(year_states.into_iter().map(|s| (year, s)));
                        }
                        Err(_) => continue,
                    }
                }
                Ok(pairs)
            }
        }
    }

    /// Download every archive for a (year, state) pair into
    /// `output/<year>/<ST>/<composite>/`, extracting zips per the options.
    pub fn download(&mut self, year: u16, state: &str) -> Result<()> {
        let code = states::validate(state)?;
        let archives = self
            .catalog
            .archives(year, &code, self.options.composites)?;

        let state_dir = self
            .options
            .output_dir
            .join(year.to_string())
            .join(&code);

        let total = archives.len();
        println!("Downloading {year} {code} NAIP archives ({total} files)...");

        for (i, entry) in archives.iter().enumerate() {
            self.fetch_archive(entry, &state_dir, i + 1, total)?;
        }

        Ok(())
    }

    fn fetch_archive(
        &self,
        entry: &ArchiveEntry,
        state_dir: &Path,
        index: usize,
        total: usize,
    ) -> Result<()> {
        let composite_dir = state_dir.join(&entry.composite);
        fs::ensure_dir_exists(&composite_dir)?;

        let dest = composite_dir.join(&entry.name);
        let extract_dir = extracted_dir_for(&dest);

        if !self.options.overwrite {
            if let Some(dir) = &extract_dir {
                if dir.exists() {
                    println!("  {} already extracted, skipping", entry.name);
                    return Ok(());
                }
            }
            if dest.exists() {
                println!("  {} already downloaded, skipping", entry.name);
                return Ok(());
            }
        }

        let label = format!("[{index}/{total}] {}", entry.name);
        self.downloader.download_file(&entry.url, &dest, &label)?;

        if self.options.unzip {
            if let Some(dir) = &extract_dir {
                match self.downloader.extract_zip(&dest, dir) {
                    Ok(()) => fs::remove_file_quiet(&dest),
                    Err(e) => {
                        // Corrupt archive: report and keep the zip.
                        println!("  Warning: could not extract {}: {e}", entry.name);
                    }
                }
            }
        }

        Ok(())
    }
}

/// Directory a zip archive extracts into, next to the archive itself.
/// `None` for non-zip files, which are kept as downloaded.
fn extracted_dir_for(dest: &Path) -> Option<PathBuf> {
    let name = dest.file_name()?.to_str()?;
    let stem = name.strip_suffix(".zip")?;
    Some(dest.with_file_name(stem))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::catalog::fixture_pages;
    use crate::core::fetch::testing::FixtureFetcher;
    use crate::error::NaipError;
    use pretty_assertions::assert_eq;

    fn fixture_scraper() -> NaipScraper<FixtureFetcher> {
        NaipScraper::with_fetcher(
            FetchOptions::default(),
            FixtureFetcher::new(fixture_pages()),
        )
        .unwrap()
    }

    #[test]
    fn test_expand_explicit_pair() {
        let mut scraper = fixture_scraper();
        assert_eq!(
            scraper.expand_selection(Some(2021), Some("nc")).unwrap(),
            vec![(2021, "NC".to_string())]
        );
    }

    #[test]
    fn test_expand_year_only_covers_all_states() {
        let mut scraper = fixture_scraper();
        assert_eq!(
            scraper.expand_selection(Some(2021), None).unwrap(),
            vec![(2021, "MS".to_string()), (2021, "NC".to_string())]
        );
    }

    #[test]
    fn test_expand_state_only_covers_all_years() {
        let mut scraper = fixture_scraper();
        assert_eq!(
            scraper.expand_selection(None, Some("NC")).unwrap(),
            vec![(2021, "NC".to_string()), (2019, "NC".to_string())]
        );
    }

    #[test]
    fn test_expand_everything() {
        let mut scraper = fixture_scraper();
        assert_eq!(
            scraper.expand_selection(None, None).unwrap(),
            vec![
                (2021, "MS".to_string()),
                (2021, "NC".to_string()),
                (2019, "NC".to_string()),
            ]
        );
    }

    #[test]
    fn test_invalid_state_rejected_before_any_fetch() {
        let mut scraper = fixture_scraper();
        let err = scraper.expand_selection(None, Some("XX")).unwrap_err();
        assert!(matches!(err, NaipError::InvalidState { .. }));
        // Nothing was fetched for a selection that never validated.
        assert!(scraper.catalog_hits().is_empty());
    }

    #[test]
    fn test_unknown_pair_is_fatal_on_expansion() {
        let mut scraper = fixture_scraper();
        let err = scraper.expand_selection(Some(2019), Some("MS")).unwrap_err();
        assert!(matches!(err, NaipError::PairNotFound { .. }));
    }

    #[test]
    fn test_download_url_for_pair() {
        let mut scraper = fixture_scraper();
        let url = scraper.download_url(2021, "NC").unwrap();
        assert!(url.ends_with("file_id=f_9001"));
    }

    #[test]
    fn test_extracted_dir_for() {
        assert_eq!(
            extracted_dir_for(Path::new("/data/2021/NC/nc_m/nc_m_a.zip")),
            Some(PathBuf::from("/data/2021/NC/nc_m/nc_m_a"))
        );
        assert_eq!(extracted_dir_for(Path::new("/data/notes.txt")), None);
    }

    impl NaipScraper<FixtureFetcher> {
        fn catalog_hits(&self) -> Vec<String> {
            self.catalog.fetcher_hits()
        }
    }
}
