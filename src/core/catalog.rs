use crate::core::fetch::PageFetcher;
use crate::core::listing::{parse_listing, Entry, Listing};
use crate::core::states;
use crate::error::{NaipError, Result};
use std::collections::{BTreeMap, BTreeSet, HashMap};

pub const NAIP_ROOT_URL: &str = "https://nrcs.app.box.com/v/naip/folder/17936490251/";
pub const NAIP_FOLDER_URL: &str = "https://nrcs.app.box.com/v/naip/folder/";
pub const NAIP_DOWNLOAD_URL: &str =
    "https://nrcs.app.box.com/index.php?rm=box_download_shared_file&vanity_name=naip&file_id=f_";

/// Which composite imagery folders to resolve for a state.
///
/// State folders hold composites named `<st>_m` (4-band multispectral),
/// `<st>_c` (color infrared) and `<st>_n` (natural color). A multispectral
/// folder supersedes the others whenever it exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompositeFilter {
    #[default]
    All,
    CirOnly,
    RgbOnly,
}

/// One downloadable archive resolved for a (year, state) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub name: String,
    pub composite: String,
    pub url: String,
}

/// In-memory index of the NAIP Box folder, built lazily from listing pages.
///
/// Each listing level is fetched at most once per process. Nothing is
/// persisted; the catalog lives for the process lifetime. A failed fetch
/// memoizes nothing, so a later query retries the level.
pub struct Catalog<F> {
    fetcher: F,
    years: Option<BTreeMap<u16, u64>>,
    states: HashMap<u16, BTreeMap<String, u64>>,
}

impl<F: PageFetcher> Catalog<F> {
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher,
            years: None,
            states: HashMap::new(),
        }
    }

    /// All available years, most recent first.
    pub fn years(&mut self) -> Result<Vec<u16>> {
        Ok(self.year_index()?.keys().rev().copied().collect())
    }

    /// Years whose state listing contains `code`. A year whose listing
    /// cannot be fetched is skipped rather than failing the whole scan.
    pub fn years_for_state(&mut self, code: &str) -> Result<Vec<u16>> {
        let mut hits = Vec::new();
        for year in self.years()? {
            match self.states_for_year(year) {
                Ok(year_states) => {
                    if year_states.iter().any(|s| s == code) {
                        hits.push(year);
                    }
                }
                Err(_) => continue,
            }
        }
        Ok(hits)
    }

    /// Sorted state codes available for `year`.
    pub fn states_for_year(&mut self, year: u16) -> Result<Vec<String>> {
        Ok(self.state_index(year)?.keys().cloned().collect())
    }

    /// Union of state codes across every year, sorted.
    pub fn all_states(&mut self) -> Result<Vec<String>> {
        let mut all = BTreeSet::new();
        for year in self.years()? {
            match self.states_for_year(year) {
                Ok(year_states) => all.extend(year_states),
                Err(_) => continue,
            }
        }
        Ok(all.into_iter().collect())
    }

    /// Resolve every archive for a (year, state) pair, walking the pair's
    /// composite folders. `code` must already be a normalized state code.
    pub fn archives(
        &mut self,
        year: u16,
        code: &str,
        filter: CompositeFilter,
    ) -> Result<Vec<ArchiveEntry>> {
        let state_id = self.state_folder(year, code)?;
        let composites = self.composite_folders(state_id, year, code, filter)?;

        let mut entries = Vec::new();
        for folder in &composites {
            for file in self.folder_files(folder)? {
                entries.push(ArchiveEntry {
                    name: file.name,
                    composite: folder.name.clone(),
                    url: format!("{NAIP_DOWNLOAD_URL}{}", file.id),
                });
            }
        }
        Ok(entries)
    }

    /// Resolve the download URL of the primary archive for a (year, state)
    /// pair. Fails with a not-found condition when the pair is absent from
    /// the listing, distinct from any network failure.
    pub fn download_url(
        &mut self,
        year: u16,
        code: &str,
        filter: CompositeFilter,
    ) -> Result<String> {
        let entries = self.archives(year, code, filter)?;
        entries
            .into_iter()
            .next()
            .map(|entry| entry.url)
            .ok_or_else(|| NaipError::PairNotFound {
                year,
                state: code.to_string(),
            })
    }

    fn fetch_listing(&self, url: &str) -> Result<Listing> {
        let html = self.fetcher.fetch(url)?;
        parse_listing(&html)
    }

    fn folder_url(id: u64, page: u32) -> String {
        format!("{NAIP_FOLDER_URL}{id}?page={page}")
    }

    /// Interpret a root-listing label as a 4-digit year; anything else is a
    /// navigational or decorative folder and is skipped.
    fn parse_year(name: &str) -> Option<u16> {
        let trimmed = name.trim();
        if trimmed.len() != 4 || !trimmed.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        trimmed.parse().ok()
    }

    fn year_index(&mut self) -> Result<&BTreeMap<u16, u64>> {
        if self.years.is_none() {
            let mut index = BTreeMap::new();
            let mut page = 1;
            loop {
                let listing = self.fetch_listing(&format!("{NAIP_ROOT_URL}?page={page}"))?;
                for folder in listing.folders() {
                    if let Some(year) = Self::parse_year(&folder.name) {
                        index.insert(year, folder.id);
                    }
                }
                if page >= listing.page_count {
                    break;
                }
                page += 1;
            }
            self.years = Some(index);
        }
        match &self.years {
            Some(index) => Ok(index),
            None => unreachable!("year index populated above"),
        }
    }

    fn year_folder(&mut self, year: u16) -> Result<u64> {
        self.year_index()?
            .get(&year)
            .copied()
            .ok_or(NaipError::YearNotFound { year })
    }

    fn state_index(&mut self, year: u16) -> Result<&BTreeMap<String, u64>> {
        if !self.states.contains_key(&year) {
            let folder_id = self.year_folder(year)?;
            let mut index = BTreeMap::new();
            let mut page = 1;
            loop {
                let listing = self.fetch_listing(&Self::folder_url(folder_id, page))?;
                for folder in listing.folders() {
                    if let Some(code) = states::normalize(&folder.name) {
                        index.insert(code, folder.id);
                    }
                }
                if page >= listing.page_count {
                    break;
                }
                page += 1;
            }
            self.states.insert(year, index);
        }
        match self.states.get(&year) {
            Some(index) => Ok(index),
            None => unreachable!("state index populated above"),
        }
    }

    fn state_folder(&mut self, year: u16, code: &str) -> Result<u64> {
        self.state_index(year)?
            .get(code)
            .copied()
            .ok_or_else(|| NaipError::PairNotFound {
                year,
                state: code.to_string(),
            })
    }

    fn composite_folders(
        &mut self,
        state_id: u64,
        year: u16,
        code: &str,
        filter: CompositeFilter,
    ) -> Result<Vec<Entry>> {
        let lower = code.to_ascii_lowercase();
        let multispectral = format!("{lower}_m");
        let cir = format!("{lower}_c");
        let rgb = format!("{lower}_n");

        let mut chosen = Vec::new();
        let mut page = 1;
        loop {
            let listing = self.fetch_listing(&Self::folder_url(state_id, page))?;
            for folder in listing.folders() {
                let name = folder.name.to_ascii_lowercase();
                if name.contains(&multispectral) {
                    // Multispectral supersedes everything else.
                    return Ok(vec![folder.clone()]);
                }
                let wanted = match filter {
                    CompositeFilter::All => name.contains(&cir) || name.contains(&rgb),
                    CompositeFilter::CirOnly => name.contains(&cir),
                    CompositeFilter::RgbOnly => name.contains(&rgb),
                };
                if wanted {
                    chosen.push(folder.clone());
                }
            }
            if page >= listing.page_count {
                break;
            }
            page += 1;
        }

        if chosen.is_empty() {
            return Err(NaipError::NoComposites {
                year,
                state: code.to_string(),
            });
        }
        Ok(chosen)
    }

    fn folder_files(&mut self, folder: &Entry) -> Result<Vec<Entry>> {
        let mut files = Vec::new();
        let mut page = 1;
        loop {
            let listing = self.fetch_listing(&Self::folder_url(folder.id, page))?;
            if listing.files().is_empty() {
                break;
            }
            files.extend(listing.files().iter().cloned());
            if files.len() as u64 >= folder.files_count || page >= listing.page_count {
                break;
            }
            page += 1;
        }
        Ok(files)
    }
}

#[cfg(test)]
impl Catalog<crate::core::fetch::testing::FixtureFetcher> {
    pub(crate) fn fetcher_hits(&self) -> Vec<String> {
        self.fetcher.hits.borrow().clone()
    }
}

/// Canned Box pages describing a small NAIP tree, shared by catalog and
/// scraper tests: years 2021 (MS, NC) and 2019 (NC only); NC 2021 carries a
/// multispectral composite that supersedes its RGB one, MS 2021 carries CIR
/// and RGB composites.
#[cfg(test)]
pub(crate) fn fixture_pages() -> Vec<(String, String)> {
    use crate::core::listing::fixture_page;

    vec![
        (
            format!("{NAIP_ROOT_URL}?page=1"),
            fixture_page(
                r#"{"type": "folder", "id": 100, "name": "2021"},
                   {"type": "folder", "id": 200, "name": "2019"},
                   {"type": "folder", "id": 300, "name": "Documentation"},
                   {"type": "web_link", "id": 9, "name": "USDA"}"#,
                1,
            ),
        ),
        (
            format!("{NAIP_FOLDER_URL}100?page=1"),
            fixture_page(
                r#"{"type": "folder", "id": 110, "name": "MS"},
                   {"type": "folder", "id": 120, "name": "NC"},
                   {"type": "folder", "id": 130, "name": "readme"}"#,
                1,
            ),
        ),
        (
            format!("{NAIP_FOLDER_URL}200?page=1"),
            fixture_page(r#"{"type": "folder", "id": 210, "name": "NC"}"#, 1),
        ),
        (
            format!("{NAIP_FOLDER_URL}120?page=1"),
            fixture_page(
                r#"{"type": "folder", "id": 121, "name": "nc_n_2021", "filesCount": 1},
                   {"type": "folder", "id": 122, "name": "nc_m_2021", "filesCount": 2}"#,
                1,
            ),
        ),
        (
            format!("{NAIP_FOLDER_URL}122?page=1"),
            fixture_page(
                r#"{"type": "file", "id": 9001, "name": "nc_m_a.zip"},
                   {"type": "file", "id": 9002, "name": "nc_m_b.zip"}"#,
                1,
            ),
        ),
        (
            format!("{NAIP_FOLDER_URL}110?page=1"),
            fixture_page(
                r#"{"type": "folder", "id": 111, "name": "ms_c_2021", "filesCount": 1},
                   {"type": "folder", "id": 112, "name": "ms_n_2021", "filesCount": 1}"#,
                1,
            ),
        ),
        (
            format!("{NAIP_FOLDER_URL}111?page=1"),
            fixture_page(r#"{"type": "file", "id": 8001, "name": "ms_c.zip"}"#, 1),
        ),
        (
            format!("{NAIP_FOLDER_URL}112?page=1"),
            fixture_page(r#"{"type": "file", "id": 8002, "name": "ms_n.zip"}"#, 1),
        ),
    ]
}
