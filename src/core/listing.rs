use crate::error::{NaipError, Result};
use scraper::{Html, Selector};
use serde::Deserialize;

/// Box folder pages carry their directory data as a JSON blob assigned in an
/// inline script. Anchors on the page are navigation chrome; the blob is the
/// source of truth.
const STREAM_DATA_MARKER: &str = "Box.postStreamData = ";

/// One folder or file entry from a Box listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub id: u64,
    pub name: String,
    pub files_count: u64,
}

/// Parsed contents of one Box listing page.
#[derive(Debug)]
pub struct Listing {
    folders: Vec<Entry>,
    files: Vec<Entry>,
    pub page_count: u32,
}

impl Listing {
    pub fn folders(&self) -> &[Entry] {
        &self.folders
    }

    pub fn files(&self) -> &[Entry] {
        &self.files
    }
}

#[derive(Deserialize)]
struct StreamData {
    #[serde(rename = "/app-api/enduserapp/shared-folder")]
    shared_folder: SharedFolder,
    #[serde(rename = "pageCount", default = "default_page_count")]
    page_count: u32,
}

#[derive(Deserialize)]
struct SharedFolder {
    items: Vec<Item>,
}

#[derive(Deserialize)]
struct Item {
    id: u64,
    name: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(rename = "filesCount", default)]
    files_count: u64,
}

fn default_page_count() -> u32 {
    1
}

/// Parse a Box folder listing page into its folder and file entries.
///
/// Locates the script containing the `postStreamData` assignment, slices the
/// JSON payload out of it, and deserializes the shared-folder items. Items
/// that are neither folders nor files are skipped.
pub fn parse_listing(html: &str) -> Result<Listing> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("script")
        .map_err(|e| NaipError::parse_error(format!("bad selector: {e}")))?;

    let mut raw_json = None;
    for script in document.select(&selector) {
        let text: String = script.text().collect();
        if let Some(start) = text.find(STREAM_DATA_MARKER) {
            raw_json = Some(slice_json(&text[start + STREAM_DATA_MARKER.len()..]));
        }
    }

    let raw_json = raw_json.ok_or_else(|| {
        NaipError::parse_error("no embedded folder data found in listing page")
    })?;

    let data: StreamData = serde_json::from_str(&raw_json).map_err(|e| {
        NaipError::parse_error(format!("embedded folder data is not valid JSON: {e}"))
    })?;

    let mut folders = Vec::new();
    let mut files = Vec::new();
    for item in data.shared_folder.items {
        let entry = Entry {
            id: item.id,
            name: item.name,
            files_count: item.files_count,
        };
        match item.kind.as_str() {
            "folder" => folders.push(entry),
            "file" => files.push(entry),
            _ => {}
        }
    }

    Ok(Listing {
        folders,
        files,
        page_count: data.page_count,
    })
}

/// The assignment ends with a statement terminator; everything after the
/// last `;` is discarded.
fn slice_json(rest: &str) -> String {
    match rest.rsplit_once(';') {
        Some((json, _)) => json.trim().to_string(),
        None => rest.trim().to_string(),
    }
}

#[cfg(test)]
pub(crate) fn fixture_page(items_json: &str, page_count: u32) -> String {
    format!(
        r#"<html><head><title>NAIP | Powered by Box</title></head><body>
<a href="https://www.box.com/">Box Home</a>
<a href="/signup">Sign Up</a>
<script>var config = {{"locale": "en-US"}};</script>
<script>Box.postStreamData = {{"/app-api/enduserapp/shared-folder": {{"items": [{items_json}]}}, "pageCount": {page_count}}};</script>
</body></html>"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_folders_and_files() {
        let html = fixture_page(
            r#"{"type": "folder", "id": 101, "name": "2021", "filesCount": 0},
               {"type": "folder", "id": 102, "name": "2019", "filesCount": 0},
               {"type": "file", "id": 555, "name": "ms_m_2021.zip"},
               {"type": "web_link", "id": 9, "name": "About NAIP"}"#,
            3,
        );

        let listing = parse_listing(&html).unwrap();

        assert_eq!(listing.page_count, 3);
        assert_eq!(
            listing.folders().iter().map(|f| f.name.as_str()).collect::<Vec<_>>(),
            vec!["2021", "2019"]
        );
        assert_eq!(listing.folders()[0].id, 101);
        assert_eq!(
            listing.files(),
            &[Entry {
                id: 555,
                name: "ms_m_2021.zip".to_string(),
                files_count: 0,
            }]
        );
    }

    #[test]
    fn test_decorative_anchors_are_not_entries() {
        // The fixture page carries navigation anchors; only the embedded
        // JSON items may appear in the output.
        let html = fixture_page(r#"{"type": "folder", "id": 7, "name": "2020"}"#, 1);
        let listing = parse_listing(&html).unwrap();

        assert_eq!(listing.folders().len(), 1);
        assert!(listing.files().is_empty());
    }

    #[test]
    fn test_missing_page_count_defaults_to_one() {
        let html = r#"<html><body><script>Box.postStreamData = {"/app-api/enduserapp/shared-folder": {"items": []}};</script></body></html>"#;
        let listing = parse_listing(html).unwrap();
        assert_eq!(listing.page_count, 1);
    }

    #[test]
    fn test_page_without_stream_data_is_parse_error() {
        let html = "<html><body><a href=\"/folder/1\">2021</a></body></html>";
        let err = parse_listing(html).unwrap_err();
        assert!(matches!(err, NaipError::Parse { .. }));
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        let html = "<html><body><script>Box.postStreamData = {not json};</script></body></html>";
        let err = parse_listing(html).unwrap_err();
        assert!(matches!(err, NaipError::Parse { .. }));
    }

    #[test]
    fn test_files_count_carried_on_folders() {
        let html = fixture_page(
            r#"{"type": "folder", "id": 33, "name": "ms_m", "filesCount": 12}"#,
            1,
        );
        let listing = parse_listing(&html).unwrap();
        assert_eq!(listing.folders()[0].files_count, 12);
    }
}
