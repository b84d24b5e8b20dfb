use crate::core::fetch::USER_AGENT;
use crate::core::progress::Progress;
use crate::error::{NaipError, Result};
use reqwest::blocking::Client;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use std::time::Duration;
use zip::ZipArchive;

const CHUNK_SIZE: usize = 64 * 1024;

pub struct Downloader {
    client: Client,
}

impl Downloader {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            // Archives are large; no overall timeout, only on connect.
            .connect_timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self { client })
    }

    /// Stream `url` into `dest`, reporting byte progress sized by the
    /// response's content length.
    ///
    /// An interrupted stream leaves a partial file on disk; there is no
    /// atomic rename or checksum verification.
    pub fn download_file(&self, url: &str, dest: &Path, label: &str) -> Result<()> {
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut response = self.client.get(url).send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(NaipError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let mut progress = Progress::new(label, response.content_length());
        let mut file = File::create(dest)?;
        copy_with_progress(&mut response, &mut file, &mut progress)?;
        progress.finish();

        Ok(())
    }

    /// Extract a zip archive into `dest`. The archive is left untouched;
    /// removal on success is the caller's decision.
    pub fn extract_zip(&self, archive_path: &Path, dest: &Path) -> Result<()> {
        std::fs::create_dir_all(dest)?;

        let file = File::open(archive_path)?;
        let mut archive = ZipArchive::new(file).map_err(|_| NaipError::Extraction {
            path: archive_path.to_path_buf(),
        })?;

        for i in 0..archive.len() {
            let mut entry = archive.by_index(i).map_err(|_| NaipError::Extraction {
                path: archive_path.to_path_buf(),
            })?;
            let outpath = match entry.enclosed_name() {
                Some(path) => dest.join(path),
                None => continue,
            };

            if entry.name().ends_with('/') {
                std::fs::create_dir_all(&outpath)?;
            } else {
                if let Some(parent) = outpath.parent() {
                    if !parent.exists() {
                        std::fs::create_dir_all(parent)?;
                    }
                }
                let mut outfile = File::create(&outpath)?;
                std::io::copy(&mut entry, &mut outfile)?;
            }

            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                if let Some(mode) = entry.unix_mode() {
                    std::fs::set_permissions(&outpath, std::fs::Permissions::from_mode(mode))?;
                }
            }
        }

        Ok(())
    }
}

/// Copy `reader` into `writer` in fixed-size chunks, feeding the progress
/// indicator. Returns the number of bytes copied.
pub fn copy_with_progress<R: Read, W: Write>(
    reader: &mut R,
    writer: &mut W,
    progress: &mut Progress,
) -> Result<u64> {
    let mut buf = [0u8; CHUNK_SIZE];
    let mut written = 0u64;
    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        writer.write_all(&buf[..n])?;
        written += n as u64;
        progress.add(n as u64);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    fn write_fixture_zip(path: &Path) {
        let file = File::create(path).unwrap();
        let mut zip = ZipWriter::new(file);
        let options = SimpleFileOptions::default();

        zip.start_file("readme.txt", options).unwrap();
        zip.write_all(b"NAIP composite tiles").unwrap();
        zip.add_directory("tiles", options).unwrap();
        zip.start_file("tiles/tile_001.tif", options).unwrap();
        zip.write_all(&[0u8; 128]).unwrap();
        zip.finish().unwrap();
    }

    #[test]
    fn test_copy_with_progress_moves_all_bytes() {
        let payload = vec![7u8; 200_000];
        let mut reader = Cursor::new(payload.clone());
        let mut out = Vec::new();
        let mut progress = Progress::new("fixture", Some(payload.len() as u64));

        let written = copy_with_progress(&mut reader, &mut out, &mut progress).unwrap();

        assert_eq!(written, payload.len() as u64);
        assert_eq!(out, payload);
        assert_eq!(progress.current(), payload.len() as u64);
    }

    #[test]
    fn test_extract_zip_matches_manifest() {
        let temp = tempfile::tempdir().unwrap();
        let archive = temp.path().join("nc_m_test.zip");
        write_fixture_zip(&archive);

        let dest = temp.path().join("nc_m_test");
        let downloader = Downloader::new().unwrap();
        downloader.extract_zip(&archive, &dest).unwrap();

        assert_eq!(
            std::fs::read_to_string(dest.join("readme.txt")).unwrap(),
            "NAIP composite tiles"
        );
        assert_eq!(
            std::fs::read(dest.join("tiles").join("tile_001.tif"))
                .unwrap()
                .len(),
            128
        );
        // The archive itself is untouched.
        assert!(archive.exists());
    }

    #[test]
    fn test_corrupt_zip_is_extraction_error_and_retained() {
        let temp = tempfile::tempdir().unwrap();
        let archive = temp.path().join("broken.zip");
        std::fs::write(&archive, b"this is not a zip archive").unwrap();

        let downloader = Downloader::new().unwrap();
        let err = downloader
            .extract_zip(&archive, &temp.path().join("broken"))
            .unwrap_err();

        assert!(matches!(err, NaipError::Extraction { .. }));
        assert!(archive.exists());
    }
}
