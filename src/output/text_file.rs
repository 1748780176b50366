//! Newline-delimited sitemap files
//!
//! One file per root, named after the root's host, holding one URL per line
//! in first-claim order.

use crate::output::traits::{OutputError, OutputResult, Sink};
use crate::url::extract_domain;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use url::Url;

/// [`Sink`] writing `<host>_sitemap.txt` files into a directory
#[derive(Debug, Clone)]
pub struct TextFileSink {
    directory: PathBuf,
}

impl TextFileSink {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Full path of the sitemap file for `root`
    pub fn path_for(&self, root: &Url) -> OutputResult<PathBuf> {
        Ok(self.directory.join(sitemap_file_name(root)?))
    }
}

impl Sink for TextFileSink {
    fn persist(&self, root: &Url, sitemap: &[String]) -> OutputResult<PathBuf> {
        let path = self.path_for(root)?;
        fs::create_dir_all(&self.directory)?;

        let mut writer = BufWriter::new(File::create(&path)?);
        for url in sitemap {
            writeln!(writer, "{}", url)?;
        }
        writer.flush()?;

        tracing::debug!("Wrote {} URLs to {}", sitemap.len(), path.display());
        Ok(path)
    }
}

/// File name of the sitemap for `root`
///
/// `<host>_sitemap.txt`, or `<host>_<port>_sitemap.txt` when the root names
/// a non-default port. Characters unsafe in file names are replaced by `_`.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use sumi_sitemap::output::sitemap_file_name;
///
/// let root = Url::parse("http://crawler-test.com/").unwrap();
/// assert_eq!(sitemap_file_name(&root).unwrap(), "crawler-test.com_sitemap.txt");
/// ```
pub fn sitemap_file_name(root: &Url) -> OutputResult<String> {
    let host = extract_domain(root)
        .ok_or_else(|| OutputError::Write(format!("Root URL {} has no host", root)))?;

    let stem = match root.port() {
        Some(port) => format!("{}_{}", host, port),
        None => host,
    };
    let stem: String = stem
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    Ok(format!("{}_sitemap.txt", stem))
}
