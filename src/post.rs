//! Post metadata extraction.
//!
//! Posts are already-rendered HTML files. Their metadata lives in the markup
//! itself rather than in front matter:
//!
//! | Field | Source element |
//! |-------|----------------|
//! | title | first `<h1>` |
//! | description | first `<h2>` |
//! | publish date | first `<timestamp>`, text `DD/MM/YYYY` |
//!
//! All three are required. A post missing any of them is an authoring error
//! and fails the whole build.

use crate::document::{self, Document, Selector};
use chrono::NaiveDate;
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PostError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("No h1 tag found in {0}, this tag is required to title the post")]
    MissingTitle(PathBuf),
    #[error("No h2 tag found in {0}, this tag is required to describe the post")]
    MissingSubtitle(PathBuf),
    #[error("{0} lacks a timestamp tag, posts cannot be ordered without one")]
    MissingTimestamp(PathBuf),
    #[error("Invalid timestamp {text:?} in {path}, expected DD/MM/YYYY")]
    InvalidDateFormat { path: PathBuf, text: String },
}

/// A post loaded from one HTML file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Post {
    /// Path of the source file, as discovered.
    pub path: PathBuf,
    /// Text of the first `<h1>`.
    pub title: String,
    /// Text of the first `<h2>`.
    pub description: String,
    /// Date from the `<timestamp>` element.
    pub publish_date: NaiveDate,
}

/// Load a post's metadata from an HTML file.
pub fn load(path: &Path) -> Result<Post, PostError> {
    let doc = Document::read(path).map_err(|source| PostError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    from_document(&doc, path)
}

fn from_document(doc: &Document, path: &Path) -> Result<Post, PostError> {
    let title = doc
        .find_first(Selector::tag("h1"))
        .map(|h1| document::text_content(&h1))
        .ok_or_else(|| PostError::MissingTitle(path.to_path_buf()))?;

    let description = doc
        .find_first(Selector::tag("h2"))
        .map(|h2| document::text_content(&h2))
        .ok_or_else(|| PostError::MissingSubtitle(path.to_path_buf()))?;

    let timestamp = doc
        .find_first(Selector::tag("timestamp"))
        .map(|ts| document::text_content(&ts))
        .ok_or_else(|| PostError::MissingTimestamp(path.to_path_buf()))?;

    let publish_date =
        parse_timestamp(&timestamp).ok_or_else(|| PostError::InvalidDateFormat {
            path: path.to_path_buf(),
            text: timestamp.clone(),
        })?;

    Ok(Post {
        path: path.to_path_buf(),
        title,
        description,
        publish_date,
    })
}

/// Parse `DD/MM/YYYY`. Each component may carry surrounding whitespace.
///
/// Returns `None` unless there are exactly three integer components forming
/// a real calendar date.
pub fn parse_timestamp(text: &str) -> Option<NaiveDate> {
    let parts: Vec<&str> = text.split('/').map(str::trim).collect();
    let [day, month, year] = parts.as_slice() else {
        return None;
    };
    let day: u32 = day.parse().ok()?;
    let month: u32 = month.parse().ok()?;
    let year: i32 = year.parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Sort posts newest first. Posts sharing a date keep their relative order.
pub fn sort_newest_first(posts: &mut [Post]) {
    posts.sort_by(|a, b| b.publish_date.cmp(&a.publish_date));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{date, post_html, post_with_date};
    use std::fs;
    use tempfile::TempDir;

    fn write(tmp: &TempDir, name: &str, html: &str) -> PathBuf {
        let path = tmp.path().join(name);
        fs::write(&path, html).unwrap();
        path
    }

    #[test]
    fn load_reads_all_fields() {
        let tmp = TempDir::new().unwrap();
        let path = write(
            &tmp,
            "p.html",
            &post_html("On Rust", "Ownership notes", "15/06/2021"),
        );

        let post = load(&path).unwrap();
        assert_eq!(post.path, path);
        assert_eq!(post.title, "On Rust");
        assert_eq!(post.description, "Ownership notes");
        assert_eq!(post.publish_date, date(2021, 6, 15));
    }

    #[test]
    fn load_uses_first_occurrence() {
        let tmp = TempDir::new().unwrap();
        let path = write(
            &tmp,
            "p.html",
            "<html><body><h1>First</h1><h1>Second</h1><h2>Sub</h2><h2>Other</h2>\
             <timestamp>01/01/2020</timestamp><timestamp>02/02/2022</timestamp></body></html>",
        );

        let post = load(&path).unwrap();
        assert_eq!(post.title, "First");
        assert_eq!(post.description, "Sub");
        assert_eq!(post.publish_date, date(2020, 1, 1));
    }

    #[test]
    fn title_includes_nested_text() {
        let tmp = TempDir::new().unwrap();
        let path = write(
            &tmp,
            "p.html",
            "<body><h1>A <em>bold</em> claim</h1><h2>s</h2><timestamp>01/01/2020</timestamp></body>",
        );
        assert_eq!(load(&path).unwrap().title, "A bold claim");
    }

    #[test]
    fn missing_title() {
        let tmp = TempDir::new().unwrap();
        let path = write(
            &tmp,
            "p.html",
            "<body><h2>s</h2><timestamp>01/01/2020</timestamp></body>",
        );
        assert!(matches!(load(&path), Err(PostError::MissingTitle(p)) if p == path));
    }

    #[test]
    fn missing_subtitle() {
        let tmp = TempDir::new().unwrap();
        let path = write(
            &tmp,
            "p.html",
            "<body><h1>t</h1><timestamp>01/01/2020</timestamp></body>",
        );
        assert!(matches!(load(&path), Err(PostError::MissingSubtitle(_))));
    }

    #[test]
    fn missing_timestamp() {
        let tmp = TempDir::new().unwrap();
        let path = write(&tmp, "p.html", "<body><h1>t</h1><h2>s</h2></body>");
        assert!(matches!(load(&path), Err(PostError::MissingTimestamp(_))));
    }

    #[test]
    fn impossible_date_is_invalid() {
        let tmp = TempDir::new().unwrap();
        let path = write(&tmp, "p.html", &post_html("t", "s", "31/02/2020"));
        match load(&path) {
            Err(PostError::InvalidDateFormat { text, .. }) => assert_eq!(text, "31/02/2020"),
            other => panic!("expected InvalidDateFormat, got {other:?}"),
        }
    }

    #[test]
    fn missing_file_is_io_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nope.html");
        assert!(matches!(load(&path), Err(PostError::Io { .. })));
    }

    #[test]
    fn parse_timestamp_formats() {
        assert_eq!(parse_timestamp("05/11/2019"), Some(date(2019, 11, 5)));
        assert_eq!(parse_timestamp(" 5/11/2019 "), Some(date(2019, 11, 5)));
        assert_eq!(parse_timestamp("2019-11-05"), None);
        assert_eq!(parse_timestamp("05/11"), None);
        assert_eq!(parse_timestamp("05/11/2019/1"), None);
        assert_eq!(parse_timestamp("aa/11/2019"), None);
        assert_eq!(parse_timestamp("29/02/2021"), None);
        assert_eq!(parse_timestamp("29/02/2020"), Some(date(2020, 2, 29)));
    }

    #[test]
    fn sort_is_descending_and_stable() {
        let mut posts = vec![
            post_with_date("first", date(2020, 1, 1)),
            post_with_date("second", date(2021, 6, 15)),
            post_with_date("third", date(2021, 6, 15)),
        ];
        sort_newest_first(&mut posts);

        let titles: Vec<&str> = posts.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["second", "third", "first"]);
    }
}
