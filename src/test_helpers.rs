//! Shared test utilities for the tufte-press test suite.
//!
//! Provides fixture setup, builders for post files, and lookup helpers that
//! work with scan-phase data structures (`Category`, `Post`).
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_fixtures();
//! let categories = list_categories(&tmp.path().join("posts")).unwrap();
//!
//! let essays = find_category(&categories, "essays");
//! assert_eq!(post_titles(&essays.posts).len(), 3);
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use chrono::NaiveDate;

use crate::config::SiteConfig;
use crate::generate::Site;
use crate::post::Post;
use crate::scan::Category;

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/site/` to a temp directory and return it.
///
/// Tests get an isolated copy they can mutate without affecting other tests
/// or the source fixtures.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/site");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

/// A [`Site`] over a fixture copy with the stock config.
pub fn fixture_site(tmp: &TempDir) -> Site {
    Site::new(tmp.path(), SiteConfig::default())
}

/// Contents of every page plus the homepage, in order.
pub fn snapshot(pages: &[PathBuf], homepage: &Path) -> Vec<String> {
    pages
        .iter()
        .map(PathBuf::as_path)
        .chain(std::iter::once(homepage))
        .map(|p| fs::read_to_string(p).unwrap())
        .collect()
}

// =========================================================================
// Builders
// =========================================================================

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// A minimal post page with title, subtitle and timestamp.
pub fn post_html(title: &str, subtitle: &str, date_text: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head><title>{title}</title></head>\n<body>\n\
         <article>\n<h1>{title}</h1>\n<h2>{subtitle}</h2>\n\
         <timestamp>{date_text}</timestamp>\n<p>Body text.</p>\n</article>\n\
         </body>\n</html>\n"
    )
}

/// Write `posts/{category}/{file}` under `root`, creating directories.
pub fn write_post(
    root: &Path,
    category: &str,
    file: &str,
    title: &str,
    subtitle: &str,
    date_text: &str,
) -> PathBuf {
    let dir = root.join("posts").join(category);
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join(file);
    fs::write(&path, post_html(title, subtitle, date_text)).unwrap();
    path
}

/// Write a homepage with an empty content container to `root/index.html`.
pub fn write_homepage(root: &Path) -> PathBuf {
    let path = root.join("index.html");
    fs::write(
        &path,
        "<!DOCTYPE html>\n<html>\n<head><title>Home</title></head>\n<body>\n\
         <div class=\"content\">\n<h1>Home</h1>\n</div>\n</body>\n</html>\n",
    )
    .unwrap();
    path
}

pub fn post_with_date(title: &str, publish_date: NaiveDate) -> Post {
    post_at(&format!("/site/posts/misc/{title}.html"), title, "", publish_date)
}

pub fn post_at(path: &str, title: &str, description: &str, publish_date: NaiveDate) -> Post {
    Post {
        path: PathBuf::from(path),
        title: title.to_string(),
        description: description.to_string(),
        publish_date,
    }
}

// =========================================================================
// Lookups: panic with a clear message on miss
// =========================================================================

/// Find a category by name. Panics if not found.
pub fn find_category<'a>(categories: &'a [Category], name: &str) -> &'a Category {
    categories.iter().find(|c| c.name == name).unwrap_or_else(|| {
        panic!(
            "category '{name}' not found. Available: {:?}",
            category_names(categories)
        )
    })
}

pub fn category_names(categories: &[Category]) -> Vec<&str> {
    categories.iter().map(|c| c.name.as_str()).collect()
}

pub fn post_titles(posts: &[Post]) -> Vec<&str> {
    posts.iter().map(|p| p.title.as_str()).collect()
}
