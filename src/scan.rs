//! Category discovery and post collection.
//!
//! Every immediate subdirectory of the posts directory is a category. The
//! category's own listing page lives inside it, named after the directory:
//!
//! ```text
//! posts/
//! ├── essays/
//! │   ├── essays.html          # Category index (regenerated, never loaded as a post)
//! │   ├── on-rust.html         # Post
//! │   └── on-tufte.html        # Post
//! └── notes/
//!     ├── notes.html
//!     └── reading-list.html
//! ```
//!
//! ## Ordering
//!
//! Directory entries are sorted by file name before anything else happens, so
//! the discovery order (and with it the tie-break between posts sharing a
//! date) is the same on every filesystem. Hidden entries are skipped.
//!
//! ## Failure policy
//!
//! Loading is fail-fast. One malformed post aborts the scan with the error for
//! that file; nothing is skipped silently.

use crate::post::{self, Post, PostError};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("\"{0}\" directory required for compilation")]
    MissingPostsDirectory(PathBuf),
    #[error(transparent)]
    Post(#[from] PostError),
}

/// A directory of posts.
#[derive(Debug, Clone, Serialize)]
pub struct Category {
    /// Directory name; also the stem of the category's index page.
    pub name: String,
    pub posts: Vec<Post>,
}

impl Category {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            posts: Vec::new(),
        }
    }

    /// File name of this category's listing page (`{name}.html`).
    pub fn index_file_name(&self) -> String {
        index_file_name(&self.name)
    }

    /// Sort this category's posts newest first (stable).
    pub fn sort_posts(&mut self) {
        post::sort_newest_first(&mut self.posts);
    }
}

fn index_file_name(category: &str) -> String {
    format!("{category}.html")
}

/// Discover every category under `posts_root` and load its posts.
///
/// Posts are left in discovery order; callers sort when they render.
pub fn list_categories(posts_root: &Path) -> Result<Vec<Category>, ScanError> {
    if !posts_root.is_dir() {
        return Err(ScanError::MissingPostsDirectory(posts_root.to_path_buf()));
    }

    let mut categories = Vec::new();
    for dir in collect_entries(posts_root)?.into_iter().filter(|p| p.is_dir()) {
        let name = file_name(&dir);
        let mut category = Category::new(name);
        populate(&mut category, &dir)?;
        log::debug!(
            "category {} has {} posts",
            category.name,
            category.posts.len()
        );
        categories.push(category);
    }
    Ok(categories)
}

/// Load every post file in `dir` into `category`, skipping its index page.
pub fn populate(category: &mut Category, dir: &Path) -> Result<(), ScanError> {
    let index = category.index_file_name();
    for path in collect_entries(dir)?.into_iter().filter(|p| p.is_file()) {
        if file_name(&path) == index {
            continue;
        }
        log::debug!("loading {}", path.display());
        category.posts.push(post::load(&path)?);
    }
    Ok(())
}

/// Load every post of every category into one flat list, in discovery order.
///
/// This is a fresh read of the tree, independent of any earlier
/// [`list_categories`] result.
pub fn collect_posts(posts_root: &Path) -> Result<Vec<Post>, ScanError> {
    Ok(list_categories(posts_root)?
        .into_iter()
        .flat_map(|c| c.posts)
        .collect())
}

/// Every file inside every category directory, index pages included.
///
/// Symlinks are followed, matching what [`populate`] loads as posts.
pub fn page_files(posts_root: &Path) -> Result<Vec<PathBuf>, ScanError> {
    if !posts_root.is_dir() {
        return Err(ScanError::MissingPostsDirectory(posts_root.to_path_buf()));
    }

    let mut files = Vec::new();
    let walker = WalkDir::new(posts_root)
        .min_depth(2)
        .max_depth(2)
        .follow_links(true)
        .sort_by_file_name();
    for entry in walker {
        let entry = entry?;
        let in_hidden_dir = entry.path().parent().is_some_and(is_hidden);
        if entry.file_type().is_file() && !is_hidden(entry.path()) && !in_hidden_dir {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

fn collect_entries(path: &Path) -> Result<Vec<PathBuf>, ScanError> {
    let mut entries: Vec<PathBuf> = fs::read_dir(path)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| !is_hidden(p))
        .collect();

    entries.sort();
    Ok(entries)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .map(|n| n.to_string_lossy().starts_with('.'))
        .unwrap_or(false)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}
