//! CLI output formatting.
//!
//! # Information-First Display
//!
//! Every entity (category, post, page) is shown by its identity first: a
//! positional index and a title. Filesystem paths come second, on indented
//! `Source:` lines, relative to the site root.
//!
//! # Output Format
//!
//! ## Scan
//!
//! ```text
//! Categories
//! 001 essays (3 posts)
//!     Source: posts/essays/
//!     001 On Tufte (2021-06-15)
//!         Source: posts/essays/on-tufte.html
//!         Description: Small multiples and sparklines
//! ```
//!
//! ## Compile
//!
//! ```text
//! Categories
//! 001 essays (3 posts) → posts/essays/essays.html
//! 002 notes (2 posts) → posts/notes/notes.html
//!
//! Sidebar
//!     8 pages updated
//!     Skipped: posts/notes/fragment.html
//!
//! Recent Posts → index.html
//!     001 On Tufte (2021-06-15)
//!
//! Compiled 2 categories, 5 posts
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure: no I/O, no side effects.

use crate::generate::CompileReport;
use crate::post::Post;
use crate::scan::Category;
use std::path::Path;

// ============================================================================
// Shared entity display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn count(n: usize, singular: &str, plural: &str) -> String {
    if n == 1 {
        format!("{n} {singular}")
    } else {
        format!("{n} {plural}")
    }
}

/// Category header: index, name and post count.
///
/// ```text
/// 001 essays (3 posts)
/// ```
fn category_header(index: usize, category: &Category) -> String {
    format!(
        "{} {} ({})",
        format_index(index),
        category.name,
        count(category.posts.len(), "post", "posts")
    )
}

/// Post line: index, title and publish date.
fn post_line(index: usize, post: &Post) -> String {
    format!(
        "{} {} ({})",
        format_index(index),
        post.title,
        post.publish_date.format("%Y-%m-%d")
    )
}

/// Truncate text to `max` characters, appending `...` if truncated.
fn truncate_desc(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

/// `path` relative to `root` with `/` separators, for display.
fn display_path(path: &Path, root: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.to_string_lossy().replace('\\', "/")
}

// ============================================================================
// Scan / check
// ============================================================================

/// Format the categories found by a scan, posts in the order given.
pub fn format_scan_output(categories: &[Category], root: &Path) -> Vec<String> {
    let mut lines = vec!["Categories".to_string()];

    if categories.is_empty() {
        lines.push(format!("{}(none)", indent(1)));
        return lines;
    }

    for (i, category) in categories.iter().enumerate() {
        lines.push(category_header(i + 1, category));
        if let Some(dir) = category.posts.first().and_then(|p| p.path.parent()) {
            lines.push(format!("{}Source: {}/", indent(1), display_path(dir, root)));
        }
        for (j, post) in category.posts.iter().enumerate() {
            lines.push(format!("{}{}", indent(1), post_line(j + 1, post)));
            lines.push(format!(
                "{}Source: {}",
                indent(2),
                display_path(&post.path, root)
            ));
            if !post.description.is_empty() {
                lines.push(format!(
                    "{}Description: {}",
                    indent(2),
                    truncate_desc(&post.description, 60)
                ));
            }
        }
    }

    lines
}

/// Print scan output to stdout.
pub fn print_scan_output(categories: &[Category], root: &Path) {
    for line in format_scan_output(categories, root) {
        println!("{}", line);
    }
}

// ============================================================================
// Compile
// ============================================================================

/// Format the result of a compile run.
pub fn format_compile_output(report: &CompileReport, root: &Path, homepage: &Path) -> Vec<String> {
    let mut lines = vec!["Categories".to_string()];

    for (i, (category, page)) in report
        .categories
        .iter()
        .zip(&report.category_pages)
        .enumerate()
    {
        lines.push(format!(
            "{} → {}",
            category_header(i + 1, category),
            display_path(page, root)
        ));
    }

    lines.push(String::new());
    lines.push("Sidebar".to_string());
    lines.push(format!(
        "{}{} updated",
        indent(1),
        count(report.sidebar.updated.len(), "page", "pages")
    ));
    for skipped in &report.sidebar.skipped {
        lines.push(format!("{}Skipped: {}", indent(1), display_path(skipped, root)));
    }

    if report.stylesheets_linked > 0 {
        lines.push(String::new());
        lines.push(format!(
            "Stylesheets linked into {}",
            count(report.stylesheets_linked, "page", "pages")
        ));
    }

    lines.push(String::new());
    lines.push(format!("Recent Posts → {}", display_path(homepage, root)));
    for (i, post) in report.recent_posts.iter().enumerate() {
        lines.push(format!("{}{}", indent(1), post_line(i + 1, post)));
    }

    let total_posts: usize = report.categories.iter().map(|c| c.posts.len()).sum();
    lines.push(String::new());
    lines.push(format!(
        "Compiled {}, {}",
        count(report.categories.len(), "category", "categories"),
        count(total_posts, "post", "posts")
    ));

    lines
}

/// Print compile output to stdout.
pub fn print_compile_output(report: &CompileReport, root: &Path, homepage: &Path) {
    for line in format_compile_output(report, root, homepage) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================
