//! Site assembly.
//!
//! Rewrites an existing site tree in place. Nothing is generated into a
//! separate output directory: category listing pages are overwritten, every
//! page gets the shared sidebar, and the homepage gets a fresh "Recent Posts"
//! list.
//!
//! ## Pipeline
//!
//! [`Site::compile`] runs these steps strictly in order:
//!
//! ```text
//! 1. Categories   posts/*/           →  Vec<Category>            (scan::list_categories)
//! 2. Listings     Category            →  posts/{c}/{c}.html       (write_category_page)
//! 3. Sidebar      Vec<Category>       →  Sidebar                  (build_sidebar)
//! 4. Propagate    Sidebar             →  every page + homepage    (propagate_sidebar)
//! 5. Stylesheets  config.stylesheets  →  <head> of every page     (link_stylesheets, opt-in)
//! 6. Recent       fresh post scan     →  homepage div.content     (rebuild_recent_posts)
//! ```
//!
//! A failure at any step stops the run. Files written by earlier steps stay
//! written.
//!
//! ## Page regions
//!
//! Injected regions are found again on the next run by their markers, which
//! makes repeated runs idempotent:
//!
//! - Sidebar: the first `div` with class `sidebar` inside `<body>`; replaced in
//!   place, or appended to `<body>` when absent.
//! - Recent posts: `div#recentposts`; removed and rebuilt at the end of the
//!   homepage's `div.content`.
//!
//! ## Links
//!
//! Every generated link is `{base_url}/{site-relative path}`, built by
//! [`SiteLinks`]. With an empty base URL the links are rooted at `/`; with a
//! hosting URL (`compile-for https://user.github.io/blog`) they are absolute.
//!
//! ## HTML Generation
//!
//! New markup (listing pages, the sidebar, post blocks) is written with
//! [maud](https://maud.lambda.xyz/), so titles and descriptions are escaped.
//! Existing pages are edited through [`crate::document`].

use crate::config::SiteConfig;
use crate::document::{self, Document, Fragment, Selector};
use crate::post::{self, Post};
use crate::scan::{self, Category, ScanError};
use maud::{DOCTYPE, Markup, html};
use std::fs;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Scan(#[from] ScanError),
    #[error("{0} has no <div class=\"content\"> to hold the recent posts")]
    MissingContentContainer(PathBuf),
}

const SIDEBAR_CLASS: &str = "sidebar";
const CONTENT_CLASS: &str = "content";
const RECENT_POSTS_ID: &str = "recentposts";

// ============================================================================
// Links
// ============================================================================

/// Builds the hrefs written into generated markup.
#[derive(Debug, Clone)]
pub struct SiteLinks {
    root: PathBuf,
    base_url: String,
    posts_dir: String,
    homepage: String,
}

impl SiteLinks {
    pub fn new(root: &Path, config: &SiteConfig) -> Self {
        Self {
            root: root.to_path_buf(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            posts_dir: config.posts_dir.trim_matches('/').to_string(),
            homepage: config.homepage.trim_start_matches('/').to_string(),
        }
    }

    /// Link to a path relative to the site root.
    pub fn href(&self, site_path: &str) -> String {
        format!("{}/{}", self.base_url, site_path.trim_start_matches('/'))
    }

    /// Link to a file on disk under the site root.
    pub fn file_href(&self, path: &Path) -> String {
        self.href(&site_relative(path, &self.root))
    }

    pub fn home(&self) -> String {
        self.href(&self.homepage)
    }

    /// Link to a category's listing page: `{base}/{posts_dir}/{name}/{name}.html`.
    pub fn category(&self, name: &str) -> String {
        self.href(&format!("{}/{name}/{name}.html", self.posts_dir))
    }
}

/// `path` relative to `root`, with `/` separators.
fn site_relative(path: &Path, root: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// `../` repeated once per directory between `page` and the site root.
fn relative_prefix(page: &Path, root: &Path) -> String {
    let depth = site_relative(page, root).split('/').count().saturating_sub(1);
    "../".repeat(depth)
}

// ============================================================================
// Sidebar
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavLink {
    pub title: String,
    pub href: String,
}

/// Navigation shared by every page: a Home link and one link per category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sidebar {
    pub home: NavLink,
    pub categories: Vec<NavLink>,
}

impl Sidebar {
    pub fn render(&self) -> Markup {
        html! {
            div.sidebar.no-print {
                h2 { a href=(self.home.href) { (self.home.title) } }
                h3 { "Categories" }
                @for link in &self.categories {
                    a href=(link.href) { (link.title) }
                }
            }
        }
    }

    pub fn fragment(&self) -> Fragment {
        Fragment::from(self.render())
    }
}

/// Build the sidebar for `categories`, keeping their order.
pub fn build_sidebar(categories: &[Category], links: &SiteLinks) -> Sidebar {
    Sidebar {
        home: NavLink {
            title: "Home".to_string(),
            href: links.home(),
        },
        categories: categories
            .iter()
            .map(|c| NavLink {
                title: c.name.clone(),
                href: links.category(&c.name),
            })
            .collect(),
    }
}

/// What happened to one page during sidebar propagation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SidebarInjection {
    Replaced,
    Appended,
    /// The page has no `<body>`; left untouched.
    Skipped,
}

#[derive(Debug, Default)]
pub struct PropagateReport {
    pub updated: Vec<PathBuf>,
    pub skipped: Vec<PathBuf>,
}

/// Put `fragment` into one page, replacing an existing sidebar if there is one.
pub fn inject_sidebar(path: &Path, fragment: &Fragment) -> Result<SidebarInjection, GenerateError> {
    let doc = Document::read(path)?;
    let Some(body) = doc.body() else {
        log::warn!("{} has no <body>, sidebar not added", path.display());
        return Ok(SidebarInjection::Skipped);
    };

    let outcome = match document::find_within(&body, Selector::class("div", SIDEBAR_CLASS)) {
        Some(existing) => {
            doc.replace(&existing, fragment);
            SidebarInjection::Replaced
        }
        None => {
            doc.append_child(&body, fragment);
            SidebarInjection::Appended
        }
    };
    doc.write(path)?;
    log::debug!("sidebar {:?} in {}", outcome, path.display());
    Ok(outcome)
}

/// Inject the sidebar into every page in `pages`, then into the homepage.
pub fn propagate_sidebar(
    sidebar: &Sidebar,
    pages: &[PathBuf],
    homepage: &Path,
) -> Result<PropagateReport, GenerateError> {
    let fragment = sidebar.fragment();
    let mut report = PropagateReport::default();

    for path in pages.iter().map(PathBuf::as_path).chain(std::iter::once(homepage)) {
        match inject_sidebar(path, &fragment)? {
            SidebarInjection::Skipped => report.skipped.push(path.to_path_buf()),
            _ => report.updated.push(path.to_path_buf()),
        }
    }
    Ok(report)
}

// ============================================================================
// Category pages
// ============================================================================

/// One post's entry in a listing: linked title, description, spacer.
fn post_block(post: &Post, links: &SiteLinks) -> Markup {
    html! {
        h3 {
            a href=(links.file_href(&post.path)) { (post.title) }
        }
        h4 { (post.description) }
        br;
    }
}

/// Render a category's listing page. `stylesheets` are hrefs as written.
///
/// Posts are listed in the order given; sort them first.
pub fn render_category_page(category: &Category, links: &SiteLinks, stylesheets: &[String]) -> Markup {
    html! {
        (DOCTYPE)
        html {
            head {
                @for href in stylesheets {
                    link rel="stylesheet" href=(href);
                }
            }
            body {
                div.content {
                    h1 { (category.name) }
                    hr;
                    br;
                    @for post in &category.posts {
                        (post_block(post, links))
                    }
                }
            }
        }
    }
}

/// Write `category`'s listing page into `dir`, overwriting `{name}.html`.
pub fn write_category_page(
    category: &Category,
    dir: &Path,
    links: &SiteLinks,
    stylesheets: &[String],
) -> Result<PathBuf, GenerateError> {
    let path = dir.join(category.index_file_name());
    let prefix = relative_prefix(&path, &links.root);
    let hrefs: Vec<String> = stylesheets.iter().map(|s| format!("{prefix}{s}")).collect();

    let page = render_category_page(category, links, &hrefs);
    fs::write(&path, page.into_string())?;
    log::debug!("wrote {}", path.display());
    Ok(path)
}

// ============================================================================
// Homepage
// ============================================================================

fn render_recent_posts(posts: &[Post], links: &SiteLinks) -> Markup {
    html! {
        div id=(RECENT_POSTS_ID) {
            h2 { "Recent Posts" }
            @for post in posts {
                (post_block(post, links))
            }
        }
    }
}

/// Rebuild the homepage's recent posts list from a fresh scan of `posts_root`.
///
/// Returns the posts that were listed, newest first.
pub fn rebuild_recent_posts(
    homepage: &Path,
    posts_root: &Path,
    links: &SiteLinks,
    limit: usize,
) -> Result<Vec<Post>, GenerateError> {
    let mut posts = scan::collect_posts(posts_root)?;
    post::sort_newest_first(&mut posts);
    posts.truncate(limit);

    let doc = Document::read(homepage)?;
    if let Some(existing) = doc.find_first(Selector::id("div", RECENT_POSTS_ID)) {
        doc.remove(&existing);
    }
    let content = doc
        .find_first(Selector::class("div", CONTENT_CLASS))
        .ok_or_else(|| GenerateError::MissingContentContainer(homepage.to_path_buf()))?;
    doc.append_child(&content, &Fragment::from(render_recent_posts(&posts, links)));
    doc.write(homepage)?;
    Ok(posts)
}

// ============================================================================
// Stylesheets
// ============================================================================

/// Make sure `page` links each stylesheet (site-relative) from its `<head>`.
///
/// Hrefs are written relative to the page. Returns whether the file changed.
pub fn link_stylesheets(page: &Path, root: &Path, stylesheets: &[String]) -> Result<bool, GenerateError> {
    let doc = Document::read(page)?;
    let Some(head) = doc.head() else {
        return Ok(false);
    };

    let prefix = relative_prefix(page, root);
    let mut changed = false;
    for sheet in stylesheets {
        let href = format!("{prefix}{sheet}");
        if document::find_within(&head, Selector::attr("link", "href", &href)).is_none() {
            let tag = html! { link rel="stylesheet" href=(href); };
            doc.append_child(&head, &Fragment::from(tag));
            changed = true;
        }
    }
    if changed {
        doc.write(page)?;
    }
    Ok(changed)
}

// ============================================================================
// Whole site
// ============================================================================

/// Outcome of a [`Site::compile`] run.
#[derive(Debug)]
pub struct CompileReport {
    /// Categories with their posts sorted newest first.
    pub categories: Vec<Category>,
    /// Listing pages written, one per category.
    pub category_pages: Vec<PathBuf>,
    pub sidebar: PropagateReport,
    /// Pages that gained at least one stylesheet link.
    pub stylesheets_linked: usize,
    pub recent_posts: Vec<Post>,
}

/// A site rooted at a directory, with its resolved configuration.
#[derive(Debug, Clone)]
pub struct Site {
    root: PathBuf,
    config: SiteConfig,
}

impl Site {
    pub fn new(root: impl Into<PathBuf>, config: SiteConfig) -> Self {
        Self {
            root: root.into(),
            config,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    pub fn posts_dir(&self) -> PathBuf {
        self.root.join(&self.config.posts_dir)
    }

    pub fn homepage(&self) -> PathBuf {
        self.root.join(&self.config.homepage)
    }

    pub fn links(&self) -> SiteLinks {
        SiteLinks::new(&self.root, &self.config)
    }

    /// Load every category without writing anything.
    pub fn categories(&self) -> Result<Vec<Category>, GenerateError> {
        let mut categories = scan::list_categories(&self.posts_dir())?;
        for category in &mut categories {
            category.sort_posts();
        }
        Ok(categories)
    }

    /// Regenerate listings, sidebars and the homepage's recent posts.
    pub fn compile(&self) -> Result<CompileReport, GenerateError> {
        let posts_dir = self.posts_dir();
        let homepage = self.homepage();
        let links = self.links();

        log::info!("scanning {}", posts_dir.display());
        let categories = self.categories()?;

        let mut category_pages = Vec::with_capacity(categories.len());
        for category in &categories {
            let dir = posts_dir.join(&category.name);
            category_pages.push(write_category_page(
                category,
                &dir,
                &links,
                &self.config.stylesheets,
            )?);
        }
        log::info!("wrote {} category pages", category_pages.len());

        let sidebar = build_sidebar(&categories, &links);
        let pages = scan::page_files(&posts_dir)?;
        let sidebar_report = propagate_sidebar(&sidebar, &pages, &homepage)?;
        log::info!(
            "sidebar updated in {} pages, {} skipped",
            sidebar_report.updated.len(),
            sidebar_report.skipped.len()
        );

        let mut stylesheets_linked = 0;
        if self.config.link_stylesheets {
            for page in pages.iter().chain(std::iter::once(&homepage)) {
                if link_stylesheets(page, &self.root, &self.config.stylesheets)? {
                    stylesheets_linked += 1;
                }
            }
            log::info!("linked stylesheets into {stylesheets_linked} pages");
        }

        let recent_posts =
            rebuild_recent_posts(&homepage, &posts_dir, &links, self.config.recent_posts)?;
        log::info!("homepage lists {} recent posts", recent_posts.len());

        Ok(CompileReport {
            categories,
            category_pages,
            sidebar: sidebar_report,
            stylesheets_linked,
            recent_posts,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
