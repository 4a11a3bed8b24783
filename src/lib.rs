//! # Tufte Press
//!
//! A small static site generator for hand-written HTML blogs styled with
//! Tufte CSS. Posts are ordinary HTML files grouped into category
//! directories; the generator never renders post bodies. It keeps the site's
//! shared parts in sync: category listing pages, a navigation sidebar on
//! every page, and a "Recent Posts" list on the homepage.
//!
//! ```text
//! site/
//! ├── config.toml                # Optional, see [`config`]
//! ├── index.html                 # Homepage, needs <div class="content">
//! ├── tufte.css
//! └── posts/
//!     ├── essays/
//!     │   ├── essays.html        # Listing page (regenerated)
//!     │   └── on-tufte.html      # Post: <h1> title, <h2> subtitle, <timestamp>DD/MM/YYYY</timestamp>
//!     └── notes/
//!         └── ...
//! ```
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`markdown`] | Line-oriented Markdown subset: ATX and Setext headers, paragraphs |
//! | [`table`] | CSV rows to an HTML `<table>`, with an optional line-broken layout |
//! | [`document`] | Parse, query, edit and serialize existing HTML pages (html5ever) |
//! | [`post`] | Load title, subtitle and publish date from a post page |
//! | [`scan`] | Discover categories and their posts under the posts directory |
//! | [`generate`] | Rewrite the site: listing pages, sidebar, recent posts, stylesheets |
//! | [`config`] | `config.toml` loading, layering and validation |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## In-Place Rewrites
//!
//! The site directory is both input and output. Generated regions are
//! recognized by markers (`div.sidebar`, `div#recentposts`) and replaced on
//! every run, so compiling twice gives the same files as compiling once.
//!
//! ## Metadata From Markup
//!
//! There is no front matter. A post's title, description and date are read
//! from its first `<h1>`, `<h2>` and `<timestamp>` elements. A post missing
//! any of them stops the build with an error naming the file.
//!
//! ## Maud For New Markup
//!
//! Listing pages, the sidebar and post blocks are built with
//! [Maud](https://maud.lambda.xyz/). Interpolated titles are escaped.

pub mod config;
pub mod document;
pub mod generate;
pub mod markdown;
pub mod output;
pub mod post;
pub mod scan;
pub mod table;

#[cfg(test)]
pub(crate) mod test_helpers;
