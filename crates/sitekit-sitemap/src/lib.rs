//! Sitemap builder for static HTML sites.
//!
//! Walks one or more local site roots, collects every public HTML page and
//! writes a single sitemaps.org 0.9 document covering all of them.

pub mod builder;
pub mod discover;
pub mod ignore;
pub mod sitemap;

pub use builder::{SitemapBuilder, SitemapConfig, SitemapError, SitemapResult};
pub use discover::{discover_site, SiteRoot};
pub use ignore::{glob_to_regex, CompiledIgnore, IgnoreError, IgnoreRules};
pub use sitemap::{render_robots, render_sitemap, Priority, SitemapEntry};
