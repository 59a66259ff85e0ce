//! Sitemap entries and XML rendering.

use std::fmt;

use chrono::NaiveDate;

/// Crawl priority of a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    /// The root index page of a site
    Root,
    /// Any other page
    Page,
}

impl Priority {
    /// Value written to `<priority>`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Root => "1.0",
            Priority::Page => "0.8",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single `<url>` record.
#[derive(Debug, Clone, PartialEq)]
pub struct SitemapEntry {
    /// Absolute public URL
    pub loc: String,

    /// Last modification date (local time)
    pub lastmod: NaiveDate,

    /// Crawl priority
    pub priority: Priority,
}

/// Render entries as a sitemaps.org 0.9 document, in the given order.
pub fn render_sitemap(entries: &[SitemapEntry]) -> String {
    let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    xml.push_str("<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n");

    for entry in entries {
        xml.push_str("  <url>\n");
        xml.push_str(&format!("    <loc>{}</loc>\n", escape_xml(&entry.loc)));
        xml.push_str(&format!(
            "    <lastmod>{}</lastmod>\n",
            entry.lastmod.format("%Y-%m-%d")
        ));
        xml.push_str(&format!("    <priority>{}</priority>\n", entry.priority));
        xml.push_str("  </url>\n");
    }

    xml.push_str("</urlset>");
    xml
}

/// Render a robots.txt that allows everything and points at the sitemap.
pub fn render_robots(sitemap_url: &str) -> String {
    format!("User-agent: *\nAllow: /\nSitemap: {}\n", sitemap_url)
}

fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}
