//! Site discovery: walks a local site root and turns HTML files into entries.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use walkdir::WalkDir;

use crate::ignore::CompiledIgnore;
use crate::sitemap::{Priority, SitemapEntry};

/// A local directory published under a base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct SiteRoot {
    /// Directory on disk
    pub local_path: PathBuf,

    /// Public URL of the directory, always ending in `/`
    pub base_url: String,
}

impl SiteRoot {
    /// Create a site root, normalising the base URL to end with a slash.
    pub fn new(local_path: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        Self {
            local_path: local_path.into(),
            base_url,
        }
    }

    /// Public URL for a page given its path relative to the root.
    ///
    /// Returns the URL and its priority; only the top-level `index.html`
    /// maps to the bare base URL.
    pub fn url_for(&self, relative: &Path) -> (String, Priority) {
        let url_path = relative
            .components()
            .map(|c| urlencoding::encode(&c.as_os_str().to_string_lossy()).into_owned())
            .collect::<Vec<_>>()
            .join("/");

        if url_path == "index.html" {
            (self.base_url.clone(), Priority::Root)
        } else {
            (format!("{}{}", self.base_url, url_path), Priority::Page)
        }
    }
}

/// Collect sitemap entries for every non-ignored HTML file under a site root.
///
/// Entries come back in file-name order, directories depth-first. Ignored
/// directories are pruned without being read.
pub fn discover_site(site: &SiteRoot, ignore: &CompiledIgnore) -> Vec<SitemapEntry> {
    let mut entries = Vec::new();

    let walker = WalkDir::new(&site.local_path)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            if e.depth() == 0 || !e.file_type().is_dir() {
                return true;
            }
            let name = e.file_name().to_string_lossy();
            !ignore.ignores_dir(&name)
        });

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("Skipping unreadable entry: {}", e);
                continue;
            }
        };

        // Directory symlinks are not followed
        if entry.file_type().is_dir() {
            continue;
        }

        let name = entry.file_name().to_string_lossy();
        if !name.to_lowercase().ends_with(".html") {
            continue;
        }
        if ignore.ignores_file(&name) {
            tracing::debug!("Ignoring {}", entry.path().display());
            continue;
        }

        let Ok(relative) = entry.path().strip_prefix(&site.local_path) else {
            continue;
        };

        // Follows symlinks, so linked pages report their target's mtime
        let metadata = match fs::metadata(entry.path()) {
            Ok(metadata) => metadata,
            Err(e) => {
                tracing::warn!("Failed to stat {}: {}", entry.path().display(), e);
                continue;
            }
        };
        if !metadata.is_file() {
            continue;
        }

        let modified = match metadata.modified() {
            Ok(time) => time,
            Err(e) => {
                tracing::warn!("No modification time for {}: {}", entry.path().display(), e);
                continue;
            }
        };

        let (loc, priority) = site.url_for(relative);

        entries.push(SitemapEntry {
            loc,
            lastmod: DateTime::<Local>::from(modified).date_naive(),
            priority,
        });
    }

    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ignore::IgnoreRules;
    use tempfile::tempdir;

    fn write(root: &Path, relative: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "<html></html>").unwrap();
    }

    #[test]
    fn normalises_base_url() {
        let site = SiteRoot::new("site", "https://example.dev");

        assert_eq!(site.base_url, "https://example.dev/");
    }

    #[test]
    fn root_index_maps_to_bare_domain() {
        let site = SiteRoot::new("site", "https://example.dev/");

        assert_eq!(
            site.url_for(Path::new("index.html")),
            ("https://example.dev/".to_string(), Priority::Root)
        );
        assert_eq!(
            site.url_for(Path::new("docs/index.html")),
            (
                "https://example.dev/docs/index.html".to_string(),
                Priority::Page
            )
        );
    }

    #[test]
    fn escapes_path_segments() {
        let site = SiteRoot::new("site", "https://example.dev/");

        let (url, _) = site.url_for(Path::new("my notes/a&b.html"));

        assert_eq!(url, "https://example.dev/my%20notes/a%26b.html");
    }

    #[test]
    fn discovers_html_and_skips_ignored() {
        let temp = tempdir().unwrap();
        let root = temp.path();

        write(root, "index.html");
        write(root, "about.html");
        write(root, "404.html");
        write(root, "google1234.html");
        write(root, "notes.txt");
        write(root, "UPPER.HTML");
        write(root, "blog/post.html");
        write(root, "node_modules/pkg/readme.html");
        write(root, "assets/embed.html");

        let site = SiteRoot::new(root, "https://example.dev/");
        let ignore = IgnoreRules::default().compile().unwrap();

        let entries = discover_site(&site, &ignore);
        let locs: Vec<&str> = entries.iter().map(|e| e.loc.as_str()).collect();

        assert_eq!(
            locs,
            vec![
                "https://example.dev/UPPER.HTML",
                "https://example.dev/about.html",
                "https://example.dev/blog/post.html",
                "https://example.dev/",
            ]
        );

        let root_entry = entries.iter().find(|e| e.loc == "https://example.dev/").unwrap();
        assert_eq!(root_entry.priority, Priority::Root);
        assert!(entries
            .iter()
            .filter(|e| e.loc != "https://example.dev/")
            .all(|e| e.priority == Priority::Page));
    }

    #[test]
    fn lastmod_uses_file_mtime() {
        let temp = tempdir().unwrap();
        write(temp.path(), "index.html");

        let site = SiteRoot::new(temp.path(), "https://example.dev/");
        let ignore = IgnoreRules::default().compile().unwrap();

        let entries = discover_site(&site, &ignore);

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].lastmod, Local::now().date_naive());
    }

    #[cfg(unix)]
    #[test]
    fn follows_symlinked_pages_but_not_directories() {
        use std::os::unix::fs::symlink;

        let temp = tempdir().unwrap();
        let root = temp.path().join("site");
        let shared = temp.path().join("shared");

        write(&root, "index.html");
        write(&shared, "shared.html");
        write(&shared, "nested/deep.html");
        symlink(shared.join("shared.html"), root.join("shared.html")).unwrap();
        symlink(&shared, root.join("linked")).unwrap();
        symlink(temp.path().join("gone.html"), root.join("broken.html")).unwrap();

        let site = SiteRoot::new(&root, "https://example.dev/");
        let ignore = IgnoreRules::default().compile().unwrap();

        let entries = discover_site(&site, &ignore);
        let locs: Vec<&str> = entries.iter().map(|e| e.loc.as_str()).collect();

        assert_eq!(
            locs,
            vec!["https://example.dev/", "https://example.dev/shared.html"]
        );
        assert_eq!(entries[1].priority, Priority::Page);
        assert_eq!(entries[1].lastmod, Local::now().date_naive());
    }
}
