//! File and directory exclusion rules.

use std::collections::HashSet;

use regex::{Regex, RegexBuilder};

/// Exclusion lists shared by every scanned site.
#[derive(Debug, Clone, PartialEq)]
pub struct IgnoreRules {
    /// Glob patterns matched against file names (not paths)
    pub files: Vec<String>,

    /// Directory names whose whole subtree is skipped
    pub dirs: Vec<String>,

    /// Match file patterns without regard to case, as on Windows.
    /// Directory names always match exactly.
    pub case_insensitive: bool,
}

impl Default for IgnoreRules {
    fn default() -> Self {
        Self {
            files: [
                "google*.html",
                "404.html",
                "draft.html",
                "index1.html",
                "index2.html",
                "indexcopy.html",
                "index copy.html",
                "indexbackup*.html",
                "new.html",
                "template.html",
                "wpChat.html",
                "wpChat-backup.html",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            dirs: [
                ".git",
                "node_modules",
                ".github",
                ".vscode",
                "screenshots",
                "dist",
                "build",
                "__pycache__",
                "backups",
                "assets",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            case_insensitive: false,
        }
    }
}

/// Errors that can occur when compiling ignore rules.
#[derive(Debug, thiserror::Error)]
pub enum IgnoreError {
    #[error("Invalid ignore pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },
}

impl IgnoreRules {
    /// Compile the glob patterns into matchers.
    pub fn compile(&self) -> Result<CompiledIgnore, IgnoreError> {
        let files = self
            .files
            .iter()
            .map(|pattern| {
                RegexBuilder::new(&glob_to_regex(pattern))
                    .case_insensitive(self.case_insensitive)
                    .build()
                    .map_err(|e| IgnoreError::InvalidPattern {
                        pattern: pattern.clone(),
                        message: e.to_string(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(CompiledIgnore {
            files,
            dirs: self.dirs.iter().cloned().collect(),
        })
    }
}

/// Ignore rules ready for matching.
#[derive(Debug, Clone)]
pub struct CompiledIgnore {
    files: Vec<Regex>,
    dirs: HashSet<String>,
}

impl CompiledIgnore {
    /// Whether a file name matches any ignore pattern.
    pub fn ignores_file(&self, name: &str) -> bool {
        self.files.iter().any(|re| re.is_match(name))
    }

    /// Whether a directory name is excluded.
    pub fn ignores_dir(&self, name: &str) -> bool {
        self.dirs.contains(name)
    }
}

/// Translate a shell-style glob into an anchored regular expression.
///
/// Supports `*`, `?`, `[seq]` and `[!seq]`. An unterminated `[` matches
/// itself literally.
pub fn glob_to_regex(pattern: &str) -> String {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::from("^");
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '*' => out.push_str(".*"),
            '?' => out.push('.'),
            '[' => {
                // Find the closing bracket; a `]` right after `[` or `[!` is literal
                let mut j = i + 1;
                if j < chars.len() && chars[j] == '!' {
                    j += 1;
                }
                if j < chars.len() && chars[j] == ']' {
                    j += 1;
                }
                while j < chars.len() && chars[j] != ']' {
                    j += 1;
                }

                if j >= chars.len() {
                    out.push_str(r"\[");
                } else {
                    let body: String = chars[i + 1..j].iter().collect();
                    let (negate, body) = match body.strip_prefix('!') {
                        Some(rest) => (true, rest.to_string()),
                        None => (false, body),
                    };
                    out.push('[');
                    if negate {
                        out.push('^');
                    }
                    for c in body.chars() {
                        if c == '\\' || c == '[' || c == ']' || c == '^' || c == '&' || c == '~' {
                            out.push('\\');
                        }
                        out.push(c);
                    }
                    out.push(']');
                    i = j;
                }
            }
            c => out.push_str(&regex::escape(&c.to_string())),
        }
        i += 1;
    }

    out.push('$');
    out
}
