// src/crawl/filter.rs
// =============================================================================
// Decides which entries are left out of the walk.
//
// Patterns are matched against the entry *name* (not its path), are
// case-sensitive, and are either an exact name ("node_modules") or a simple
// wildcard ("*.min.js"). A matching directory is never listed and never
// descended into, so it costs no upstream request.
// =============================================================================

use globset::{Glob, GlobSet, GlobSetBuilder};

/// Built-in patterns. Extra patterns can be added, these cannot be removed.
pub const DEFAULT_SKIP_PATTERNS: &[&str] = &[
    // version control
    ".git",
    ".svn",
    ".hg",
    // dependencies
    "node_modules",
    "bower_components",
    "vendor",
    ".venv",
    "venv",
    // build output
    "target",
    "dist",
    "build",
    "out",
    ".next",
    ".nuxt",
    "coverage",
    // tool caches
    "__pycache__",
    ".pytest_cache",
    ".mypy_cache",
    ".cache",
    ".gradle",
    ".idea",
    ".vscode",
    ".DS_Store",
    // lockfiles
    "package-lock.json",
    "yarn.lock",
    "pnpm-lock.yaml",
    "Cargo.lock",
    "Gemfile.lock",
    "poetry.lock",
    "composer.lock",
    "*.lock",
    // logs and generated assets
    "*.log",
    "*.min.js",
    "*.min.css",
    "*.map",
    "*.pyc",
];

/// Compiled skip patterns.
#[derive(Debug, Clone)]
pub struct SkipFilter {
    set: GlobSet,
    patterns: Vec<String>,
}

impl SkipFilter {
    /// Builds a filter from the defaults plus `extra` patterns.
    pub fn new<S: AsRef<str>>(extra: &[S]) -> Result<Self, globset::Error> {
        let mut patterns: Vec<String> = DEFAULT_SKIP_PATTERNS.iter().map(|p| p.to_string()).collect();
        patterns.extend(extra.iter().map(|p| p.as_ref().to_string()));

        let mut builder = GlobSetBuilder::new();
        for pattern in &patterns {
            builder.add(Glob::new(pattern)?);
        }

        Ok(Self {
            set: builder.build()?,
            patterns,
        })
    }

    /// True when an entry with this name must be left out.
    pub fn should_skip(&self, name: &str) -> bool {
        self.set.is_match(name)
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }
}

impl Default for SkipFilter {
    fn default() -> Self {
        Self::new::<&str>(&[]).expect("built-in skip patterns are valid globs")
    }
}
