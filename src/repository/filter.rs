use glob::Pattern;

/// Git config key listing comma-separated paths excluded from fetching.
pub const FETCH_EXCLUDE_KEY: &str = "lode.fetchexclude";

/// Path-exclusion filter applied upstream of the object verifier.
///
/// Objects the user elected not to fetch must not be reported as missing, so
/// the by-blob feed drops their pointers before verification ever sees them.
#[derive(Debug, Default)]
pub struct PathFilter {
    exclude: Vec<ExcludeRule>,
}

#[derive(Debug)]
struct ExcludeRule {
    raw: String,
    pattern: Option<Pattern>,
    anchored: bool,
}

impl PathFilter {
    /// A filter that excludes nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let exclude = patterns
            .into_iter()
            .map(|p| {
                let raw = p.as_ref().trim_end_matches('/').to_string();
                ExcludeRule {
                    pattern: Pattern::new(&raw).ok(),
                    anchored: raw.contains('/'),
                    raw,
                }
            })
            .filter(|r| !r.raw.is_empty())
            .collect();
        Self { exclude }
    }

    /// Build from the repository's `lode.fetchexclude` config value.
    pub fn from_config(config: &git2::Config) -> Self {
        match config.get_string(FETCH_EXCLUDE_KEY) {
            Ok(value) => Self::new(value.split(',').map(str::trim)),
            Err(_) => Self::empty(),
        }
    }

    /// Whether a repository-relative path passes the filter.
    pub fn allows(&self, path: &str) -> bool {
        !self.exclude.iter().any(|rule| rule.matches(path))
    }
}

impl ExcludeRule {
    fn matches(&self, path: &str) -> bool {
        if path == self.raw {
            return true;
        }
        if let Some(rest) = path.strip_prefix(self.raw.as_str()) {
            if rest.starts_with('/') {
                return true;
            }
        }
        let Some(pattern) = &self.pattern else {
            return false;
        };
        if self.anchored {
            pattern.matches(path)
        } else {
            // Unanchored patterns apply to the basename and to any directory
            // component, the way ignore-style patterns do.
            path.split('/').any(|segment| pattern.matches(segment))
        }
    }
}
