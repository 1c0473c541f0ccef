//! core::config
//!
//! Source configuration: which repositories to merge, and where each one's
//! content lands in the merged tree.
//!
//! # Token format
//!
//! Each source is supplied as a single CLI token `<url>:<directory>`. The
//! **last** colon splits URL from directory, so URLs containing colons
//! (`https://...`, `ssh://git@host:port/...`) work without escaping:
//!
//! ```text
//! https://example.com/libs/b.git:libs/b
//! ../local/repo:.
//! ```
//!
//! A directory of `.` places the source's tree at the root of the merged
//! repository. Target directories of different sources must not overlap as
//! path prefixes; that is the caller's responsibility and violations are
//! detected during the merge, not here.
//!
//! # Lifecycle
//!
//! Configs are created once at startup from the CLI tokens and are
//! read-only afterwards. [`ConfigSet`] preserves input order; that order
//! determines parent order in every synthesized merge commit.

use thiserror::Error;

/// Errors from source-configuration parsing.
///
/// These are usage errors: the process should exit with code 64 without
/// starting any merge work.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Token does not match `<url>:<directory>`.
    #[error("invalid argument '{token}', expected '<repository_url>:<target_directory>'")]
    InvalidToken {
        /// The offending CLI token
        token: String,
    },

    /// Target directory is unusable (empty, absolute, or escapes the root).
    #[error("invalid target directory '{directory}': {reason}")]
    InvalidDirectory {
        /// The offending directory
        directory: String,
        /// Why it was rejected
        reason: String,
    },

    /// No source tokens were supplied at all.
    #[error("usage: tributary <repository_url>:<target_directory>...")]
    NoSources,
}

/// One source repository and its placement in the merged tree.
///
/// Immutable after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtreeConfig {
    /// URL or local path of the source repository.
    url: String,
    /// Target directory in the merged tree; `"."` means the root.
    directory: String,
    /// Display name, derived from the URL and unique within a [`ConfigSet`].
    name: String,
}

impl SubtreeConfig {
    /// Parse a `<url>:<directory>` token.
    ///
    /// The split happens at the last colon, so the directory half can never
    /// contain one. Both halves must be non-empty; the directory must be a
    /// relative path that stays inside the merged tree.
    ///
    /// The display name is derived later, when the config joins a
    /// [`ConfigSet`] (uniqueness is a set-level property).
    fn parse(token: &str) -> Result<(String, String), ConfigError> {
        let invalid = || ConfigError::InvalidToken {
            token: token.to_string(),
        };

        let (url, directory) = token.rsplit_once(':').ok_or_else(invalid)?;
        if url.is_empty() || directory.is_empty() {
            return Err(invalid());
        }

        let directory = directory.trim_end_matches('/');
        validate_directory(directory)?;

        Ok((url.to_string(), directory.to_string()))
    }

    /// URL or local path of the source repository.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Target directory in the merged tree; `"."` means the root.
    pub fn directory(&self) -> &str {
        &self.directory
    }

    /// Whether this source maps to the root of the merged tree.
    pub fn is_root(&self) -> bool {
        self.directory == "."
    }

    /// Display name used in refs, messages, and reports.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Display for SubtreeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.url, self.directory)
    }
}

/// Validate a target directory token half.
fn validate_directory(directory: &str) -> Result<(), ConfigError> {
    let err = |reason: &str| ConfigError::InvalidDirectory {
        directory: directory.to_string(),
        reason: reason.to_string(),
    };

    if directory.is_empty() {
        return Err(err("directory is empty"));
    }
    if directory.starts_with('/') {
        return Err(err("directory must be relative"));
    }
    if directory
        .split('/')
        .any(|component| component.is_empty() || component == "..")
    {
        return Err(err("directory must not contain '..' or empty components"));
    }
    // "." is only meaningful as the whole directory (root placement)
    if directory != "." && directory.split('/').any(|component| component == ".") {
        return Err(err("'.' is only valid as the entire directory"));
    }

    Ok(())
}

/// Derive a "humanish" name from a repository URL: the last path segment
/// with any `.git` suffix stripped.
///
/// The name is embedded in ref names (`refs/sources/<name>/...`), so it
/// is sanitized to a single valid ref component: characters git rejects
/// become `-`, `..` sequences are collapsed, and a `.lock` suffix or
/// leading/trailing `.`/`-` are stripped.
fn humanish_name(url: &str) -> String {
    let trimmed = url.trim_end_matches('/');
    let segment = trimmed
        .rsplit(['/', ':'])
        .find(|s| !s.is_empty())
        .unwrap_or(trimmed);
    let base = segment.strip_suffix(".git").unwrap_or(segment);

    let mut name: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '-'
            }
        })
        .collect();
    while name.contains("..") {
        name = name.replace("..", "-");
    }
    let name = name
        .trim_end_matches(".lock")
        .trim_matches(|c| c == '.' || c == '-');

    if name.is_empty() {
        "source".to_string()
    } else {
        name.to_string()
    }
}

/// Ordered, immutable set of source configurations.
///
/// Iteration order equals input order and is the canonical config order
/// used for parent lists, timestamp tie-breaking, and reporting.
#[derive(Debug, Clone)]
pub struct ConfigSet {
    configs: Vec<SubtreeConfig>,
}

impl ConfigSet {
    /// Build a config set from CLI tokens.
    ///
    /// Display names are derived from the URLs and made unique by
    /// suffixing an index on collision.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::NoSources`] if `tokens` is empty
    /// - [`ConfigError::InvalidToken`] / [`ConfigError::InvalidDirectory`]
    ///   for any malformed token
    pub fn from_tokens<I, S>(tokens: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut configs: Vec<SubtreeConfig> = Vec::new();

        for token in tokens {
            let (url, directory) = SubtreeConfig::parse(token.as_ref())?;

            let base = humanish_name(&url);
            let mut name = base.clone();
            let mut suffix = 1;
            while configs.iter().any(|c| c.name == name) {
                suffix += 1;
                name = format!("{}-{}", base, suffix);
            }

            configs.push(SubtreeConfig {
                url,
                directory,
                name,
            });
        }

        if configs.is_empty() {
            return Err(ConfigError::NoSources);
        }

        Ok(Self { configs })
    }

    /// Number of sources.
    pub fn len(&self) -> usize {
        self.configs.len()
    }

    /// Whether the set is empty (never true for a constructed set).
    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }

    /// Iterate configs in canonical (input) order.
    pub fn iter(&self) -> std::slice::Iter<'_, SubtreeConfig> {
        self.configs.iter()
    }
}

impl<'a> IntoIterator for &'a ConfigSet {
    type Item = &'a SubtreeConfig;
    type IntoIter = std::slice::Iter<'a, SubtreeConfig>;

    fn into_iter(self) -> Self::IntoIter {
        self.configs.iter()
    }
}
