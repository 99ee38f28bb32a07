//! Endpoint classification and path normalization.
//!
//! Deciding whether a path found in documentation is an API endpoint is a
//! cascade of ordered pattern rules:
//!
//! 1. Exclusion rules, evaluated in order. The first match rejects the path.
//! 2. A length cap ([`MAX_PATH_LEN`]).
//! 3. Inclusion rules ("looks like an API"), evaluated in order. The first
//!    match accepts the path.
//! 4. Otherwise only a simple single-segment resource path is accepted.
//!
//! The order of both tables is behavior-defining: an exclusion always wins
//! over an inclusion. The default tables are [`DEFAULT_EXCLUSIONS`] and
//! [`DEFAULT_INCLUSIONS`]; callers can build a [`Classifier`] with their own.

use std::sync::LazyLock;

use regex::Regex;

/// Paths longer than this are never endpoints.
pub const MAX_PATH_LEN: usize = 200;

/// Default exclusion rules as `(name, pattern)`, in evaluation order.
pub const DEFAULT_EXCLUSIONS: &[(&str, &str)] = &[
    ("images", r"^/img/"),
    ("cdn", r"^/cdn/"),
    ("static-asset", r"(?i)\.(png|jpg|jpeg|gif|svg|ico|css|js)$"),
    ("oauth", r"^/oauth/"),
    ("oauth-connect", r"^/connect/"),
    ("link-shortener", r"^/l/"),
    ("base64-blob", r"^/[A-Za-z0-9+/]{50,}"),
    ("signup", r"^/signup"),
    ("analytics", r"^/analytics"),
    ("privacy", r"^/privacy"),
    ("status-page", r"^/status"),
    ("twitter", r"^/twitter"),
    ("github", r"^/github"),
    ("slack", r"^/slack"),
    ("messenger", r"^/m\."),
    ("www-link", r"^/www\."),
    ("aws", r"^/aws"),
    ("root", r"^/$"),
    ("double-slash", r"^//+"),
];

/// Default "looks like an API" rules as `(name, pattern)`, in evaluation order.
pub const DEFAULT_INCLUSIONS: &[(&str, &str)] = &[
    ("api-prefix", r"^/api/"),
    ("version-prefix", r"^/v\d+/"),
    (
        "resource-verb",
        r"(?i)^/[\w-]+/(random|categories|search|list|get|create|update|delete)",
    ),
    ("resource-numeric-id", r"^/[\w-]+/\d+"),
    ("resource-id-placeholder", r"^/[\w-]+/\{id\}"),
    ("resource-query", r"^/[\w-]+\?"),
];

static SIMPLE_RESOURCE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^/[\w-]+/?$").ok());

static DEFAULT_CLASSIFIER: LazyLock<Classifier> = LazyLock::new(Classifier::default);

/// A named pattern in a classification cascade.
#[derive(Debug, Clone)]
pub struct Rule {
    pub name: String,
    pattern: Regex,
}

impl Rule {
    pub fn new(name: impl Into<String>, pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            name: name.into(),
            pattern: Regex::new(pattern)?,
        })
    }

    pub fn matches(&self, path: &str) -> bool {
        self.pattern.is_match(path)
    }
}

/// Outcome of classifying a single path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Rejected by the named exclusion rule.
    Excluded(String),
    /// Rejected for exceeding [`MAX_PATH_LEN`].
    TooLong,
    /// Accepted by the named inclusion rule.
    Included(String),
    /// Accepted as a short single-segment resource path.
    SimpleResource,
    /// Matched nothing.
    Rejected,
}

impl Verdict {
    pub fn is_endpoint(&self) -> bool {
        matches!(self, Verdict::Included(_) | Verdict::SimpleResource)
    }
}

/// Ordered exclusion/inclusion cascade.
#[derive(Debug, Clone)]
pub struct Classifier {
    exclusions: Vec<Rule>,
    inclusions: Vec<Rule>,
}

impl Default for Classifier {
    fn default() -> Self {
        Self {
            exclusions: compile_table(DEFAULT_EXCLUSIONS),
            inclusions: compile_table(DEFAULT_INCLUSIONS),
        }
    }
}

fn compile_table(table: &[(&str, &str)]) -> Vec<Rule> {
    table
        .iter()
        .filter_map(|(name, pattern)| Rule::new(*name, pattern).ok())
        .collect()
}

impl Classifier {
    pub fn new(exclusions: Vec<Rule>, inclusions: Vec<Rule>) -> Self {
        Self {
            exclusions,
            inclusions,
        }
    }

    pub fn exclusions(&self) -> &[Rule] {
        &self.exclusions
    }

    pub fn inclusions(&self) -> &[Rule] {
        &self.inclusions
    }

    pub fn classify(&self, path: &str) -> Verdict {
        if let Some(rule) = self.exclusions.iter().find(|r| r.matches(path)) {
            return Verdict::Excluded(rule.name.clone());
        }

        if path.len() > MAX_PATH_LEN {
            return Verdict::TooLong;
        }

        if let Some(rule) = self.inclusions.iter().find(|r| r.matches(path)) {
            return Verdict::Included(rule.name.clone());
        }

        let simple = SIMPLE_RESOURCE
            .as_ref()
            .is_some_and(|re| re.is_match(path));
        if simple && path.len() > 2 && path.len() < 50 {
            return Verdict::SimpleResource;
        }

        Verdict::Rejected
    }

    pub fn is_endpoint(&self, path: &str) -> bool {
        self.classify(path).is_endpoint()
    }
}

/// Classify with the default rule tables.
pub fn is_endpoint(path: &str) -> bool {
    DEFAULT_CLASSIFIER.is_endpoint(path)
}

/// Canonicalize a path shape.
///
/// Numeric segments become `{id}`, colon-style params (`:slug`) become
/// brace-style (`{slug}`), and trailing slashes are stripped (the bare root
/// stays `/`). Rules apply per segment, so the function is idempotent.
pub fn normalize_path(path: &str) -> String {
    let normalized = path
        .split('/')
        .map(normalize_segment)
        .collect::<Vec<_>>()
        .join("/");

    let trimmed = normalized.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        trimmed.to_string()
    }
}

fn normalize_segment(segment: &str) -> String {
    if !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit()) {
        return "{id}".to_string();
    }
    if let Some(name) = segment.strip_prefix(':')
        && !name.is_empty()
        && name.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
    {
        return format!("{{{name}}}");
    }
    segment.to_string()
}
