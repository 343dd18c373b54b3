//! Which documents get heading-anchored sync.
//!
//! Patterns come in two flavours. Anything containing `://` is a userscript
//! style match pattern, `scheme://host/path`, where `*` as the scheme means
//! any scheme, `*.example.com` covers the bare domain and every subdomain,
//! and `*` in the path matches any run of characters. Everything else is a
//! path glob: `*` and `?` wildcards, tested against the file name when the
//! pattern has no `/` and against the whole path otherwise.

use anyhow::{Result, bail};
use regex::Regex;

/// Default activation patterns.
pub const DEFAULT_PATTERNS: &[&str] = &[
    "*.md",
    "*.markdown",
    "*.mdx",
    "*://*.qiita.com/drafts/new",
    "*://*.qiita.com/drafts/*/edit*",
];

#[derive(Debug, Clone)]
struct Pattern {
    regex: Regex,
    url: bool,
    basename: bool,
}

/// A compiled set of activation patterns.
#[derive(Debug, Clone)]
pub struct RoutePatterns {
    patterns: Vec<Pattern>,
}

impl Default for RoutePatterns {
    fn default() -> Self {
        // The built-in patterns are known to compile.
        Self {
            patterns: DEFAULT_PATTERNS
                .iter()
                .filter_map(|p| compile(p).ok())
                .collect(),
        }
    }
}

impl RoutePatterns {
    /// Compile `patterns`.
    ///
    /// # Errors
    ///
    /// Returns an error for a match pattern without a host.
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self> {
        let patterns = patterns
            .iter()
            .map(|p| compile(p.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    /// Whether `locator` (a URL or a file path) activates sync.
    pub fn matches(&self, locator: &str) -> bool {
        let is_url = locator.contains("://");
        let basename = locator.rsplit(['/', '\\']).next().unwrap_or(locator);
        self.patterns.iter().any(|pattern| {
            if pattern.url != is_url {
                return false;
            }
            let subject = if pattern.basename { basename } else { locator };
            pattern.regex.is_match(subject)
        })
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

fn compile(pattern: &str) -> Result<Pattern> {
    if let Some((scheme, rest)) = pattern.split_once("://") {
        let (host, path) = rest.find('/').map_or((rest, "/"), |i| rest.split_at(i));
        if host.is_empty() {
            bail!("match pattern {pattern:?} has no host");
        }
        let scheme = if scheme == "*" {
            "[a-z][a-z0-9+.-]*".to_string()
        } else {
            regex::escape(scheme)
        };
        let host = if host == "*" {
            "[^/]*".to_string()
        } else if let Some(domain) = host.strip_prefix("*.") {
            format!(r"(?:[^/]*\.)?{}", regex::escape(domain))
        } else {
            regex::escape(host)
        };
        let regex = Regex::new(&format!("^{scheme}://{host}{}$", glob(path, false)))?;
        return Ok(Pattern {
            regex,
            url: true,
            basename: false,
        });
    }

    let regex = Regex::new(&format!("^{}$", glob(pattern, true)))?;
    Ok(Pattern {
        regex,
        url: false,
        basename: !pattern.contains('/'),
    })
}

/// Regex source for a glob. `?` is a wildcard only in path globs; in URLs
/// it starts the query string.
fn glob(pattern: &str, question_wildcard: bool) -> String {
    let mut out = String::with_capacity(pattern.len() * 2);
    for ch in pattern.chars() {
        match ch {
            '*' => out.push_str(".*"),
            '?' if question_wildcard => out.push('.'),
            _ => out.push_str(&regex::escape(ch.encode_utf8(&mut [0; 4]))),
        }
    }
    out
}
