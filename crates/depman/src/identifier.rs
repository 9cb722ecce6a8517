//! Dependency identifiers
//!
//! An identifier is either a package reference
//! (`pkg://<group>:<name>[:<version>]?scope=<s>&transitive=<bool>`) or any
//! other absolute URI, treated as a direct download link.
//!
//! Package authorities such as `org.example:tool:1.2.3` are not valid
//! `host:port` pairs, so package identifiers are split by hand instead of
//! going through [`Url::parse`].

use depman_core::{DepmanError, Result};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use url::Url;

/// Scheme of package coordinate identifiers.
pub const PACKAGE_SCHEME: &str = "pkg";

#[derive(Debug, Clone)]
pub struct DependencyIdentifier {
    raw: String,
    target: Target,
}

#[derive(Debug, Clone)]
enum Target {
    Package {
        authority: String,
        query: BTreeMap<String, String>,
    },
    Link(Url),
}

impl DependencyIdentifier {
    pub fn parse(input: &str) -> Result<Self> {
        let raw = input.trim();
        let invalid = |reason: &str| DepmanError::IdentifierInvalid {
            identifier: raw.to_string(),
            reason: reason.to_string(),
        };

        let (scheme, rest) = raw
            .split_once(':')
            .ok_or_else(|| invalid("missing URI scheme"))?;
        if !is_valid_scheme(scheme) {
            return Err(invalid("invalid URI scheme"));
        }

        let target = if scheme.eq_ignore_ascii_case(PACKAGE_SCHEME) {
            let rest = rest
                .strip_prefix("//")
                .ok_or_else(|| invalid("expected pkg://<group>:<name>[:<version>]"))?;
            let (rest, _fragment) = rest.split_once('#').unwrap_or((rest, ""));
            let (before_query, query) = match rest.split_once('?') {
                Some((head, query)) => (head, Some(query)),
                None => (rest, None),
            };
            let authority = before_query
                .split('/')
                .next()
                .unwrap_or_default()
                .to_string();
            if authority.is_empty() {
                return Err(invalid("missing package coordinate"));
            }

            Target::Package {
                authority,
                query: split_query(raw, query)?,
            }
        } else {
            let url = Url::parse(raw).map_err(|e| invalid(&e.to_string()))?;
            Target::Link(url)
        };

        Ok(Self {
            raw: raw.to_string(),
            target,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn is_package(&self) -> bool {
        matches!(self.target, Target::Package { .. })
    }

    /// The coordinate string of a package identifier.
    pub fn coordinate(&self) -> Option<&str> {
        match &self.target {
            Target::Package { authority, .. } => Some(authority),
            Target::Link(_) => None,
        }
    }

    /// Decoded query parameter of a package identifier.
    pub fn query_param(&self, key: &str) -> Option<&str> {
        match &self.target {
            Target::Package { query, .. } => query.get(key).map(String::as_str),
            Target::Link(_) => None,
        }
    }

    /// The URL of a direct link identifier.
    pub fn link(&self) -> Option<&Url> {
        match &self.target {
            Target::Link(url) => Some(url),
            Target::Package { .. } => None,
        }
    }
}

/// RFC 3986: `ALPHA *( ALPHA / DIGIT / "+" / "-" / "." )`
fn is_valid_scheme(scheme: &str) -> bool {
    let mut chars = scheme.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

/// Splits `k=v&k2=v2` into decoded pairs. A non-empty pair without `=` is an
/// error; later duplicates replace earlier ones.
fn split_query(identifier: &str, query: Option<&str>) -> Result<BTreeMap<String, String>> {
    let mut params = BTreeMap::new();
    let Some(query) = query.filter(|q| !q.is_empty()) else {
        return Ok(params);
    };

    for pair in query.split('&').filter(|p| !p.is_empty()) {
        if !pair.contains('=') {
            return Err(DepmanError::IdentifierInvalid {
                identifier: identifier.to_string(),
                reason: format!("malformed query parameter '{pair}'"),
            });
        }
        for (key, value) in url::form_urlencoded::parse(pair.as_bytes()) {
            params.insert(key.into_owned(), value.into_owned());
        }
    }

    Ok(params)
}

impl FromStr for DependencyIdentifier {
    type Err = DepmanError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// A `pkg:` URL becomes a package identifier like its textual form would.
impl TryFrom<Url> for DependencyIdentifier {
    type Error = DepmanError;

    fn try_from(url: Url) -> Result<Self> {
        if url.scheme().eq_ignore_ascii_case(PACKAGE_SCHEME) {
            return Self::parse(url.as_str());
        }
        Ok(Self {
            raw: url.as_str().to_string(),
            target: Target::Link(url),
        })
    }
}

impl fmt::Display for DependencyIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

// Identity and ordering follow the textual form.
impl PartialEq for DependencyIdentifier {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl Eq for DependencyIdentifier {}

impl Hash for DependencyIdentifier {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
    }
}

impl PartialOrd for DependencyIdentifier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DependencyIdentifier {
    fn cmp(&self, other: &Self) -> Ordering {
        self.raw.cmp(&other.raw)
    }
}

/// Parses every input, failing on the first invalid identifier.
pub fn parse_all<I, S>(inputs: I) -> Result<Vec<DependencyIdentifier>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    inputs
        .into_iter()
        .map(|s| DependencyIdentifier::parse(s.as_ref()))
        .collect()
}
