//! Identifier classification
//!
//! Splits a batch into transitive package references, single package
//! references and direct links. Pure: no network or disk access.

use crate::identifier::DependencyIdentifier;
use depman_core::{DepmanError, Result};
use url::Url;

pub const DEFAULT_SCOPE: &str = "compile";

/// A `pkg://` identifier after classification. The coordinate may still be
/// missing its version at this point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageReference {
    pub identifier: DependencyIdentifier,
    pub coordinate: String,
    pub scope: String,
    pub transitive: bool,
}

impl PackageReference {
    /// Reads coordinate, `scope` and `transitive` from a package identifier.
    ///
    /// An absent `transitive` parameter means `true`.
    pub fn from_identifier(identifier: &DependencyIdentifier) -> Result<Self> {
        let coordinate = identifier
            .coordinate()
            .ok_or_else(|| DepmanError::IdentifierInvalid {
                identifier: identifier.to_string(),
                reason: "not a package identifier".to_string(),
            })?;

        let scope = identifier
            .query_param("scope")
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_SCOPE);

        let transitive = match identifier.query_param("transitive") {
            None => true,
            Some(v) if v.eq_ignore_ascii_case("true") => true,
            Some(v) if v.eq_ignore_ascii_case("false") => false,
            Some(v) => {
                return Err(DepmanError::IdentifierInvalid {
                    identifier: identifier.to_string(),
                    reason: format!("'transitive' must be true or false, got '{v}'"),
                });
            }
        };

        Ok(Self {
            identifier: identifier.clone(),
            coordinate: coordinate.to_string(),
            scope: scope.to_string(),
            transitive,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectLink {
    pub identifier: DependencyIdentifier,
    pub url: Url,
}

/// The three disjoint buckets of a classified batch, each in canonical order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DependencyList {
    pub transitive: Vec<PackageReference>,
    pub single: Vec<PackageReference>,
    pub direct_links: Vec<DirectLink>,
}

impl DependencyList {
    pub fn is_empty(&self) -> bool {
        self.transitive.is_empty() && self.single.is_empty() && self.direct_links.is_empty()
    }

    pub fn len(&self) -> usize {
        self.transitive.len() + self.single.len() + self.direct_links.len()
    }
}

/// Sorts the batch into canonical order, drops exact duplicates and
/// partitions it.
pub fn classify(identifiers: impl IntoIterator<Item = DependencyIdentifier>) -> Result<DependencyList> {
    let mut identifiers: Vec<_> = identifiers.into_iter().collect();
    identifiers.sort();
    identifiers.dedup();

    let mut list = DependencyList::default();
    for identifier in identifiers {
        if let Some(url) = identifier.link() {
            list.direct_links.push(DirectLink {
                url: url.clone(),
                identifier,
            });
            continue;
        }

        let reference = PackageReference::from_identifier(&identifier)?;
        if reference.transitive {
            list.transitive.push(reference);
        } else {
            list.single.push(reference);
        }
    }

    Ok(list)
}
