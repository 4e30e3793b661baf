// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Role sets and role policies.

use std::collections::BTreeSet;

use super::AuthError;

/// Parse a stored comma-joined role string into a role set.
///
/// Whitespace around names is trimmed and empty entries are dropped. A
/// missing source yields an empty set rather than an error.
pub fn parse_rolenames(raw: Option<&str>) -> BTreeSet<String> {
    raw.map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

/// A role policy attached to a route.
///
/// ## Semantics
///
/// - `All` - granted roles must be a superset of the named roles.
///   An empty set is always satisfied.
/// - `Any` - granted roles must intersect the named roles.
///   An empty set is never satisfied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleRequirement {
    All(BTreeSet<String>),
    Any(BTreeSet<String>),
}

impl RoleRequirement {
    pub fn all<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        RoleRequirement::All(names.into_iter().map(Into::into).collect())
    }

    pub fn any<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        RoleRequirement::Any(names.into_iter().map(Into::into).collect())
    }

    /// Check if `granted` satisfies this requirement.
    pub fn is_satisfied_by(&self, granted: &BTreeSet<String>) -> bool {
        match self {
            RoleRequirement::All(required) => granted.is_superset(required),
            RoleRequirement::Any(accepted) => !granted.is_disjoint(accepted),
        }
    }

    /// Like [`is_satisfied_by`](Self::is_satisfied_by), but produces the
    /// `MissingRole` error on failure.
    pub fn check(&self, granted: &BTreeSet<String>) -> Result<(), AuthError> {
        if self.is_satisfied_by(granted) {
            return Ok(());
        }
        let (policy, names) = match self {
            RoleRequirement::All(names) => ("all", names),
            RoleRequirement::Any(names) => ("one", names),
        };
        Err(AuthError::MissingRole {
            policy,
            roles: names.iter().cloned().collect::<Vec<_>>().join(", "),
        })
    }
}

impl std::fmt::Display for RoleRequirement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (kind, names) = match self {
            RoleRequirement::All(names) => ("all", names),
            RoleRequirement::Any(names) => ("any", names),
        };
        let joined = names.iter().map(String::as_str).collect::<Vec<_>>().join(",");
        write!(f, "{kind}({joined})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parse_rolenames_splits_and_trims() {
        assert_eq!(parse_rolenames(Some("admin, svc,,user ")), set(&["admin", "svc", "user"]));
    }

    #[test]
    fn parse_rolenames_missing_is_empty() {
        assert!(parse_rolenames(None).is_empty());
        assert!(parse_rolenames(Some("")).is_empty());
        assert!(parse_rolenames(Some(" , ,")).is_empty());
    }

    #[test]
    fn all_requires_superset() {
        let req = RoleRequirement::all(["a", "b"]);
        assert!(req.is_satisfied_by(&set(&["a", "b", "c"])));
        assert!(!req.is_satisfied_by(&set(&["a"])));
    }

    #[test]
    fn any_requires_intersection() {
        let req = RoleRequirement::any(["a", "b"]);
        assert!(req.is_satisfied_by(&set(&["b"])));
        assert!(!req.is_satisfied_by(&set(&["c"])));
    }

    #[test]
    fn empty_sets_are_asymmetric() {
        let none: [&str; 0] = [];
        assert!(RoleRequirement::all(none).is_satisfied_by(&set(&[])));
        assert!(RoleRequirement::all(none).is_satisfied_by(&set(&["x"])));
        assert!(!RoleRequirement::any(none).is_satisfied_by(&set(&["x"])));
        assert!(!RoleRequirement::any(none).is_satisfied_by(&set(&[])));
    }

    #[test]
    fn check_reports_missing_role() {
        let err = RoleRequirement::all(["admin", "missing"])
            .check(&set(&["admin"]))
            .unwrap_err();
        assert_eq!(
            err,
            AuthError::MissingRole {
                policy: "all",
                roles: "admin, missing".to_string()
            }
        );
    }

    #[test]
    fn display_is_compact() {
        assert_eq!(RoleRequirement::any(["b", "a"]).to_string(), "any(a,b)");
    }
}
