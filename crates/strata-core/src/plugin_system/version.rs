use std::fmt;
use std::str::FromStr;

use semver::{Comparator, Op, Version, VersionReq};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VersionError {
    #[error("Invalid version '{version}': {message}")]
    InvalidVersion { version: String, message: String },

    #[error("Invalid version constraint '{constraint}': {message}")]
    InvalidConstraint { constraint: String, message: String },
}

/// Parse a full semantic version such as `"1.2.3"`.
pub fn parse_version(version: &str) -> Result<Version, VersionError> {
    Version::parse(version.trim()).map_err(|e| VersionError::InvalidVersion {
        version: version.to_string(),
        message: e.to_string(),
    })
}

/// Represents a version requirement range using semver constraints.
#[derive(Debug, Clone)]
pub struct VersionRange {
    /// The original constraint string (e.g., "^1.2.3", ">=2.0")
    constraint: String,
    req: VersionReq,
}

impl VersionRange {
    pub fn from_constraint(constraint: &str) -> Result<Self, VersionError> {
        let req = VersionReq::parse(constraint).map_err(|e| VersionError::InvalidConstraint {
            constraint: constraint.to_string(),
            message: e.to_string(),
        })?;
        Ok(Self {
            constraint: constraint.to_string(),
            req,
        })
    }

    /// Versions a package built against `version` can run on.
    pub fn compatible_with(version: &Version) -> Self {
        let comparator = Comparator {
            op: Op::Caret,
            major: version.major,
            minor: Some(version.minor),
            patch: Some(version.patch),
            pre: version.pre.clone(),
        };
        Self {
            constraint: comparator.to_string(),
            req: VersionReq {
                comparators: vec![comparator],
            },
        }
    }

    pub fn includes(&self, version: &Version) -> bool {
        self.req.matches(version)
    }

    pub fn constraint_string(&self) -> &str {
        &self.constraint
    }
}

impl FromStr for VersionRange {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VersionRange::from_constraint(s)
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.constraint)
    }
}

/// Whether a package built against `plugin_api` can be loaded by a host at `host_api`.
pub fn is_api_compatible(plugin_api: &str, host_api: &str) -> Result<bool, VersionError> {
    let plugin = parse_version(plugin_api)?;
    let host = parse_version(host_api)?;
    Ok(VersionRange::compatible_with(&plugin).includes(&host))
}
