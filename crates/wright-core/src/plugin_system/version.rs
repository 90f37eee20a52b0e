use std::fmt;
use std::str::FromStr;

use semver::{Version, VersionReq};

/// Error type for version parsing
#[derive(Debug, thiserror::Error)]
pub enum VersionError {
    #[error("Invalid version '{version}': {reason}")]
    InvalidVersion { version: String, reason: String },

    #[error("Invalid version constraint '{constraint}': {reason}")]
    InvalidConstraint { constraint: String, reason: String },
}

/// Parse a plain `major.minor.patch` version.
pub fn parse_version(version: &str) -> Result<Version, VersionError> {
    Version::parse(version).map_err(|e| VersionError::InvalidVersion {
        version: version.to_string(),
        reason: e.to_string(),
    })
}

/// A version requirement range using semver constraints.
#[derive(Debug, Clone)]
pub struct VersionRange {
    /// The original constraint string (e.g., "^0.1", ">=0.1.0")
    constraint: String,
    req: VersionReq,
}

impl VersionRange {
    pub fn from_constraint(constraint: &str) -> Result<Self, VersionError> {
        let req = VersionReq::parse(constraint).map_err(|e| VersionError::InvalidConstraint {
            constraint: constraint.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            constraint: constraint.to_string(),
            req,
        })
    }

    pub fn includes(&self, version: &Version) -> bool {
        self.req.matches(version)
    }

    pub fn semver_req(&self) -> &VersionReq {
        &self.req
    }

    pub fn constraint_string(&self) -> &str {
        &self.constraint
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.constraint)
    }
}

impl FromStr for VersionRange {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VersionRange::from_constraint(s)
    }
}
