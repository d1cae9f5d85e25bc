//! `MAJOR.MINOR.PATCH` versions as stored in the history file
//!
//! Only the patch segment is ever advanced by the generator. There is no
//! rollover: `1.2.9` bumps to `1.2.10`.

use std::fmt;
use std::str::FromStr;

use crate::errors::ManifestError;

/// Version assigned to an id the first time it is seen
pub const INITIAL_VERSION: &str = "1.0.0";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl Version {
    pub const INITIAL: Version = Version {
        major: 1,
        minor: 0,
        patch: 0,
    };

    /// Next patch release
    pub fn bump_patch(self) -> Version {
        Version {
            patch: self.patch.saturating_add(1),
            ..self
        }
    }
}

impl FromStr for Version {
    type Err = ManifestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ManifestError::InvalidVersion(s.to_string());
        let mut parts = s.trim().split('.');
        let mut next = || -> Result<u64, ManifestError> {
            parts
                .next()
                .and_then(|p| p.parse::<u64>().ok())
                .ok_or_else(invalid)
        };
        let version = Version {
            major: next()?,
            minor: next()?,
            patch: next()?,
        };
        if parts.next().is_some() {
            return Err(invalid());
        }
        Ok(version)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        assert!(matches!(
            "2.3.14".parse::<Version>(),
            Ok(Version {
                major: 2,
                minor: 3,
                patch: 14
            })
        ));
        assert_eq!(Version::INITIAL.to_string(), INITIAL_VERSION);
    }

    #[test]
    fn test_bump_patch_has_no_rollover() {
        let Ok(version) = "1.4.9".parse::<Version>() else {
            panic!("valid version");
        };
        assert_eq!(version.bump_patch().to_string(), "1.4.10");
        assert_eq!(Version::INITIAL.bump_patch().to_string(), "1.0.1");
    }

    #[test]
    fn test_invalid_versions() {
        for bad in ["", "1.0", "1.0.0.0", "v1.0.0", "1.x.0", "1..0"] {
            assert!(
                matches!(bad.parse::<Version>(), Err(ManifestError::InvalidVersion(_))),
                "expected '{}' to be rejected",
                bad
            );
        }
    }
}
