//! Version arithmetic and tag naming.

use regex::Regex;
use semver::{BuildMetadata, Prerelease, Version};
use thiserror::Error;

use crate::analyzer::ReleaseType;

/// Placeholder replaced by the version in tag templates.
pub const VERSION_PLACEHOLDER: &str = "${version}";

/// Version used when the repository has no release yet.
pub const INITIAL_VERSION: Version = Version::new(1, 0, 0);

/// Regex fragment capturing a semantic version.
const SEMVER_FRAGMENT: &str =
    r"(?P<version>\d+\.\d+\.\d+(?:-[0-9A-Za-z.-]+)?(?:\+[0-9A-Za-z.-]+)?)";

/// Errors raised for invalid tag templates.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TagFormatError {
    /// The template does not contain `${version}`.
    #[error("tag format {0:?} must contain ${{version}} exactly once")]
    MissingPlaceholder(String),

    /// The rendered tag pattern could not be compiled.
    #[error("tag format {format:?} is invalid: {reason}")]
    InvalidPattern {
        /// The offending template.
        format: String,
        /// Regex compilation error.
        reason: String,
    },
}

/// A version component that cannot be incremented any further.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("cannot apply a {release} bump to version {version}: component overflows")]
pub struct VersionOverflow {
    /// The version being bumped.
    pub version: Version,
    /// The requested bump.
    pub release: ReleaseType,
}

/// Computes the version that follows `last` for the given release type.
pub fn next_version(
    last: Option<&Version>,
    release: ReleaseType,
) -> Result<Version, VersionOverflow> {
    let Some(last) = last else {
        return Ok(INITIAL_VERSION);
    };

    let overflow = || VersionOverflow {
        version: last.clone(),
        release,
    };
    let mut next = last.clone();
    next.pre = Prerelease::EMPTY;
    next.build = BuildMetadata::EMPTY;
    match release {
        ReleaseType::Major => {
            next.major = next.major.checked_add(1).ok_or_else(overflow)?;
            next.minor = 0;
            next.patch = 0;
        }
        ReleaseType::Minor => {
            next.minor = next.minor.checked_add(1).ok_or_else(overflow)?;
            next.patch = 0;
        }
        ReleaseType::Patch => {
            next.patch = next.patch.checked_add(1).ok_or_else(overflow)?;
        }
    }
    Ok(next)
}

/// Tag naming template such as `v${version}`.
#[derive(Debug, Clone)]
pub struct TagFormat {
    template: String,
    pattern: Regex,
}

impl TagFormat {
    /// Builds a tag format from a template with one `${version}` placeholder.
    pub fn new(template: &str) -> Result<Self, TagFormatError> {
        if template.matches(VERSION_PLACEHOLDER).count() != 1 {
            return Err(TagFormatError::MissingPlaceholder(template.to_string()));
        }

        let (prefix, suffix) = template
            .split_once(VERSION_PLACEHOLDER)
            .ok_or_else(|| TagFormatError::MissingPlaceholder(template.to_string()))?;
        let source = format!(
            "^{}{}{}$",
            regex::escape(prefix),
            SEMVER_FRAGMENT,
            regex::escape(suffix)
        );
        let pattern = Regex::new(&source).map_err(|e| TagFormatError::InvalidPattern {
            format: template.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            template: template.to_string(),
            pattern,
        })
    }

    /// Renders the tag name for a version.
    pub fn render(&self, version: &Version) -> String {
        self.template
            .replace(VERSION_PLACEHOLDER, &version.to_string())
    }

    /// Extracts the version from a tag name, if it follows this format.
    pub fn parse(&self, tag: &str) -> Option<Version> {
        let caps = self.pattern.captures(tag)?;
        Version::parse(&caps["version"]).ok()
    }
}

impl Default for TagFormat {
    fn default() -> Self {
        #[allow(clippy::expect_used)] // Constant template is always valid
        Self::new("v${version}").expect("default tag format is valid")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    #[test]
    fn first_release_is_one_zero_zero() {
        assert_eq!(next_version(None, ReleaseType::Patch).unwrap(), v("1.0.0"));
        assert_eq!(next_version(None, ReleaseType::Major).unwrap(), v("1.0.0"));
    }

    #[test]
    fn bumps() {
        let last = v("1.4.2");
        assert_eq!(next_version(Some(&last), ReleaseType::Patch).unwrap(), v("1.4.3"));
        assert_eq!(next_version(Some(&last), ReleaseType::Minor).unwrap(), v("1.5.0"));
        assert_eq!(next_version(Some(&last), ReleaseType::Major).unwrap(), v("2.0.0"));
    }

    #[test]
    fn overflowing_component_is_an_error() {
        let last = Version::new(u64::MAX, 0, 0);
        let err = next_version(Some(&last), ReleaseType::Major).unwrap_err();
        assert_eq!(err.version, last);
        assert_eq!(err.release, ReleaseType::Major);
        assert!(next_version(Some(&last), ReleaseType::Minor).is_ok());

        let last = Version::new(1, u64::MAX, u64::MAX);
        assert!(next_version(Some(&last), ReleaseType::Minor).is_err());
        assert!(next_version(Some(&last), ReleaseType::Patch).is_err());
        assert_eq!(
            next_version(Some(&last), ReleaseType::Major).unwrap(),
            v("2.0.0")
        );
    }

    #[test]
    fn huge_tag_parses_but_cannot_be_bumped() {
        let format = TagFormat::default();
        let last = format.parse("v18446744073709551615.0.0").unwrap();
        assert!(next_version(Some(&last), ReleaseType::Major).is_err());
    }

    #[test]
    fn bump_clears_prerelease_and_build() {
        let last = v("1.4.2-beta.1+build.5");
        assert_eq!(next_version(Some(&last), ReleaseType::Patch).unwrap(), v("1.4.3"));
    }

    #[test]
    fn default_format_round_trips() {
        let format = TagFormat::default();
        assert_eq!(format.render(&v("2.3.4")), "v2.3.4");
        assert_eq!(format.parse("v2.3.4"), Some(v("2.3.4")));
    }

    #[test]
    fn custom_format_with_suffix() {
        let format = TagFormat::new("release-${version}-final").unwrap();
        assert_eq!(format.render(&v("0.1.0")), "release-0.1.0-final");
        assert_eq!(format.parse("release-0.1.0-final"), Some(v("0.1.0")));
        assert_eq!(format.parse("v0.1.0"), None);
    }

    #[test]
    fn non_matching_tags_are_ignored() {
        let format = TagFormat::default();
        assert_eq!(format.parse("latest"), None);
        assert_eq!(format.parse("v1.2"), None);
        assert_eq!(format.parse("xv1.2.3"), None);
    }

    #[test]
    fn template_without_placeholder_is_rejected() {
        assert!(matches!(
            TagFormat::new("v1"),
            Err(TagFormatError::MissingPlaceholder(_))
        ));
        assert!(matches!(
            TagFormat::new("${version}-${version}"),
            Err(TagFormatError::MissingPlaceholder(_))
        ));
    }

    mod prop {
        use super::*;
        use proptest::prelude::*;

        fn arb_release() -> impl Strategy<Value = ReleaseType> {
            prop_oneof![
                Just(ReleaseType::Patch),
                Just(ReleaseType::Minor),
                Just(ReleaseType::Major),
            ]
        }

        proptest! {
            #[test]
            fn next_version_is_always_greater(
                major in 0u64..1000,
                minor in 0u64..1000,
                patch in 0u64..1000,
                release in arb_release(),
            ) {
                let last = Version::new(major, minor, patch);
                let next = next_version(Some(&last), release).unwrap();
                prop_assert!(next > last);
            }

            #[test]
            fn rendered_tags_parse_back(
                major in 0u64..1000,
                minor in 0u64..1000,
                patch in 0u64..1000,
            ) {
                let version = Version::new(major, minor, patch);
                let format = TagFormat::default();
                prop_assert_eq!(format.parse(&format.render(&version)), Some(version));
            }
        }
    }
}
