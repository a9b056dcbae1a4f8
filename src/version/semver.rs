use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use semver::Version;
use tracing::warn;

use crate::error::VersionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareResult {
    LessThan,
    Equal,
    GreaterThan,
    Invalid,
}

/// An application version ordered by semver precedence.
///
/// Build metadata is carried for display but never takes part in
/// comparison or equality, so `1.2.0+42` equals `1.2.0`.
#[derive(Debug, Clone)]
pub struct AppVersion(Version);

impl AppVersion {
    /// Parse a version string, normalizing partial versions.
    ///
    /// Surrounding whitespace and a single leading `v` are ignored, missing
    /// minor/patch components are padded with zeros and leading zeros in
    /// numeric components are dropped:
    /// - "1" -> 1.0.0
    /// - "v1.2" -> 1.2.0
    /// - "1.2-beta.1" -> 1.2.0-beta.1
    /// - "2024.01.15" -> 2024.1.15
    pub fn parse(text: &str) -> Result<Self, VersionError> {
        let invalid = || VersionError::InvalidFormat(text.to_string());

        let trimmed = text.trim();
        let unprefixed = trimmed
            .strip_prefix('v')
            .or_else(|| trimmed.strip_prefix('V'))
            .unwrap_or(trimmed);

        let split_at = unprefixed.find(['-', '+']).unwrap_or(unprefixed.len());
        let (core, suffix) = unprefixed.split_at(split_at);

        let mut numbers = [0u64; 3];
        let mut count = 0;
        for part in core.split('.') {
            let digits = !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());
            if count == numbers.len() || !digits {
                return Err(invalid());
            }
            numbers[count] = part.parse().map_err(|_| invalid())?;
            count += 1;
        }

        let [major, minor, patch] = numbers;
        Version::parse(&format!("{major}.{minor}.{patch}{suffix}"))
            .map(Self)
            .map_err(|_| invalid())
    }

    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self(Version::new(major, minor, patch))
    }

    pub fn is_prerelease(&self) -> bool {
        !self.0.pre.is_empty()
    }

    pub fn as_semver(&self) -> &Version {
        &self.0
    }
}

impl FromStr for AppVersion {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for AppVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl Ord for AppVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .major
            .cmp(&other.0.major)
            .then(self.0.minor.cmp(&other.0.minor))
            .then(self.0.patch.cmp(&other.0.patch))
            .then_with(|| self.0.pre.cmp(&other.0.pre))
    }
}

impl PartialOrd for AppVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for AppVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for AppVersion {}

impl Hash for AppVersion {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.major.hash(state);
        self.0.minor.hash(state);
        self.0.patch.hash(state);
        self.0.pre.as_str().hash(state);
    }
}

/// Parse a version at a component boundary, turning failure into `None`.
///
/// `what` names the value in the warning, e.g. "installed version".
pub fn parse_lenient(text: &str, what: &str) -> Option<AppVersion> {
    AppVersion::parse(text)
        .inspect_err(|e| warn!("Ignoring unparsable {}: {}", what, e))
        .ok()
}

/// Compare two version strings.
///
/// Returns [`CompareResult::Invalid`] when either side fails to parse;
/// callers must treat that as unknown rather than as an available update.
pub fn compare_versions(a: &str, b: &str) -> CompareResult {
    let (Ok(a), Ok(b)) = (AppVersion::parse(a), AppVersion::parse(b)) else {
        return CompareResult::Invalid;
    };

    match a.cmp(&b) {
        Ordering::Less => CompareResult::LessThan,
        Ordering::Equal => CompareResult::Equal,
        Ordering::Greater => CompareResult::GreaterThan,
    }
}
