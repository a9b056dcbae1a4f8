use serde::Deserialize;

use crate::version::semver::{AppVersion, parse_lenient};

/// One release as published by a feed, before normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReleaseEntry {
    pub version: String,
    /// Installed versions below a critical release are always blocked
    pub critical: bool,
    pub min_app_version: Option<String>,
    pub release_notes: Option<String>,
    /// Store listing or download URL
    pub url: Option<String>,
    /// Operating system this release targets; `None` means any
    pub os: Option<String>,
    pub minimum_system_version: Option<String>,
    pub maximum_system_version: Option<String>,
}

impl ReleaseEntry {
    pub fn new(version: &str) -> Self {
        Self {
            version: version.to_string(),
            ..Default::default()
        }
    }

    pub fn critical(mut self) -> Self {
        self.critical = true;
        self
    }

    pub fn with_min_app_version(mut self, version: &str) -> Self {
        self.min_app_version = Some(version.to_string());
        self
    }

    pub fn with_release_notes(mut self, notes: &str) -> Self {
        self.release_notes = Some(notes.to_string());
        self
    }

    pub fn with_url(mut self, url: &str) -> Self {
        self.url = Some(url.to_string());
        self
    }

    pub fn with_os(mut self, os: &str) -> Self {
        self.os = Some(os.to_string());
        self
    }

    pub fn with_system_versions(mut self, minimum: Option<&str>, maximum: Option<&str>) -> Self {
        self.minimum_system_version = minimum.map(str::to_string);
        self.maximum_system_version = maximum.map(str::to_string);
        self
    }
}

/// The single release a check cycle reasons about.
///
/// Built fresh for every check and never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedResult {
    pub latest_version: Option<AppVersion>,
    pub listing_url: Option<String>,
    pub release_notes: Option<String>,
    pub min_app_version: Option<AppVersion>,
    pub is_critical: bool,
}

/// Identity a feed provider is asked about
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedRequest {
    pub app_id: Option<String>,
    pub locale: Option<String>,
}

/// Platform the application runs on, supplied by the embedding application.
///
/// Unknown fields never exclude a release.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostInfo {
    pub os: Option<String>,
    pub os_version: Option<AppVersion>,
}

impl HostInfo {
    pub fn supports(&self, entry: &ReleaseEntry) -> bool {
        if let (Some(wanted), Some(host_os)) = (&entry.os, &self.os)
            && !wanted.eq_ignore_ascii_case(host_os)
        {
            return false;
        }

        let Some(host_version) = &self.os_version else {
            return true;
        };

        let minimum = entry
            .minimum_system_version
            .as_deref()
            .and_then(|v| parse_lenient(v, "minimum system version"));
        let maximum = entry
            .maximum_system_version
            .as_deref()
            .and_then(|v| parse_lenient(v, "maximum system version"));

        minimum.is_none_or(|min| *host_version >= min)
            && maximum.is_none_or(|max| *host_version <= max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn host(os: Option<&str>, version: Option<&str>) -> HostInfo {
        HostInfo {
            os: os.map(str::to_string),
            os_version: version.map(|v| AppVersion::parse(v).unwrap()),
        }
    }

    #[rstest]
    #[case(host(None, None), ReleaseEntry::new("1.0.0").with_os("android"), true)]
    #[case(host(Some("ios"), None), ReleaseEntry::new("1.0.0"), true)]
    #[case(host(Some("ios"), None), ReleaseEntry::new("1.0.0").with_os("iOS"), true)]
    #[case(host(Some("ios"), None), ReleaseEntry::new("1.0.0").with_os("android"), false)]
    #[case(
        host(Some("macos"), Some("12.0")),
        ReleaseEntry::new("1.0.0").with_system_versions(Some("13.0"), None),
        false
    )]
    #[case(
        host(Some("macos"), Some("14.1")),
        ReleaseEntry::new("1.0.0").with_system_versions(Some("13.0"), Some("14")),
        false
    )]
    #[case(
        host(Some("macos"), Some("13.5")),
        ReleaseEntry::new("1.0.0").with_system_versions(Some("13.0"), Some("14")),
        true
    )]
    #[case(
        host(None, Some("1.0")),
        ReleaseEntry::new("1.0.0").with_system_versions(Some("garbage"), None),
        true
    )]
    fn host_supports_returns_expected(
        #[case] host: HostInfo,
        #[case] entry: ReleaseEntry,
        #[case] expected: bool,
    ) {
        assert_eq!(host.supports(&entry), expected);
    }

    #[test]
    fn release_entry_deserializes_camel_case_fields() {
        let entry: ReleaseEntry = serde_json::from_str(
            r#"{
                "version": "2.1.0",
                "critical": true,
                "minAppVersion": "1.5.0",
                "releaseNotes": "Bug fixes",
                "url": "https://example.com/app",
                "minimumSystemVersion": "12.0"
            }"#,
        )
        .unwrap();

        assert_eq!(
            entry,
            ReleaseEntry::new("2.1.0")
                .critical()
                .with_min_app_version("1.5.0")
                .with_release_notes("Bug fixes")
                .with_url("https://example.com/app")
                .with_system_versions(Some("12.0"), None)
        );
    }
}
