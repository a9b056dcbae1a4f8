//! Reduces a feed's release entries to a single [`FeedResult`]

use tracing::debug;

use crate::feed::types::{FeedResult, HostInfo, ReleaseEntry};
use crate::version::semver::{AppVersion, parse_lenient};

type Candidate<'a> = (AppVersion, &'a ReleaseEntry);

/// Normalize raw release entries for the given installed version and host.
///
/// - Entries with an unparsable version or an unsupported host are dropped.
/// - The best item is the highest non-critical release, or the highest
///   release overall when every entry is critical.
/// - `is_critical` is set only when a critical release is strictly newer than
///   the installed version. An unknown installed version is never critical.
/// - All other fields come from the best item alone.
pub fn normalize(
    entries: &[ReleaseEntry],
    installed: Option<&AppVersion>,
    host: &HostInfo,
) -> FeedResult {
    let candidates: Vec<Candidate<'_>> = entries
        .iter()
        .filter_map(|entry| {
            let version = parse_lenient(&entry.version, "release version")?;
            if !host.supports(entry) {
                debug!("Skipping release {}: not supported by host", version);
                return None;
            }
            Some((version, entry))
        })
        .collect();

    let (critical, regular): (Vec<&Candidate<'_>>, Vec<&Candidate<'_>>) =
        candidates.iter().partition(|(_, entry)| entry.critical);

    let best = if regular.is_empty() {
        highest(candidates.iter())
    } else {
        highest(regular)
    };
    let critical_item = highest(critical);

    let is_critical = match (critical_item, installed) {
        (Some((critical_version, _)), Some(installed)) => installed < critical_version,
        _ => false,
    };

    let Some((latest, entry)) = best else {
        debug!("Feed contained no usable releases");
        return FeedResult::default();
    };

    debug!("Normalized feed: latest={}, critical={}", latest, is_critical);

    FeedResult {
        latest_version: Some(latest.clone()),
        listing_url: entry.url.clone(),
        release_notes: entry.release_notes.clone(),
        min_app_version: entry
            .min_app_version
            .as_deref()
            .and_then(|v| parse_lenient(v, "minimum app version")),
        is_critical,
    }
}

/// Highest version, keeping the first encountered on ties.
fn highest<'a, 'e: 'a>(
    items: impl IntoIterator<Item = &'a Candidate<'e>>,
) -> Option<&'a Candidate<'e>> {
    items
        .into_iter()
        .reduce(|best, item| if item.0 > best.0 { item } else { best })
}
