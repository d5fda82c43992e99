//! Normalization and deduplication.
//!
//! Turns the heterogeneous raw records from every source into canonical
//! incidents and keeps one incident per content hash, preferring the most
//! recently published copy.

use std::collections::HashSet;

use frontierwatch_common::{CanonicalIncident, RawRecord};
use tracing::info;

/// Canonicalize and deduplicate.
///
/// 1. Each record is typed once: content, content hash, parsed timestamp.
/// 2. Stable sort by `published` descending; unknown timestamps sort last and
///    ties keep input order.
/// 3. First occurrence of each content hash wins, which in this order is the
///    most recent one.
///
/// Total over any input, including an empty one.
pub fn normalize(records: Vec<RawRecord>) -> Vec<CanonicalIncident> {
    let input = records.len();

    let mut incidents: Vec<CanonicalIncident> =
        records.into_iter().map(CanonicalIncident::from_raw).collect();

    // `sort_by` is stable; `Published::Unknown` is the minimum.
    incidents.sort_by(|a, b| b.published.cmp(&a.published));

    let mut seen: HashSet<String> = HashSet::with_capacity(incidents.len());
    incidents.retain(|incident| seen.insert(incident.content_hash.clone()));

    info!(input, unique = incidents.len(), "Deduplicated incidents");
    incidents
}
