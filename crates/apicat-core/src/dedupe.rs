use std::collections::HashSet;

use indexmap::IndexMap;

use crate::classify::entity_label;
use crate::naming::spaced_words;
use crate::project::CatalogEntry;

/// Disambiguate duplicate names within one verb bucket.
///
/// An explicit two-pass state machine: count collisions, rewrite every
/// member of a colliding name with its URL-derived entity prefix, recount,
/// then append the second path-parameter name where one exists. Residual
/// duplicates after both passes are left as-is. Order-preserving: entries
/// are rewritten in place, never reordered.
pub fn resolve_duplicate_names(entries: &mut [CatalogEntry]) {
    let duplicated = duplicated_names(entries);
    if duplicated.is_empty() {
        return;
    }

    // Pass 1: prefix all members of a colliding name, not just the extras.
    for entry in entries.iter_mut() {
        if duplicated.contains(&entry.name) {
            let prefix = spaced_words(&entity_label(url_first_segment(&entry.url)));
            entry.name = format!("{prefix} - {}", entry.name);
        }
    }

    // Pass 2: same entity, different parameter shape.
    let remaining = duplicated_names(entries);
    if remaining.is_empty() {
        return;
    }

    for entry in entries.iter_mut() {
        if remaining.contains(&entry.name) {
            let second_key = entry
                .path_params
                .as_ref()
                .and_then(|params| params.get(1))
                .map(|param| param.key.as_str())
                .filter(|key| !key.is_empty());
            if let Some(key) = second_key {
                entry.name = format!("{}, {key}", entry.name);
            }
        }
    }
}

fn duplicated_names(entries: &[CatalogEntry]) -> HashSet<String> {
    let mut counts: IndexMap<&str, usize> = IndexMap::new();
    for entry in entries {
        *counts.entry(entry.name.as_str()).or_default() += 1;
    }
    counts
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|(name, _)| name.to_string())
        .collect()
}

/// First path segment of an entry URL: after the service-root marker when
/// present, otherwise after the host.
fn url_first_segment(url: &str) -> &str {
    let path = if let Some((_, rest)) = url.split_once(".svc/") {
        rest
    } else if let Some(scheme_end) = url.find("://") {
        let after_host = &url[scheme_end + 3..];
        match after_host.find('/') {
            Some(slash) => &after_host[slash + 1..],
            None => "",
        }
    } else {
        url.trim_start_matches('/')
    };

    path.split(['(', '/']).next().unwrap_or("")
}
