//! Ordering of server-reported id lists against the user's declared order

use std::collections::HashSet;

/// Reconcile the ids the server reports against the ids the user declared.
///
/// Declared ids that the server still reports keep their declared position.
/// Declared ids the server no longer reports leave a `0` in their slot; the
/// slot is not compacted, so the next plan shows the stale entry as a diff.
/// Server ids that were not declared are appended in server order.
///
/// The result has length `declared.len() + |observed \ declared|` and holds
/// every observed id exactly once.
pub fn reconcile_ids(observed: &[i64], declared: &[i64]) -> Vec<i64> {
    let mut remaining: HashSet<i64> = observed.iter().copied().collect();
    let mut result = Vec::with_capacity(declared.len() + observed.len());

    for id in declared {
        if remaining.remove(id) {
            result.push(*id);
        } else {
            result.push(0);
        }
    }

    for id in observed {
        if remaining.remove(id) {
            result.push(*id);
        }
    }

    result
}

/// Ids to send to the API: placeholders are never sent.
pub fn declared_ids(declared: &[i64]) -> Vec<i64> {
    declared.iter().copied().filter(|id| *id != 0).collect()
}
