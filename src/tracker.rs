use crate::models::{Watch, WatchState};
use crate::resolver::Resolution;

#[derive(Debug, Clone, PartialEq)]
pub struct Reconciliation {
    pub changed: bool,
    pub state: WatchState,
    pub watch: Watch,
}

/// Whether a fresh resolution differs from what was last persisted.
///
/// A status change always counts. A count only counts when the new check
/// produced one and it differs from the stored value; losing a count without
/// a status change is not a change.
pub fn has_changed(watch: &Watch, resolution: &Resolution) -> bool {
    let status_changed = watch.previous_status() != Some(resolution.status);
    let count_changed = resolution
        .count
        .is_some_and(|count| watch.last_available != Some(count));

    status_changed || count_changed
}

/// Compare against the persisted state and produce the state to write back.
///
/// The returned state is written whether or not anything changed;
/// `last_notified` is left for the caller to update after a send.
pub fn reconcile(watch: &Watch, resolution: Resolution, checked_at: i64) -> Reconciliation {
    let changed = has_changed(watch, &resolution);
    let state = WatchState {
        status: resolution.status,
        available: resolution.count,
        checked_at,
    };

    let mut updated = watch.clone();
    updated.apply(&state);

    Reconciliation {
        changed,
        state,
        watch: updated,
    }
}
