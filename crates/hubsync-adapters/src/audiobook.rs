//! Listening-progress synchronization
//!
//! Pushes listening progress from a seller library export to the
//! audiobook server. Books match by ASIN and must already exist on the
//! shelf. Progress beyond the finish threshold coalesces to a finished
//! state; partial progress is only pushed onto a shelf item that has
//! none at all, so a pass never clobbers local listening.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use hubsync_core::{
    Completion, Domain, FieldChange, MatchKey, RemoteId, ScopeFields, UnmatchedPolicy,
    coalesce_percent,
};

/// Listening state for one book in the seller library
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListeningRecord {
    pub asin: String,
    #[serde(default)]
    pub title: String,
    /// Percent complete, 0.0 to 100.0
    #[serde(default)]
    pub percent_complete: f64,
    #[serde(default)]
    pub is_finished: bool,
}

impl ScopeFields for ListeningRecord {
    fn name(&self) -> &str {
        &self.title
    }
}

/// A library item on the audiobook server, with the user's progress
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShelfItem {
    pub id: String,
    #[serde(default)]
    pub asin: String,
    #[serde(default)]
    pub title: String,
    /// Progress ratio, 0.0 to 1.0
    #[serde(default)]
    pub progress: f64,
    /// Playback position in seconds
    #[serde(default)]
    pub current_time: f64,
    /// Total duration in seconds
    #[serde(default)]
    pub duration: f64,
    #[serde(default)]
    pub is_finished: bool,
}

impl ScopeFields for ShelfItem {
    fn name(&self) -> &str {
        &self.title
    }
}

/// Progress domain adapter
#[derive(Debug, Clone, Copy, Default)]
pub struct ProgressSync;

impl Domain for ProgressSync {
    type Desired = ListeningRecord;
    type Remote = ShelfItem;

    fn name(&self) -> &'static str {
        "audiobooks"
    }

    fn desired_key(&self, desired: &ListeningRecord) -> Option<MatchKey> {
        (!desired.asin.is_empty()).then(|| desired.asin.clone())
    }

    fn remote_key(&self, remote: &ShelfItem) -> Option<MatchKey> {
        (!remote.asin.is_empty()).then(|| remote.asin.clone())
    }

    fn remote_id(&self, remote: &ShelfItem) -> RemoteId {
        remote.id.clone()
    }

    fn label(&self, desired: &ListeningRecord) -> String {
        if desired.title.is_empty() {
            desired.asin.clone()
        } else {
            desired.title.clone()
        }
    }

    fn unmatched_policy(&self) -> UnmatchedPolicy {
        // Books cannot be created remotely; absence is reported.
        UnmatchedPolicy::Report
    }

    fn changed_fields(&self, desired: &ListeningRecord, remote: &ShelfItem) -> Vec<FieldChange> {
        let mut changes = Vec::new();

        match coalesce_percent(desired.percent_complete, desired.is_finished) {
            Completion::Finished => {
                if !remote.is_finished {
                    push_if_changed_bool(&mut changes, "is_finished", remote.is_finished, true);
                    push_if_changed(&mut changes, "progress", remote.progress, 1.0);
                    push_if_changed(
                        &mut changes,
                        "current_time",
                        remote.current_time,
                        remote.duration,
                    );
                }
            }
            Completion::Partial(ratio) => {
                let untouched = !remote.is_finished
                    && remote.progress == 0.0
                    && remote.current_time == 0.0;
                if ratio > 0.0 && untouched {
                    push_if_changed(&mut changes, "progress", remote.progress, ratio);
                    push_if_changed(
                        &mut changes,
                        "current_time",
                        remote.current_time,
                        remote.duration * ratio,
                    );
                }
            }
        }

        changes
    }

    fn all_fields(&self, desired: &ListeningRecord, remote: &ShelfItem) -> Vec<FieldChange> {
        // A forced pass drops the untouched-shelf guard and writes the
        // full desired state, finished or partial.
        let mut changes = Vec::new();
        match coalesce_percent(desired.percent_complete, desired.is_finished) {
            Completion::Finished => {
                push_if_changed_bool(&mut changes, "is_finished", remote.is_finished, true);
                push_if_changed(&mut changes, "progress", remote.progress, 1.0);
                push_if_changed(
                    &mut changes,
                    "current_time",
                    remote.current_time,
                    remote.duration,
                );
            }
            Completion::Partial(ratio) => {
                push_if_changed_bool(&mut changes, "is_finished", remote.is_finished, false);
                push_if_changed(&mut changes, "progress", remote.progress, ratio);
                push_if_changed(
                    &mut changes,
                    "current_time",
                    remote.current_time,
                    remote.duration * ratio,
                );
            }
        }
        changes
    }
}

fn push_if_changed(changes: &mut Vec<FieldChange>, field: &str, old: f64, new: f64) {
    if old != new {
        changes.push(FieldChange {
            field: field.to_string(),
            old: Some(Value::from(old)),
            new: Value::from(new),
        });
    }
}

fn push_if_changed_bool(changes: &mut Vec<FieldChange>, field: &str, old: bool, new: bool) {
    if old != new {
        changes.push(FieldChange::replace(field, old, new));
    }
}
