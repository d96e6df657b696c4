//! Saved form of an unload task.
//!
//! Only the quantity and the specific-item flag survive a save. The target
//! item reference is owned by whoever persists the world and is handed back
//! to [`UnloadTask::restore`](super::UnloadTask::restore) separately.

use serde::{Deserialize, Serialize};

/// Persisted fields of an unload task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnloadTaskSave {
    /// Units the task intends to move.
    pub count_to_drop: u32,
    /// Whether the caller pinned the target item.
    pub specific_item: bool,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn json_round_trip_preserves_both_fields() {
        let save = UnloadTaskSave {
            count_to_drop: 3,
            specific_item: true,
        };
        let json = serde_json::to_string(&save).unwrap();
        assert_eq!(json, r#"{"count_to_drop":3,"specific_item":true}"#);
        let restored: UnloadTaskSave = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, save);
    }
}
