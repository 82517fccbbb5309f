use serde::Serialize;
use std::time::SystemTime;

use crate::wrapped::{TimeRange, WrapSnapshot};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: usize,
    pub handle: String,
    pub first_name: String,
    pub created: SystemTime,
}

/// A persisted wrap with its full snapshot.
#[derive(Clone, Debug, PartialEq)]
pub struct SavedWrap {
    pub id: usize,
    pub user_id: usize,
    pub time_range: TimeRange,
    pub snapshot: WrapSnapshot,
    pub created: SystemTime,
}

/// Listing entry of a persisted wrap, without the snapshot payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WrapSummary {
    pub id: usize,
    pub time_range: TimeRange,
    pub created: SystemTime,
}
