use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Request payload for recording a review
#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    pub quality: i32,
}

/// Query parameters of the due-items endpoint
#[derive(Debug, Default, Deserialize)]
pub struct DueQuery {
    pub as_of: Option<NaiveDateTime>,
    pub limit: Option<i64>,
}

/// Interval (days) each quality rating would schedule next
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntervalPreview {
    pub item_id: i32,
    pub intervals: [i32; 6],
}
