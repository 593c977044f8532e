use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::data::models::ItemError;
use crate::schema::srs_items;
use crate::spaced_repetition_system::ScheduleState;

pub const MAX_TAG_LEN: usize = 64;

/// Where an item came from; informational only
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemSource {
    #[default]
    Manual,
    Syllabus,
    Task,
    Note,
}

impl ItemSource {
    pub fn as_str(self) -> &'static str {
        match self {
            ItemSource::Manual => "manual",
            ItemSource::Syllabus => "syllabus",
            ItemSource::Task => "task",
            ItemSource::Note => "note",
        }
    }
}

impl fmt::Display for ItemSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "manual" => Ok(ItemSource::Manual),
            "syllabus" => Ok(ItemSource::Syllabus),
            "task" => Ok(ItemSource::Task),
            "note" => Ok(ItemSource::Note),
            other => Err(format!("unknown item source: {}", other)),
        }
    }
}

/// Row as stored in `srs_items`
#[derive(Queryable, Selectable, Debug, Clone, PartialEq)]
#[diesel(table_name = srs_items)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ItemRecord {
    pub item_id: i32,
    pub owner_id: i32,
    pub original_content: String,
    pub answer_content: Option<String>,
    pub study_plan_id: Option<String>,
    pub task_id: Option<String>,
    pub last_reviewed_at: Option<NaiveDateTime>,
    pub next_review_at: NaiveDateTime,
    pub current_interval: i32,
    pub ease_factor: f64,
    pub repetitions: i32,
    pub lapses: i32,
    pub source: String,
    pub tags: String,
    pub version: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl ItemRecord {
    pub fn schedule(&self) -> ScheduleState {
        ScheduleState {
            repetitions: self.repetitions,
            current_interval: self.current_interval,
            ease_factor: self.ease_factor,
            lapses: self.lapses,
        }
    }
}

#[derive(Insertable, Debug)]
#[diesel(table_name = srs_items)]
pub struct NewItemRecord<'a> {
    pub owner_id: i32,
    pub original_content: &'a str,
    pub answer_content: Option<&'a str>,
    pub study_plan_id: Option<&'a str>,
    pub task_id: Option<&'a str>,
    pub last_reviewed_at: Option<NaiveDateTime>,
    pub next_review_at: NaiveDateTime,
    pub current_interval: i32,
    pub ease_factor: f64,
    pub repetitions: i32,
    pub lapses: i32,
    pub source: &'a str,
    pub tags: &'a str,
    pub version: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Partial content edit; `None` fields are left untouched
#[derive(AsChangeset, Debug, Default)]
#[diesel(table_name = srs_items)]
pub struct ContentChangeset {
    pub original_content: Option<String>,
    pub answer_content: Option<Option<String>>,
    pub tags: Option<String>,
}

/// A learning item as returned to callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SrsItem {
    pub id: i32,
    pub owner_id: i32,
    pub original_content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer_content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub study_plan_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
    pub last_reviewed_at: Option<NaiveDateTime>,
    pub next_review_at: NaiveDateTime,
    pub current_interval: i32,
    pub ease_factor: f64,
    pub repetitions: i32,
    pub lapses: i32,
    pub source: ItemSource,
    pub tags: BTreeSet<String>,
    pub version: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<ItemRecord> for SrsItem {
    type Error = ItemError;

    fn try_from(record: ItemRecord) -> Result<Self, Self::Error> {
        let source = record
            .source
            .parse::<ItemSource>()
            .map_err(ItemError::Internal)?;
        let tags: BTreeSet<String> = serde_json::from_str(&record.tags).map_err(|e| {
            ItemError::Internal(format!("corrupt tags on item {}: {}", record.item_id, e))
        })?;

        Ok(SrsItem {
            id: record.item_id,
            owner_id: record.owner_id,
            original_content: record.original_content,
            answer_content: record.answer_content,
            study_plan_id: record.study_plan_id,
            task_id: record.task_id,
            last_reviewed_at: record.last_reviewed_at,
            next_review_at: record.next_review_at,
            current_interval: record.current_interval,
            ease_factor: record.ease_factor,
            repetitions: record.repetitions,
            lapses: record.lapses,
            source,
            tags,
            version: record.version,
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }
}

/// Request payload for creating an item
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateItemRequest {
    #[validate(length(min = 1, max = 10000, message = "originalContent must be 1-10000 characters"))]
    pub original_content: String,
    #[validate(length(max = 10000, message = "answerContent must be at most 10000 characters"))]
    pub answer_content: Option<String>,
    #[validate(length(min = 1, max = 128))]
    pub study_plan_id: Option<String>,
    #[validate(length(min = 1, max = 128))]
    pub task_id: Option<String>,
    #[serde(default)]
    pub source: Option<ItemSource>,
    #[validate(length(max = 50, message = "at most 50 tags"))]
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

/// Request payload for editing non-scheduling fields.
/// An empty `answerContent` clears the answer.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateContentRequest {
    #[validate(length(min = 1, max = 10000, message = "originalContent must be 1-10000 characters"))]
    pub original_content: Option<String>,
    #[validate(length(max = 10000, message = "answerContent must be at most 10000 characters"))]
    pub answer_content: Option<String>,
    #[validate(length(max = 50, message = "at most 50 tags"))]
    pub tags: Option<Vec<String>>,
}

/// Optional filters for listing an owner's items
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemFilter {
    pub study_plan_id: Option<String>,
    pub task_id: Option<String>,
    pub source: Option<ItemSource>,
    pub tag: Option<String>,
}
