use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{NaiveDateTime, Utc};
use diesel::r2d2::{ConnectionManager, PooledConnection};
use diesel::{Connection, SqliteConnection};
use validator::Validate;

use crate::data::models::{
    ContentChangeset, CreateItemRequest, IntervalPreview, ItemError, ItemFilter, ItemRecord,
    NewItemRecord, SrsItem, UpdateContentRequest, MAX_TAG_LEN,
};
use crate::data::repositories::{ItemRepository, ScheduleUpdate};
use crate::db::DbPool;
use crate::spaced_repetition_system::{self, Quality, ScheduleState};

type Conn = PooledConnection<ConnectionManager<SqliteConnection>>;

/// Source of "now" for every timestamp the service writes
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Utc::now().naive_utc()
    }
}

/// CRUD and review operations over learning items, scoped by owner.
///
/// Reviews use optimistic concurrency: the row's `version` read before
/// scheduling must still match when the result is written, otherwise the
/// review fails with `ItemError::Conflict` and nothing is persisted.
#[derive(Clone)]
pub struct ItemService {
    pool: DbPool,
    clock: Arc<dyn Clock>,
}

impl ItemService {
    pub fn new(pool: DbPool) -> Self {
        Self::with_clock(pool, Arc::new(SystemClock))
    }

    pub fn with_clock(pool: DbPool, clock: Arc<dyn Clock>) -> Self {
        Self { pool, clock }
    }

    fn conn(&self) -> Result<Conn, ItemError> {
        self.pool.get().map_err(|e| {
            log::error!("Failed to get DB connection: {}", e);
            ItemError::PoolError(e)
        })
    }

    pub fn create(&self, owner_id: i32, request: CreateItemRequest) -> Result<SrsItem, ItemError> {
        validate_id("ownerId", owner_id)?;
        request.validate()?;
        let original_content = non_blank("originalContent", &request.original_content)?;
        let tags = normalize_tags(request.tags.unwrap_or_default())?;
        let tags_json = encode_tags(&tags)?;
        let answer_content = request
            .answer_content
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());
        let source = request.source.unwrap_or_default();

        let now = self.clock.now();
        let initial = ScheduleState::initial();
        let new_item = NewItemRecord {
            owner_id,
            original_content,
            answer_content,
            study_plan_id: request.study_plan_id.as_deref(),
            task_id: request.task_id.as_deref(),
            last_reviewed_at: None,
            next_review_at: spaced_repetition_system::due_date(now, initial.current_interval),
            current_interval: initial.current_interval,
            ease_factor: initial.ease_factor,
            repetitions: initial.repetitions,
            lapses: initial.lapses,
            source: source.as_str(),
            tags: &tags_json,
            version: 0,
            created_at: now,
            updated_at: now,
        };

        let mut conn = self.conn()?;
        let record = ItemRepository::insert(&mut conn, &new_item)?;
        log::info!("Created item {} for owner {}", record.item_id, owner_id);
        SrsItem::try_from(record)
    }

    /// Records a review and returns the rescheduled item
    pub fn review(&self, item_id: i32, owner_id: i32, quality: i32) -> Result<SrsItem, ItemError> {
        validate_id("itemId", item_id)?;
        validate_id("ownerId", owner_id)?;
        let quality = Quality::new(quality)?;

        let mut conn = self.conn()?;
        let record = ItemRepository::find_owned(&mut conn, item_id, owner_id)?
            .ok_or(ItemError::NotFound)?;

        let now = self.clock.now();
        let outcome = spaced_repetition_system::next_review(&record.schedule(), quality, now);
        let update = ScheduleUpdate {
            last_reviewed_at: outcome.last_reviewed_at,
            next_review_at: outcome.next_review_at,
            current_interval: outcome.state.current_interval,
            ease_factor: outcome.state.ease_factor,
            repetitions: outcome.state.repetitions,
            lapses: outcome.state.lapses,
        };

        let written =
            ItemRepository::apply_review(&mut conn, item_id, owner_id, record.version, &update, now)?;
        if written == 0 {
            // The row changed or vanished between read and write
            return match ItemRepository::find_owned(&mut conn, item_id, owner_id)? {
                Some(_) => {
                    log::warn!("Concurrent update detected while reviewing item {}", item_id);
                    Err(ItemError::Conflict)
                }
                None => Err(ItemError::NotFound),
            };
        }

        log::debug!(
            "Item {} reviewed with quality {}, next review at {}",
            item_id,
            quality.value(),
            update.next_review_at
        );

        let reviewed = ItemRecord {
            last_reviewed_at: Some(update.last_reviewed_at),
            next_review_at: update.next_review_at,
            current_interval: update.current_interval,
            ease_factor: update.ease_factor,
            repetitions: update.repetitions,
            lapses: update.lapses,
            version: record.version + 1,
            updated_at: now,
            ..record
        };
        SrsItem::try_from(reviewed)
    }

    /// Owned items due at `as_of` (default: now), most overdue first
    pub fn get_due(
        &self,
        owner_id: i32,
        as_of: Option<NaiveDateTime>,
        limit: Option<i64>,
    ) -> Result<Vec<SrsItem>, ItemError> {
        validate_id("ownerId", owner_id)?;
        if let Some(limit) = limit {
            if limit <= 0 {
                return Err(ItemError::InvalidArgument(
                    "limit must be a positive integer".to_string(),
                ));
            }
        }
        let as_of = as_of.unwrap_or_else(|| self.clock.now());

        let mut conn = self.conn()?;
        ItemRepository::due_for_owner(&mut conn, owner_id, as_of, limit)?
            .into_iter()
            .map(SrsItem::try_from)
            .collect()
    }

    pub fn get_by_id(&self, item_id: i32, owner_id: i32) -> Result<SrsItem, ItemError> {
        validate_id("itemId", item_id)?;
        validate_id("ownerId", owner_id)?;

        let mut conn = self.conn()?;
        ItemRepository::find_owned(&mut conn, item_id, owner_id)?
            .ok_or(ItemError::NotFound)
            .and_then(SrsItem::try_from)
    }

    pub fn list(&self, owner_id: i32, filter: &ItemFilter) -> Result<Vec<SrsItem>, ItemError> {
        validate_id("ownerId", owner_id)?;

        let mut conn = self.conn()?;
        let items = ItemRepository::list_for_owner(&mut conn, owner_id, filter)?
            .into_iter()
            .map(SrsItem::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(match filter.tag.as_deref().map(str::trim) {
            Some(tag) if !tag.is_empty() => {
                items.into_iter().filter(|item| item.tags.contains(tag)).collect()
            }
            _ => items,
        })
    }

    /// Edits content fields; scheduling fields are left as they are
    pub fn update_content(
        &self,
        item_id: i32,
        owner_id: i32,
        request: UpdateContentRequest,
    ) -> Result<SrsItem, ItemError> {
        validate_id("itemId", item_id)?;
        validate_id("ownerId", owner_id)?;
        request.validate()?;

        let mut changes = ContentChangeset::default();
        if let Some(content) = request.original_content.as_deref() {
            changes.original_content = Some(non_blank("originalContent", content)?.to_string());
        }
        if let Some(answer) = request.answer_content.as_deref() {
            let answer = answer.trim();
            changes.answer_content = Some((!answer.is_empty()).then(|| answer.to_string()));
        }
        if let Some(tags) = request.tags {
            changes.tags = Some(encode_tags(&normalize_tags(tags)?)?);
        }

        let mut conn = self.conn()?;
        let now = self.clock.now();
        let record = conn.transaction::<_, ItemError, _>(|conn| {
            if ItemRepository::update_content(conn, item_id, owner_id, &changes, now)? == 0 {
                return Err(ItemError::NotFound);
            }
            ItemRepository::find_owned(conn, item_id, owner_id)?.ok_or(ItemError::NotFound)
        })?;

        log::info!("Updated content of item {}", item_id);
        SrsItem::try_from(record)
    }

    pub fn delete(&self, item_id: i32, owner_id: i32) -> Result<(), ItemError> {
        validate_id("itemId", item_id)?;
        validate_id("ownerId", owner_id)?;

        let mut conn = self.conn()?;
        if ItemRepository::delete_owned(&mut conn, item_id, owner_id)? == 0 {
            return Err(ItemError::NotFound);
        }

        log::info!("Deleted item {} of owner {}", item_id, owner_id);
        Ok(())
    }

    /// Interval each quality would schedule, without recording anything
    pub fn preview(&self, item_id: i32, owner_id: i32) -> Result<IntervalPreview, ItemError> {
        validate_id("itemId", item_id)?;
        validate_id("ownerId", owner_id)?;

        let mut conn = self.conn()?;
        let record = ItemRepository::find_owned(&mut conn, item_id, owner_id)?
            .ok_or(ItemError::NotFound)?;

        Ok(IntervalPreview {
            item_id,
            intervals: spaced_repetition_system::preview_intervals(
                &record.schedule(),
                self.clock.now(),
            ),
        })
    }
}

fn validate_id(name: &str, id: i32) -> Result<(), ItemError> {
    if id <= 0 {
        return Err(ItemError::InvalidArgument(format!(
            "{} must be a positive integer",
            name
        )));
    }
    Ok(())
}

fn non_blank<'a>(name: &str, value: &'a str) -> Result<&'a str, ItemError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ItemError::InvalidArgument(format!("{} must not be empty", name)));
    }
    Ok(trimmed)
}

fn normalize_tags(tags: Vec<String>) -> Result<BTreeSet<String>, ItemError> {
    let mut normalized = BTreeSet::new();
    for tag in tags {
        let tag = tag.trim();
        if tag.is_empty() || tag.chars().count() > MAX_TAG_LEN {
            return Err(ItemError::InvalidArgument(format!(
                "tags must be 1-{} characters",
                MAX_TAG_LEN
            )));
        }
        normalized.insert(tag.to_string());
    }
    Ok(normalized)
}

fn encode_tags(tags: &BTreeSet<String>) -> Result<String, ItemError> {
    serde_json::to_string(tags).map_err(|e| ItemError::Internal(format!("tag encoding: {}", e)))
}
