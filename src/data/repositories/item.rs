use chrono::NaiveDateTime;
use diesel::prelude::*;
use diesel::sql_types::Integer;

use crate::data::models::{ContentChangeset, ItemFilter, ItemRecord, NewItemRecord};
use crate::schema::srs_items;

/// Scheduling columns written by a single review
#[derive(Debug, Clone, Copy)]
pub struct ScheduleUpdate {
    pub last_reviewed_at: NaiveDateTime,
    pub next_review_at: NaiveDateTime,
    pub current_interval: i32,
    pub ease_factor: f64,
    pub repetitions: i32,
    pub lapses: i32,
}

pub struct ItemRepository;

impl ItemRepository {
    pub fn insert(
        conn: &mut SqliteConnection,
        item: &NewItemRecord<'_>,
    ) -> Result<ItemRecord, diesel::result::Error> {
        conn.transaction(|conn| {
            diesel::insert_into(srs_items::table)
                .values(item)
                .execute(conn)?;

            let item_id = diesel::select(diesel::dsl::sql::<Integer>("last_insert_rowid()"))
                .get_result::<i32>(conn)?;

            srs_items::table
                .find(item_id)
                .select(ItemRecord::as_select())
                .first(conn)
        })
    }

    /// Looks an item up by id, only if `owner_id` owns it
    pub fn find_owned(
        conn: &mut SqliteConnection,
        item_id: i32,
        owner_id: i32,
    ) -> Result<Option<ItemRecord>, diesel::result::Error> {
        srs_items::table
            .filter(srs_items::item_id.eq(item_id))
            .filter(srs_items::owner_id.eq(owner_id))
            .select(ItemRecord::as_select())
            .first(conn)
            .optional()
    }

    /// Items with `next_review_at <= as_of`, most overdue first
    pub fn due_for_owner(
        conn: &mut SqliteConnection,
        owner_id: i32,
        as_of: NaiveDateTime,
        limit: Option<i64>,
    ) -> Result<Vec<ItemRecord>, diesel::result::Error> {
        let mut query = srs_items::table
            .filter(srs_items::owner_id.eq(owner_id))
            .filter(srs_items::next_review_at.le(as_of))
            .order_by((srs_items::next_review_at.asc(), srs_items::item_id.asc()))
            .select(ItemRecord::as_select())
            .into_boxed();

        if let Some(limit) = limit {
            query = query.limit(limit);
        }

        query.load(conn)
    }

    /// All owned items matching the filter, ordered like the due queue.
    /// Tag matching happens in the caller since tags are stored as JSON.
    pub fn list_for_owner(
        conn: &mut SqliteConnection,
        owner_id: i32,
        filter: &ItemFilter,
    ) -> Result<Vec<ItemRecord>, diesel::result::Error> {
        let mut query = srs_items::table
            .filter(srs_items::owner_id.eq(owner_id))
            .order_by((srs_items::next_review_at.asc(), srs_items::item_id.asc()))
            .select(ItemRecord::as_select())
            .into_boxed();

        if let Some(study_plan_id) = &filter.study_plan_id {
            query = query.filter(srs_items::study_plan_id.eq(study_plan_id.clone()));
        }
        if let Some(task_id) = &filter.task_id {
            query = query.filter(srs_items::task_id.eq(task_id.clone()));
        }
        if let Some(source) = filter.source {
            query = query.filter(srs_items::source.eq(source.as_str()));
        }

        query.load(conn)
    }

    /// Writes a review result if the row still carries `expected_version`.
    /// Returns the number of rows changed (0 or 1).
    pub fn apply_review(
        conn: &mut SqliteConnection,
        item_id: i32,
        owner_id: i32,
        expected_version: i32,
        update: &ScheduleUpdate,
        now: NaiveDateTime,
    ) -> Result<usize, diesel::result::Error> {
        diesel::update(
            srs_items::table
                .filter(srs_items::item_id.eq(item_id))
                .filter(srs_items::owner_id.eq(owner_id))
                .filter(srs_items::version.eq(expected_version)),
        )
        .set((
            srs_items::last_reviewed_at.eq(Some(update.last_reviewed_at)),
            srs_items::next_review_at.eq(update.next_review_at),
            srs_items::current_interval.eq(update.current_interval),
            srs_items::ease_factor.eq(update.ease_factor),
            srs_items::repetitions.eq(update.repetitions),
            srs_items::lapses.eq(update.lapses),
            srs_items::version.eq(srs_items::version + 1),
            srs_items::updated_at.eq(now),
        ))
        .execute(conn)
    }

    /// Applies a content edit; scheduling columns are never touched.
    ///
    /// Still bumps `version`: a review computed from a row read before the
    /// edit is rejected with `Conflict` instead of being merged, even though
    /// the two touch disjoint columns. This is deliberately conservative.
    pub fn update_content(
        conn: &mut SqliteConnection,
        item_id: i32,
        owner_id: i32,
        changes: &ContentChangeset,
        now: NaiveDateTime,
    ) -> Result<usize, diesel::result::Error> {
        diesel::update(
            srs_items::table
                .filter(srs_items::item_id.eq(item_id))
                .filter(srs_items::owner_id.eq(owner_id)),
        )
        .set((
            changes,
            srs_items::version.eq(srs_items::version + 1),
            srs_items::updated_at.eq(now),
        ))
        .execute(conn)
    }

    pub fn delete_owned(
        conn: &mut SqliteConnection,
        item_id: i32,
        owner_id: i32,
    ) -> Result<usize, diesel::result::Error> {
        diesel::delete(
            srs_items::table
                .filter(srs_items::item_id.eq(item_id))
                .filter(srs_items::owner_id.eq(owner_id)),
        )
        .execute(conn)
    }
}
