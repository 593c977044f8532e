#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use chrono::{Days, NaiveDate, NaiveDateTime};
use tempfile::TempDir;

use study_srs::config::AppConfig;
use study_srs::data::models::CreateItemRequest;
use study_srs::features::items::Clock;
use study_srs::{db, DbPool, ItemService};

/// Clock tests can move by hand
#[derive(Debug)]
pub struct ManualClock(Mutex<NaiveDateTime>);

impl ManualClock {
    pub fn new(start: NaiveDateTime) -> Arc<Self> {
        Arc::new(Self(Mutex::new(start)))
    }

    pub fn set(&self, now: NaiveDateTime) {
        *self.0.lock().unwrap() = now;
    }

    pub fn advance_days(&self, days: u64) {
        let mut now = self.0.lock().unwrap();
        *now = now.checked_add_days(Days::new(days)).unwrap();
    }
}

impl Clock for ManualClock {
    fn now(&self) -> NaiveDateTime {
        *self.0.lock().unwrap()
    }
}

pub struct TestStore {
    pub service: ItemService,
    pub clock: Arc<ManualClock>,
    pub pool: DbPool,
    _dir: TempDir,
}

impl TestStore {
    pub fn clock_now(&self) -> NaiveDateTime {
        self.clock.now()
    }
}

pub fn start_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 9, 2)
        .unwrap()
        .and_hms_opt(8, 0, 0)
        .unwrap()
}

pub fn test_store() -> TestStore {
    let dir = tempfile::tempdir().expect("create temp dir");
    let config = AppConfig {
        database_url: dir.path().join("srs-test.db").to_string_lossy().into_owned(),
        ..AppConfig::default()
    };

    let pool = db::build_pool(&config).expect("build pool");
    db::run_migrations(&pool).expect("run migrations");

    let clock = ManualClock::new(start_time());
    let service = ItemService::with_clock(pool.clone(), clock.clone());

    TestStore {
        service,
        clock,
        pool,
        _dir: dir,
    }
}

pub fn request(content: &str) -> CreateItemRequest {
    CreateItemRequest {
        original_content: content.to_string(),
        ..CreateItemRequest::default()
    }
}
