use std::sync::{Arc, Barrier, Mutex};
use std::thread;

use chrono::NaiveDateTime;
use study_srs::data::models::{ItemError, UpdateContentRequest};
use study_srs::features::items::Clock;
use study_srs::ItemService;

mod common;

use common::{request, start_time, test_store, TestStore};

const OWNER: i32 = 11;

#[test]
fn test_concurrent_reviews_never_lose_updates() {
    let store = test_store();
    let item = store.service.create(OWNER, request("race me")).unwrap();

    let reviewers = 8;
    let barrier = Arc::new(Barrier::new(reviewers));
    let handles: Vec<_> = (0..reviewers)
        .map(|_| {
            let service = store.service.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                service.review(item.id, OWNER, 4)
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    let successes = results.iter().filter(|r| r.is_ok()).count();
    let conflicts = results
        .iter()
        .filter(|r| matches!(r, Err(ItemError::Conflict)))
        .count();

    assert!(successes >= 1);
    assert_eq!(successes + conflicts, reviewers, "unexpected errors: {:?}", results);

    // every accepted review is reflected in the stored streak
    let stored = store.service.get_by_id(item.id, OWNER).unwrap();
    assert_eq!(stored.repetitions as usize, successes);
    assert_eq!(stored.version as usize, successes);
}

#[test]
fn test_sequential_retries_after_conflict_all_apply() {
    let store = test_store();
    let item = store.service.create(OWNER, request("retry me")).unwrap();

    let reviewers = 4;
    let barrier = Arc::new(Barrier::new(reviewers));
    let handles: Vec<_> = (0..reviewers)
        .map(|_| {
            let service = store.service.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                loop {
                    match service.review(item.id, OWNER, 5) {
                        Err(ItemError::Conflict) => continue,
                        other => return other,
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap().unwrap();
    }

    let stored = store.service.get_by_id(item.id, OWNER).unwrap();
    assert_eq!(stored.repetitions, reviewers as i32);
    assert_eq!(stored.version, reviewers as i32);
}

#[test]
fn test_review_after_edit_sees_edited_row() {
    let store = test_store();
    let item = store.service.create(OWNER, request("edit then review")).unwrap();

    store
        .service
        .update_content(
            item.id,
            OWNER,
            UpdateContentRequest {
                original_content: Some("edited".to_string()),
                ..UpdateContentRequest::default()
            },
        )
        .unwrap();
    let reviewed = store.service.review(item.id, OWNER, 4).unwrap();

    assert_eq!(reviewed.original_content, "edited");
    assert_eq!(reviewed.repetitions, 1);
    assert_eq!(reviewed.version, 2);
}

type Interleaving = Box<dyn FnOnce() + Send>;

/// Clock that runs one write on its first read. `review` reads the clock
/// after loading the row and before writing it back, so the write lands
/// exactly between the two.
struct InterleavingClock {
    now: NaiveDateTime,
    pending: Mutex<Option<Interleaving>>,
}

impl Clock for InterleavingClock {
    fn now(&self) -> NaiveDateTime {
        let pending = self.pending.lock().unwrap().take();
        if let Some(write) = pending {
            write();
        }
        self.now
    }
}

fn service_interleaving(store: &TestStore, write: Interleaving) -> ItemService {
    let clock = InterleavingClock {
        now: start_time(),
        pending: Mutex::new(Some(write)),
    };
    ItemService::with_clock(store.pool.clone(), Arc::new(clock))
}

#[test]
fn test_review_of_item_deleted_mid_review_is_not_found() {
    let store = test_store();
    let item = store.service.create(OWNER, request("vanishing")).unwrap();

    let other = store.service.clone();
    let service = service_interleaving(
        &store,
        Box::new(move || other.delete(item.id, OWNER).unwrap()),
    );

    assert!(matches!(
        service.review(item.id, OWNER, 4),
        Err(ItemError::NotFound)
    ));
    assert!(matches!(
        store.service.get_by_id(item.id, OWNER),
        Err(ItemError::NotFound)
    ));
}

#[test]
fn test_review_overtaken_by_another_review_conflicts() {
    let store = test_store();
    let item = store.service.create(OWNER, request("contested")).unwrap();

    let other = store.service.clone();
    let service = service_interleaving(
        &store,
        Box::new(move || {
            other.review(item.id, OWNER, 5).unwrap();
        }),
    );

    assert!(matches!(
        service.review(item.id, OWNER, 1),
        Err(ItemError::Conflict)
    ));

    // only the interleaved review was stored
    let stored = store.service.get_by_id(item.id, OWNER).unwrap();
    assert_eq!(stored.repetitions, 1);
    assert_eq!(stored.lapses, 0);
    assert_eq!(stored.version, 1);
}

#[test]
fn test_review_overtaken_by_content_edit_conflicts() {
    let store = test_store();
    let item = store.service.create(OWNER, request("before edit")).unwrap();

    let other = store.service.clone();
    let service = service_interleaving(
        &store,
        Box::new(move || {
            other
                .update_content(
                    item.id,
                    OWNER,
                    UpdateContentRequest {
                        original_content: Some("after edit".to_string()),
                        ..UpdateContentRequest::default()
                    },
                )
                .unwrap();
        }),
    );

    assert!(matches!(
        service.review(item.id, OWNER, 4),
        Err(ItemError::Conflict)
    ));

    let stored = store.service.get_by_id(item.id, OWNER).unwrap();
    assert_eq!(stored.original_content, "after edit");
    assert_eq!(stored.repetitions, 0);
    assert_eq!(stored.last_reviewed_at, None);
    assert_eq!(stored.version, 1);

    // a fresh attempt reads the edited row and goes through
    let retried = store.service.review(item.id, OWNER, 4).unwrap();
    assert_eq!(retried.original_content, "after edit");
    assert_eq!(retried.version, 2);
}
