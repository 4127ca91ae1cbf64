//! Integration tests for position handling on committees and secretariates.
//!
//! Exercises the swap and bulk reorder paths against a real database:
//! - Moving onto an occupied position swaps the two records
//! - Moving into a gap moves only the target
//! - Unknown ids write nothing
//! - Deferred unique constraint catches collisions at commit
//! - A move that loses a race for a slot is re-run, not rejected

use std::time::Duration;

use assert_matches::assert_matches;
use sqlx::PgPool;
use summit_core::diff::ChangeSet;
use summit_core::error::CoreError;
use summit_core::ordering::Slot;
use summit_core::patch::Patch;
use summit_db::models::committee::{CreateCommittee, UpdateCommittee};
use summit_db::models::secretariate::CreateSecretariate;
use summit_db::repositories::ordering::{self, OrderedTable, POSITION_ATTEMPTS};
use summit_db::repositories::{CommitteeRepo, SecretariateRepo};
use summit_db::DbError;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn new_committee(name: &str, position: Option<i32>) -> CreateCommittee {
    CreateCommittee {
        name: name.to_string(),
        abbreviation: None,
        topic: None,
        description: None,
        chair_name: None,
        image: None,
        position,
    }
}

fn new_member(name: &str) -> CreateSecretariate {
    CreateSecretariate {
        name: name.to_string(),
        title: "Director".to_string(),
        bio: None,
        email: None,
        photo: None,
        position: None,
    }
}

async fn positions(pool: &PgPool) -> Vec<(String, i32)> {
    CommitteeRepo::list(pool)
        .await
        .unwrap()
        .into_iter()
        .map(|c| (c.name, c.position))
        .collect()
}

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_create_appends_to_end(pool: PgPool) {
    let a = CommitteeRepo::create(&pool, &new_committee("GA", None), None)
        .await
        .unwrap();
    let b = CommitteeRepo::create(&pool, &new_committee("UNSC", None), None)
        .await
        .unwrap();
    assert_eq!(a.position, 1);
    assert_eq!(b.position, 2);

    let gap = CommitteeRepo::create(&pool, &new_committee("WHO", Some(7)), None)
        .await
        .unwrap();
    assert_eq!(gap.position, 7);
    let next = CommitteeRepo::create(&pool, &new_committee("ECOSOC", None), None)
        .await
        .unwrap();
    assert_eq!(next.position, 8);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_create_on_taken_position_rejected(pool: PgPool) {
    CommitteeRepo::create(&pool, &new_committee("GA", Some(1)), None)
        .await
        .unwrap();
    let err = CommitteeRepo::create(&pool, &new_committee("UNSC", Some(1)), None)
        .await
        .unwrap_err();
    let db_err = err.as_database_error().expect("database error");
    assert_eq!(db_err.constraint(), Some("uq_committees_position"));
}

// ---------------------------------------------------------------------------
// Swap
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_move_onto_occupied_position_swaps(pool: PgPool) {
    let mut ids = Vec::new();
    for name in ["A", "B", "C"] {
        let c = CommitteeRepo::create(&pool, &new_committee(name, None), None)
            .await
            .unwrap();
        ids.push(c.id);
    }

    let updated = CommitteeRepo::update(&pool, ids[2], &ChangeSet::default(), Some(1))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.position, 1);

    assert_eq!(
        positions(&pool).await,
        vec![("C".to_string(), 1), ("B".to_string(), 2), ("A".to_string(), 3)]
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn test_move_into_gap_moves_only_target(pool: PgPool) {
    let a = CommitteeRepo::create(&pool, &new_committee("A", None), None)
        .await
        .unwrap();
    CommitteeRepo::create(&pool, &new_committee("B", None), None)
        .await
        .unwrap();

    CommitteeRepo::update(&pool, a.id, &ChangeSet::default(), Some(5))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(positions(&pool).await, vec![("B".to_string(), 2), ("A".to_string(), 5)]);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_swap_and_field_changes_commit_together(pool: PgPool) {
    let a = CommitteeRepo::create(&pool, &new_committee("A", None), None)
        .await
        .unwrap();
    let b = CommitteeRepo::create(&pool, &new_committee("B", None), None)
        .await
        .unwrap();

    let dto = UpdateCommittee {
        topic: Patch::Value("Climate".into()),
        position: Patch::Value(1),
        ..Default::default()
    };
    let changes = dto.changes(&b, &Patch::Missing);
    let position = dto.position_change(&b);

    let updated = CommitteeRepo::update(&pool, b.id, &changes, position)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.topic.as_deref(), Some("Climate"));
    assert_eq!(updated.position, 1);

    let a = CommitteeRepo::find_by_id(&pool, a.id).await.unwrap().unwrap();
    assert_eq!(a.position, 2);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_move_missing_record_writes_nothing(pool: PgPool) {
    CommitteeRepo::create(&pool, &new_committee("A", None), None)
        .await
        .unwrap();

    let result = CommitteeRepo::update(&pool, 9999, &ChangeSet::default(), Some(1))
        .await
        .unwrap();
    assert!(result.is_none());
    assert_eq!(positions(&pool).await, vec![("A".to_string(), 1)]);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_move_to_invalid_position_rejected(pool: PgPool) {
    let a = CommitteeRepo::create(&pool, &new_committee("A", None), None)
        .await
        .unwrap();

    let err = CommitteeRepo::update(&pool, a.id, &ChangeSet::default(), Some(0))
        .await
        .unwrap_err();
    assert_matches!(err, DbError::Core(CoreError::Validation(_)));
    assert_eq!(positions(&pool).await, vec![("A".to_string(), 1)]);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_secretariate_swap(pool: PgPool) {
    let first = SecretariateRepo::create(&pool, &new_member("First"), None)
        .await
        .unwrap();
    let second = SecretariateRepo::create(&pool, &new_member("Second"), None)
        .await
        .unwrap();

    SecretariateRepo::update(&pool, first.id, &ChangeSet::default(), Some(2))
        .await
        .unwrap()
        .unwrap();

    let list = SecretariateRepo::list(&pool).await.unwrap();
    assert_eq!(list[0].id, second.id);
    assert_eq!(list[0].position, 1);
    assert_eq!(list[1].id, first.id);
    assert_eq!(list[1].position, 2);
}

// ---------------------------------------------------------------------------
// Bulk reorder
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_reorder_assigns_all_positions(pool: PgPool) {
    let a = CommitteeRepo::create(&pool, &new_committee("A", None), None)
        .await
        .unwrap();
    let b = CommitteeRepo::create(&pool, &new_committee("B", None), None)
        .await
        .unwrap();
    let c = CommitteeRepo::create(&pool, &new_committee("C", None), None)
        .await
        .unwrap();

    CommitteeRepo::reorder(
        &pool,
        &[
            Slot { id: a.id, position: 3 },
            Slot { id: b.id, position: 1 },
            Slot { id: c.id, position: 2 },
        ],
    )
    .await
    .unwrap();

    assert_eq!(
        positions(&pool).await,
        vec![("B".to_string(), 1), ("C".to_string(), 2), ("A".to_string(), 3)]
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn test_reorder_unknown_id_rolls_back(pool: PgPool) {
    let a = CommitteeRepo::create(&pool, &new_committee("A", None), None)
        .await
        .unwrap();
    CommitteeRepo::create(&pool, &new_committee("B", None), None)
        .await
        .unwrap();

    let err = CommitteeRepo::reorder(
        &pool,
        &[Slot { id: a.id, position: 9 }, Slot { id: 424242, position: 1 }],
    )
    .await
    .unwrap_err();
    assert_matches!(err, DbError::Core(CoreError::NotFound { id: 424242, .. }));

    assert_eq!(positions(&pool).await, vec![("A".to_string(), 1), ("B".to_string(), 2)]);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_reorder_collision_with_untouched_row_fails_at_commit(pool: PgPool) {
    let a = CommitteeRepo::create(&pool, &new_committee("A", None), None)
        .await
        .unwrap();
    CommitteeRepo::create(&pool, &new_committee("B", None), None)
        .await
        .unwrap();

    // B keeps position 2 and is not part of the request.
    let err = CommitteeRepo::reorder(&pool, &[Slot { id: a.id, position: 2 }])
        .await
        .unwrap_err();
    let db_err = match &err {
        DbError::Sqlx(e) => e.as_database_error().expect("database error"),
        other => panic!("expected a database error, got {other:?}"),
    };
    assert_eq!(db_err.constraint(), Some("uq_committees_position"));

    assert_eq!(positions(&pool).await, vec![("A".to_string(), 1), ("B".to_string(), 2)]);
}

// ---------------------------------------------------------------------------
// Concurrency
// ---------------------------------------------------------------------------

/// T1 moves A onto C's slot and holds its locks while T2 asks for the same
/// slot for B. T2 blocks on C, then finds the slot empty, and only sees A
/// there at commit. The retried transaction swaps B with A.
#[sqlx::test(migrations = "./migrations")]
async fn test_concurrent_moves_onto_same_position_both_succeed(pool: PgPool) {
    let mut ids = Vec::new();
    for name in ["A", "B", "C"] {
        let c = CommitteeRepo::create(&pool, &new_committee(name, None), None)
            .await
            .unwrap();
        ids.push(c.id);
    }

    let mut tx = pool.begin().await.unwrap();
    ordering::swap_position(&mut tx, OrderedTable::Committees, ids[0], 3)
        .await
        .unwrap()
        .unwrap();

    let second = tokio::spawn({
        let pool = pool.clone();
        let id = ids[1];
        async move { CommitteeRepo::update(&pool, id, &ChangeSet::default(), Some(3)).await }
    });
    tokio::time::sleep(Duration::from_millis(300)).await;
    tx.commit().await.unwrap();

    let moved = second.await.unwrap().unwrap().unwrap();
    assert_eq!(moved.position, 3);
    assert_eq!(
        positions(&pool).await,
        vec![
            ("C".to_string(), 1),
            ("A".to_string(), 2),
            ("B".to_string(), 3),
        ]
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn test_persistent_position_conflict_is_reported_as_conflict(pool: PgPool) {
    CommitteeRepo::create(&pool, &new_committee("A", Some(1)), None)
        .await
        .unwrap();

    let mut calls = 0;
    let err = ordering::retry_position_conflicts(OrderedTable::Committees, || {
        calls += 1;
        let pool = pool.clone();
        async move {
            CommitteeRepo::create(&pool, &new_committee("B", Some(1)), None)
                .await
                .map_err(DbError::from)
        }
    })
    .await
    .unwrap_err();

    assert_matches!(err, DbError::Core(CoreError::Conflict(_)));
    assert_eq!(calls, POSITION_ATTEMPTS);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_concurrent_appends_get_distinct_positions(pool: PgPool) {
    let tasks: Vec<_> = (0..3)
        .map(|i| {
            let pool = pool.clone();
            tokio::spawn(async move {
                CommitteeRepo::create(&pool, &new_committee(&format!("C{i}"), None), None).await
            })
        })
        .collect();
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    let taken: Vec<i32> = positions(&pool).await.into_iter().map(|(_, p)| p).collect();
    assert_eq!(taken, vec![1, 2, 3]);
}

// ---------------------------------------------------------------------------
// Delete
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_delete_leaves_gap(pool: PgPool) {
    CommitteeRepo::create(&pool, &new_committee("A", None), None)
        .await
        .unwrap();
    let b = CommitteeRepo::create(&pool, &new_committee("B", None), None)
        .await
        .unwrap();
    CommitteeRepo::create(&pool, &new_committee("C", None), None)
        .await
        .unwrap();

    let deleted = CommitteeRepo::delete(&pool, b.id).await.unwrap();
    assert_eq!(deleted.map(|c| c.name), Some("B".to_string()));
    assert!(CommitteeRepo::delete(&pool, b.id).await.unwrap().is_none());

    assert_eq!(positions(&pool).await, vec![("A".to_string(), 1), ("C".to_string(), 3)]);
}
