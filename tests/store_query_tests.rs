//! Integration tests for task retrieval against the local store.
//!
//! These tests load the demo snapshot into an in-memory database and check
//! filtering, search, ordering and the child-record retrievals.

use chrono::{TimeZone, Utc};
use task_board::db::Database;
use task_board::db::import::Snapshot;
use task_board::filters::FilterSpec;
use task_board::store::TaskStore;
use task_board::types::{Priority, Task};

const SEED: &str = include_str!("../demos/seed.json");

/// Helper to create an in-memory database loaded with the demo snapshot.
fn setup_db() -> Database {
    let db = Database::open_in_memory().expect("Failed to create in-memory database");
    let snapshot = Snapshot::from_json(SEED).expect("Seed snapshot should parse");
    db.import_snapshot(&snapshot, false)
        .expect("Seed snapshot should import");
    db
}

fn ids(tasks: &[Task]) -> Vec<&str> {
    tasks.iter().map(|t| t.id.as_str()).collect()
}

fn ordered(ordering: &str) -> FilterSpec {
    FilterSpec {
        ordering: Some(ordering.to_string()),
        ..Default::default()
    }
}

#[tokio::test]
async fn empty_filters_return_all_newest_first() {
    let db = setup_db();
    let tasks = db.fetch_tasks(&FilterSpec::default()).await.unwrap();

    assert_eq!(tasks.len(), 8);
    assert!(
        tasks
            .windows(2)
            .all(|pair| pair[0].created_at >= pair[1].created_at)
    );
    assert_eq!(tasks[0].id, "t-08");
}

#[tokio::test]
async fn creator_summary_is_joined() {
    let db = setup_db();
    let tasks = db.fetch_tasks(&FilterSpec::default()).await.unwrap();

    let review = tasks.iter().find(|t| t.id == "t-01").unwrap();
    let creator = review.created_by_user.as_ref().unwrap();
    assert_eq!(creator.username, "ana");
    assert_eq!(creator.email, "ana@example.com");

    let orphan = tasks.iter().find(|t| t.id == "t-06").unwrap();
    assert!(orphan.created_by_user.is_none());
    assert_eq!(orphan.description, "");
}

#[tokio::test]
async fn priority_filter_keeps_only_that_priority() {
    let db = setup_db();
    let filters = FilterSpec {
        priority: Some("high".to_string()),
        ..Default::default()
    };
    let tasks = db.fetch_tasks(&filters).await.unwrap();

    assert_eq!(ids(&tasks), vec!["t-07", "t-04", "t-01"]);
    assert!(tasks.iter().all(|t| t.priority == Priority::High));
}

#[tokio::test]
async fn filters_combine_with_and() {
    let db = setup_db();
    let filters = FilterSpec {
        priority: Some("medium".to_string()),
        status: Some("pending".to_string()),
        ..Default::default()
    };
    let tasks = db.fetch_tasks(&filters).await.unwrap();

    assert_eq!(ids(&tasks), vec!["t-08", "t-05"]);
}

#[tokio::test]
async fn unknown_priority_matches_nothing() {
    let db = setup_db();
    let filters = FilterSpec {
        priority: Some("urgent".to_string()),
        ..Default::default()
    };
    let tasks = db.fetch_tasks(&filters).await.unwrap();
    assert!(tasks.is_empty());
}

#[tokio::test]
async fn due_date_range_is_inclusive() {
    let db = setup_db();
    let filters = FilterSpec {
        due_date_gte: Some("2024-06-30T15:00:00Z".to_string()),
        due_date_lte: Some("2024-07-15T17:00:00Z".to_string()),
        ..Default::default()
    };
    let tasks = db.fetch_tasks(&filters).await.unwrap();

    assert_eq!(tasks.len(), 3);
    let from = Utc.with_ymd_and_hms(2024, 6, 30, 15, 0, 0).unwrap();
    let until = Utc.with_ymd_and_hms(2024, 7, 15, 17, 0, 0).unwrap();
    for task in &tasks {
        let due = task.due_date.unwrap();
        assert!(due >= from && due <= until, "{} out of range", task.id);
    }
}

#[tokio::test]
async fn due_date_bounds_accept_plain_dates() {
    let db = setup_db();
    let filters = FilterSpec {
        due_date_gte: Some("2024-08-01".to_string()),
        ..Default::default()
    };
    let tasks = db.fetch_tasks(&filters).await.unwrap();

    assert_eq!(ids(&tasks), vec!["t-06", "t-05"]);
}

#[tokio::test]
async fn due_date_bounds_accept_space_separated_times() {
    let db = setup_db();
    let filters = FilterSpec {
        due_date_gte: Some("2024-06-30 15:00:00".to_string()),
        due_date_lte: Some("2024-07-15 17:00:00".to_string()),
        ..Default::default()
    };
    let tasks = db.fetch_tasks(&filters).await.unwrap();

    assert_eq!(ids(&tasks), vec!["t-07", "t-02", "t-01"]);
}

#[tokio::test]
async fn search_matches_title_or_description_case_insensitively() {
    let db = setup_db();
    let filters = FilterSpec {
        search: Some("budget".to_string()),
        ..Default::default()
    };
    let tasks = db.fetch_tasks(&filters).await.unwrap();

    // Title "Q3 Budget Review", description "budget approval", description "BUDGET limits"
    assert_eq!(ids(&tasks), vec!["t-08", "t-02", "t-01"]);
}

#[tokio::test]
async fn search_treats_wildcards_literally() {
    let db = setup_db();
    let filters = FilterSpec {
        search: Some("%".to_string()),
        ..Default::default()
    };
    let tasks = db.fetch_tasks(&filters).await.unwrap();
    assert!(tasks.is_empty());
}

const ACCENTED: &str = r#"{
    "tasks": [
        {
            "rowguid": "t-pt",
            "title": "REVISÃO do orçamento",
            "description": "Conferir as DESPESAS de ÉPOCA",
            "priority": "medium",
            "status": "pending",
            "due_date": null,
            "created_by": null,
            "partner_id": null,
            "created_at": "2024-06-09T09:00:00Z",
            "updated_at": "2024-06-09T09:00:00Z"
        }
    ]
}"#;

#[tokio::test]
async fn search_folds_case_beyond_ascii() {
    let db = setup_db();
    db.import_snapshot(&Snapshot::from_json(ACCENTED).unwrap(), false)
        .unwrap();

    for term in ["revis", "revisão", "REVISÃO", "Orçamento", "época"] {
        let filters = FilterSpec {
            search: Some(term.to_string()),
            ..Default::default()
        };
        let tasks = db.fetch_tasks(&filters).await.unwrap();
        assert_eq!(ids(&tasks), vec!["t-pt"], "search for {:?}", term);
    }
}

#[tokio::test]
async fn reversed_ordering_reverses_results() {
    let db = setup_db();

    for field in ["priority", "due_date", "title", "status", "created_at"] {
        let ascending = db.fetch_tasks(&ordered(field)).await.unwrap();
        let mut descending = db
            .fetch_tasks(&ordered(&format!("-{}", field)))
            .await
            .unwrap();
        descending.reverse();
        assert_eq!(ids(&ascending), ids(&descending), "ordering by {}", field);
    }
}

#[tokio::test]
async fn priority_orders_high_to_low() {
    let db = setup_db();
    let tasks = db.fetch_tasks(&ordered("priority")).await.unwrap();
    let priorities: Vec<Priority> = tasks.iter().map(|t| t.priority).collect();

    let mut sorted = priorities.clone();
    sorted.sort();
    assert_eq!(priorities, sorted);
    assert_eq!(priorities[0], Priority::High);
}

#[tokio::test]
async fn due_date_ascending_puts_missing_dates_last() {
    let db = setup_db();
    let tasks = db.fetch_tasks(&ordered("due_date")).await.unwrap();

    assert_eq!(tasks[0].id, "t-04");
    assert!(tasks[6].due_date.is_none());
    assert!(tasks[7].due_date.is_none());
}

#[tokio::test]
async fn no_matches_is_an_empty_list() {
    let db = setup_db();
    let filters = FilterSpec {
        status: Some("archived".to_string()),
        ..Default::default()
    };
    let tasks = db.fetch_tasks(&filters).await.unwrap();
    assert!(tasks.is_empty());
}

#[tokio::test]
async fn unknown_ordering_field_is_a_store_error() {
    let db = setup_db();
    let err = db.fetch_tasks(&ordered("-owner")).await.unwrap_err();

    assert_eq!(err.table, "tasks");
    assert_eq!(err.to_string(), "column tasks.owner does not exist");
}

#[tokio::test]
async fn fetch_task_by_id() {
    let db = setup_db();

    let task = db.fetch_task("t-02").await.unwrap().unwrap();
    assert_eq!(task.title, "Vendor contract renewal");
    assert_eq!(task.group_id.as_deref(), Some("p-acme"));

    assert!(db.fetch_task("missing").await.unwrap().is_none());
}

#[tokio::test]
async fn comments_are_oldest_first() {
    let db = setup_db();
    let comments = db.fetch_task_comments("t-01").await.unwrap();

    let ids: Vec<&str> = comments.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["c-01", "c-02"]);
    assert_eq!(comments[0].user_id.as_deref(), Some("u-bruno"));
}

#[tokio::test]
async fn attachments_are_oldest_first() {
    let db = setup_db();
    let attachments = db.fetch_task_attachments("t-01").await.unwrap();

    let names: Vec<&str> = attachments.iter().map(|a| a.filename.as_str()).collect();
    assert_eq!(names, vec!["notes.pdf", "q3-budget.xlsx"]);
}

#[tokio::test]
async fn children_of_task_without_any_are_empty() {
    let db = setup_db();
    assert!(db.fetch_task_comments("t-03").await.unwrap().is_empty());
    assert!(db.fetch_task_attachments("t-03").await.unwrap().is_empty());
}

#[test]
fn file_backed_database_persists_imports() {
    let temp = tempfile::TempDir::new().unwrap();
    let path = temp.path().join("tasks.db");

    {
        let db = Database::open(&path).unwrap();
        let snapshot = Snapshot::from_json(SEED).unwrap();
        db.import_snapshot(&snapshot, true).unwrap();
    }

    let db = Database::open(&path).unwrap();
    let count: i64 = db
        .with_conn(|conn| Ok(conn.query_row("SELECT COUNT(*) FROM tasks", [], |row| row.get(0))?))
        .unwrap();
    assert_eq!(count, 8);
}
