use chrono::Duration;
use quiz_core::model::{QuestionId, SessionMeta, View};
use quiz_core::time::fixed_now;
use storage::repository::{AnswerRepository, SessionMetaRepository, Storage};
use storage::sqlite::SqliteRepository;

fn ids(raw: &[&str]) -> Vec<QuestionId> {
    raw.iter().map(|id| QuestionId::new(*id).unwrap()).collect()
}

async fn connect(name: &str) -> SqliteRepository {
    let repo = SqliteRepository::connect(&format!("sqlite:file:{name}?mode=memory&cache=shared"))
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");
    repo
}

#[tokio::test]
async fn sqlite_answers_round_trip_and_clear() {
    let repo = connect("memdb_answers").await;
    let all = ids(&["q1", "q2", "q3"]);

    repo.ensure_answers(&all).await.unwrap();
    repo.set_answer(&all[0], "C").await.unwrap();
    repo.set_answer(&all[2], "mitochondria").await.unwrap();
    // Lazy creation must not overwrite existing answers.
    repo.ensure_answers(&all).await.unwrap();

    let sheet = repo.get_answers(&all).await.unwrap();
    assert_eq!(sheet.get(&all[0]), "C");
    assert_eq!(sheet.get(&all[1]), "");
    assert_eq!(sheet.get(&all[2]), "mitochondria");

    repo.clear_all(&all).await.unwrap();
    for id in &all {
        assert_eq!(repo.get_answer(id).await.unwrap(), "");
    }
}

#[tokio::test]
async fn sqlite_unknown_answer_reads_empty() {
    let repo = connect("memdb_unknown").await;
    let id = QuestionId::new("never-written").unwrap();
    assert_eq!(repo.get_answer(&id).await.unwrap(), "");
}

#[tokio::test]
async fn sqlite_meta_overwrites_whole_record() {
    let repo = connect("memdb_meta").await;
    assert_eq!(repo.load_meta().await.unwrap(), SessionMeta::default());

    let first = SessionMeta {
        started_at: Some(fixed_now()),
        submitted_at: Some(fixed_now() + Duration::minutes(4)),
        view: View::Result,
        current_id: Some(QuestionId::new("q2").unwrap()),
        review_id: Some(QuestionId::new("q2").unwrap()),
    };
    repo.save_meta(&first).await.unwrap();
    assert_eq!(repo.load_meta().await.unwrap(), first);

    let second = SessionMeta {
        view: View::Start,
        ..SessionMeta::default()
    };
    repo.save_meta(&second).await.unwrap();
    assert_eq!(repo.load_meta().await.unwrap(), second);
}

#[tokio::test]
async fn sqlite_corrupt_meta_reads_as_default() {
    let repo = connect("memdb_corrupt").await;
    sqlx::query(
        "INSERT INTO kv_store (key, value, updated_at) VALUES ('session_meta', '{\"view\":', '')",
    )
    .execute(repo.pool())
    .await
    .unwrap();

    assert_eq!(repo.load_meta().await.unwrap(), SessionMeta::default());
}

#[tokio::test]
async fn storage_sqlite_wires_both_stores() {
    let storage = Storage::sqlite("sqlite:file:memdb_storage?mode=memory&cache=shared")
        .await
        .expect("storage");
    let id = QuestionId::new("q1").unwrap();
    storage.answers.set_answer(&id, "B").await.unwrap();
    assert_eq!(storage.answers.get_answer(&id).await.unwrap(), "B");

    let meta = SessionMeta {
        started_at: Some(fixed_now()),
        view: View::Quiz,
        ..SessionMeta::default()
    };
    storage.meta.save_meta(&meta).await.unwrap();
    assert_eq!(storage.meta.load_meta().await.unwrap(), meta);
}
