use std::path::PathBuf;

use quiz_core::model::{QuestionId, View};
use quiz_core::time::fixed_clock;
use services::{AppServices, AppServicesError, DatasetError, SubmitOutcome};

const DATASET: &str = "\
id,question,questionType,options,answer
q1,2 + 2 = ?,Multiple Choice,A. 3|B. 4|C. 5,B
q2,Capital of France,Fill in the blank,,Paris
";

fn write_dataset(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("quiz-{name}-{}.csv", std::process::id()));
    std::fs::write(&path, contents).expect("write dataset");
    path
}

#[tokio::test]
async fn sqlite_session_persists_between_opens() {
    let dataset = write_dataset("smoke", DATASET);
    let app = AppServices::new_sqlite(
        "sqlite:file:memdb_app_smoke?mode=memory&cache=shared",
        &dataset,
        fixed_clock(),
    )
    .await
    .expect("app services");

    let mut session = app.open_session().await.unwrap();
    assert_eq!(session.view(), View::Start);
    session.start_new().await.unwrap();
    session
        .set_answer(&QuestionId::new("q1").unwrap(), " b ")
        .await
        .unwrap();
    session
        .set_answer(&QuestionId::new("q2").unwrap(), "paris")
        .await
        .unwrap();
    assert_eq!(
        session.submit(|_| false).await.unwrap(),
        SubmitOutcome::Submitted
    );

    let reopened = app.open_session().await.unwrap();
    assert_eq!(reopened.view(), View::Result);
    let snap = reopened.snapshot();
    assert_eq!(snap.score.correct, 1);
    assert!((snap.score.percent - 50.0).abs() < f64::EPSILON);

    std::fs::remove_file(dataset).ok();
}

#[tokio::test]
async fn empty_dataset_is_a_load_failure() {
    let dataset = write_dataset("empty", "id,question,answer\n");
    let err = AppServices::new_sqlite(
        "sqlite:file:memdb_app_empty?mode=memory&cache=shared",
        &dataset,
        fixed_clock(),
    )
    .await
    .err()
    .expect("load failure");

    assert!(matches!(
        err,
        AppServicesError::Dataset(DatasetError::EmptySheet)
    ));
    std::fs::remove_file(dataset).ok();
}
