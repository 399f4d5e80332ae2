use std::sync::Arc;

use async_trait::async_trait;
use quiz_core::model::{QuestionSet, QuestionSetId};
use quiz_core::time::fixed_clock;
use services::{ExportedSet, QuestionSetService, QuestionSetServiceError};
use storage::repository::{
    InMemoryRepository, NewQuestionSetRecord, QuestionSetRepository, Storage, StorageError,
};

#[tokio::test]
async fn authoring_flow_create_edit_delete_reorder() {
    let storage = Storage::sqlite("sqlite:file:memdb_authoring_flow?mode=memory&cache=shared")
        .await
        .expect("connect sqlite");
    let service = QuestionSetService::new(
        fixed_clock(),
        Arc::clone(&storage.question_sets),
        Arc::clone(&storage.questions),
    );

    let set_id = service.create_set("Warm-up").await.expect("create set");

    let suggested = service.suggest_answer("12 ÷ 4 =").expect("suggestion");
    let first = service
        .add_question(set_id, "12 ÷ 4 =", &suggested)
        .await
        .expect("add first");
    let second = service
        .add_question(set_id, "Largest planet?", "Jupiter")
        .await
        .expect("add second");
    let third = service
        .add_question(set_id, "5 x 5", "25")
        .await
        .expect("add third");

    service
        .update_question(set_id, second.id(), "Largest planet in our solar system?", " jupiter ")
        .await
        .expect("update");
    service
        .delete_question(set_id, first.id())
        .await
        .expect("delete");

    let set = service.get_set(set_id).await.unwrap().expect("set exists");
    assert_eq!(set.len(), 2);
    assert_eq!(set.questions()[0].id(), second.id());
    assert_eq!(set.questions()[0].text(), "Largest planet in our solar system?");
    assert_eq!(set.questions()[0].answer(), "jupiter");
    assert_eq!(set.questions()[1].id(), third.id());

    let err = service
        .delete_question(set_id, first.id())
        .await
        .unwrap_err();
    assert!(matches!(err, QuestionSetServiceError::QuestionSet(_)));

    service.delete_set(set_id).await.expect("delete set");
    assert!(service.get_set(set_id).await.unwrap().is_none());
}

#[tokio::test]
async fn export_then_import_preserves_order_with_new_ids() {
    let storage = Storage::in_memory();
    let service = QuestionSetService::new(
        fixed_clock(),
        Arc::clone(&storage.question_sets),
        Arc::clone(&storage.questions),
    );

    let set_id = service.create_set("Capitals").await.unwrap();
    for (text, answer) in [("France?", "Paris"), ("Japan?", "Tokyo"), ("Kenya?", "Nairobi")] {
        service.add_question(set_id, text, answer).await.unwrap();
    }

    let json = service.export_set(set_id).await.unwrap();
    let parsed: ExportedSet = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed.id, set_id);
    assert_eq!(parsed.name, "Capitals");
    assert_eq!(parsed.questions.len(), 3);

    let imported_id = service.import_set(&json).await.unwrap();
    assert_ne!(imported_id, set_id);

    let original = service.get_set(set_id).await.unwrap().unwrap();
    let imported = service.get_set(imported_id).await.unwrap().unwrap();
    assert_eq!(imported.name(), original.name());
    let pairs = |set: &QuestionSet| -> Vec<(String, String)> {
        set.questions()
            .iter()
            .map(|q| (q.text().to_owned(), q.answer().to_owned()))
            .collect()
    };
    assert_eq!(pairs(&imported), pairs(&original));
    assert!(
        imported
            .questions()
            .iter()
            .all(|q| original.question(q.id()).is_none())
    );
}

/// Set repository whose backing store has gone away.
struct OfflineSets;

#[async_trait]
impl QuestionSetRepository for OfflineSets {
    async fn insert_new_set(
        &self,
        _set: NewQuestionSetRecord,
    ) -> Result<QuestionSetId, StorageError> {
        Err(StorageError::Connection("offline".into()))
    }

    async fn upsert_set(&self, _set: &QuestionSet) -> Result<(), StorageError> {
        Err(StorageError::Connection("offline".into()))
    }

    async fn get_set(&self, _id: QuestionSetId) -> Result<Option<QuestionSet>, StorageError> {
        Err(StorageError::Connection("offline".into()))
    }

    async fn list_sets(&self, _limit: u32) -> Result<Vec<QuestionSet>, StorageError> {
        Err(StorageError::Connection("offline".into()))
    }

    async fn delete_set(&self, _id: QuestionSetId) -> Result<(), StorageError> {
        Err(StorageError::Connection("offline".into()))
    }
}

#[tokio::test]
async fn storage_failures_surface_as_service_errors() {
    let service = QuestionSetService::new(
        fixed_clock(),
        Arc::new(OfflineSets),
        Arc::new(InMemoryRepository::new()),
    );

    let err = service.create_set("Anything").await.unwrap_err();
    assert!(matches!(
        err,
        QuestionSetServiceError::Storage(StorageError::Connection(_))
    ));

    // Validation still runs before storage is touched.
    let err = service.create_set(" ").await.unwrap_err();
    assert!(matches!(err, QuestionSetServiceError::QuestionSet(_)));
}
