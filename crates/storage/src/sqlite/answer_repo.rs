use std::collections::HashMap;

use async_trait::async_trait;
use quiz_core::model::{AnswerSheet, QuestionId};

use crate::repository::{AnswerRepository, StorageError};

use super::SqliteRepository;
use super::kv;
use super::mapping::{ANSWER_PREFIX, answer_key, conn};

#[async_trait]
impl AnswerRepository for SqliteRepository {
    async fn get_answer(&self, id: &QuestionId) -> Result<String, StorageError> {
        Ok(kv::get(&self.pool, &answer_key(id))
            .await?
            .unwrap_or_default())
    }

    async fn set_answer(&self, id: &QuestionId, answer: &str) -> Result<(), StorageError> {
        let mut db = self.pool.acquire().await.map_err(conn)?;
        kv::put(&mut *db, &answer_key(id), answer).await
    }

    async fn get_answers(&self, ids: &[QuestionId]) -> Result<AnswerSheet, StorageError> {
        let stored: HashMap<String, String> = kv::scan_prefix(&self.pool, ANSWER_PREFIX)
            .await?
            .into_iter()
            .collect();

        Ok(ids
            .iter()
            .map(|id| {
                let text = stored.get(&answer_key(id)).cloned().unwrap_or_default();
                (id.clone(), text)
            })
            .collect())
    }

    async fn ensure_answers(&self, ids: &[QuestionId]) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await.map_err(conn)?;
        for id in ids {
            kv::put_if_absent(&mut *tx, &answer_key(id), "").await?;
        }
        tx.commit().await.map_err(conn)
    }

    async fn clear_all(&self, ids: &[QuestionId]) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await.map_err(conn)?;
        for id in ids {
            kv::put(&mut *tx, &answer_key(id), "").await?;
        }
        tx.commit().await.map_err(conn)
    }
}
