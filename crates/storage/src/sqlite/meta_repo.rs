use async_trait::async_trait;
use quiz_core::model::SessionMeta;

use crate::repository::{SessionMetaRepository, StorageError};

use super::SqliteRepository;
use super::kv;
use super::mapping::{META_KEY, conn, decode_meta, encode_meta};

#[async_trait]
impl SessionMetaRepository for SqliteRepository {
    async fn load_meta(&self) -> Result<SessionMeta, StorageError> {
        Ok(kv::get(&self.pool, META_KEY)
            .await?
            .map(|raw| decode_meta(&raw))
            .unwrap_or_default())
    }

    async fn save_meta(&self, meta: &SessionMeta) -> Result<(), StorageError> {
        let raw = encode_meta(meta)?;
        let mut db = self.pool.acquire().await.map_err(conn)?;
        kv::put(&mut *db, META_KEY, &raw).await
    }
}
