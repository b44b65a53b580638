//! Raw key/value access shared by the repositories
//!
//! Errors are returned as plain strings, each repository wraps them into the storage error of
//! its own domain
use rst_common::standard::serde::de::DeserializeOwned;
use rst_common::standard::serde::Serialize;

use rstdev_storage::engine::rocksdb::executor::Executor;
use rstdev_storage::engine::rocksdb::types::{
    Instruction as DbInstruction, OutputOpts as DbOutput,
};

use profnet_core::shared::lock::KeyedLock;

use crate::db::{Bucket, DbError};

pub(crate) fn build_key(prefix: &str, val: &str) -> String {
    format!("{}:{}", prefix, val)
}

pub(crate) async fn get_bytes(db: &Executor, key: String) -> Result<Option<Vec<u8>>, String> {
    let output = db
        .exec(DbInstruction::GetCf { key })
        .await
        .map_err(|err| err.to_string())?;

    match output {
        DbOutput::SingleByte { value } => Ok(value),
        _ => Err("unknown output type".to_string()),
    }
}

pub(crate) async fn save_bytes(db: &Executor, key: String, value: Vec<u8>) -> Result<(), String> {
    let _ = db
        .exec(DbInstruction::SaveCf { key, value })
        .await
        .map_err(|err| err.to_string())?;

    Ok(())
}

/// multi_get returns the values found for `keys`, missing keys are skipped
pub(crate) async fn multi_get(db: &Executor, keys: Vec<String>) -> Result<Vec<Vec<u8>>, String> {
    if keys.is_empty() {
        return Ok(Vec::new());
    }

    let output = db
        .exec(DbInstruction::MultiGetCf { keys })
        .await
        .map_err(|err| err.to_string())?;

    let values = match output {
        DbOutput::MultiBytes { values } => values,
        _ => return Err("unknown output type".to_string()),
    };

    let mut found = Vec::new();
    for value in values {
        match value {
            Ok(Some(bytes)) => found.push(bytes),
            Ok(None) => continue,
            Err(err) => return Err(err.to_string()),
        }
    }

    Ok(found)
}

pub(crate) async fn get_bucket<T>(db: &Executor, key: String) -> Result<Bucket<T>, String>
where
    T: Serialize + DeserializeOwned + PartialEq,
{
    match get_bytes(db, key).await? {
        Some(bytes) => Bucket::try_from(bytes).map_err(|err: DbError| err.to_string()),
        None => Ok(Bucket::new()),
    }
}

/// append_index adds `item` to the bucket stored at `key`
///
/// The read-modify-write of the bucket holds the lock of `key`, concurrent writers of the same
/// index never drop each other's items
pub(crate) async fn append_index<T>(
    db: &Executor,
    locks: &KeyedLock,
    key: String,
    item: T,
) -> Result<(), String>
where
    T: Serialize + DeserializeOwned + PartialEq,
{
    let _guard = locks.acquire(key.clone()).await;

    let mut bucket: Bucket<T> = get_bucket(db, key.clone()).await?;
    if !bucket.add(item) {
        return Ok(());
    }

    let bytes: Vec<u8> = bucket.try_into().map_err(|err: DbError| err.to_string())?;
    save_bytes(db, key, bytes).await
}
