use std::collections::HashSet;

use rst_common::standard::async_trait::async_trait;
use rst_common::with_logging::log::debug;

use rstdev_storage::engine::rocksdb::executor::Executor;

use profnet_core::message::message::Message;
use profnet_core::message::types::{MessageError, MessageFilter, MessageID, RepoMessageBuilder};
use profnet_core::shared::lock::KeyedLock;
use profnet_core::shared::types::UserID;

use super::store;

const MESSAGE_KEY_ID: &str = "message_id";
const MESSAGE_KEY_SENT: &str = "message_sent";
const MESSAGE_KEY_RECEIVED: &str = "message_received";

/// Repository stores messages in RocksDB
///
/// A message lives under `message_id:<id>`. The sender owns an index bucket under
/// `message_sent:<user>`, the receiver one under `message_received:<user>`
#[derive(Clone)]
pub struct Repository {
    db: Executor,
    locks: KeyedLock,
}

impl Repository {
    pub fn new(db: Executor, locks: KeyedLock) -> Self {
        Self { db, locks }
    }

    fn build_message_key(id: &MessageID) -> String {
        store::build_key(MESSAGE_KEY_ID, id.as_str())
    }

    async fn list_ids(&self, prefix: &str, user: &UserID) -> Result<Vec<MessageID>, MessageError> {
        let bucket = store::get_bucket::<MessageID>(&self.db, store::build_key(prefix, user.as_str()))
            .await
            .map_err(MessageError::StorageError)?;

        Ok(bucket.items().to_vec())
    }
}

#[async_trait]
impl RepoMessageBuilder for Repository {
    async fn get_message(&self, id: MessageID) -> Result<Option<Message>, MessageError> {
        let value = store::get_bytes(&self.db, Self::build_message_key(&id))
            .await
            .map_err(MessageError::StorageError)?;

        match value {
            Some(bytes) => Message::try_from(bytes).map(Some),
            None => Ok(None),
        }
    }

    async fn list_messages(&self, filter: MessageFilter) -> Result<Vec<Message>, MessageError> {
        let ids = match &filter {
            MessageFilter::SentBy(user) => self.list_ids(MESSAGE_KEY_SENT, user).await?,
            MessageFilter::ReceivedBy(user) => self.list_ids(MESSAGE_KEY_RECEIVED, user).await?,
            MessageFilter::Involving(user) => {
                let mut ids = self.list_ids(MESSAGE_KEY_SENT, user).await?;
                ids.extend(self.list_ids(MESSAGE_KEY_RECEIVED, user).await?);
                ids
            }
        };

        let mut seen = HashSet::new();
        let keys = ids
            .into_iter()
            .filter(|id| seen.insert(id.to_owned()))
            .map(|id| Self::build_message_key(&id))
            .collect::<Vec<String>>();

        let values = store::multi_get(&self.db, keys)
            .await
            .map_err(MessageError::StorageError)?;

        let messages = values
            .into_iter()
            .map(Message::try_from)
            .collect::<Result<Vec<Message>, MessageError>>()?
            .into_iter()
            .filter(|message| filter.matches(message))
            .collect::<Vec<Message>>();

        debug!(
            "[message:repository] list_messages | filter: {:?} | total: {}",
            filter,
            messages.len()
        );

        Ok(messages)
    }

    async fn put_message(&self, message: &Message) -> Result<(), MessageError> {
        let message_bytes: Vec<u8> = message.to_owned().try_into()?;
        store::save_bytes(&self.db, Self::build_message_key(message.get_id()), message_bytes)
            .await
            .map_err(MessageError::StorageError)?;

        store::append_index(
            &self.db,
            &self.locks,
            store::build_key(MESSAGE_KEY_SENT, message.get_sender().as_str()),
            message.get_id().to_owned(),
        )
        .await
        .map_err(MessageError::StorageError)?;

        store::append_index(
            &self.db,
            &self.locks,
            store::build_key(MESSAGE_KEY_RECEIVED, message.get_receiver().as_str()),
            message.get_id().to_owned(),
        )
        .await
        .map_err(MessageError::StorageError)?;

        Ok(())
    }
}
