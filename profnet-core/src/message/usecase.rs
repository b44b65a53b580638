use rst_common::standard::async_trait::async_trait;
use rst_common::with_logging::log::{debug, info, warn};

use crate::shared::lock::KeyedLock;
use crate::shared::types::UserID;

use super::message::Message;
use super::types::{
    DeleteOutcome, DeliveryStatus, MessageAPI, MessageError, MessageFilter, MessageID, Party,
    RepoMessageBuilder, UsecaseBuilder,
};

const LOCK_PREFIX_MESSAGE: &str = "message_id";

/// `Usecase` is base logic implementation for the [`MessageAPI`]
///
/// Deletion and delivery both rewrite a stored message, they run while holding the lock of the
/// message id so a concurrent delete from the other party is never lost
#[derive(Clone)]
pub struct Usecase<TRepo>
where
    TRepo: RepoMessageBuilder,
{
    repo: TRepo,
    locks: KeyedLock,
}

impl<TRepo> Usecase<TRepo>
where
    TRepo: RepoMessageBuilder,
{
    pub fn new(repo: TRepo, locks: KeyedLock) -> Self {
        Self { repo, locks }
    }

    fn validate_user(user: &UserID) -> Result<(), MessageError> {
        if user.is_blank() {
            return Err(MessageError::ValidationError(
                "user id must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    fn lock_key(id: &MessageID) -> String {
        format!("{}:{}", LOCK_PREFIX_MESSAGE, id)
    }

    fn sorted(mut messages: Vec<Message>) -> Vec<Message> {
        messages.sort_by(|a, b| {
            a.get_sent_at()
                .cmp(&b.get_sent_at())
                .then_with(|| a.get_id().as_str().cmp(b.get_id().as_str()))
        });
        messages
    }

    /// Marks every listed message received by `reader` as delivered
    ///
    /// Each message is advanced on its own, under its own lock, and the stored record is read
    /// again first so a message deleted or delivered in the meantime keeps its newer state.
    /// A failing message does not stop the others: every message is attempted, the ones that
    /// succeeded stay delivered, and the failures are reported together afterwards. Delivery
    /// only moves forward, a later listing retries the failed ones.
    async fn deliver(&self, reader: &UserID, listed: &[Message]) -> Result<(), MessageError> {
        let pending = listed
            .iter()
            .filter(|message| message.get_receiver() == reader)
            .filter(|message| message.get_delivery() == DeliveryStatus::Sent);

        let mut failures: Vec<String> = Vec::new();
        for message in pending {
            if let Err(err) = self.deliver_one(reader, message.get_id()).await {
                warn!(
                    "[message:deliver] failed | id: {} | error: {}",
                    message.get_id(),
                    err
                );
                failures.push(format!("{}: {}", message.get_id(), err));
            }
        }

        if !failures.is_empty() {
            return Err(MessageError::StorageError(format!(
                "unable to mark {} message(s) as delivered: {}",
                failures.len(),
                failures.join(", ")
            )));
        }

        Ok(())
    }

    async fn deliver_one(&self, reader: &UserID, id: &MessageID) -> Result<(), MessageError> {
        let _guard = self.locks.acquire(Self::lock_key(id)).await;

        match self.repo.get_message(id.to_owned()).await? {
            Some(mut current) => {
                if current.mark_delivered() {
                    self.repo.put_message(&current).await?;
                    debug!("[message:deliver] id: {} | receiver: {}", id, reader);
                }
            }
            None => warn!(
                "[message:deliver] listed message is missing from the store | id: {}",
                id
            ),
        }

        Ok(())
    }
}

impl<TRepo> UsecaseBuilder for Usecase<TRepo>
where
    TRepo: RepoMessageBuilder,
{
    type RepoImplementer = TRepo;

    fn repo(&self) -> Self::RepoImplementer {
        self.repo.clone()
    }
}

#[async_trait]
impl<TRepo> MessageAPI for Usecase<TRepo>
where
    TRepo: RepoMessageBuilder,
{
    async fn send_message(
        &self,
        sender: UserID,
        receiver: UserID,
        contents: String,
    ) -> Result<MessageID, MessageError> {
        Self::validate_user(&sender)?;
        Self::validate_user(&receiver)?;

        let message = Message::new(sender, receiver, contents);
        self.repo.put_message(&message).await?;

        info!(
            "[message:send_message] id: {} | sender: {} | receiver: {}",
            message.get_id(),
            message.get_sender(),
            message.get_receiver()
        );

        Ok(message.get_id().to_owned())
    }

    async fn list_inbox(&self, user: UserID) -> Result<Vec<Message>, MessageError> {
        Self::validate_user(&user)?;

        let messages = self
            .repo
            .list_messages(MessageFilter::ReceivedBy(user.clone()))
            .await?
            .into_iter()
            .filter(|message| message.is_visible_to(Party::Receiver))
            .collect::<Vec<Message>>();

        let inbox = Self::sorted(messages);
        self.deliver(&user, &inbox).await?;

        debug!(
            "[message:list_inbox] user: {} | total: {}",
            user,
            inbox.len()
        );

        Ok(inbox)
    }

    async fn list_outbox(&self, user: UserID) -> Result<Vec<Message>, MessageError> {
        Self::validate_user(&user)?;

        let messages = self
            .repo
            .list_messages(MessageFilter::SentBy(user.clone()))
            .await?
            .into_iter()
            .filter(|message| message.is_visible_to(Party::Sender))
            .collect::<Vec<Message>>();

        let outbox = Self::sorted(messages);
        self.deliver(&user, &outbox).await?;

        debug!(
            "[message:list_outbox] user: {} | total: {}",
            user,
            outbox.len()
        );

        Ok(outbox)
    }

    async fn list_mailbox(&self, user: UserID) -> Result<Vec<Message>, MessageError> {
        Self::validate_user(&user)?;

        let messages = self
            .repo
            .list_messages(MessageFilter::Involving(user.clone()))
            .await?
            .into_iter()
            .filter(|message| {
                message
                    .parties_of(&user)
                    .into_iter()
                    .any(|party| message.is_visible_to(party))
            })
            .collect::<Vec<Message>>();

        let mailbox = Self::sorted(messages);
        self.deliver(&user, &mailbox).await?;

        debug!(
            "[message:list_mailbox] user: {} | total: {}",
            user,
            mailbox.len()
        );

        Ok(mailbox)
    }

    async fn delete_message(
        &self,
        actor: UserID,
        id: MessageID,
    ) -> Result<DeleteOutcome, MessageError> {
        Self::validate_user(&actor)?;

        let _guard = self.locks.acquire(Self::lock_key(&id)).await;

        let mut message = match self.repo.get_message(id.clone()).await? {
            Some(message) => message,
            None => {
                info!(
                    "[message:delete_message] actor: {} | id: {} | outcome: {:?}",
                    actor,
                    id,
                    DeleteOutcome::NoSuchMessage
                );
                return Ok(DeleteOutcome::NoSuchMessage);
            }
        };

        let before = message.get_visibility();
        let outcome = match message.hide_for(&actor) {
            Ok(_) => {
                if message.get_visibility() != before {
                    self.repo.put_message(&message).await?;
                }

                DeleteOutcome::Applied
            }
            Err(MessageError::NotAParty(_)) => DeleteOutcome::NotAParty,
            Err(err) => return Err(err),
        };

        info!(
            "[message:delete_message] actor: {} | id: {} | visibility: {:?} | outcome: {:?}",
            actor,
            id,
            message.get_visibility(),
            outcome
        );

        Ok(outcome)
    }
}
