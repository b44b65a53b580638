use derive_more::{AsRef, Display, From, Into};
use the_newtype::Newtype;

use rst_common::standard::async_trait::async_trait;
use rst_common::standard::serde::{self, Deserialize, Serialize};
use rst_common::standard::uuid::Uuid;
use rst_common::with_errors::thiserror::{self, Error};

use crate::shared::types::UserID;

use super::message::Message;

/// MessageError is a base error types for the `Message` domain
///
/// Deleting a message the actor has no part in is reported through [`DeleteOutcome`], the
/// `NotAParty` variant is raised by the entity itself and mapped by the usecase
#[derive(Debug, PartialEq, Error, Serialize, Deserialize, Clone)]
#[serde(crate = "self::serde")]
pub enum MessageError {
    #[error("storage error: {0}")]
    StorageError(String),

    #[error("validation error: {0}")]
    ValidationError(String),

    #[error("user {0} is not a party of this message")]
    NotAParty(String),

    #[error("entity error: {0}")]
    EntityError(String),
}

/// Unique identifier of a message
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Newtype, From, Into, AsRef, Display,
)]
#[serde(crate = "self::serde")]
pub struct MessageID(String);

impl MessageID {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for MessageID {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(crate = "self::serde")]
pub enum DeliveryStatus {
    Sent,
    Delivered,
}

/// Side of a message an actor stands on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Party {
    Sender,
    Receiver,
}

/// Visibility tracks which parties deleted a message
///
/// It only ever escalates toward [`Visibility::HiddenFromBoth`], a hidden side never
/// becomes visible again
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(crate = "self::serde")]
pub enum Visibility {
    VisibleToBoth,
    HiddenFromSender,
    HiddenFromReceiver,
    HiddenFromBoth,
}

impl Visibility {
    pub fn hide_from(self, party: Party) -> Self {
        match (self, party) {
            (Visibility::VisibleToBoth, Party::Sender) => Visibility::HiddenFromSender,
            (Visibility::VisibleToBoth, Party::Receiver) => Visibility::HiddenFromReceiver,
            (Visibility::HiddenFromSender, Party::Receiver) => Visibility::HiddenFromBoth,
            (Visibility::HiddenFromReceiver, Party::Sender) => Visibility::HiddenFromBoth,
            (current, _) => current,
        }
    }

    pub fn is_visible_to(&self, party: Party) -> bool {
        match self {
            Visibility::VisibleToBoth => true,
            Visibility::HiddenFromSender => party == Party::Receiver,
            Visibility::HiddenFromReceiver => party == Party::Sender,
            Visibility::HiddenFromBoth => false,
        }
    }
}

/// Outcome of [`MessageAPI::delete_message`]
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(crate = "self::serde")]
pub enum DeleteOutcome {
    Applied,
    NotAParty,
    NoSuchMessage,
}

/// MessageFilter selects the messages a store read should return
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageFilter {
    SentBy(UserID),
    ReceivedBy(UserID),
    Involving(UserID),
}

impl MessageFilter {
    pub fn matches(&self, message: &Message) -> bool {
        match self {
            MessageFilter::SentBy(user) => message.get_sender() == user,
            MessageFilter::ReceivedBy(user) => message.get_receiver() == user,
            MessageFilter::Involving(user) => {
                message.get_sender() == user || message.get_receiver() == user
            }
        }
    }
}

/// MessageAPI is main entrypoint to communicate with the `Message` domain
///
/// Listing is not read-only: every listed message the reader receives which was still
/// [`DeliveryStatus::Sent`] is marked as [`DeliveryStatus::Delivered`] in the store
#[async_trait]
pub trait MessageAPI: Clone {
    /// send_message stores a new message, no connection between both users is required
    async fn send_message(
        &self,
        sender: UserID,
        receiver: UserID,
        contents: String,
    ) -> Result<MessageID, MessageError>;

    /// list_inbox returns messages received by `user` which were not deleted by the receiver
    async fn list_inbox(&self, user: UserID) -> Result<Vec<Message>, MessageError>;

    /// list_outbox returns messages sent by `user` which were not deleted by the sender
    async fn list_outbox(&self, user: UserID) -> Result<Vec<Message>, MessageError>;

    /// list_mailbox merges the inbox and the outbox, ordered by sending time
    async fn list_mailbox(&self, user: UserID) -> Result<Vec<Message>, MessageError>;

    async fn delete_message(
        &self,
        actor: UserID,
        id: MessageID,
    ) -> Result<DeleteOutcome, MessageError>;
}

/// RepoMessageBuilder is a `Message Repository` abstraction by implementing repository pattern
#[async_trait]
pub trait RepoMessageBuilder: Clone + Sync + Send {
    async fn get_message(&self, id: MessageID) -> Result<Option<Message>, MessageError>;
    async fn list_messages(&self, filter: MessageFilter) -> Result<Vec<Message>, MessageError>;

    /// put_message inserts or replaces the message keyed by its id
    async fn put_message(&self, message: &Message) -> Result<(), MessageError>;
}

/// `UsecaseBuilder` is a trait behavior that provides
/// base application logic's handlers
pub trait UsecaseBuilder: MessageAPI {
    type RepoImplementer: RepoMessageBuilder;

    fn repo(&self) -> Self::RepoImplementer;
}

#[cfg(test)]
mod tests {
    use super::*;
    use table_test::table_test;

    #[test]
    fn test_hide_from_escalates() {
        let table = vec![
            (
                (Visibility::VisibleToBoth, Party::Sender),
                Visibility::HiddenFromSender,
            ),
            (
                (Visibility::VisibleToBoth, Party::Receiver),
                Visibility::HiddenFromReceiver,
            ),
            (
                (Visibility::HiddenFromSender, Party::Sender),
                Visibility::HiddenFromSender,
            ),
            (
                (Visibility::HiddenFromSender, Party::Receiver),
                Visibility::HiddenFromBoth,
            ),
            (
                (Visibility::HiddenFromReceiver, Party::Sender),
                Visibility::HiddenFromBoth,
            ),
            (
                (Visibility::HiddenFromBoth, Party::Receiver),
                Visibility::HiddenFromBoth,
            ),
        ];

        for (validator, (current, party), expected) in table_test!(table) {
            let actual = current.hide_from(party);

            validator
                .given(&format!("{:?}", current))
                .when(&format!("hide from {:?}", party))
                .then(&format!("visibility is {:?}", expected))
                .assert_eq(expected, actual);
        }
    }

    #[test]
    fn test_is_visible_to() {
        assert!(Visibility::VisibleToBoth.is_visible_to(Party::Sender));
        assert!(Visibility::VisibleToBoth.is_visible_to(Party::Receiver));
        assert!(!Visibility::HiddenFromSender.is_visible_to(Party::Sender));
        assert!(Visibility::HiddenFromSender.is_visible_to(Party::Receiver));
        assert!(Visibility::HiddenFromReceiver.is_visible_to(Party::Sender));
        assert!(!Visibility::HiddenFromReceiver.is_visible_to(Party::Receiver));
        assert!(!Visibility::HiddenFromBoth.is_visible_to(Party::Sender));
        assert!(!Visibility::HiddenFromBoth.is_visible_to(Party::Receiver));
    }

    #[test]
    fn test_generated_ids_are_unique() {
        let first = MessageID::generate();
        let second = MessageID::generate();

        assert_ne!(first, second);
        assert!(!first.as_str().is_empty());
    }
}
