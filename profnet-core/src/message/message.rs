use rst_common::standard::chrono::serde::ts_seconds;
use rst_common::standard::chrono::{DateTime, Utc};
use rst_common::standard::serde::{self, Deserialize, Serialize};
use rst_common::standard::serde_json;

use rstdev_domain::entity::ToJSON;
use rstdev_domain::BaseError;

use crate::shared::types::UserID;

use super::types::{DeliveryStatus, MessageError, MessageID, Party, Visibility};

/// Message is a direct message from `sender` to `receiver`
///
/// Both parties share the same record. Deleting only hides the message from the side of the
/// actor, the record itself stays in the mailbox
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(crate = "self::serde")]
pub struct Message {
    id: MessageID,
    sender: UserID,
    receiver: UserID,
    contents: String,
    delivery: DeliveryStatus,
    visibility: Visibility,

    #[serde(with = "ts_seconds")]
    sent_at: DateTime<Utc>,
}

impl Message {
    pub fn new(sender: UserID, receiver: UserID, contents: String) -> Self {
        Self {
            id: MessageID::generate(),
            sender,
            receiver,
            contents,
            delivery: DeliveryStatus::Sent,
            visibility: Visibility::VisibleToBoth,
            sent_at: Utc::now(),
        }
    }

    pub fn get_id(&self) -> &MessageID {
        &self.id
    }

    pub fn get_sender(&self) -> &UserID {
        &self.sender
    }

    pub fn get_receiver(&self) -> &UserID {
        &self.receiver
    }

    pub fn get_contents(&self) -> &str {
        &self.contents
    }

    pub fn get_delivery(&self) -> DeliveryStatus {
        self.delivery
    }

    pub fn get_visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn get_sent_at(&self) -> DateTime<Utc> {
        self.sent_at
    }

    /// parties_of lists the sides `user` stands on, both of them for a message sent to oneself
    pub fn parties_of(&self, user: &UserID) -> Vec<Party> {
        let mut parties = Vec::new();
        if &self.sender == user {
            parties.push(Party::Sender);
        }

        if &self.receiver == user {
            parties.push(Party::Receiver);
        }

        parties
    }

    pub fn is_visible_to(&self, party: Party) -> bool {
        self.visibility.is_visible_to(party)
    }

    /// Hides the message from every side `actor` stands on
    pub fn hide_for(&mut self, actor: &UserID) -> Result<(), MessageError> {
        let parties = self.parties_of(actor);
        if parties.is_empty() {
            return Err(MessageError::NotAParty(actor.to_string()));
        }

        self.visibility = parties
            .into_iter()
            .fold(self.visibility, |visibility, party| visibility.hide_from(party));

        Ok(())
    }

    /// mark_delivered returns `true` when the status actually changed
    pub fn mark_delivered(&mut self) -> bool {
        if self.delivery == DeliveryStatus::Delivered {
            return false;
        }

        self.delivery = DeliveryStatus::Delivered;
        true
    }
}

impl ToJSON for Message {
    fn to_json(&self) -> Result<String, BaseError> {
        serde_json::to_string(self).map_err(|e| BaseError::ToJSONError(e.to_string()))
    }
}

impl TryInto<Vec<u8>> for Message {
    type Error = MessageError;

    fn try_into(self) -> Result<Vec<u8>, Self::Error> {
        serde_json::to_vec(&self).map_err(|e| MessageError::EntityError(e.to_string()))
    }
}

impl TryFrom<Vec<u8>> for Message {
    type Error = MessageError;

    fn try_from(bytes: Vec<u8>) -> Result<Self, Self::Error> {
        serde_json::from_slice(&bytes).map_err(|e| MessageError::EntityError(e.to_string()))
    }
}
