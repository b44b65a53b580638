use rst_common::standard::chrono::serde::ts_seconds;
use rst_common::standard::chrono::{DateTime, Utc};
use rst_common::standard::serde::{self, Deserialize, Serialize};
use rst_common::standard::serde_json;

use rstdev_domain::entity::ToJSON;
use rstdev_domain::BaseError;

use crate::shared::types::UserID;

use super::types::{ConnectionError, Decision, EdgeStatus};

const PAIR_SEPARATOR: &str = "|";

/// ConnectionEdge is the record of a connection request between two users
///
/// The edge is directed as stored, `requester` is the user who sent the request. Once it is
/// [`EdgeStatus::Accepted`] it is traversed from both endpoints. The edge is never removed,
/// its status is the terminal record of the pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(crate = "self::serde")]
pub struct ConnectionEdge {
    requester: UserID,
    target: UserID,
    status: EdgeStatus,

    #[serde(with = "ts_seconds")]
    created_at: DateTime<Utc>,

    #[serde(with = "ts_seconds")]
    updated_at: DateTime<Utc>,
}

impl ConnectionEdge {
    /// Creates a fresh pending request from `requester` toward `target`
    pub fn request(requester: UserID, target: UserID) -> Self {
        let now = Utc::now();
        Self {
            requester,
            target,
            status: EdgeStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    /// pair_key builds the storage key of an unordered pair, `pair_key(a, b) == pair_key(b, a)`
    ///
    /// Each id is prefixed with its byte length, so ids containing the separator can never
    /// produce the key of another pair
    pub fn pair_key(a: &UserID, b: &UserID) -> String {
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        format!(
            "{}:{}{}{}:{}",
            low.as_str().len(),
            low.as_str(),
            PAIR_SEPARATOR,
            high.as_str().len(),
            high.as_str()
        )
    }

    pub fn get_pair_key(&self) -> String {
        Self::pair_key(&self.requester, &self.target)
    }

    pub fn get_requester(&self) -> &UserID {
        &self.requester
    }

    pub fn get_target(&self) -> &UserID {
        &self.target
    }

    pub fn get_status(&self) -> EdgeStatus {
        self.status
    }

    pub fn get_created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn get_updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn is_initiated_by(&self, user: &UserID) -> bool {
        &self.requester == user
    }

    pub fn is_pending(&self) -> bool {
        self.status == EdgeStatus::Pending
    }

    /// connects is `true` when the endpoints of this edge are exactly `a` and `b`, in any order
    pub fn connects(&self, a: &UserID, b: &UserID) -> bool {
        (&self.requester == a && &self.target == b) || (&self.requester == b && &self.target == a)
    }

    /// peer_of returns the other endpoint when `user` is part of this edge
    pub fn peer_of(&self, user: &UserID) -> Option<&UserID> {
        if &self.requester == user {
            return Some(&self.target);
        }

        if &self.target == user {
            return Some(&self.requester);
        }

        None
    }

    /// Moves a pending edge into the terminal status matching the given decision
    pub fn resolve(&mut self, decision: Decision) -> Result<(), ConnectionError> {
        let next = EdgeStatus::from(decision);
        if self.status.is_terminal() {
            return Err(ConnectionError::InvalidStateTransition {
                from: self.status,
                to: next,
            });
        }

        self.status = next;
        self.updated_at = Utc::now();
        Ok(())
    }
}

impl ToJSON for ConnectionEdge {
    fn to_json(&self) -> Result<String, BaseError> {
        serde_json::to_string(self).map_err(|e| BaseError::ToJSONError(e.to_string()))
    }
}

impl TryInto<Vec<u8>> for ConnectionEdge {
    type Error = ConnectionError;

    fn try_into(self) -> Result<Vec<u8>, Self::Error> {
        serde_json::to_vec(&self).map_err(|e| ConnectionError::EntityError(e.to_string()))
    }
}

impl TryFrom<Vec<u8>> for ConnectionEdge {
    type Error = ConnectionError;

    fn try_from(bytes: Vec<u8>) -> Result<Self, Self::Error> {
        serde_json::from_slice(&bytes).map_err(|e| ConnectionError::EntityError(e.to_string()))
    }
}
