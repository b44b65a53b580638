use rst_common::standard::async_trait::async_trait;
use rst_common::standard::serde::{self, Deserialize, Serialize};
use rst_common::with_errors::thiserror::{self, Error};

use crate::shared::types::UserID;

use super::edge::ConnectionEdge;

/// Default maximum number of accepted-edge hops between a requester and a target
pub const DEFAULT_MAX_HOPS: usize = 3;

/// Default neighbor count under which a requester may request anyone
pub const DEFAULT_OPEN_NETWORK_THRESHOLD: usize = 5;

/// ConnectionError is a base error types for the `Connection` domain
///
/// It will contains any possible errors for the `connection`. Expected business results like
/// an out of range request are not errors, they are reported through [`SendOutcome`] and
/// [`RespondOutcome`]
#[derive(Debug, PartialEq, Error, Serialize, Deserialize, Clone)]
#[serde(crate = "self::serde")]
pub enum ConnectionError {
    #[error("storage error: {0}")]
    StorageError(String),

    #[error("validation error: {0}")]
    ValidationError(String),

    #[error("invalid state transition: {from} -> {to}")]
    InvalidStateTransition { from: EdgeStatus, to: EdgeStatus },

    #[error("entity error: {0}")]
    EntityError(String),
}

/// EdgeStatus represent the lifecycle of a connection between two users
///
/// A connection request always starts as [`EdgeStatus::Pending`]. [`EdgeStatus::Accepted`]
/// and [`EdgeStatus::Rejected`] are terminal for the pair
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(crate = "self::serde")]
pub enum EdgeStatus {
    Pending,
    Accepted,
    Rejected,
}

impl EdgeStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, EdgeStatus::Pending)
    }
}

impl std::fmt::Display for EdgeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EdgeStatus::Pending => write!(f, "pending"),
            EdgeStatus::Accepted => write!(f, "accepted"),
            EdgeStatus::Rejected => write!(f, "rejected"),
        }
    }
}

/// Decision taken by the target of a pending request
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(crate = "self::serde")]
pub enum Decision {
    Accept,
    Reject,
}

impl From<Decision> for EdgeStatus {
    fn from(value: Decision) -> Self {
        match value {
            Decision::Accept => EdgeStatus::Accepted,
            Decision::Reject => EdgeStatus::Rejected,
        }
    }
}

/// Outcome of [`ConnectionAPI::send_request`]
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(crate = "self::serde")]
pub enum SendOutcome {
    /// a new pending edge has been written
    Sent,
    /// the requester already has a pending request toward the target
    AlreadyRequested,
    /// the target had a pending request toward the requester, it is now accepted
    MutuallyAccepted,
    /// the target is outside of the allowed degree of separation
    OutOfRange,
    /// both users are already connected
    AlreadyConnected,
    /// an earlier request between both users was rejected
    Declined,
}

/// Outcome of [`ConnectionAPI::respond`]
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(crate = "self::serde")]
pub enum RespondOutcome {
    Applied,
    NoSuchPendingEdge,
}

/// ReachabilityPolicy holds the degree of separation rules
///
/// - `max_hops`: longest accepted-edge path a requester may reach through
/// - `open_network_threshold`: requesters with fewer accepted neighbors than this
///   are allowed to request anyone
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(crate = "self::serde")]
pub struct ReachabilityPolicy {
    pub max_hops: usize,
    pub open_network_threshold: usize,
}

impl ReachabilityPolicy {
    pub fn new(max_hops: usize, open_network_threshold: usize) -> Self {
        Self {
            max_hops,
            open_network_threshold,
        }
    }
}

impl Default for ReachabilityPolicy {
    fn default() -> Self {
        Self {
            max_hops: DEFAULT_MAX_HOPS,
            open_network_threshold: DEFAULT_OPEN_NETWORK_THRESHOLD,
        }
    }
}

/// ConnectionAPI is main entrypoint to communicate with the `Connection` domain
///
/// Every method takes the acting user explicitly, there is no session state
#[async_trait]
pub trait ConnectionAPI: Clone {
    /// send_request used by `requester` to ask `target` for a connection
    ///
    /// An existing reciprocal pending request is always honored and turned into an accepted
    /// connection, before any reachability check happens
    async fn send_request(
        &self,
        requester: UserID,
        target: UserID,
    ) -> Result<SendOutcome, ConnectionError>;

    /// respond used by `responder` to accept or reject the pending request sent by `initiator`
    async fn respond(
        &self,
        responder: UserID,
        initiator: UserID,
        decision: Decision,
    ) -> Result<RespondOutcome, ConnectionError>;

    /// can_request runs the reachability check only, nothing is written
    async fn can_request(&self, requester: UserID, target: UserID)
        -> Result<bool, ConnectionError>;

    async fn get_edge_status(
        &self,
        a: UserID,
        b: UserID,
    ) -> Result<Option<EdgeStatus>, ConnectionError>;

    /// list_friends returns every user connected to `user` through an accepted edge
    async fn list_friends(&self, user: UserID) -> Result<Vec<UserID>, ConnectionError>;

    /// list_incoming_requests returns pending edges waiting for `user` to respond
    async fn list_incoming_requests(
        &self,
        user: UserID,
    ) -> Result<Vec<ConnectionEdge>, ConnectionError>;

    /// list_outgoing_requests returns pending edges initiated by `user`
    async fn list_outgoing_requests(
        &self,
        user: UserID,
    ) -> Result<Vec<ConnectionEdge>, ConnectionError>;
}

/// RepoConnectionBuilder is a `Connection Repository` abstraction by implementing repository pattern
///
/// An edge is stored once per unordered pair of users. `put_edge` must be an atomic upsert
/// keyed by that pair
#[async_trait]
pub trait RepoConnectionBuilder: Clone + Sync + Send {
    /// get_edge looks up the edge between `a` and `b` regardless of its stored direction
    async fn get_edge(
        &self,
        a: UserID,
        b: UserID,
    ) -> Result<Option<ConnectionEdge>, ConnectionError>;

    /// list_accepted returns the other endpoint of every accepted edge touching `user`
    async fn list_accepted(&self, user: UserID) -> Result<Vec<UserID>, ConnectionError>;

    /// list_edges returns every edge touching `user`, any status, any direction
    async fn list_edges(&self, user: UserID) -> Result<Vec<ConnectionEdge>, ConnectionError>;

    async fn put_edge(&self, edge: &ConnectionEdge) -> Result<(), ConnectionError>;
}

/// `UsecaseBuilder` is a trait behavior that provides
/// base application logic's handlers
pub trait UsecaseBuilder: ConnectionAPI {
    type RepoImplementer: RepoConnectionBuilder;

    fn repo(&self) -> Self::RepoImplementer;
    fn policy(&self) -> ReachabilityPolicy;
}
