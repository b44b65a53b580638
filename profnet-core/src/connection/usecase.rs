use rst_common::standard::async_trait::async_trait;
use rst_common::with_logging::log::{debug, info};

use crate::shared::lock::KeyedLock;
use crate::shared::types::UserID;

use super::edge::ConnectionEdge;
use super::graph::Graph;
use super::reachability::Authorizer;
use super::types::{
    ConnectionAPI, ConnectionError, Decision, EdgeStatus, ReachabilityPolicy, RepoConnectionBuilder,
    RespondOutcome, SendOutcome, UsecaseBuilder,
};

const LOCK_PREFIX_EDGE: &str = "connection_edge";

/// `Usecase` is base logic implementation for the [`ConnectionAPI`]
///
/// It drives the lifecycle of a connection request between two users:
///
/// ```text
/// None -> Pending(initiator) -> Accepted | Rejected
/// ```
///
/// Every read-decide-write sequence runs while holding the lock of the unordered pair it
/// touches, so two concurrent requests between the same users can never both observe an
/// empty pair and write two pending edges
#[derive(Clone)]
pub struct Usecase<TRepo>
where
    TRepo: RepoConnectionBuilder,
{
    repo: TRepo,
    graph: Graph<TRepo>,
    authorizer: Authorizer<TRepo>,
    locks: KeyedLock,
}

impl<TRepo> Usecase<TRepo>
where
    TRepo: RepoConnectionBuilder,
{
    pub fn new(repo: TRepo, policy: ReachabilityPolicy, locks: KeyedLock) -> Self {
        Self {
            graph: Graph::new(repo.clone()),
            authorizer: Authorizer::new(repo.clone(), policy),
            repo,
            locks,
        }
    }

    fn validate_pair(a: &UserID, b: &UserID) -> Result<(), ConnectionError> {
        if a.is_blank() || b.is_blank() {
            return Err(ConnectionError::ValidationError(
                "user id must not be empty".to_string(),
            ));
        }

        if a == b {
            return Err(ConnectionError::ValidationError(format!(
                "user {} cannot be connected to itself",
                a
            )));
        }

        Ok(())
    }

    fn validate_user(user: &UserID) -> Result<(), ConnectionError> {
        if user.is_blank() {
            return Err(ConnectionError::ValidationError(
                "user id must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    fn lock_key(a: &UserID, b: &UserID) -> String {
        format!("{}:{}", LOCK_PREFIX_EDGE, ConnectionEdge::pair_key(a, b))
    }

    async fn list_pending(
        &self,
        user: UserID,
        initiated_by_user: bool,
    ) -> Result<Vec<ConnectionEdge>, ConnectionError> {
        Self::validate_user(&user)?;

        let mut edges = self
            .repo
            .list_edges(user.clone())
            .await?
            .into_iter()
            .filter(|edge| edge.is_pending())
            .filter(|edge| edge.is_initiated_by(&user) == initiated_by_user)
            .collect::<Vec<ConnectionEdge>>();

        edges.sort_by_key(|edge| edge.get_created_at());
        Ok(edges)
    }
}

impl<TRepo> UsecaseBuilder for Usecase<TRepo>
where
    TRepo: RepoConnectionBuilder,
{
    type RepoImplementer = TRepo;

    fn repo(&self) -> Self::RepoImplementer {
        self.repo.clone()
    }

    fn policy(&self) -> ReachabilityPolicy {
        self.authorizer.policy()
    }
}

#[async_trait]
impl<TRepo> ConnectionAPI for Usecase<TRepo>
where
    TRepo: RepoConnectionBuilder,
{
    async fn send_request(
        &self,
        requester: UserID,
        target: UserID,
    ) -> Result<SendOutcome, ConnectionError> {
        Self::validate_pair(&requester, &target)?;

        let _guard = self
            .locks
            .acquire(Self::lock_key(&requester, &target))
            .await;

        let existing = self
            .repo
            .get_edge(requester.clone(), target.clone())
            .await?;

        let outcome = match existing {
            Some(edge) if edge.get_status() == EdgeStatus::Accepted => SendOutcome::AlreadyConnected,
            Some(edge) if edge.get_status() == EdgeStatus::Rejected => SendOutcome::Declined,
            Some(edge) if edge.is_initiated_by(&requester) => SendOutcome::AlreadyRequested,
            Some(mut edge) => {
                edge.resolve(Decision::Accept)?;
                self.repo.put_edge(&edge).await?;
                SendOutcome::MutuallyAccepted
            }
            None => {
                let allowed = self.authorizer.authorize(&requester, &target).await?;
                if allowed {
                    let edge = ConnectionEdge::request(requester.clone(), target.clone());
                    self.repo.put_edge(&edge).await?;
                    SendOutcome::Sent
                } else {
                    SendOutcome::OutOfRange
                }
            }
        };

        info!(
            "[connection:send_request] requester: {} | target: {} | outcome: {:?}",
            requester, target, outcome
        );

        Ok(outcome)
    }

    async fn respond(
        &self,
        responder: UserID,
        initiator: UserID,
        decision: Decision,
    ) -> Result<RespondOutcome, ConnectionError> {
        Self::validate_pair(&responder, &initiator)?;

        let _guard = self
            .locks
            .acquire(Self::lock_key(&responder, &initiator))
            .await;

        let edge = self
            .repo
            .get_edge(initiator.clone(), responder.clone())
            .await?
            .filter(|edge| edge.is_pending())
            .filter(|edge| edge.is_initiated_by(&initiator));

        let outcome = match edge {
            Some(mut pending) => {
                pending.resolve(decision)?;
                self.repo.put_edge(&pending).await?;
                RespondOutcome::Applied
            }
            None => RespondOutcome::NoSuchPendingEdge,
        };

        info!(
            "[connection:respond] responder: {} | initiator: {} | decision: {:?} | outcome: {:?}",
            responder, initiator, decision, outcome
        );

        Ok(outcome)
    }

    async fn can_request(
        &self,
        requester: UserID,
        target: UserID,
    ) -> Result<bool, ConnectionError> {
        Self::validate_pair(&requester, &target)?;
        self.authorizer.authorize(&requester, &target).await
    }

    async fn get_edge_status(
        &self,
        a: UserID,
        b: UserID,
    ) -> Result<Option<EdgeStatus>, ConnectionError> {
        Self::validate_pair(&a, &b)?;
        self.graph.has_edge(&a, &b).await
    }

    async fn list_friends(&self, user: UserID) -> Result<Vec<UserID>, ConnectionError> {
        Self::validate_user(&user)?;

        let mut friends = self
            .graph
            .accepted_neighbors(&user)
            .await?
            .into_iter()
            .collect::<Vec<UserID>>();

        friends.sort();
        debug!(
            "[connection:list_friends] user: {} | total: {}",
            user,
            friends.len()
        );

        Ok(friends)
    }

    async fn list_incoming_requests(
        &self,
        user: UserID,
    ) -> Result<Vec<ConnectionEdge>, ConnectionError> {
        self.list_pending(user, false).await
    }

    async fn list_outgoing_requests(
        &self,
        user: UserID,
    ) -> Result<Vec<ConnectionEdge>, ConnectionError> {
        self.list_pending(user, true).await
    }
}
