use std::collections::HashSet;

use rst_common::with_logging::log::debug;

use crate::shared::types::UserID;

use super::graph::Graph;
use super::types::{ConnectionError, ReachabilityPolicy, RepoConnectionBuilder};

/// `Reach` explains an authorization decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reach {
    /// the requester has fewer accepted neighbors than the open network threshold
    Open,
    /// the target was found this many hops away
    Within(usize),
    /// the target was not found inside the hop bound
    OutOfRange,
}

impl Reach {
    pub fn is_allowed(&self) -> bool {
        !matches!(self, Reach::OutOfRange)
    }
}

/// `Authorizer` decides whether a requester may send a connection request to a target
///
/// The search is a breadth first traversal over accepted edges bounded by
/// [`ReachabilityPolicy::max_hops`]. A visited set guarantees that each user is expanded
/// at most once, so the search terminates on any finite graph, cycles included
#[derive(Clone)]
pub struct Authorizer<TRepo>
where
    TRepo: RepoConnectionBuilder,
{
    graph: Graph<TRepo>,
    policy: ReachabilityPolicy,
}

impl<TRepo> Authorizer<TRepo>
where
    TRepo: RepoConnectionBuilder,
{
    pub fn new(repo: TRepo, policy: ReachabilityPolicy) -> Self {
        Self {
            graph: Graph::new(repo),
            policy,
        }
    }

    pub fn policy(&self) -> ReachabilityPolicy {
        self.policy
    }

    pub async fn authorize(
        &self,
        requester: &UserID,
        target: &UserID,
    ) -> Result<bool, ConnectionError> {
        let reach = self.search(requester, target).await?;
        Ok(reach.is_allowed())
    }

    pub async fn search(
        &self,
        requester: &UserID,
        target: &UserID,
    ) -> Result<Reach, ConnectionError> {
        let neighbors = self.graph.accepted_neighbors(requester).await?;
        if neighbors.len() < self.policy.open_network_threshold {
            debug!(
                "[reachability:search] open network | requester: {} | neighbors: {}",
                requester,
                neighbors.len()
            );
            return Ok(Reach::Open);
        }

        let mut visited: HashSet<UserID> = HashSet::new();
        visited.insert(requester.to_owned());

        let mut frontier: Vec<UserID> = Vec::new();
        for neighbor in neighbors {
            if visited.insert(neighbor.clone()) {
                frontier.push(neighbor);
            }
        }

        let mut depth = 1;
        loop {
            if frontier.iter().any(|user| user == target) {
                debug!(
                    "[reachability:search] found | requester: {} | target: {} | hops: {}",
                    requester, target, depth
                );
                return Ok(Reach::Within(depth));
            }

            if depth >= self.policy.max_hops || frontier.is_empty() {
                break;
            }

            let mut next: Vec<UserID> = Vec::new();
            for user in frontier.iter() {
                let peers = self.graph.accepted_neighbors(user).await?;
                for peer in peers {
                    if visited.insert(peer.clone()) {
                        next.push(peer);
                    }
                }
            }

            frontier = next;
            depth += 1;
        }

        debug!(
            "[reachability:search] out of range | requester: {} | target: {} | visited: {}",
            requester,
            target,
            visited.len()
        );

        Ok(Reach::OutOfRange)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::mock;
    use mockall::predicate::eq;
    use rst_common::standard::async_trait::async_trait;
    use rst_common::with_tokio::tokio;

    use crate::connection::edge::ConnectionEdge;
    use crate::shared::fakes::FakeConnectionRepo;

    mock!(
        FakeRepo{}

        impl Clone for FakeRepo {
            fn clone(&self) -> Self;
        }

        #[async_trait]
        impl RepoConnectionBuilder for FakeRepo {
            async fn get_edge(&self, a: UserID, b: UserID) -> Result<Option<ConnectionEdge>, ConnectionError>;
            async fn list_accepted(&self, user: UserID) -> Result<Vec<UserID>, ConnectionError>;
            async fn list_edges(&self, user: UserID) -> Result<Vec<ConnectionEdge>, ConnectionError>;
            async fn put_edge(&self, edge: &ConnectionEdge) -> Result<(), ConnectionError>;
        }
    );

    fn ids(names: &[&str]) -> Vec<UserID> {
        names.iter().map(|name| UserID::from(*name)).collect()
    }

    fn user(name: &str) -> UserID {
        UserID::from(name)
    }

    #[tokio::test]
    async fn test_open_network_fast_path() {
        let repo = FakeConnectionRepo::new();
        for friend in ["b", "c", "d", "e"] {
            repo.connect("a", friend).await;
        }

        let authorizer = Authorizer::new(repo, ReachabilityPolicy::default());
        let reach = authorizer.search(&user("a"), &user("f")).await;
        assert_eq!(reach.unwrap(), Reach::Open);

        let allowed = authorizer.authorize(&user("a"), &user("f")).await;
        assert!(allowed.unwrap());
    }

    #[tokio::test]
    async fn test_out_of_range_with_five_neighbors() {
        let repo = FakeConnectionRepo::new();
        for friend in ["b", "c", "d", "e", "f"] {
            repo.connect("a", friend).await;
        }

        // g is reachable only at four hops: a - b - x - y - g
        repo.connect("b", "x").await;
        repo.connect("x", "y").await;
        repo.connect("y", "g").await;

        let authorizer = Authorizer::new(repo, ReachabilityPolicy::default());
        let allowed = authorizer.authorize(&user("a"), &user("g")).await;
        assert!(!allowed.unwrap());
    }

    #[tokio::test]
    async fn test_reachable_at_each_depth() {
        let repo = FakeConnectionRepo::new();
        for friend in ["b", "c", "d", "e", "f"] {
            repo.connect("a", friend).await;
        }

        repo.connect("x", "b").await;
        repo.connect("y", "x").await;

        let authorizer = Authorizer::new(repo, ReachabilityPolicy::default());
        assert_eq!(
            authorizer.search(&user("a"), &user("c")).await.unwrap(),
            Reach::Within(1)
        );
        assert_eq!(
            authorizer.search(&user("a"), &user("x")).await.unwrap(),
            Reach::Within(2)
        );
        assert_eq!(
            authorizer.search(&user("a"), &user("y")).await.unwrap(),
            Reach::Within(3)
        );
    }

    #[tokio::test]
    async fn test_pending_and_rejected_edges_are_not_traversed() {
        let repo = FakeConnectionRepo::new();
        for friend in ["b", "c", "d", "e", "f"] {
            repo.connect("a", friend).await;
        }

        let _ = repo
            .put_edge(&ConnectionEdge::request(user("b"), user("g")))
            .await;

        let authorizer = Authorizer::new(repo, ReachabilityPolicy::default());
        let allowed = authorizer.authorize(&user("a"), &user("g")).await;
        assert!(!allowed.unwrap());
    }

    #[tokio::test]
    async fn test_terminates_on_cycles_and_expands_once() {
        let repo = FakeConnectionRepo::new();

        // a dense cyclic neighborhood: every pair among a..f is connected
        let members = ["a", "b", "c", "d", "e", "f"];
        for (idx, left) in members.iter().enumerate() {
            for right in members.iter().skip(idx + 1) {
                repo.connect(left, right).await;
            }
        }

        let authorizer = Authorizer::new(repo.clone(), ReachabilityPolicy::default());
        let allowed = authorizer.authorize(&user("a"), &user("z")).await;
        assert!(!allowed.unwrap());

        for member in members {
            assert_eq!(repo.neighbor_reads(member), 1, "expanded twice: {}", member);
        }
    }

    #[tokio::test]
    async fn test_each_node_read_once_with_mock() {
        let mut repo = MockFakeRepo::new();

        repo.expect_list_accepted()
            .with(eq(user("a")))
            .times(1)
            .returning(|_| Ok(ids(&["b", "c", "d", "e", "f"])));

        for name in ["b", "c", "d", "e", "f"] {
            repo.expect_list_accepted()
                .with(eq(user(name)))
                .times(1)
                .returning(|_| Ok(ids(&["a", "b", "c", "d", "e", "f"])));
        }

        let authorizer = Authorizer::new(repo, ReachabilityPolicy::default());
        let reach = authorizer.search(&user("a"), &user("g")).await;
        assert_eq!(reach.unwrap(), Reach::OutOfRange);
    }

    #[tokio::test]
    async fn test_custom_policy() {
        let repo = FakeConnectionRepo::new();
        repo.connect("a", "b").await;
        repo.connect("b", "c").await;

        let strict = Authorizer::new(repo.clone(), ReachabilityPolicy::new(1, 0));
        assert!(!strict.authorize(&user("a"), &user("c")).await.unwrap());

        let relaxed = Authorizer::new(repo, ReachabilityPolicy::new(2, 0));
        assert!(relaxed.authorize(&user("a"), &user("c")).await.unwrap());
    }

    #[tokio::test]
    async fn test_storage_error_propagated() {
        let mut repo = MockFakeRepo::new();
        repo.expect_list_accepted()
            .returning(|_| Err(ConnectionError::StorageError("db down".to_string())));

        let authorizer = Authorizer::new(repo, ReachabilityPolicy::default());
        let allowed = authorizer.authorize(&user("a"), &user("b")).await;
        assert!(matches!(
            allowed.unwrap_err(),
            ConnectionError::StorageError(_)
        ));
    }
}
