use std::collections::HashSet;

use rst_common::with_logging::log::debug;

use crate::shared::types::UserID;

use super::types::{ConnectionError, EdgeStatus, RepoConnectionBuilder};

/// `Graph` is the social graph view over a connection repository
///
/// Accepted edges are undirected here: an edge stored as `alice -> bob` makes `bob` a
/// neighbor of `alice` and `alice` a neighbor of `bob`. Nothing is cached, every call
/// reads the repository again
#[derive(Clone)]
pub struct Graph<TRepo>
where
    TRepo: RepoConnectionBuilder,
{
    repo: TRepo,
}

impl<TRepo> Graph<TRepo>
where
    TRepo: RepoConnectionBuilder,
{
    pub fn new(repo: TRepo) -> Self {
        Self { repo }
    }

    pub async fn accepted_neighbors(
        &self,
        user: &UserID,
    ) -> Result<HashSet<UserID>, ConnectionError> {
        let neighbors = self
            .repo
            .list_accepted(user.to_owned())
            .await?
            .into_iter()
            .filter(|peer| peer != user)
            .collect::<HashSet<UserID>>();

        debug!(
            "[graph:accepted_neighbors] user: {} | neighbors: {}",
            user,
            neighbors.len()
        );

        Ok(neighbors)
    }

    pub async fn has_edge(
        &self,
        a: &UserID,
        b: &UserID,
    ) -> Result<Option<EdgeStatus>, ConnectionError> {
        let edge = self.repo.get_edge(a.to_owned(), b.to_owned()).await?;
        Ok(edge.map(|found| found.get_status()))
    }
}
