use rst_common::standard::async_trait::async_trait;
use rst_common::with_logging::log::debug;

use rstdev_storage::engine::rocksdb::executor::Executor;

use profnet_core::connection::edge::ConnectionEdge;
use profnet_core::connection::types::{ConnectionError, EdgeStatus, RepoConnectionBuilder};
use profnet_core::shared::lock::KeyedLock;
use profnet_core::shared::types::UserID;

use super::store;

const CONNECTION_KEY_EDGE: &str = "connection_edge";
const CONNECTION_KEY_INDEX: &str = "connection_index";

/// Repository stores connection edges in RocksDB
///
/// Each edge lives under `connection_edge:<pair>`. Every user also owns an index bucket under
/// `connection_index:<user>` listing the users it shares an edge with, whatever its status
#[derive(Clone)]
pub struct Repository {
    db: Executor,
    locks: KeyedLock,
}

impl Repository {
    pub fn new(db: Executor, locks: KeyedLock) -> Self {
        Self { db, locks }
    }

    fn build_edge_key(a: &UserID, b: &UserID) -> String {
        store::build_key(CONNECTION_KEY_EDGE, &ConnectionEdge::pair_key(a, b))
    }

    fn build_index_key(user: &UserID) -> String {
        store::build_key(CONNECTION_KEY_INDEX, user.as_str())
    }
}

#[async_trait]
impl RepoConnectionBuilder for Repository {
    async fn get_edge(
        &self,
        a: UserID,
        b: UserID,
    ) -> Result<Option<ConnectionEdge>, ConnectionError> {
        let value = store::get_bytes(&self.db, Self::build_edge_key(&a, &b))
            .await
            .map_err(ConnectionError::StorageError)?;

        match value {
            Some(bytes) => {
                let edge = ConnectionEdge::try_from(bytes)?;
                Ok(Some(edge).filter(|edge| edge.connects(&a, &b)))
            }
            None => Ok(None),
        }
    }

    async fn list_accepted(&self, user: UserID) -> Result<Vec<UserID>, ConnectionError> {
        let peers = self
            .list_edges(user.clone())
            .await?
            .iter()
            .filter(|edge| edge.get_status() == EdgeStatus::Accepted)
            .filter_map(|edge| edge.peer_of(&user).cloned())
            .collect();

        Ok(peers)
    }

    async fn list_edges(&self, user: UserID) -> Result<Vec<ConnectionEdge>, ConnectionError> {
        let index = store::get_bucket::<UserID>(&self.db, Self::build_index_key(&user))
            .await
            .map_err(ConnectionError::StorageError)?;

        let keys = index
            .items()
            .iter()
            .map(|peer| Self::build_edge_key(&user, peer))
            .collect::<Vec<String>>();

        let values = store::multi_get(&self.db, keys)
            .await
            .map_err(ConnectionError::StorageError)?;

        let edges = values
            .into_iter()
            .map(ConnectionEdge::try_from)
            .collect::<Result<Vec<ConnectionEdge>, ConnectionError>>()?
            .into_iter()
            .filter(|edge| edge.peer_of(&user).is_some())
            .collect::<Vec<ConnectionEdge>>();

        debug!(
            "[connection:repository] list_edges | user: {} | total: {}",
            user,
            edges.len()
        );

        Ok(edges)
    }

    async fn put_edge(&self, edge: &ConnectionEdge) -> Result<(), ConnectionError> {
        let requester = edge.get_requester().to_owned();
        let target = edge.get_target().to_owned();

        let edge_bytes: Vec<u8> = edge.to_owned().try_into()?;
        store::save_bytes(&self.db, Self::build_edge_key(&requester, &target), edge_bytes)
            .await
            .map_err(ConnectionError::StorageError)?;

        store::append_index(
            &self.db,
            &self.locks,
            Self::build_index_key(&requester),
            target.clone(),
        )
        .await
        .map_err(ConnectionError::StorageError)?;

        store::append_index(
            &self.db,
            &self.locks,
            Self::build_index_key(&target),
            requester,
        )
        .await
        .map_err(ConnectionError::StorageError)?;

        Ok(())
    }
}
