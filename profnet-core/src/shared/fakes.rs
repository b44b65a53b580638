//! In-memory repositories used by the unit tests of this crate
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use rst_common::standard::async_trait::async_trait;
use rst_common::with_tokio::tokio;

use crate::connection::edge::ConnectionEdge;
use crate::connection::types::{ConnectionError, Decision, EdgeStatus, RepoConnectionBuilder};
use crate::message::message::Message;
use crate::message::types::{MessageError, MessageFilter, MessageID, RepoMessageBuilder};

use super::types::UserID;

#[derive(Clone, Default)]
pub struct FakeConnectionRepo {
    edges: Arc<Mutex<HashMap<String, ConnectionEdge>>>,
    neighbor_reads: Arc<Mutex<HashMap<UserID, usize>>>,
    failing: Arc<AtomicBool>,
}

impl FakeConnectionRepo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores an accepted edge `requester -> target`
    pub async fn connect(&self, requester: &str, target: &str) {
        let mut edge = ConnectionEdge::request(UserID::from(requester), UserID::from(target));
        let _ = edge.resolve(Decision::Accept);
        let _ = self.put_edge(&edge).await;
    }

    pub fn fail_reads(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    pub fn neighbor_reads(&self, user: &str) -> usize {
        self.neighbor_reads
            .lock()
            .unwrap()
            .get(&UserID::from(user))
            .copied()
            .unwrap_or_default()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.lock().unwrap().len()
    }

    fn check(&self) -> Result<(), ConnectionError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(ConnectionError::StorageError("fake storage is down".to_string()));
        }

        Ok(())
    }
}

#[async_trait]
impl RepoConnectionBuilder for FakeConnectionRepo {
    async fn get_edge(
        &self,
        a: UserID,
        b: UserID,
    ) -> Result<Option<ConnectionEdge>, ConnectionError> {
        self.check()?;

        // give concurrent callers a chance to interleave between read and write
        tokio::task::yield_now().await;

        let key = ConnectionEdge::pair_key(&a, &b);
        let edge = self
            .edges
            .lock()
            .unwrap()
            .get(&key)
            .filter(|edge| edge.connects(&a, &b))
            .cloned();

        Ok(edge)
    }

    async fn list_accepted(&self, user: UserID) -> Result<Vec<UserID>, ConnectionError> {
        self.check()?;

        *self
            .neighbor_reads
            .lock()
            .unwrap()
            .entry(user.clone())
            .or_default() += 1;

        let peers = self
            .edges
            .lock()
            .unwrap()
            .values()
            .filter(|edge| edge.get_status() == EdgeStatus::Accepted)
            .filter_map(|edge| edge.peer_of(&user).cloned())
            .collect();

        Ok(peers)
    }

    async fn list_edges(&self, user: UserID) -> Result<Vec<ConnectionEdge>, ConnectionError> {
        self.check()?;

        let edges = self
            .edges
            .lock()
            .unwrap()
            .values()
            .filter(|edge| edge.peer_of(&user).is_some())
            .cloned()
            .collect();

        Ok(edges)
    }

    async fn put_edge(&self, edge: &ConnectionEdge) -> Result<(), ConnectionError> {
        self.edges
            .lock()
            .unwrap()
            .insert(edge.get_pair_key(), edge.to_owned());

        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct FakeMessageRepo {
    messages: Arc<Mutex<HashMap<MessageID, Message>>>,
    failing: Arc<AtomicBool>,
}

impl FakeMessageRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_reads(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    pub fn stored(&self, id: &MessageID) -> Option<Message> {
        self.messages.lock().unwrap().get(id).cloned()
    }

    fn check(&self) -> Result<(), MessageError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(MessageError::StorageError("fake storage is down".to_string()));
        }

        Ok(())
    }
}

#[async_trait]
impl RepoMessageBuilder for FakeMessageRepo {
    async fn get_message(&self, id: MessageID) -> Result<Option<Message>, MessageError> {
        self.check()?;
        tokio::task::yield_now().await;

        Ok(self.messages.lock().unwrap().get(&id).cloned())
    }

    async fn list_messages(&self, filter: MessageFilter) -> Result<Vec<Message>, MessageError> {
        self.check()?;

        let messages = self
            .messages
            .lock()
            .unwrap()
            .values()
            .filter(|message| filter.matches(message))
            .cloned()
            .collect();

        Ok(messages)
    }

    async fn put_message(&self, message: &Message) -> Result<(), MessageError> {
        self.messages
            .lock()
            .unwrap()
            .insert(message.get_id().to_owned(), message.to_owned());

        Ok(())
    }
}
