use rst_common::with_logging::log::info;
use rst_common::with_tracing::tracing_subscriber::{
    self, layer::SubscriberExt, util::SubscriberInitExt,
};

use rstdev_storage::engine::rocksdb::executor::Executor;

use profnet_core::connection::types::ReachabilityPolicy;
use profnet_core::connection::usecase::Usecase as ConnectionUsecase;
use profnet_core::message::usecase::Usecase as MessageUsecase;
use profnet_core::shared::lock::KeyedLock;

use crate::common::types::CommonError;
use crate::config::{Config, Parser};
use crate::db::Builder as DbBuilder;
use crate::repository::connection::Repository as ConnectionRepository;
use crate::repository::message::Repository as MessageRepository;

const DEFAULT_LOG_FILTER: &str = "profnet_storage=debug,profnet_core=debug";

pub type ConnectionService = ConnectionUsecase<ConnectionRepository>;
pub type MessageService = MessageUsecase<MessageRepository>;

/// Installs the global tracing subscriber, `RUST_LOG` overrides the default filter
///
/// Calling it again once a subscriber is installed does nothing
pub fn setup_tracing() {
    let installed = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer().without_time())
        .try_init();

    if installed.is_ok() {
        info!("[profnet:setup_tracing] tracing subscriber installed");
    }
}

/// `Profnet` wires the configuration, the database and the usecases together
///
/// Every service built from the same `Profnet` shares one [`KeyedLock`], so the connection
/// and message workflows stay serialized per record across clones
pub struct Profnet {
    config: Config,
    db: Executor,
    locks: KeyedLock,
}

impl Profnet {
    /// Loads the configuration and opens the database, logging stays untouched until the
    /// caller installs a subscriber with [`setup_tracing`]
    pub fn new(config_path: &str) -> Result<Self, CommonError> {
        let config = Parser::new(config_path.to_string()).load()?;
        let db = DbBuilder::new(config.clone()).build()?;

        info!("[profnet:new] profnet is ready | config: {}", config_path);
        Ok(Self {
            config,
            db,
            locks: KeyedLock::new(),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn policy(&self) -> ReachabilityPolicy {
        ReachabilityPolicy::from(self.config.policy().to_owned())
    }

    pub fn connection(&self) -> ConnectionService {
        let repo = ConnectionRepository::new(self.db.clone(), self.locks.clone());
        ConnectionUsecase::new(repo, self.policy(), self.locks.clone())
    }

    pub fn message(&self) -> MessageService {
        let repo = MessageRepository::new(self.db.clone(), self.locks.clone());
        MessageUsecase::new(repo, self.locks.clone())
    }
}
