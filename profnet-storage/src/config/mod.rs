//! `config` maps the TOML configuration file of the storage layer
//!
//! ```toml
//! [database.common]
//! path = "./profnet-storage"
//! cf_name = "profnet-cf"
//!
//! [database.db]
//! create_if_missing = true
//! create_missing_columns = true
//! set_error_if_exists = false
//! set_wal_dir = "./profnet-wal"
//!
//! [policy]
//! max_hops = 3
//! open_network_threshold = 5
//! ```
mod database;
pub use database::{Database, RocksDBCommon, RocksDBOptions};

mod policy;
pub use policy::Policy;

mod config;
pub use config::Config;

mod parser;
pub use parser::Parser;
