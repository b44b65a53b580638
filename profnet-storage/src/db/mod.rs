mod types;
pub use types::DbError;

mod bucket;
pub use bucket::Bucket;

mod builder;
pub use builder::Builder;
