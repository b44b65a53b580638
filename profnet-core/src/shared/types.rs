use derive_more::{AsRef, Display, From, Into};
use the_newtype::Newtype;

use rst_common::standard::serde::{self, Deserialize, Serialize};

/// `UserID` is the identifier of a network member
///
/// Users are created and authenticated outside of this crate, the core only
/// references them by this identifier
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Newtype,
    From,
    Into,
    AsRef,
    Display,
)]
#[serde(crate = "self::serde")]
pub struct UserID(String);

impl UserID {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl From<&str> for UserID {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}
