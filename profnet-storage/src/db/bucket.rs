use rst_common::standard::serde::de::DeserializeOwned;
use rst_common::standard::serde::{self, Deserialize, Serialize};
use rst_common::standard::serde_json;

use rstdev_domain::entity::ToJSON;
use rstdev_domain::BaseError;

use super::types::DbError;

/// Bucket is a JSON encoded collection stored under a single key
///
/// It backs the secondary indexes of the repositories, a bucket never holds the same item twice
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(crate = "self::serde")]
pub struct Bucket<T>
where
    T: Serialize,
{
    collections: Vec<T>,
}

impl<T> Bucket<T>
where
    T: Serialize + DeserializeOwned + PartialEq,
{
    pub fn new() -> Self {
        Self {
            collections: Vec::new(),
        }
    }

    /// add returns `false` when the item was already part of the bucket
    pub fn add(&mut self, val: T) -> bool {
        if self.collections.contains(&val) {
            return false;
        }

        self.collections.push(val);
        true
    }

    pub fn contains(&self, val: &T) -> bool {
        self.collections.contains(val)
    }

    pub fn len(&self) -> usize {
        self.collections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collections.is_empty()
    }

    pub fn items(&self) -> &[T] {
        &self.collections
    }
}

impl<T> TryInto<Vec<u8>> for Bucket<T>
where
    T: Serialize,
{
    type Error = DbError;

    fn try_into(self) -> Result<Vec<u8>, Self::Error> {
        serde_json::to_vec(&self).map_err(|err| DbError::BucketError(err.to_string()))
    }
}

impl<T> TryFrom<Vec<u8>> for Bucket<T>
where
    T: Serialize + DeserializeOwned,
{
    type Error = DbError;

    fn try_from(value: Vec<u8>) -> Result<Self, Self::Error> {
        serde_json::from_slice(&value).map_err(|err| DbError::BucketError(err.to_string()))
    }
}

impl<T> ToJSON for Bucket<T>
where
    T: Serialize,
{
    fn to_json(&self) -> Result<String, BaseError> {
        serde_json::to_string(&self).map_err(|err| BaseError::ToJSONError(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use profnet_core::shared::types::UserID;

    #[test]
    fn test_add_skips_duplicates() {
        let mut bucket: Bucket<UserID> = Bucket::new();

        assert!(bucket.add(UserID::from("alice")));
        assert!(bucket.add(UserID::from("bob")));
        assert!(!bucket.add(UserID::from("alice")));

        assert_eq!(bucket.len(), 2);
        assert!(bucket.contains(&UserID::from("bob")));
        assert!(!bucket.contains(&UserID::from("carol")));
    }

    #[test]
    fn test_from_json() {
        let mut bucket: Bucket<UserID> = Bucket::new();
        bucket.add(UserID::from("alice"));
        bucket.add(UserID::from("bob"));

        let json_builder = bucket.to_json();
        assert!(json_builder.is_ok());

        let from_json: Result<Bucket<UserID>, DbError> =
            json_builder.unwrap().as_bytes().to_vec().try_into();

        let restored = from_json.unwrap();
        assert_eq!(
            restored.items(),
            &[UserID::from("alice"), UserID::from("bob")]
        );
    }

    #[test]
    fn test_invalid_bytes() {
        let from_bytes: Result<Bucket<UserID>, DbError> = b"{}".to_vec().try_into();
        assert!(matches!(from_bytes.unwrap_err(), DbError::BucketError(_)));
    }
}
