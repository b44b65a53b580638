use rst_common::standard::serde::{self, Deserialize};

use crate::common::types::{CommonError, ToValidate};

use super::{Database, Policy};

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(crate = "self::serde")]
pub struct Config {
    pub(super) database: Database,

    #[serde(default)]
    pub(super) policy: Policy,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn db(&self) -> &Database {
        &self.database
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }
}

impl ToValidate for Config {
    fn validate(&self) -> Result<(), CommonError> {
        self.database.validate()?;
        self.policy.validate()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::helpers;

    #[test]
    fn test_validation_failed() {
        let cfg = Config::new();
        let validation = helpers::validate(cfg);
        assert!(matches!(
            validation.unwrap_err(),
            CommonError::ValidationError(_)
        ))
    }
}
