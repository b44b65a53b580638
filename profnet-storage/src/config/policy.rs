use rst_common::standard::serde::{self, Deserialize};

use profnet_core::connection::types::{
    ReachabilityPolicy, DEFAULT_MAX_HOPS, DEFAULT_OPEN_NETWORK_THRESHOLD,
};

use crate::common::types::{CommonError, ToValidate};

/// `[policy]`, degree of separation rules applied to connection requests
///
/// The whole section and each of its keys are optional
#[derive(Deserialize, Debug, Clone)]
#[serde(crate = "self::serde", default)]
pub struct Policy {
    pub(super) max_hops: usize,
    pub(super) open_network_threshold: usize,
}

impl Policy {
    pub fn get_max_hops(&self) -> usize {
        self.max_hops
    }

    pub fn get_open_network_threshold(&self) -> usize {
        self.open_network_threshold
    }
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            max_hops: DEFAULT_MAX_HOPS,
            open_network_threshold: DEFAULT_OPEN_NETWORK_THRESHOLD,
        }
    }
}

impl From<Policy> for ReachabilityPolicy {
    fn from(value: Policy) -> Self {
        ReachabilityPolicy::new(value.max_hops, value.open_network_threshold)
    }
}

impl ToValidate for Policy {
    fn validate(&self) -> Result<(), CommonError> {
        if self.max_hops < 1 {
            return Err(CommonError::ValidationError(
                "config: policy:max_hops must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstdev_config::format::use_toml;
    use rstdev_config::parser::from_file;
    use rstdev_config::{types::ConfigError, Builder};

    use table_test::table_test;

    use crate::common::helpers;
    use crate::common::helpers::testdb::fixture;

    #[test]
    fn test_parse_policy_config() -> Result<(), ConfigError> {
        let config_toml: Result<Policy, ConfigError> =
            Builder::new(from_file(fixture("config_policy.toml")))
                .fetch()?
                .parse(use_toml);

        let policy = config_toml?;
        assert_eq!(policy.get_max_hops(), 2);
        assert_eq!(policy.get_open_network_threshold(), 10);

        let reachability = ReachabilityPolicy::from(policy);
        assert_eq!(reachability, ReachabilityPolicy::new(2, 10));
        Ok(())
    }

    #[test]
    fn test_default_policy() {
        let policy = Policy::default();
        assert!(helpers::validate(policy.clone()).is_ok());
        assert_eq!(
            ReachabilityPolicy::from(policy),
            ReachabilityPolicy::default()
        );
    }

    #[test]
    fn test_policy_validation() {
        let table = vec![((0, 5), false), ((1, 0), true), ((3, 5), true)];

        for (validator, (max_hops, open_network_threshold), expected) in table_test!(table) {
            let policy = Policy {
                max_hops,
                open_network_threshold,
            };

            let validation = helpers::validate(policy);
            if let Err(err) = &validation {
                assert!(err.to_string().contains("policy:max_hops"));
            }

            validator
                .given(&format!("max_hops: {}", max_hops))
                .when("validate the policy")
                .then(&format!("valid: {}", expected))
                .assert_eq(expected, validation.is_ok());
        }
    }
}
