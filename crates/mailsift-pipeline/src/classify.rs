//! Role filtering followed by validation.

use mailsift_core::{AppConfig, Verdict};
use mailsift_roles::{RoleFilter, RoleRules, RoleVerdict};
use mailsift_validator::Validator;

/// Outcome of classifying a first-seen item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// Role mailbox; never reaches the validator
    Role(RoleVerdict),
    /// Validator verdict
    Checked(Verdict),
}

/// Role filter and validator applied in that order.
#[derive(Debug, Clone)]
pub struct Classifier {
    roles: RoleFilter,
    validator: Validator,
}

impl Classifier {
    /// Combine a role filter and a validator.
    #[must_use]
    pub fn new(roles: RoleFilter, validator: Validator) -> Self {
        Self { roles, validator }
    }

    /// Build both stages from configuration.
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            RoleFilter::new(RoleRules::from_config(&config.roles)),
            Validator::from_config(&config.validation),
        )
    }

    /// Classify one item.
    pub async fn classify(&self, raw: &str) -> Classification {
        let role = self.roles.classify(raw);
        if role.role_based {
            return Classification::Role(role);
        }
        Classification::Checked(self.validator.validate(raw).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> Classifier {
        Classifier::new(
            RoleFilter::new(RoleRules::new(["admin"], Vec::<String>::new()).expect("rules")),
            Validator::new(["gmail.com"]),
        )
    }

    #[tokio::test]
    async fn test_role_short_circuits() {
        match classifier().classify("admin@gmail.com").await {
            Classification::Role(v) => assert_eq!(v.reason, "exact: admin"),
            other => panic!("expected role, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_malformed_goes_to_validator() {
        match classifier().classify("not-an-address").await {
            Classification::Checked(v) => assert!(!v.valid_format),
            other => panic!("expected verdict, got {other:?}"),
        }
    }
}
