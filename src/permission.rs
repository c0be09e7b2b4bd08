//! Permission oracles

use crate::config::LedgerConfig;
use crate::core::traits::PermissionOracle;
use crate::types::AccountId;
use std::collections::BTreeSet;

/// Fixed set of administrator identities
#[derive(Debug, Clone, Default)]
pub struct StaticAdministrators {
    administrators: BTreeSet<AccountId>,
}

impl StaticAdministrators {
    pub fn new(administrators: impl IntoIterator<Item = AccountId>) -> Self {
        Self {
            administrators: administrators.into_iter().collect(),
        }
    }

    pub fn from_config(config: &LedgerConfig) -> Self {
        Self {
            administrators: config.administrators.clone(),
        }
    }
}

impl PermissionOracle for StaticAdministrators {
    fn is_administrator(&self, identity: AccountId) -> bool {
        self.administrators.contains(&identity)
    }
}
