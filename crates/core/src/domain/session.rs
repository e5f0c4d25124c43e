use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::Module;

/// What the logged-in user is allowed to fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct Entitlements {
    #[serde(default)]
    pub active_modules: BTreeSet<Module>,
    #[serde(default)]
    pub premium: bool,
}

impl Entitlements {
    pub fn new<I, M>(modules: I) -> Self
    where
        I: IntoIterator<Item = M>,
        M: Into<Module>,
    {
        Self {
            active_modules: modules.into_iter().map(Into::into).collect(),
            premium: false,
        }
    }

    pub fn with_premium(mut self, premium: bool) -> Self {
        self.premium = premium;
        self
    }

    pub fn is_active(&self, module: &Module) -> bool {
        self.active_modules.contains(module)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entitlements_default_is_empty() {
        let entitlements = Entitlements::default();

        assert!(entitlements.active_modules.is_empty());
        assert!(!entitlements.premium);
    }

    #[test]
    fn test_is_active() {
        let entitlements = Entitlements::new(["uniswap", "compound"]).with_premium(true);

        assert!(entitlements.is_active(&Module::new("uniswap")));
        assert!(!entitlements.is_active(&Module::new("aave")));
        assert!(entitlements.premium);
    }
}
