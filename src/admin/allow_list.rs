//! Admin allow-list.
//!
//! Membership is a plain string comparison against the configured entries.
//! Nothing here proves the caller controls the address.

use crate::config::AdminConfig;

/// Addresses allowed to use admin operations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdminAllowList {
    addresses: Vec<String>,
}

impl AdminAllowList {
    pub fn new(addresses: Vec<String>) -> Self {
        let addresses = addresses
            .into_iter()
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty())
            .collect();
        Self { addresses }
    }

    pub fn from_config(config: &AdminConfig) -> Self {
        Self::new(config.addresses.clone())
    }

    /// Exact, case-sensitive membership. Used to authorize minting.
    pub fn contains_exact(&self, address: &str) -> bool {
        self.addresses.iter().any(|a| a == address)
    }

    /// Membership of the address as given or in its lowercase form. Used for
    /// status and profile lookups.
    pub fn is_admin(&self, address: &str) -> bool {
        self.contains_exact(address) || self.contains_exact(&address.to_lowercase())
    }

    /// Number of configured admins. The entries themselves are never exposed.
    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list() -> AdminAllowList {
        AdminAllowList::new(vec![" 0xabc ".to_string(), String::new(), "0xDEF".to_string()])
    }

    #[test]
    fn test_entries_are_trimmed_and_empties_dropped() {
        let admins = list();
        assert_eq!(admins.len(), 2);
        assert!(admins.contains_exact("0xabc"));
    }

    #[test]
    fn test_exact_membership_is_case_sensitive() {
        let admins = list();
        assert!(admins.contains_exact("0xDEF"));
        assert!(!admins.contains_exact("0xdef"));
        assert!(!admins.contains_exact("0xABC"));
    }

    #[test]
    fn test_is_admin_accepts_lowercase_form() {
        let admins = list();
        assert!(admins.is_admin("0xABC"));
        assert!(admins.is_admin("0xDEF"));
        // The lowercase form of a stored mixed-case entry does not match it.
        assert!(!admins.is_admin("0xdef"));
        assert!(!admins.is_admin("0x1"));
    }

    #[test]
    fn test_empty_list() {
        let admins = AdminAllowList::from_config(&AdminConfig::default());
        assert!(admins.is_empty());
        assert!(!admins.is_admin("0x1"));
    }
}
