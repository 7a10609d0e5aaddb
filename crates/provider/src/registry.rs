//! Static reference sets consulted by the heuristics.
//!
//! Built once at startup and shared read-only. Deployments extend the
//! built-in lists from a plain text file instead of a live feed.

use alloy_primitives::{Address, Selector};
use std::collections::HashSet;
use std::path::Path;
use txguard_core::error::{GuardError, GuardResult};

/// Selectors of functions seen in wallet-drainer contracts.
const DRAINER_SELECTORS: &[&str] = &[
    "0xb93073bf", // batch sweep used by drainer kits
];

/// Addresses flagged as malicious. Ships empty; populated per deployment.
const MALICIOUS_ADDRESSES: &[&str] = &[];

/// Immutable lookup tables for the known-malicious and drainer checks.
///
/// Addresses are stored as parsed [`Address`] values so lookups are
/// insensitive to case and checksum formatting.
#[derive(Debug, Clone, Default)]
pub struct ReferenceSets {
    malicious: HashSet<Address>,
    drainer_selectors: HashSet<Selector>,
}

impl ReferenceSets {
    /// The compiled-in lists.
    pub fn builtin() -> Self {
        Self {
            malicious: MALICIOUS_ADDRESSES.iter().copied().map(builtin_address).collect(),
            drainer_selectors: DRAINER_SELECTORS.iter().copied().map(builtin_selector).collect(),
        }
    }

    pub fn with_malicious(mut self, addresses: impl IntoIterator<Item = Address>) -> Self {
        self.malicious.extend(addresses);
        self
    }

    pub fn with_drainer_selectors(mut self, selectors: impl IntoIterator<Item = Selector>) -> Self {
        self.drainer_selectors.extend(selectors);
        self
    }

    /// Adds addresses from a file: one per line, `#` starts a comment.
    pub fn load_malicious_file(self, path: &Path) -> GuardResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            GuardError::InvalidInput(format!("Failed to read {}: {e}", path.display()))
        })?;
        let addresses = parse_address_list(&text)?;
        tracing::info!(
            path = %path.display(),
            count = addresses.len(),
            "loaded malicious address list"
        );
        Ok(self.with_malicious(addresses))
    }

    pub fn is_malicious(&self, address: &Address) -> bool {
        self.malicious.contains(address)
    }

    pub fn is_drainer_selector(&self, selector: &Selector) -> bool {
        self.drainer_selectors.contains(selector)
    }

    pub fn malicious_count(&self) -> usize {
        self.malicious.len()
    }
}

fn parse_address_list(text: &str) -> GuardResult<Vec<Address>> {
    text.lines()
        .enumerate()
        .filter_map(|(i, line)| {
            let entry = line.split('#').next().unwrap_or_default().trim();
            (!entry.is_empty()).then_some((i + 1, entry))
        })
        .map(|(line, entry)| {
            entry.parse::<Address>().map_err(|e| {
                GuardError::InvalidInput(format!("line {line}: {entry:?} is not an address: {e}"))
            })
        })
        .collect()
}

fn builtin_address(s: &str) -> Address {
    s.parse()
        .unwrap_or_else(|e| panic!("builtin malicious address {s:?}: {e}"))
}

fn builtin_selector(s: &str) -> Selector {
    s.parse()
        .unwrap_or_else(|e| panic!("builtin drainer selector {s:?}: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_drainer_selector() {
        let refs = ReferenceSets::builtin();
        let sel: Selector = "0xb93073bf".parse().unwrap();
        assert!(refs.is_drainer_selector(&sel));
        assert!(!refs.is_drainer_selector(&Selector::ZERO));
    }

    #[test]
    fn malicious_lookup_ignores_checksum_case() {
        let flagged: Address = "0x742d35Cc6634C0532925a3b844Bc9e7595f0bEb0".parse().unwrap();
        let refs = ReferenceSets::builtin().with_malicious([flagged]);
        let lower: Address = "0x742d35cc6634c0532925a3b844bc9e7595f0beb0".parse().unwrap();
        assert!(refs.is_malicious(&lower));
        assert!(!refs.is_malicious(&Address::ZERO));
    }

    #[test]
    fn address_list_skips_comments_and_blanks() {
        let text = "# known drainers\n\n0x0000000000000000000000000000000000000001 # sweeper\n  0x0000000000000000000000000000000000000002\n";
        let list = parse_address_list(text).unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0], Address::with_last_byte(1));
    }

    #[test]
    fn builtin_lists_parse() {
        for s in DRAINER_SELECTORS {
            builtin_selector(s);
        }
        for s in MALICIOUS_ADDRESSES {
            builtin_address(s);
        }
    }

    #[test]
    fn load_malicious_file_extends_builtin() {
        let tmp =
            std::env::temp_dir().join(format!("txguard-malicious-{}.txt", std::process::id()));
        std::fs::write(&tmp, "# feed export
0x00000000000000000000000000000000000000aa
")
            .expect("write temp list");

        let refs = ReferenceSets::builtin().load_malicious_file(&tmp);
        std::fs::remove_file(&tmp).ok();

        let refs = refs.expect("list loads");
        assert_eq!(refs.malicious_count(), MALICIOUS_ADDRESSES.len() + 1);
        assert!(refs.is_malicious(&Address::with_last_byte(0xaa)));
        assert!(refs.is_drainer_selector(&"0xb93073bf".parse().unwrap()));
    }

    #[test]
    fn missing_malicious_file_is_invalid_input() {
        let path = std::env::temp_dir().join("txguard-no-such-list.txt");
        let err = ReferenceSets::builtin().load_malicious_file(&path).unwrap_err();
        assert!(matches!(err, GuardError::InvalidInput(_)));
        assert!(err.to_string().contains("Failed to read"));
    }

    #[test]
    fn address_list_reports_bad_line() {
        let err = parse_address_list("0x01\n").unwrap_err();
        assert!(err.to_string().contains("line 1"));
    }
}
