//! Static label registry for well-known contracts.
//!
//! Lets the report name the target of an approval or transfer without an
//! external API call. A label says nothing about safety; it only helps the
//! user recognise who they are about to grant access to.

use alloy_primitives::Address;
use std::collections::HashMap;
use std::sync::LazyLock;

/// Contract metadata: protocol name and label.
#[derive(Debug, Clone)]
pub struct ContractLabel {
    pub protocol: &'static str,
    pub name: &'static str,
}

impl ContractLabel {
    const fn new(protocol: &'static str, name: &'static str) -> Self {
        Self { protocol, name }
    }
}

/// Returns the label for a known contract, if any.
pub fn lookup(address: &Address) -> Option<&'static ContractLabel> {
    KNOWN_LABELS.get(address)
}

static KNOWN_LABELS: LazyLock<HashMap<Address, ContractLabel>> = LazyLock::new(|| {
    let mut m = HashMap::new();

    // ── Base ─────────────────────────────────────────────────
    m.insert(
        addr("0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913"),
        ContractLabel::new("USDC", "USD Coin (Base)"),
    );
    m.insert(
        addr("0x4200000000000000000000000000000000000006"),
        ContractLabel::new("WETH", "Wrapped Ether (Base)"),
    );

    // ── Tokens ───────────────────────────────────────────────
    m.insert(
        addr("0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2"),
        ContractLabel::new("WETH", "Wrapped Ether"),
    );
    m.insert(
        addr("0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48"),
        ContractLabel::new("USDC", "USD Coin"),
    );
    m.insert(
        addr("0xdAC17F958D2ee523a2206206994597C13D831ec7"),
        ContractLabel::new("USDT", "Tether USD"),
    );
    m.insert(
        addr("0x6B175474E89094C44Da98b954EedeAC495271d0F"),
        ContractLabel::new("DAI", "Dai Stablecoin"),
    );
    m.insert(
        addr("0x2260FAC5E5542a773Aa44fBCfeDf7C193bc2C599"),
        ContractLabel::new("WBTC", "Wrapped BTC"),
    );

    // ── Approval spenders ────────────────────────────────────
    m.insert(
        addr("0x000000000022D473030F116dDEE9F6B43aC78BA3"),
        ContractLabel::new("Uniswap", "Permit2"),
    );
    m.insert(
        addr("0x3fC91A3afd70395Cd496C647d5a6CC9D4B2b7FAD"),
        ContractLabel::new("Uniswap", "Universal Router"),
    );
    m.insert(
        addr("0x68b3465833fb72A70ecDF485E0e4C7bD8665Fc45"),
        ContractLabel::new("Uniswap", "V3 SwapRouter02"),
    );
    m.insert(
        addr("0x111111125421cA6dc452d289314280a0f8842A65"),
        ContractLabel::new("1inch", "V6 Router"),
    );
    m.insert(
        addr("0xDef1C0ded9bec7F1a1670819833240f027b25EfF"),
        ContractLabel::new("0x Protocol", "Exchange Proxy"),
    );

    // ── NFT marketplaces (setApprovalForAll operators) ───────
    m.insert(
        addr("0x00000000000000ADc04C56Bf30aC9d3c0aAF14dC"),
        ContractLabel::new("OpenSea", "Seaport 1.5"),
    );
    m.insert(
        addr("0x1E0049783F008A0085193E00003D00cd54003c71"),
        ContractLabel::new("OpenSea", "Conduit"),
    );
    m.insert(
        addr("0x000000000000Ad05Ccc4F10045630fb830B95127"),
        ContractLabel::new("Blur", "Marketplace"),
    );

    m
});

fn addr(s: &str) -> Address {
    s.parse().unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_base_usdc() {
        let usdc: Address = "0x833589fcd6edb6e08f4c7c32d4f71b54bda02913"
            .parse()
            .unwrap();
        let label = lookup(&usdc).unwrap();
        assert_eq!(label.protocol, "USDC");
    }

    #[test]
    fn unknown_returns_none() {
        assert!(lookup(&Address::ZERO).is_none());
    }
}
