//! Fixed ERC-20 / ERC-721 function catalog.
//!
//! Matching is an ordered sequence of decode attempts: ERC-20 first, then
//! ERC-721. The two interfaces share the `approve` and `transferFrom`
//! selectors, so those always resolve to their ERC-20 reading.

use alloy_primitives::{Address, U256};
use alloy_sol_types::{sol, SolInterface};
use txguard_core::units::format_token_amount;
use txguard_core::{AbiValue, FunctionArgs, KnownFunction, TokenStandard};

sol! {
    interface IERC20 {
        function transfer(address to, uint256 amount) external returns (bool);
        function approve(address spender, uint256 amount) external returns (bool);
        function transferFrom(address from, address to, uint256 amount) external returns (bool);
        function increaseAllowance(address spender, uint256 addedValue) external returns (bool);
    }

    interface IERC721 {
        function approve(address to, uint256 tokenId) external;
        function setApprovalForAll(address operator, bool approved) external;
        function transferFrom(address from, address to, uint256 tokenId) external;
        function safeTransferFrom(address from, address to, uint256 tokenId) external;
    }
}

/// A catalog hit: which function, its named arguments, and a summary line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedCall {
    pub standard: TokenStandard,
    pub function: KnownFunction,
    pub args: FunctionArgs,
    pub summary: String,
}

/// Tries each catalog in order; `None` when no interface decodes cleanly.
///
/// A selector hit whose arguments fail to decode (truncated or malformed
/// calldata) is indistinguishable from a miss.
pub fn match_call(data: &[u8]) -> Option<MatchedCall> {
    match_erc20(data).or_else(|| match_erc721(data))
}

fn match_erc20(data: &[u8]) -> Option<MatchedCall> {
    use IERC20::IERC20Calls as Call;

    let (function, args, summary) = match Call::abi_decode(data).ok()? {
        Call::transfer(c) => (
            KnownFunction::Transfer,
            args([("to", address(c.to)), ("amount", uint(c.amount))]),
            format!(
                "Transfer {} tokens to {}",
                format_token_amount(c.amount),
                c.to
            ),
        ),
        Call::approve(c) => {
            let amount = if c.amount == U256::MAX {
                "unlimited".to_string()
            } else {
                format_token_amount(c.amount)
            };
            (
                KnownFunction::Approve,
                args([("spender", address(c.spender)), ("amount", uint(c.amount))]),
                format!("Approve {amount} tokens for {}", c.spender),
            )
        }
        Call::transferFrom(c) => (
            KnownFunction::TransferFrom,
            args([
                ("from", address(c.from)),
                ("to", address(c.to)),
                ("amount", uint(c.amount)),
            ]),
            format!(
                "Transfer {} tokens from {} to {}",
                format_token_amount(c.amount),
                c.from,
                c.to
            ),
        ),
        Call::increaseAllowance(c) => (
            KnownFunction::IncreaseAllowance,
            args([
                ("spender", address(c.spender)),
                ("addedValue", uint(c.addedValue)),
            ]),
            format!(
                "Increase allowance by {} tokens for {}",
                format_token_amount(c.addedValue),
                c.spender
            ),
        ),
    };

    Some(MatchedCall {
        standard: TokenStandard::Erc20,
        function,
        args,
        summary,
    })
}

fn match_erc721(data: &[u8]) -> Option<MatchedCall> {
    use IERC721::IERC721Calls as Call;

    let (function, args, summary) = match Call::abi_decode(data).ok()? {
        Call::approve(c) => (
            KnownFunction::Approve,
            args([("to", address(c.to)), ("tokenId", uint(c.tokenId))]),
            format!("Approve NFT #{} to {}", c.tokenId, c.to),
        ),
        Call::setApprovalForAll(c) => (
            KnownFunction::SetApprovalForAll,
            args([
                ("operator", address(c.operator)),
                ("approved", AbiValue::Bool(c.approved)),
            ]),
            format!(
                "Set approval for all NFTs: {} for {}",
                if c.approved { "Granted" } else { "Revoked" },
                c.operator
            ),
        ),
        Call::transferFrom(c) => (
            KnownFunction::TransferFrom,
            nft_transfer_args(c.from, c.to, c.tokenId),
            format!("Transfer NFT #{} from {} to {}", c.tokenId, c.from, c.to),
        ),
        Call::safeTransferFrom(c) => (
            KnownFunction::SafeTransferFrom,
            nft_transfer_args(c.from, c.to, c.tokenId),
            format!("Transfer NFT #{} from {} to {}", c.tokenId, c.from, c.to),
        ),
    };

    Some(MatchedCall {
        standard: TokenStandard::Erc721,
        function,
        args,
        summary,
    })
}

fn nft_transfer_args(from: Address, to: Address, token_id: U256) -> FunctionArgs {
    args([
        ("from", address(from)),
        ("to", address(to)),
        ("tokenId", uint(token_id)),
    ])
}

fn args<const N: usize>(pairs: [(&'static str, AbiValue); N]) -> FunctionArgs {
    pairs.into_iter().collect()
}

fn address(a: Address) -> AbiValue {
    AbiValue::Address(a)
}

fn uint(v: U256) -> AbiValue {
    AbiValue::Uint(v)
}
