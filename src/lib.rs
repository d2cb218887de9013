pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod pages;
pub mod pipeline;
pub mod queries;
pub mod render;
pub mod reporter;
pub mod transform;
pub mod types;
pub mod units;

#[cfg(test)]
pub(crate) mod testing;

/// Gateway-hosted subgraph indexing user positions.
pub const POSITIONS_SUBGRAPH_URL: &str = "https://gateway.thegraph.com/api/da2f1e3f756e36b4ec56026f7aa773a3/subgraphs/id/6c58N5U4MtQE2Y8njfVrrAfRykzfqajMGeTMEvMmskVz";

/// Gateway-hosted subgraph indexing per-account profit and loss.
pub const ACCOUNTS_SUBGRAPH_URL: &str = "https://gateway.thegraph.com/api/da2f1e3f756e36b4ec56026f7aa773a3/subgraphs/id/81Dm16JjuFSrqz813HysXoUPvzTwE7fsfPk2RTf66nyC";

/// Studio subgraph indexing CTF exchange order events (fills and matches).
pub const ORDERBOOK_SUBGRAPH_URL: &str =
    "https://api.studio.thegraph.com/query/92067/polymarket-sf24-v2/version/latest";

/// Studio subgraph indexing conditional-token payout redemptions.
pub const CONDITIONAL_TOKENS_SUBGRAPH_URL: &str =
    "https://api.studio.thegraph.com/query/92068/polymarket_conditional_tokens/version/latest";

/// Account shown by the account page until another address is submitted.
pub const DEFAULT_ACCOUNT: &str = "0x1f2dd6d473f3e824cd2f8a89d9c69fb96f6ad0cf";
