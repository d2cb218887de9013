use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Subgraph entities
// ---------------------------------------------------------------------------

/// An `OrderFilled` event from the CTF exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderFilled {
    pub id: String,
    #[serde(default)]
    pub order_hash: String,
    pub maker: String,
    pub taker: String,
    pub maker_asset_id: String,
    pub taker_asset_id: String,
    pub maker_amount_filled: String,
    pub taker_amount_filled: String,
    pub fee: String,
    pub block_timestamp: String,
}

/// An `OrdersMatched` event: one taker order matched against makers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderMatched {
    pub id: String,
    pub maker_asset_id: String,
    pub maker_amount_filled: String,
    pub taker_asset_id: String,
    pub taker_amount_filled: String,
    pub taker_order_hash: String,
    pub taker_order_maker: String,
    pub transaction_hash: String,
    pub block_timestamp: String,
    pub block_number: String,
}

/// A user's balance of one outcome token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPosition {
    pub id: String,
    pub user: String,
    pub token_id: String,
    /// Base units (6 decimals).
    pub amount: String,
}

/// Realized profit of an account in one market.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketProfit {
    pub id: String,
    /// Base units (6 decimals), may be negative.
    pub profit: String,
}

/// Aggregate trading history of one Polymarket account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    pub creation_timestamp: String,
    pub last_seen_timestamp: String,
    pub last_traded_timestamp: String,
    pub collateral_volume: String,
    pub num_trades: String,
    pub profit: String,
    pub scaled_collateral_volume: String,
    #[serde(default)]
    pub market_profits: Vec<MarketProfit>,
}

/// A conditional-token payout redemption.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoutRedemption {
    pub id: String,
    pub payout: String,
    pub block_number: String,
    pub transaction_hash: String,
}

// ---------------------------------------------------------------------------
// Query payloads (the `data` object of each response)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderFilledsData {
    pub order_filleds: Vec<OrderFilled>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrdersMatchedData {
    pub orders_matcheds: Vec<OrderMatched>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPositionsData {
    pub user_positions: Vec<UserPosition>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoutRedemptionsData {
    pub payout_redemptions: Vec<PayoutRedemption>,
}

/// `account` is null when the id is unknown to the subgraph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountData {
    pub account: Option<Account>,
}

// ---------------------------------------------------------------------------
// Trade legs
// ---------------------------------------------------------------------------

/// A record with a maker leg and a taker leg, each an (asset id, amount) pair.
pub trait TradeLegs {
    fn maker_leg(&self) -> (&str, &str);
    fn taker_leg(&self) -> (&str, &str);
    fn block_timestamp(&self) -> &str;
}

impl TradeLegs for OrderFilled {
    fn maker_leg(&self) -> (&str, &str) {
        (&self.maker_asset_id, &self.maker_amount_filled)
    }

    fn taker_leg(&self) -> (&str, &str) {
        (&self.taker_asset_id, &self.taker_amount_filled)
    }

    fn block_timestamp(&self) -> &str {
        &self.block_timestamp
    }
}

impl TradeLegs for OrderMatched {
    fn maker_leg(&self) -> (&str, &str) {
        (&self.maker_asset_id, &self.maker_amount_filled)
    }

    fn taker_leg(&self) -> (&str, &str) {
        (&self.taker_asset_id, &self.taker_amount_filled)
    }

    fn block_timestamp(&self) -> &str {
        &self.block_timestamp
    }
}
