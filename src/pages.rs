//! Dashboard pages.
//!
//! Each page is one fixed query against one subgraph, plus the pure mappers
//! that turn its payload into table rows, detail lines, and a chart.

use std::fmt;
use std::str::FromStr;

use chrono::{Local, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tabled::Tabled;
use thiserror::Error;

use crate::DEFAULT_ACCOUNT;
use crate::client::Subgraph;
use crate::queries;
use crate::transform::{
    ProfitSign, SeriesPoint, Slice, SortDirection, SortState, Sortable, TOP_N,
    collateral_volume_series, scaled_series, sort_rows, top_n_with_others,
};
use crate::types::{
    Account, AccountData, OrderFilled, OrderFilledsData, OrderMatched, OrdersMatchedData,
    PayoutRedemption, PayoutRedemptionsData, UserPositionsData,
};
use crate::units::{
    DEFAULT_TIME_FORMAT, LegAmount, SHORT_TIME_FORMAT, format_collateral_field, format_timestamp,
    scale_collateral_f64,
};

// ---------------------------------------------------------------------------
// Page contract
// ---------------------------------------------------------------------------

/// Everything needed to fetch and present one page.
pub trait Page {
    /// The query's `data` object.
    type Payload: DeserializeOwned;
    type Row: Tabled + Serialize;

    const TITLE: &'static str;
    const SUBGRAPH: Subgraph;
    const QUERY: &'static str;

    fn variables(&self) -> Option<Value> {
        None
    }

    fn rows(&self, payload: &Self::Payload) -> Vec<Self::Row>;

    fn chart(&self, payload: &Self::Payload) -> Option<Chart>;

    fn details(&self, _payload: &Self::Payload) -> Vec<Detail> {
        Vec::new()
    }

    /// Message shown instead of data when the payload is empty in a meaningful way.
    fn notice(&self, _payload: &Self::Payload) -> Option<String> {
        None
    }

    fn view(&self, payload: &Self::Payload) -> PageView<Self::Row> {
        PageView {
            title: Self::TITLE,
            notice: self.notice(payload),
            details: self.details(payload),
            rows: self.rows(payload),
            chart: self.chart(payload),
        }
    }
}

/// Transformed, ready-to-render content of a page.
#[derive(Debug, Clone, Serialize)]
pub struct PageView<R> {
    pub title: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<Detail>,
    pub rows: Vec<R>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart: Option<Chart>,
}

/// A labelled scalar shown above the table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Detail {
    pub label: &'static str,
    pub value: String,
}

impl Detail {
    fn new(label: &'static str, value: impl Into<String>) -> Self {
        Self {
            label,
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Chart {
    Line {
        title: &'static str,
        x_label: &'static str,
        y_label: &'static str,
        points: Vec<SeriesPoint>,
    },
    Bar {
        title: &'static str,
        y_label: &'static str,
        bars: Vec<Bar>,
    },
    Donut {
        title: &'static str,
        slices: Vec<Slice>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bar {
    pub label: String,
    pub value: f64,
    pub sign: ProfitSign,
}

/// Time zone used to render block timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayZone {
    #[default]
    Local,
    Utc,
}

impl DisplayZone {
    pub fn format(self, raw: &str, format: &str) -> String {
        match self {
            DisplayZone::Local => format_timestamp(raw, &Local, format),
            DisplayZone::Utc => format_timestamp(raw, &Utc, format),
        }
    }
}

/// `0x1f2dd6…d0cf` style abbreviation for chart labels.
pub fn short_id(id: &str) -> String {
    let chars: Vec<char> = id.chars().collect();
    if chars.len() <= 12 {
        return id.to_string();
    }
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}…{tail}")
}

#[derive(Debug, Error)]
#[error("unknown column `{0}`")]
pub struct UnknownColumn(String);

// ---------------------------------------------------------------------------
// Trades (order fills)
// ---------------------------------------------------------------------------

/// Latest order fills on the CTF exchange.
#[derive(Debug, Clone, Default)]
pub struct TradesPage {
    pub zone: DisplayZone,
}

#[derive(Debug, Clone, Serialize, Tabled)]
pub struct TradeRow {
    #[tabled(rename = "#")]
    pub index: usize,
    #[tabled(rename = "Maker")]
    pub maker: String,
    #[tabled(rename = "Taker")]
    pub taker: String,
    #[tabled(rename = "Maker Asset ID")]
    pub maker_asset_id: String,
    #[tabled(rename = "Taker Asset ID")]
    pub taker_asset_id: String,
    #[tabled(rename = "Maker Amount Filled")]
    pub maker_amount_filled: String,
    #[tabled(rename = "Taker Amount Filled")]
    pub taker_amount_filled: String,
    #[tabled(rename = "Fee")]
    pub fee: String,
    #[tabled(rename = "Timestamp")]
    pub timestamp: String,
}

impl TradesPage {
    fn row(&self, index: usize, fill: &OrderFilled) -> TradeRow {
        TradeRow {
            index: index + 1,
            maker: fill.maker.clone(),
            taker: fill.taker.clone(),
            maker_asset_id: fill.maker_asset_id.clone(),
            taker_asset_id: fill.taker_asset_id.clone(),
            maker_amount_filled: LegAmount::from_leg(&fill.maker_asset_id, &fill.maker_amount_filled)
                .to_string(),
            taker_amount_filled: LegAmount::from_leg(&fill.taker_asset_id, &fill.taker_amount_filled)
                .to_string(),
            fee: fill.fee.clone(),
            timestamp: self.zone.format(&fill.block_timestamp, DEFAULT_TIME_FORMAT),
        }
    }
}

impl Page for TradesPage {
    type Payload = OrderFilledsData;
    type Row = TradeRow;

    const TITLE: &'static str = "Polymarket Trades";
    const SUBGRAPH: Subgraph = Subgraph::Orderbook;
    const QUERY: &'static str = queries::ORDER_FILLEDS;

    fn rows(&self, payload: &OrderFilledsData) -> Vec<TradeRow> {
        payload
            .order_filleds
            .iter()
            .enumerate()
            .map(|(i, fill)| self.row(i, fill))
            .collect()
    }

    fn chart(&self, payload: &OrderFilledsData) -> Option<Chart> {
        Some(Chart::Line {
            title: "USDC Volume per Fill",
            x_label: "Block Timestamp",
            y_label: "USDC",
            points: collateral_volume_series(&payload.order_filleds),
        })
    }
}

// ---------------------------------------------------------------------------
// Orders matched
// ---------------------------------------------------------------------------

/// Sortable columns of the orders-matched table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchedColumn {
    Id,
    MakerAssetId,
    MakerAmountFilled,
    TakerAssetId,
    TakerAmountFilled,
}

impl MatchedColumn {
    fn name(self) -> &'static str {
        match self {
            MatchedColumn::Id => "id",
            MatchedColumn::MakerAssetId => "maker-asset-id",
            MatchedColumn::MakerAmountFilled => "maker-amount-filled",
            MatchedColumn::TakerAssetId => "taker-asset-id",
            MatchedColumn::TakerAmountFilled => "taker-amount-filled",
        }
    }
}

impl fmt::Display for MatchedColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for MatchedColumn {
    type Err = UnknownColumn;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "id" => Ok(MatchedColumn::Id),
            "maker-asset-id" | "makerAssetId" => Ok(MatchedColumn::MakerAssetId),
            "maker-amount-filled" | "makerAmountFilled" => Ok(MatchedColumn::MakerAmountFilled),
            "taker-asset-id" | "takerAssetId" => Ok(MatchedColumn::TakerAssetId),
            "taker-amount-filled" | "takerAmountFilled" => Ok(MatchedColumn::TakerAmountFilled),
            other => Err(UnknownColumn(other.to_string())),
        }
    }
}

impl Sortable for OrderMatched {
    type Key = MatchedColumn;

    fn sort_field(&self, key: MatchedColumn) -> &str {
        match key {
            MatchedColumn::Id => &self.id,
            MatchedColumn::MakerAssetId => &self.maker_asset_id,
            MatchedColumn::MakerAmountFilled => &self.maker_amount_filled,
            MatchedColumn::TakerAssetId => &self.taker_asset_id,
            MatchedColumn::TakerAmountFilled => &self.taker_amount_filled,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OrdersMatchedPage {
    pub sort: SortState<MatchedColumn>,
    pub zone: DisplayZone,
}

impl Default for OrdersMatchedPage {
    fn default() -> Self {
        Self {
            sort: SortState::new(MatchedColumn::MakerAmountFilled, SortDirection::Descending),
            zone: DisplayZone::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Tabled)]
pub struct MatchedRow {
    #[tabled(rename = "ID")]
    pub id: String,
    #[tabled(rename = "Maker Asset ID")]
    pub maker_asset_id: String,
    #[tabled(rename = "Maker Amount Filled")]
    pub maker_amount_filled: String,
    #[tabled(rename = "Taker Asset ID")]
    pub taker_asset_id: String,
    #[tabled(rename = "Taker Amount Filled")]
    pub taker_amount_filled: String,
    #[tabled(rename = "Taker Order Hash")]
    pub taker_order_hash: String,
    #[tabled(rename = "Taker Order Maker")]
    pub taker_order_maker: String,
    #[tabled(rename = "Transaction Hash")]
    pub transaction_hash: String,
    #[tabled(rename = "Block Timestamp")]
    pub block_timestamp: String,
    #[tabled(rename = "Block Number")]
    pub block_number: String,
}

impl Page for OrdersMatchedPage {
    type Payload = OrdersMatchedData;
    type Row = MatchedRow;

    const TITLE: &'static str = "Orders Matched";
    const SUBGRAPH: Subgraph = Subgraph::Orderbook;
    const QUERY: &'static str = queries::ORDERS_MATCHEDS;

    fn rows(&self, payload: &OrdersMatchedData) -> Vec<MatchedRow> {
        let mut orders = payload.orders_matcheds.clone();
        sort_rows(&mut orders, &self.sort);
        orders
            .into_iter()
            .map(|o| MatchedRow {
                maker_amount_filled: LegAmount::from_leg(&o.maker_asset_id, &o.maker_amount_filled)
                    .to_string(),
                taker_amount_filled: LegAmount::from_leg(&o.taker_asset_id, &o.taker_amount_filled)
                    .to_string(),
                block_timestamp: self.zone.format(&o.block_timestamp, DEFAULT_TIME_FORMAT),
                id: o.id,
                maker_asset_id: o.maker_asset_id,
                taker_asset_id: o.taker_asset_id,
                taker_order_hash: o.taker_order_hash,
                taker_order_maker: o.taker_order_maker,
                transaction_hash: o.transaction_hash,
                block_number: o.block_number,
            })
            .collect()
    }

    fn chart(&self, payload: &OrdersMatchedData) -> Option<Chart> {
        Some(Chart::Line {
            title: "USDC Volume per Match",
            x_label: "Block Timestamp",
            y_label: "USDC",
            points: collateral_volume_series(&payload.orders_matcheds),
        })
    }
}

// ---------------------------------------------------------------------------
// User positions
// ---------------------------------------------------------------------------

/// Largest user positions, with a top-5 breakdown.
#[derive(Debug, Clone, Default)]
pub struct PositionsPage;

#[derive(Debug, Clone, Serialize, Tabled)]
pub struct PositionRow {
    #[tabled(rename = "ID")]
    pub id: String,
    #[tabled(rename = "User")]
    pub user: String,
    #[tabled(rename = "Token ID")]
    pub token_id: String,
    #[tabled(rename = "Amount in USDC")]
    pub amount: String,
}

impl Page for PositionsPage {
    type Payload = UserPositionsData;
    type Row = PositionRow;

    const TITLE: &'static str = "User Positions";
    const SUBGRAPH: Subgraph = Subgraph::Positions;
    const QUERY: &'static str = queries::USER_POSITIONS;

    fn rows(&self, payload: &UserPositionsData) -> Vec<PositionRow> {
        payload
            .user_positions
            .iter()
            .map(|p| PositionRow {
                id: p.id.clone(),
                user: p.user.clone(),
                token_id: p.token_id.clone(),
                amount: format_collateral_field(&p.amount),
            })
            .collect()
    }

    fn chart(&self, payload: &UserPositionsData) -> Option<Chart> {
        let slices = payload
            .user_positions
            .iter()
            .map(|p| Slice {
                label: short_id(&p.token_id),
                value: scale_collateral_f64(&p.amount),
            })
            .collect();
        Some(Chart::Donut {
            title: "Largest Positions",
            slices: top_n_with_others(slices, TOP_N),
        })
    }
}

// ---------------------------------------------------------------------------
// Payout redemptions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RedemptionColumn {
    Payout,
    BlockNumber,
}

impl RedemptionColumn {
    fn name(self) -> &'static str {
        match self {
            RedemptionColumn::Payout => "payout",
            RedemptionColumn::BlockNumber => "block-number",
        }
    }
}

impl fmt::Display for RedemptionColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RedemptionColumn {
    type Err = UnknownColumn;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "payout" => Ok(RedemptionColumn::Payout),
            "block-number" | "blockNumber" => Ok(RedemptionColumn::BlockNumber),
            other => Err(UnknownColumn(other.to_string())),
        }
    }
}

impl Sortable for PayoutRedemption {
    type Key = RedemptionColumn;

    fn sort_field(&self, key: RedemptionColumn) -> &str {
        match key {
            RedemptionColumn::Payout => &self.payout,
            RedemptionColumn::BlockNumber => &self.block_number,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RedemptionsPage {
    pub sort: SortState<RedemptionColumn>,
}

impl Default for RedemptionsPage {
    fn default() -> Self {
        Self {
            sort: SortState::new(RedemptionColumn::Payout, SortDirection::Descending),
        }
    }
}

#[derive(Debug, Clone, Serialize, Tabled)]
pub struct RedemptionRow {
    #[tabled(rename = "Payout")]
    pub payout: String,
    #[tabled(rename = "Block Number")]
    pub block_number: String,
    #[tabled(rename = "Transaction Hash")]
    pub transaction_hash: String,
}

impl Page for RedemptionsPage {
    type Payload = PayoutRedemptionsData;
    type Row = RedemptionRow;

    const TITLE: &'static str = "Payout Redemptions";
    const SUBGRAPH: Subgraph = Subgraph::ConditionalTokens;
    const QUERY: &'static str = queries::PAYOUT_REDEMPTIONS;

    fn rows(&self, payload: &PayoutRedemptionsData) -> Vec<RedemptionRow> {
        let mut redemptions = payload.payout_redemptions.clone();
        sort_rows(&mut redemptions, &self.sort);
        redemptions
            .into_iter()
            .map(|r| RedemptionRow {
                payout: format_collateral_field(&r.payout),
                block_number: r.block_number,
                transaction_hash: r.transaction_hash,
            })
            .collect()
    }

    fn chart(&self, payload: &PayoutRedemptionsData) -> Option<Chart> {
        let points = scaled_series(
            payload
                .payout_redemptions
                .iter()
                .map(|r| (r.block_number.as_str(), r.payout.as_str())),
        );
        Some(Chart::Line {
            title: "Payout Amount",
            x_label: "Block Number",
            y_label: "Payout Amount",
            points,
        })
    }
}

// ---------------------------------------------------------------------------
// Account
// ---------------------------------------------------------------------------

/// Profit and loss of one account, looked up by address.
#[derive(Debug, Clone)]
pub struct AccountPage {
    address: String,
    pub zone: DisplayZone,
}

impl AccountPage {
    /// Addresses are indexed lowercase; input is normalized accordingly.
    pub fn new(address: &str) -> Self {
        Self {
            address: address.trim().to_lowercase(),
            zone: DisplayZone::default(),
        }
    }

    pub fn with_zone(mut self, zone: DisplayZone) -> Self {
        self.zone = zone;
        self
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    fn account_details(&self, account: &Account) -> Vec<Detail> {
        vec![
            Detail::new("ID", account.id.clone()),
            Detail::new(
                "Creation Timestamp",
                self.zone.format(&account.creation_timestamp, SHORT_TIME_FORMAT),
            ),
            Detail::new(
                "Last Seen Timestamp",
                self.zone.format(&account.last_seen_timestamp, SHORT_TIME_FORMAT),
            ),
            Detail::new(
                "Last Traded Timestamp",
                self.zone.format(&account.last_traded_timestamp, SHORT_TIME_FORMAT),
            ),
            Detail::new("Number of Trades", account.num_trades.clone()),
            Detail::new("Profit in USDC", format_collateral_field(&account.profit)),
            Detail::new(
                "Collateral Volume in USDC",
                format_collateral_field(&account.collateral_volume),
            ),
            Detail::new(
                "Scaled Collateral Volume",
                account.scaled_collateral_volume.clone(),
            ),
        ]
    }
}

impl Default for AccountPage {
    fn default() -> Self {
        Self::new(DEFAULT_ACCOUNT)
    }
}

#[derive(Debug, Clone, Serialize, Tabled)]
pub struct MarketProfitRow {
    #[tabled(rename = "ID")]
    pub id: String,
    #[tabled(rename = "Profit in USDC")]
    pub profit: String,
    #[tabled(rename = "Result")]
    pub result: String,
}

impl Page for AccountPage {
    type Payload = AccountData;
    type Row = MarketProfitRow;

    const TITLE: &'static str = "Polymarket Account";
    const SUBGRAPH: Subgraph = Subgraph::Accounts;
    const QUERY: &'static str = queries::ACCOUNT;

    fn variables(&self) -> Option<Value> {
        Some(json!({ "id": self.address }))
    }

    fn rows(&self, payload: &AccountData) -> Vec<MarketProfitRow> {
        let Some(account) = &payload.account else {
            return Vec::new();
        };
        account
            .market_profits
            .iter()
            .map(|mp| {
                let result = match ProfitSign::of(scale_collateral_f64(&mp.profit)) {
                    ProfitSign::Gain => "gain",
                    ProfitSign::Loss => "loss",
                    ProfitSign::Flat => "",
                };
                MarketProfitRow {
                    id: mp.id.clone(),
                    profit: format_collateral_field(&mp.profit),
                    result: result.to_string(),
                }
            })
            .collect()
    }

    fn chart(&self, payload: &AccountData) -> Option<Chart> {
        let account = payload.account.as_ref()?;
        let bars = account
            .market_profits
            .iter()
            .map(|mp| {
                let value = scale_collateral_f64(&mp.profit);
                Bar {
                    label: short_id(&mp.id),
                    value,
                    sign: ProfitSign::of(value),
                }
            })
            .collect();
        Some(Chart::Bar {
            title: "Market Position Magnitudes",
            y_label: "Profit in USDC",
            bars,
        })
    }

    fn details(&self, payload: &AccountData) -> Vec<Detail> {
        payload
            .account
            .as_ref()
            .map(|a| self.account_details(a))
            .unwrap_or_default()
    }

    fn notice(&self, payload: &AccountData) -> Option<String> {
        match payload.account {
            Some(_) => None,
            None => Some(format!("No account found for {}", self.address)),
        }
    }
}
