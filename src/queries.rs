//! Fixed GraphQL documents, one per dashboard page.

/// Latest 25 order fills.
pub const ORDER_FILLEDS: &str = r#"
  query GetPolymarketTrades {
    orderFilleds(first: 25, orderBy: blockTimestamp, orderDirection: desc) {
      id
      orderHash
      maker
      taker
      makerAssetId
      takerAssetId
      makerAmountFilled
      takerAmountFilled
      fee
      blockTimestamp
    }
  }
"#;

pub const ORDERS_MATCHEDS: &str = r#"
  {
    ordersMatcheds {
      makerAssetId
      makerAmountFilled
      id
      takerAmountFilled
      takerAssetId
      takerOrderHash
      takerOrderMaker
      transactionHash
      blockTimestamp
      blockNumber
    }
  }
"#;

/// 20 largest positions by amount.
pub const USER_POSITIONS: &str = r#"
  {
    userPositions(first: 20, orderBy: amount, orderDirection: desc) {
      id
      user
      tokenId
      amount
    }
  }
"#;

pub const PAYOUT_REDEMPTIONS: &str = r#"
  {
    payoutRedemptions {
      id
      payout
      blockNumber
      transactionHash
    }
  }
"#;

/// Takes one variable, `$id`: the lowercase account address.
pub const ACCOUNT: &str = r#"
  query ($id: ID!) {
    account(id: $id) {
      id
      creationTimestamp
      lastSeenTimestamp
      collateralVolume
      lastTradedTimestamp
      numTrades
      profit
      scaledCollateralVolume
      marketProfits {
        id
        profit
      }
    }
  }
"#;
