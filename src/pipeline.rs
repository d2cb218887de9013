use serde::Serialize;
use tracing::{debug, info, warn};

use crate::client::{Subgraphs, Transport};
use crate::error::QueryError;
use crate::pages::{Page, PageView};

/// Static message shown in place of a page whose fetch failed.
pub const LOAD_ERROR_MESSAGE: &str = "Error loading data.";

/// What a page currently shows.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PageState<R> {
    Loading { title: &'static str },
    Ready(PageView<R>),
    Failed { title: &'static str, message: &'static str },
}

impl<R> PageState<R> {
    pub fn loading<P: Page<Row = R>>() -> Self {
        PageState::Loading { title: P::TITLE }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, PageState::Ready(_))
    }
}

/// Fetch the page's query from its subgraph and transform the payload.
pub async fn load<P, T>(subgraphs: &Subgraphs<T>, page: &P) -> Result<PageView<P::Row>, QueryError>
where
    P: Page,
    T: Transport,
{
    let client = subgraphs.client(P::SUBGRAPH);
    debug!("Fetching {} from {}", P::TITLE, client.endpoint());
    let payload: P::Payload = client.execute(P::QUERY, page.variables()).await?;
    Ok(page.view(&payload))
}

/// [`load`], with failures logged and turned into [`PageState::Failed`].
pub async fn run<P, T>(subgraphs: &Subgraphs<T>, page: &P) -> PageState<P::Row>
where
    P: Page,
    T: Transport,
{
    match load(subgraphs, page).await {
        Ok(view) => {
            info!("Loaded {} ({} rows)", P::TITLE, view.rows.len());
            PageState::Ready(view)
        }
        Err(e) => {
            warn!("Error loading {}: {e}", P::TITLE);
            PageState::Failed {
                title: P::TITLE,
                message: LOAD_ERROR_MESSAGE,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::cache::ResponseCache;
    use crate::client::{FetchPolicy, Subgraph};
    use crate::pages::{AccountPage, DisplayZone, RedemptionsPage, TradesPage};
    use crate::testing::MockTransport;

    fn subgraphs(transport: MockTransport) -> Subgraphs<MockTransport> {
        Subgraphs::with_default_urls(
            transport,
            Arc::new(ResponseCache::default()),
            FetchPolicy::NetworkOnly,
        )
        .expect("default urls parse")
    }

    fn two_fills() -> serde_json::Value {
        json!({
            "orderFilleds": [
                {
                    "id": "f1", "orderHash": "0xo1", "maker": "0xm1", "taker": "0xt1",
                    "makerAssetId": "0", "takerAssetId": "123",
                    "makerAmountFilled": "2500000", "takerAmountFilled": "4000000",
                    "fee": "0", "blockTimestamp": "1700000000"
                },
                {
                    "id": "f2", "orderHash": "0xo2", "maker": "0xm2", "taker": "0xt2",
                    "makerAssetId": "1", "takerAssetId": "456",
                    "makerAmountFilled": "2500000", "takerAmountFilled": "4000000",
                    "fee": "0", "blockTimestamp": "1700000100"
                }
            ]
        })
    }

    #[tokio::test]
    async fn fills_end_to_end() {
        let transport = MockTransport::data(two_fills());
        let page = TradesPage {
            zone: DisplayZone::Utc,
        };
        let state = run(&subgraphs(transport.clone()), &page).await;
        let PageState::Ready(view) = state else {
            panic!("expected a ready page");
        };
        assert_eq!(view.rows[0].maker_amount_filled, "2.50 USDC");
        assert_eq!(view.rows[1].maker_amount_filled, "2500000");
        assert!(view.chart.is_some());

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].0, Subgraph::Orderbook.default_url());
    }

    #[tokio::test]
    async fn transport_rejection_shows_error_only() {
        let state = run(&subgraphs(MockTransport::status(502)), &TradesPage::default()).await;
        assert!(!state.is_ready());
        let PageState::Failed { title, message } = state else {
            panic!("expected a failed page");
        };
        assert_eq!(title, "Polymarket Trades");
        assert_eq!(message, LOAD_ERROR_MESSAGE);
    }

    #[tokio::test]
    async fn graphql_errors_fail_the_page() {
        let transport = MockTransport::body(json!({
            "errors": [{ "message": "Failed to decode `block.number`" }]
        }));
        let state = run(&subgraphs(transport), &RedemptionsPage::default()).await;
        assert!(matches!(state, PageState::Failed { .. }));
    }

    #[tokio::test]
    async fn malformed_payload_fails_the_page() {
        let transport = MockTransport::data(json!({ "orderFilleds": [{ "id": "f1" }] }));
        let err = load(&subgraphs(transport), &TradesPage::default())
            .await
            .unwrap_err();
        assert!(matches!(err, QueryError::Decode(_)));
    }

    #[tokio::test]
    async fn pages_hit_their_own_subgraph() {
        let accounts_url = Subgraph::Accounts.default_url();
        let transport = MockTransport::routed(move |url| {
            if url.as_str() == accounts_url {
                Ok(json!({ "data": { "account": null } }))
            } else {
                Err(QueryError::Status(404))
            }
        });
        let page = AccountPage::new("0xABC");
        let state = run(&subgraphs(transport.clone()), &page).await;
        let PageState::Ready(view) = state else {
            panic!("expected a ready page");
        };
        assert_eq!(view.notice.as_deref(), Some("No account found for 0xabc"));
        assert_eq!(transport.requests()[0].1["variables"]["id"], "0xabc");
    }

    #[tokio::test]
    async fn every_submit_refetches() {
        let transport = MockTransport::data(json!({ "account": null }));
        let subgraphs = subgraphs(transport.clone());
        for address in ["0xa", "0xb", "0xa"] {
            run(&subgraphs, &AccountPage::new(address)).await;
        }
        assert_eq!(transport.calls(), 3);
    }

    #[test]
    fn failed_state_serializes_without_rows() {
        let state: PageState<()> = PageState::Failed {
            title: "Payout Redemptions",
            message: LOAD_ERROR_MESSAGE,
        };
        let value = serde_json::to_value(&state).expect("serializable");
        assert_eq!(
            value,
            json!({
                "state": "failed",
                "title": "Payout Redemptions",
                "message": "Error loading data."
            })
        );
    }
}
