use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::debug;
use url::Url;

use crate::cache::{CacheKey, ResponseCache};
use crate::error::{GraphQlError, QueryError};
use crate::{
    ACCOUNTS_SUBGRAPH_URL, CONDITIONAL_TOKENS_SUBGRAPH_URL, ORDERBOOK_SUBGRAPH_URL,
    POSITIONS_SUBGRAPH_URL,
};

/// The indexing subgraphs the dashboard reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Subgraph {
    Positions,
    Accounts,
    Orderbook,
    ConditionalTokens,
}

impl Subgraph {
    pub const ALL: [Subgraph; 4] = [
        Subgraph::Positions,
        Subgraph::Accounts,
        Subgraph::Orderbook,
        Subgraph::ConditionalTokens,
    ];

    pub fn default_url(self) -> &'static str {
        match self {
            Subgraph::Positions => POSITIONS_SUBGRAPH_URL,
            Subgraph::Accounts => ACCOUNTS_SUBGRAPH_URL,
            Subgraph::Orderbook => ORDERBOOK_SUBGRAPH_URL,
            Subgraph::ConditionalTokens => CONDITIONAL_TOKENS_SUBGRAPH_URL,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Subgraph::Positions => "positions",
            Subgraph::Accounts => "accounts",
            Subgraph::Orderbook => "orderbook",
            Subgraph::ConditionalTokens => "conditional_tokens",
        }
    }
}

impl fmt::Display for Subgraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Whether a query may be answered from the response cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FetchPolicy {
    /// Always hit the network; the result still refreshes the cache.
    #[default]
    NetworkOnly,
    /// Serve a cached result when one exists for the same query and variables.
    CacheFirst,
}

/// HTTP seam: POST a JSON body to `url` and return the decoded JSON response.
pub trait Transport: Send + Sync {
    fn post_json(
        &self,
        url: &Url,
        body: &Value,
    ) -> impl Future<Output = Result<Value, QueryError>> + Send;
}

impl Transport for reqwest::Client {
    async fn post_json(&self, url: &Url, body: &Value) -> Result<Value, QueryError> {
        let resp = self.post(url.clone()).json(body).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(QueryError::Status(status.as_u16()));
        }
        Ok(resp.json::<Value>().await?)
    }
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    errors: Option<Vec<GraphQlError>>,
}

/// GraphQL client bound to a single subgraph endpoint.
pub struct SubgraphClient<T = reqwest::Client> {
    transport: T,
    endpoint: Url,
    cache: Arc<ResponseCache>,
    policy: FetchPolicy,
}

impl<T: Transport> SubgraphClient<T> {
    pub fn new(transport: T, endpoint: Url, cache: Arc<ResponseCache>) -> Self {
        Self {
            transport,
            endpoint,
            cache,
            policy: FetchPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: FetchPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn policy(&self) -> FetchPolicy {
        self.policy
    }

    /// Run `query` and decode its `data` object as `D`.
    ///
    /// Any entry in the response's `errors` array fails the whole query, even
    /// when `data` is also present.
    pub async fn execute<D: DeserializeOwned>(
        &self,
        query: &str,
        variables: Option<Value>,
    ) -> Result<D, QueryError> {
        let key = CacheKey::new(self.endpoint.as_str(), query, variables.as_ref());
        if self.policy == FetchPolicy::CacheFirst
            && let Some(data) = self.cache.get(&key)
        {
            debug!("Cache hit for query to {}", self.endpoint);
            return Ok(serde_json::from_value(data)?);
        }

        let mut body = json!({ "query": query });
        if let Some(vars) = &variables {
            body["variables"] = vars.clone();
        }

        let start = Instant::now();
        let raw = self.transport.post_json(&self.endpoint, &body).await?;
        debug!("Query to {} answered in {:?}", self.endpoint, start.elapsed());

        let response: GraphQlResponse = serde_json::from_value(raw)?;
        if let Some(errors) = response.errors
            && !errors.is_empty()
        {
            return Err(QueryError::GraphQl(errors));
        }
        let data = response
            .data
            .filter(|d| !d.is_null())
            .ok_or(QueryError::MissingData)?;

        let payload = serde_json::from_value(data.clone())?;
        self.cache.insert(key, data);
        Ok(payload)
    }
}

/// One client per subgraph, all sharing one transport and one response cache.
pub struct Subgraphs<T = reqwest::Client> {
    positions: SubgraphClient<T>,
    accounts: SubgraphClient<T>,
    orderbook: SubgraphClient<T>,
    conditional_tokens: SubgraphClient<T>,
}

impl<T: Transport + Clone> Subgraphs<T> {
    /// Build the clients, asking `url_for` for each subgraph's endpoint.
    pub fn try_new<E>(
        transport: T,
        cache: Arc<ResponseCache>,
        policy: FetchPolicy,
        mut url_for: impl FnMut(Subgraph) -> Result<Url, E>,
    ) -> Result<Self, E> {
        let mut make = |subgraph: Subgraph| -> Result<SubgraphClient<T>, E> {
            let url = url_for(subgraph)?;
            Ok(SubgraphClient::new(transport.clone(), url, cache.clone()).with_policy(policy))
        };
        Ok(Self {
            positions: make(Subgraph::Positions)?,
            accounts: make(Subgraph::Accounts)?,
            orderbook: make(Subgraph::Orderbook)?,
            conditional_tokens: make(Subgraph::ConditionalTokens)?,
        })
    }

    /// Clients for the built-in endpoint URLs.
    pub fn with_default_urls(
        transport: T,
        cache: Arc<ResponseCache>,
        policy: FetchPolicy,
    ) -> Result<Self, url::ParseError> {
        Self::try_new(transport, cache, policy, |s| Url::parse(s.default_url()))
    }
}

impl<T> Subgraphs<T> {
    pub fn client(&self, subgraph: Subgraph) -> &SubgraphClient<T> {
        match subgraph {
            Subgraph::Positions => &self.positions,
            Subgraph::Accounts => &self.accounts,
            Subgraph::Orderbook => &self.orderbook,
            Subgraph::ConditionalTokens => &self.conditional_tokens,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockTransport;
    use crate::types::PayoutRedemptionsData;

    fn client(transport: MockTransport, policy: FetchPolicy) -> SubgraphClient<MockTransport> {
        let url = Url::parse("https://subgraph.test/query").expect("valid url");
        SubgraphClient::new(transport, url, Arc::new(ResponseCache::new(8))).with_policy(policy)
    }

    fn redemptions() -> Value {
        json!({
            "payoutRedemptions": [
                { "id": "r1", "payout": "1000000", "blockNumber": "10", "transactionHash": "0xt1" }
            ]
        })
    }

    #[tokio::test]
    async fn execute_decodes_data() {
        let transport = MockTransport::data(redemptions());
        let c = client(transport.clone(), FetchPolicy::NetworkOnly);
        let data: PayoutRedemptionsData = c.execute("{ q }", None).await.expect("query ok");
        assert_eq!(data.payout_redemptions.len(), 1);
        assert_eq!(data.payout_redemptions[0].payout, "1000000");
    }

    #[tokio::test]
    async fn execute_sends_query_and_variables() {
        let transport = MockTransport::data(json!({ "account": null }));
        let c = client(transport.clone(), FetchPolicy::NetworkOnly);
        let _: Value = c
            .execute("query ($id: ID!) { x }", Some(json!({ "id": "0xabc" })))
            .await
            .expect("query ok");
        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].0, "https://subgraph.test/query");
        assert_eq!(requests[0].1["query"], "query ($id: ID!) { x }");
        assert_eq!(requests[0].1["variables"]["id"], "0xabc");
    }

    #[tokio::test]
    async fn execute_omits_absent_variables() {
        let transport = MockTransport::data(redemptions());
        let c = client(transport.clone(), FetchPolicy::NetworkOnly);
        let _: Value = c.execute("{ q }", None).await.expect("query ok");
        assert!(transport.requests()[0].1.get("variables").is_none());
    }

    #[tokio::test]
    async fn graphql_errors_reject_even_with_data() {
        let transport = MockTransport::body(json!({
            "data": redemptions(),
            "errors": [{ "message": "indexing_error" }]
        }));
        let c = client(transport, FetchPolicy::NetworkOnly);
        let err = c.execute::<Value>("{ q }", None).await.unwrap_err();
        assert!(matches!(err, QueryError::GraphQl(ref e) if e[0].message == "indexing_error"));
    }

    #[tokio::test]
    async fn empty_errors_array_is_success() {
        let transport = MockTransport::body(json!({ "data": redemptions(), "errors": [] }));
        let c = client(transport, FetchPolicy::NetworkOnly);
        assert!(c.execute::<PayoutRedemptionsData>("{ q }", None).await.is_ok());
    }

    #[tokio::test]
    async fn missing_data() {
        let transport = MockTransport::body(json!({ "data": null }));
        let c = client(transport, FetchPolicy::NetworkOnly);
        let err = c.execute::<Value>("{ q }", None).await.unwrap_err();
        assert!(matches!(err, QueryError::MissingData));
    }

    #[tokio::test]
    async fn wrong_shape_is_decode_error() {
        let transport = MockTransport::data(json!({ "payoutRedemptions": "nope" }));
        let c = client(transport, FetchPolicy::NetworkOnly);
        let err = c
            .execute::<PayoutRedemptionsData>("{ q }", None)
            .await
            .unwrap_err();
        assert!(matches!(err, QueryError::Decode(_)));
    }

    #[tokio::test]
    async fn transport_failure_propagates() {
        let transport = MockTransport::status(503);
        let c = client(transport, FetchPolicy::NetworkOnly);
        let err = c.execute::<Value>("{ q }", None).await.unwrap_err();
        assert!(matches!(err, QueryError::Status(503)));
    }

    #[tokio::test]
    async fn network_only_always_refetches() {
        let transport = MockTransport::data(redemptions());
        let c = client(transport.clone(), FetchPolicy::NetworkOnly);
        for _ in 0..3 {
            let _: PayoutRedemptionsData = c.execute("{ q }", None).await.expect("query ok");
        }
        assert_eq!(transport.calls(), 3);
    }

    #[tokio::test]
    async fn cache_first_reuses_result() {
        let transport = MockTransport::data(redemptions());
        let c = client(transport.clone(), FetchPolicy::CacheFirst);
        let first: PayoutRedemptionsData = c.execute("{ q }", None).await.expect("query ok");
        let second: PayoutRedemptionsData = c.execute("{ q }", None).await.expect("query ok");
        assert_eq!(transport.calls(), 1);
        assert_eq!(first.payout_redemptions, second.payout_redemptions);
    }

    #[tokio::test]
    async fn failed_query_is_not_cached() {
        let transport = MockTransport::status(500);
        let c = client(transport.clone(), FetchPolicy::CacheFirst);
        assert!(c.execute::<Value>("{ q }", None).await.is_err());
        assert!(c.execute::<Value>("{ q }", None).await.is_err());
        assert_eq!(transport.calls(), 2);
    }

    #[test]
    fn subgraphs_route_to_their_endpoints() {
        let subgraphs = Subgraphs::with_default_urls(
            MockTransport::status(500),
            Arc::new(ResponseCache::default()),
            FetchPolicy::NetworkOnly,
        )
        .expect("default urls parse");
        for subgraph in Subgraph::ALL {
            assert_eq!(subgraphs.client(subgraph).endpoint().as_str(), subgraph.default_url());
        }
    }
}
