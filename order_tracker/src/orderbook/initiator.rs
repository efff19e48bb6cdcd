use error_stack::ResultExt;
use orderbook_models::models::api_response::ApiResponse;
use orderbook_models::models::order::Order;
use orderbook_models::network::http::{HttpMethod, send_request};
use reqwest::Client;
use serde_json::{Value, json};

use crate::error::{Error, TrackerResult};
use crate::orderbook::Initiator;

/// Hands initiation to a settlement service that holds the user's signer.
#[derive(Debug, Clone)]
pub struct HttpInitiator {
    client: Client,
    url: String,
}

impl HttpInitiator {
    pub fn new(client: Client, url: String) -> Self {
        Self { client, url }
    }
}

#[async_trait::async_trait]
impl Initiator for HttpInitiator {
    async fn initiate(&self, order: &Order) -> TrackerResult<()> {
        let body = json!({
            "order_id": order.order_id,
            "chain": order.source_swap.chain,
            "swap_id": order.source_swap.swap_id,
        });

        let response: ApiResponse<Value> = send_request(
            &self.client,
            &self.url,
            "initiate",
            None,
            Some(body),
            HttpMethod::POST,
        )
        .await
        .change_context(Error::InitiateError(order.order_id.clone()))?;

        response
            .into_result()
            .change_context(Error::InitiateError(order.order_id.clone()))?;

        tracing::info!("Initiate submitted for order {}", order.order_id);
        Ok(())
    }
}
