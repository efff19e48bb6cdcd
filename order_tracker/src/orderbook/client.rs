use error_stack::ResultExt;
use orderbook_models::constants::chains::Network;
use orderbook_models::models::api_response::ApiResponse;
use orderbook_models::models::order::{BlockNumbers, OrderPage, OrdersQuery};
use orderbook_models::network::http::{HttpMethod, send_request};
use reqwest::Client;
use serde_json::json;

use crate::error::{Error, TrackerResult};
use crate::orderbook::OrderSource;

/// Order book and block-number service over HTTP
#[derive(Debug, Clone)]
pub struct OrderbookClient {
    client: Client,
    orderbook_url: String,
    data_url: String,
}

impl OrderbookClient {
    pub fn new(client: Client, orderbook_url: String, data_url: String) -> Self {
        Self {
            client,
            orderbook_url,
            data_url,
        }
    }
}

pub fn orders_query_params(query: &OrdersQuery) -> serde_json::Value {
    json!({
        "page": query.page,
        "per_page": query.per_page,
        "pending": query.pending,
    })
}

pub fn orders_path(query: &OrdersQuery) -> &'static str {
    if query.matched {
        "orders/matched"
    } else {
        "orders/unmatched"
    }
}

#[async_trait::async_trait]
impl OrderSource for OrderbookClient {
    async fn fetch_orders(&self, query: &OrdersQuery) -> TrackerResult<OrderPage> {
        let response: ApiResponse<OrderPage> = send_request(
            &self.client,
            &self.orderbook_url,
            orders_path(query),
            Some(orders_query_params(query)),
            None,
            HttpMethod::GET,
        )
        .await
        .change_context(Error::OrderbookError)
        .attach_printable("Error fetching orders")?;

        response
            .into_result()
            .change_context(Error::OrderbookError)
            .attach_printable("Order book rejected orders request")
    }

    async fn fetch_block_numbers(&self, network: Network) -> TrackerResult<BlockNumbers> {
        send_request(
            &self.client,
            &self.data_url,
            &format!("blocknumber/{network}"),
            None,
            None,
            HttpMethod::GET,
        )
        .await
        .change_context(Error::OrderbookError)
        .attach_printable_lazy(|| format!("Error fetching block numbers for {network}"))
    }
}
