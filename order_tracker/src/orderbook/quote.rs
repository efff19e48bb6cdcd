use error_stack::{ResultExt, report};
use orderbook_models::constants::chains::Chain;
use orderbook_models::models::api_response::ApiResponse;
use orderbook_models::models::asset::AssetRegistry;
use orderbook_models::models::quote::{AssetRef, QuoteRequest, QuoteResult};
use orderbook_models::network::http::{HttpMethod, send_request};
use reqwest::Client;
use serde_json::json;

use crate::error::{Error, TrackerResult};
use crate::utils::number_conversion::{decimal_string_to_u128, format_units};

/// Fee the static preview assumes before a real quote arrives, in basis points
pub const PREVIEW_FEE_BPS: u128 = 30;

#[derive(Debug, Clone)]
pub struct QuoteClient {
    client: Client,
    url: String,
}

impl QuoteClient {
    pub fn new(client: Client, url: String) -> Self {
        Self { client, url }
    }

    pub async fn get_quote(&self, request: &QuoteRequest) -> TrackerResult<Quote> {
        let query = json!({
            "order_pair": request.order_pair(),
            "amount": request.amount.to_string(),
            "exact_out": request.exact_out,
        });

        let response: ApiResponse<QuoteResult> = send_request(
            &self.client,
            &self.url,
            "quote",
            Some(query),
            None,
            HttpMethod::GET,
        )
        .await
        .change_context(Error::QuoteError)
        .attach_printable_lazy(|| format!("Error fetching quote for {}", request.order_pair()))?;

        let result = response.into_result().change_context(Error::QuoteError)?;
        Ok(Quote { result })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    pub result: QuoteResult,
}

impl Quote {
    /// Strategy with the largest receive amount. Ties go to the smallest
    /// strategy id so the pick does not depend on map order.
    pub fn best(&self) -> TrackerResult<(&str, u128)> {
        self.result
            .quotes
            .iter()
            .max_by(|(id_a, amount_a), (id_b, amount_b)| {
                amount_a.cmp(amount_b).then_with(|| id_b.cmp(id_a))
            })
            .map(|(id, amount)| (id.as_str(), *amount))
            .ok_or_else(|| report!(Error::QuoteError).attach_printable("Quote has no strategies"))
    }
}

/// Receive amount shown while typing, before a quote is requested.
pub fn estimate_receive_amount(send_amount: u128) -> u128 {
    let keep_bps = 10_000 - PREVIEW_FEE_BPS;
    send_amount / 10_000 * keep_bps + send_amount % 10_000 * keep_bps / 10_000
}

/// User-entered amount in base units. Zero is rejected since there is
/// nothing to quote.
pub fn parse_amount(amount: &str, decimals: u8) -> TrackerResult<u128> {
    let parsed = decimal_string_to_u128(amount, decimals)
        .attach_printable_lazy(|| format!("Cannot quote amount {amount:?}"))?;
    if parsed == 0 {
        return Err(report!(Error::ParseError).attach_printable("Amount must be positive"));
    }
    Ok(parsed)
}

pub const QUOTE_USAGE: &str = "Usage: quote <chain:asset> <chain:asset> <amount> <decimals>";

/// A quote typed at the prompt: `<chain:asset> <chain:asset> <amount> <decimals>`,
/// where `decimals` is the precision of the amount being sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteCommand {
    pub request: QuoteRequest,
    pub send_decimals: u8,
}

impl QuoteCommand {
    pub fn parse(args: &[&str]) -> TrackerResult<Self> {
        let [from, to, amount, decimals] = args else {
            return Err(report!(Error::ParseError).attach_printable(QUOTE_USAGE));
        };
        let send_decimals = decimals
            .parse::<u8>()
            .change_context(Error::ParseError)
            .attach_printable_lazy(|| format!("Invalid decimals {decimals:?}"))?;

        Ok(Self {
            request: QuoteRequest {
                from: parse_asset_ref(from)?,
                to: parse_asset_ref(to)?,
                amount: parse_amount(amount, send_decimals)?,
                exact_out: false,
            },
            send_decimals,
        })
    }

    /// Precision of the asset being received
    pub fn receive_decimals(&self, registry: &AssetRegistry) -> u8 {
        registry.decimals(self.request.to.chain, &self.request.to.asset)
    }

    /// Static receive estimate in units of the destination asset. Falls back
    /// to base units when the amount cannot be rescaled or formatted.
    pub fn receive_preview(&self, registry: &AssetRegistry) -> String {
        let receive_decimals = self.receive_decimals(registry);
        let estimate = rescale(self.request.amount, self.send_decimals, receive_decimals)
            .map(estimate_receive_amount)
            .and_then(|estimate| format_units(estimate, receive_decimals));
        match estimate {
            Ok(preview) => preview,
            Err(error) => {
                tracing::debug!("Preview shown in base units: {:?}", error);
                format!("{} base units", estimate_receive_amount(self.request.amount))
            }
        }
    }
}

/// Moves an amount between precisions. Going down truncates.
fn rescale(amount: u128, from: u8, to: u8) -> TrackerResult<u128> {
    let factor = |diff: u8| {
        10u128.checked_pow(diff.into()).ok_or_else(|| {
            report!(Error::ParseError)
                .attach_printable(format!("Cannot rescale by {diff} decimals"))
        })
    };
    if to >= from {
        amount
            .checked_mul(factor(to - from)?)
            .ok_or_else(|| report!(Error::ParseError).attach_printable("Rescaled amount overflows"))
    } else {
        Ok(amount / factor(from - to)?)
    }
}

fn parse_asset_ref(value: &str) -> TrackerResult<AssetRef> {
    let (chain, asset) = value.split_once(':').ok_or_else(|| {
        report!(Error::ParseError).attach_printable(format!("Expected chain:asset, got {value:?}"))
    })?;
    let chain = Chain::try_from(chain).change_context(Error::ParseError)?;
    Ok(AssetRef::new(chain, asset))
}
