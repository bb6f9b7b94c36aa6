use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use checkout_engine::{
    db_types::OrderId,
    traits::{ChargeRequest, GatewayStatus, PaymentSession},
    GatewayClientError,
    PaymentGatewayClient,
};
use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    Client,
    Method,
};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::{config::SnapConfig, signature::verify_payload_signature};

#[derive(Clone)]
pub struct SnapApi {
    config: SnapConfig,
    client: Arc<Client>,
}

impl SnapApi {
    /// Build a client with Basic auth baked into the default headers. The gateway authenticates with
    /// `base64(server_key + ":")` and an empty password.
    pub fn new(config: SnapConfig) -> Result<Self, GatewayClientError> {
        let mut headers = HeaderMap::with_capacity(3);
        let credentials = BASE64.encode(format!("{}:", config.server_key.reveal()));
        let mut auth = HeaderValue::from_str(&format!("Basic {credentials}"))
            .map_err(|e| GatewayClientError::Initialization(e.to_string()))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| GatewayClientError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub async fn rest_query<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        url: String,
        body: Option<B>,
    ) -> Result<T, GatewayClientError> {
        trace!("Sending REST query: {url}");
        let mut req = self.client.request(method, url);
        if let Some(body) = body {
            req = req.json(&body);
        }
        let response = req.send().await.map_err(|e| GatewayClientError::RequestError(e.to_string()))?;
        if response.status().is_success() {
            trace!("REST query successful. {}", response.status());
            response.json::<T>().await.map_err(|e| GatewayClientError::JsonError(e.to_string()))
        } else {
            let status = response.status().as_u16();
            let message = response.text().await.map_err(|e| GatewayClientError::RequestError(e.to_string()))?;
            Err(GatewayClientError::ResponseError { status, message })
        }
    }

    fn snap_url(&self, path: &str) -> String {
        format!("{}{path}", self.config.base_url)
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}{path}", self.config.api_base_url)
    }
}

impl PaymentGatewayClient for SnapApi {
    async fn create_transaction(&self, request: &ChargeRequest) -> Result<PaymentSession, GatewayClientError> {
        let url = self.snap_url("/snap/v1/transactions");
        let response: Value = self.rest_query(Method::POST, url, Some(request)).await?;
        let token = response.get("token").and_then(|v| v.as_str()).map(String::from);
        let redirect_url = response.get("redirect_url").and_then(|v| v.as_str()).map(String::from);
        if token.is_none() && redirect_url.is_none() {
            return Err(GatewayClientError::JsonError(format!(
                "transaction response carries neither token nor redirect_url: {response}"
            )));
        }
        debug!(
            "💻️ Payment session created for order {}",
            request.transaction_details.order_id.as_ref().map(|o| o.as_str()).unwrap_or("<unset>")
        );
        Ok(PaymentSession { token, redirect_url, raw: response })
    }

    async fn transaction_status(&self, order_id: &OrderId) -> Result<GatewayStatus, GatewayClientError> {
        let url = self.api_url(&format!("/v2/{}/status", order_id.as_str()));
        let response: Value = self.rest_query(Method::GET, url, None::<Value>).await?;
        GatewayStatus::from_payload(&response).ok_or_else(|| {
            GatewayClientError::JsonError(format!("status response is missing mandatory fields: {response}"))
        })
    }

    /// The inbound payload is never trusted directly: its signature is checked first, and then the transaction
    /// is re-fetched from the gateway. The re-fetched status is the authoritative one.
    async fn verify_notification(&self, payload: &Value) -> Result<GatewayStatus, GatewayClientError> {
        verify_payload_signature(payload, self.config.server_key.reveal())?;
        let order_id = payload
            .get("order_id")
            .and_then(|v| v.as_str())
            .ok_or_else(|| GatewayClientError::VerificationFailed("notification is missing order_id".to_string()))?;
        let oid = OrderId(order_id.to_string());
        match self.transaction_status(&oid).await {
            Ok(status) => Ok(status),
            Err(GatewayClientError::ResponseError { status: 404, .. }) => {
                warn!("💻️ Notification for order {oid} names a transaction the gateway does not know");
                Err(GatewayClientError::VerificationFailed("transaction unknown to the gateway".to_string()))
            },
            Err(e) => Err(e),
        }
    }
}
