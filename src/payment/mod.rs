//! Payment gateway client.
//!
//! Thin HTTP wrapper over the gateway's client-token and transaction
//! endpoints. Responses and error bodies pass through verbatim: whatever
//! the gateway reports is authoritative, with no local idempotency,
//! retry, or reconciliation.

use reqwest::Client;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use thiserror::Error;

use crate::config::GatewayConfig;

#[derive(Debug, Clone)]
pub struct PaymentGateway {
    base_url: String,
    merchant_id: String,
    public_key: String,
    private_key: String,
    http: Client,
}

#[derive(Debug, Error)]
pub enum GatewayError {
    /// Transport or serialization failure before a gateway verdict
    #[error("gateway request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The gateway answered with an error payload, carried unmodified
    #[error("gateway rejected the request")]
    Rejected(Value),
}

impl PaymentGateway {
    pub fn from_config(config: &GatewayConfig) -> Self {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_default();

        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            merchant_id: config.merchant_id.clone(),
            public_key: config.public_key.clone(),
            private_key: config.private_key.clone(),
            http,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/merchants/{}/{}", self.base_url, self.merchant_id, path)
    }

    /// Request a short-lived client token for the browser-side component.
    pub async fn generate_client_token(&self) -> Result<Value, GatewayError> {
        self.post(&self.endpoint("client_token"), &json!({})).await
    }

    /// Submit a one-shot sale with immediate settlement requested.
    pub async fn sale(&self, amount: Decimal, nonce: &str) -> Result<Value, GatewayError> {
        let body = json!({
            "amount": amount,
            "payment_method_nonce": nonce,
            "options": {
                "submit_for_settlement": true
            }
        });
        self.post(&self.endpoint("transactions"), &body).await
    }

    async fn post(&self, url: &str, body: &Value) -> Result<Value, GatewayError> {
        let response = self
            .http
            .post(url)
            .basic_auth(&self.public_key, Some(&self.private_key))
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let payload = response.json::<Value>().await?;

        if status.is_success() {
            Ok(payload)
        } else {
            Err(GatewayError::Rejected(payload))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GatewayConfig;

    fn gateway() -> PaymentGateway {
        PaymentGateway::from_config(&GatewayConfig {
            base_url: "https://api.sandbox.braintreegateway.com/".to_string(),
            merchant_id: "m_123".to_string(),
            public_key: "pub".to_string(),
            private_key: "priv".to_string(),
            timeout_secs: 5,
        })
    }

    #[test]
    fn endpoint_joins_base_merchant_and_path() {
        assert_eq!(
            gateway().endpoint("transactions"),
            "https://api.sandbox.braintreegateway.com/merchants/m_123/transactions"
        );
    }

    #[test]
    fn rejected_error_keeps_raw_payload() {
        let raw = json!({ "message": "Cannot determine payment method" });
        let err = GatewayError::Rejected(raw.clone());
        match err {
            GatewayError::Rejected(payload) => assert_eq!(payload, raw),
            GatewayError::Http(_) => panic!("wrong variant"),
        }
    }
}
