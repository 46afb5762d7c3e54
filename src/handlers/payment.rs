use axum::{extract::State, Json};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::payment::GatewayError;
use crate::state::AppState;

/// GET /braintree/getToken/:userId - client token, passed through
/// verbatim
pub async fn generate_token(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let token = state
        .gateway
        .generate_client_token()
        .await
        .map_err(gateway_error)?;
    Ok(Json(token))
}

#[derive(Debug, Deserialize)]
pub struct PaymentRequest {
    #[serde(rename = "paymentMethodNonce")]
    pub payment_method_nonce: String,
    pub amount: Decimal,
}

/// POST /braintree/payment/:userId - one-shot sale with immediate
/// settlement; the gateway's verdict is authoritative
pub async fn process_payment(
    State(state): State<AppState>,
    Json(body): Json<PaymentRequest>,
) -> Result<Json<Value>, ApiError> {
    let result = state
        .gateway
        .sale(body.amount, &body.payment_method_nonce)
        .await
        .map_err(gateway_error)?;
    Ok(Json(result))
}

fn gateway_error(err: GatewayError) -> ApiError {
    match err {
        GatewayError::Rejected(raw) => ApiError::gateway(raw),
        GatewayError::Http(e) => {
            tracing::error!("gateway request failed: {}", e);
            ApiError::gateway(json!({ "error": e.to_string() }))
        }
    }
}
