use sqlx::PgPool;

use crate::payment::PaymentGateway;

/// Shared application state carried by the router. The gateway client is
/// constructed once in `main` and injected here so tests can substitute
/// one pointed at a fake endpoint.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub gateway: PaymentGateway,
}

impl AppState {
    pub fn new(pool: PgPool, gateway: PaymentGateway) -> Self {
        Self { pool, gateway }
    }
}
