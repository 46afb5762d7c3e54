pub mod auth;
pub mod authorize;
pub mod params;

pub use auth::{require_signin, AuthUser};
pub use authorize::{is_admin, is_auth};
pub use params::{category_by_id, product_by_id, user_by_id, PathCategory, PathProduct, PathUser};
