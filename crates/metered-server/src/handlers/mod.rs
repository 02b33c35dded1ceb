//! HTTP Handlers

mod auth;
mod convert;
mod payment;
mod plans;

pub use auth::{Credentials, app, login, login_form, logout, root, signup, signup_form};
pub use convert::convert;
pub use payment::{SetupReturn, attach_payment_method, payment};
pub use plans::{PlanChoice, change_plan, checkout_cancel, checkout_success, pricing};

/// Liveness probe
pub async fn ping() -> &'static str {
    "pong"
}
