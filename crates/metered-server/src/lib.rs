//! # metered-server
//!
//! Axum server for the metered temperature converter.
//!
//! | Route | Auth | |
//! |---|---|---|
//! | `GET /` | - | redirect to `/app` or `/login` |
//! | `GET,POST /login`, `GET,POST /signup` | - | forms |
//! | `GET /logout` | - | clear cookies |
//! | `GET /pricing` | - | plan list |
//! | `POST /plan` | user | subscribe or start checkout |
//! | `GET /checkout_success`, `/checkout_cancel` | user | checkout landing |
//! | `POST /convert` | user | metered conversion |
//! | `GET /app` | user | converter page |
//! | `GET /payment`, `/attach-payment-method` | user | save a card |
//! | `* /ping` | - | `pong` |
//!
//! Anything else falls through to the static directory.

pub mod config;
pub mod error;
pub mod handlers;
pub mod pages;
pub mod session;
pub mod state;

use axum::{
    Router,
    routing::{any, get, post},
};
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    let static_files = ServeDir::new(&state.config.static_dir);

    Router::new()
        .route("/", get(handlers::root))
        .route("/login", get(handlers::login_form).post(handlers::login))
        .route("/signup", get(handlers::signup_form).post(handlers::signup))
        .route("/logout", get(handlers::logout))
        .route("/pricing", get(handlers::pricing))
        .route("/plan", post(handlers::change_plan))
        .route("/checkout_success", get(handlers::checkout_success))
        .route("/checkout_cancel", get(handlers::checkout_cancel))
        .route("/convert", post(handlers::convert))
        .route("/app", get(handlers::app))
        .route("/payment", get(handlers::payment))
        .route("/attach-payment-method", get(handlers::attach_payment_method))
        .route("/ping", any(handlers::ping))
        .fallback_service(static_files)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
