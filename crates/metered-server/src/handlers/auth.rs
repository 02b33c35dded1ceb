//! Login, signup and logout

use axum::{
    Form,
    extract::State,
    http::HeaderMap,
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;

use metered_core::{
    CoreError, CreateOutcome, NewUserErrors, OrgId, User, validate_credentials, validate_new_user,
};

use crate::error::ApiError;
use crate::pages;
use crate::session::{CurrentUser, plan_hint, set_cookies};
use crate::state::AppState;

/// Login and signup form fields
#[derive(Debug, Default, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub pass: String,
}

pub async fn root(State(state): State<AppState>, headers: HeaderMap) -> Redirect {
    if state.sessions.authenticated_user(&headers).is_some() {
        Redirect::to("/app")
    } else {
        Redirect::to("/login")
    }
}

pub async fn login_form() -> Html<String> {
    pages::login(None)
}

/// Check the credential pair, then look up the org's phase for the plan hint.
/// An org without a billing record is sent to signup to repair it.
pub async fn login(State(state): State<AppState>, Form(form): Form<Credentials>) -> Response {
    if !validate_credentials(&form.user, &form.pass) {
        tracing::info!(user = %form.user, "Login rejected");
        return pages::login(Some("incorrect")).into_response();
    }

    let mut cookies = vec![state.sessions.issue(&form.user)];
    let org = OrgId::for_user(&form.user);

    let target = match state.billing.current_phase(&org).await {
        Ok(phase) => {
            if let Some(plan) = phase.current_plan() {
                cookies.push(state.sessions.plan_cookie(plan));
            }
            "/app"
        }
        Err(e) => {
            tracing::warn!(org = %org, error = %e, "No billing phase at login");
            "/signup"
        }
    };

    tracing::info!(user = %form.user, "Logged in");
    (set_cookies(cookies), Redirect::to(target)).into_response()
}

pub async fn signup_form() -> Html<String> {
    pages::signup(&NewUserErrors::default(), "", "")
}

pub async fn signup(
    State(state): State<AppState>,
    Form(form): Form<Credentials>,
) -> Result<Response, ApiError> {
    if let Err(errors) = validate_new_user(&form.user, &form.pass) {
        return Ok(pages::signup(&errors, &form.user, &form.pass).into_response());
    }

    let user = User::new(&form.user, &form.pass);
    let org = user.org();

    match state.users.create(user) {
        Ok(CreateOutcome::Created) => tracing::info!(user = %form.user, "User created"),
        Ok(CreateOutcome::Existing) => tracing::debug!(user = %form.user, "User already exists"),
        Err(CoreError::UserExists(_)) => {
            let errors = NewUserErrors {
                username: Some("Username already taken.".into()),
                password: None,
            };
            return Ok(pages::signup(&errors, &form.user, "").into_response());
        }
        Err(e) => return Err(e.into()),
    }

    let plan = &state.config.default_plan;
    state.billing.subscribe(&org, plan).await?;

    let cookies = vec![
        state.sessions.issue(&form.user),
        state.sessions.plan_cookie(plan),
    ];
    Ok((set_cookies(cookies), Redirect::to("/app")).into_response())
}

pub async fn logout(State(state): State<AppState>) -> impl IntoResponse {
    (set_cookies(state.sessions.clear()), Redirect::to("/login"))
}

/// The converter page
pub async fn app(user: CurrentUser, headers: HeaderMap) -> Html<String> {
    pages::app(&user.id, plan_hint(&headers).as_deref())
}
