use crate::turnstile::{handlers::Reply, store::CredentialStore};
use axum::{
    extract::{Extension, Form},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, instrument};
use utoipa::ToSchema;

/// Login form as posted by the signin page.
#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Result of an authentication attempt. Store failures collapse into
/// `Rejected`; the caller never learns whether the store was reachable.
#[derive(Debug, PartialEq, Eq)]
pub enum AuthOutcome {
    Authenticated { id: i64 },
    Rejected,
}

#[utoipa::path(
    post,
    path= "/signin",
    request_body(content = LoginForm, content_type = "application/x-www-form-urlencoded"),
    responses (
        (status = 200, description = "Authentication outcome, success or error", body = [Reply], content_type = "application/json"),
        (status = 400, description = "Missing or undecodable form body"),
    ),
    tag= "signin"
)]
// axum handler for signin
#[instrument(skip(store))]
pub async fn login(
    store: Extension<Arc<dyn CredentialStore>>,
    payload: Option<Form<LoginForm>>,
) -> Response {
    let form: LoginForm = match payload {
        Some(Form(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing form body".to_string()).into_response(),
    };

    debug!("form: {:?}", form);

    if form.username.is_empty() || form.password.is_empty() {
        let reply = Reply::error("Username and password are required");

        return (StatusCode::OK, Json(reply)).into_response();
    }

    let reply = match authenticate(store.0.as_ref(), &form.username, &form.password).await {
        AuthOutcome::Authenticated { id } => Reply::success("Authentication successful")
            .with_id(id)
            .with_location("/client")
            .with_username(&form.username),

        AuthOutcome::Rejected => Reply::error("Authentication failed"),
    };

    (StatusCode::OK, Json(reply)).into_response()
}

/// Match the submitted username and password against stored records, exact
/// string equality on both. Fails closed: any store error is logged and
/// reported as `Rejected`, never surfaced to the caller. Never mutates the
/// store.
pub async fn authenticate(
    store: &dyn CredentialStore,
    username: &str,
    password: &str,
) -> AuthOutcome {
    match store.find_id_by_credentials(username, password).await {
        Ok(Some(id)) => AuthOutcome::Authenticated { id },

        Ok(None) => {
            debug!("no credential record matched");

            AuthOutcome::Rejected
        }

        Err(error) => {
            error!("Error querying the credential store: {error}");

            AuthOutcome::Rejected
        }
    }
}
