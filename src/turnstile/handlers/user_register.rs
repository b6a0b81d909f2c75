use crate::turnstile::{
    handlers::Reply,
    store::{CredentialStore, NewCredential, StoreError},
};
use axum::{
    extract::{Extension, Form},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, instrument};
use utoipa::ToSchema;

/// Registration form as posted by the signup page. Absent fields
/// deserialize to empty strings and fail validation instead of rejecting
/// the request.
#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct RegisterForm {
    #[serde(default)]
    pub fname: String,
    #[serde(default)]
    pub lname: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub cpassword: String,
}

/// Result of a registration attempt. `Registered` means exactly one new
/// credential record exists; every other variant leaves the store untouched.
#[derive(Debug, PartialEq, Eq)]
pub enum RegisterOutcome {
    AllFieldsRequired,
    PasswordTooShort,
    PasswordMismatch,
    StoreConnectionFailed,
    InternalError,
    Registered,
}

impl From<RegisterOutcome> for Reply {
    fn from(outcome: RegisterOutcome) -> Self {
        match outcome {
            RegisterOutcome::AllFieldsRequired => Reply::error("All fields are required"),
            RegisterOutcome::PasswordTooShort => {
                Reply::error("Password must be 6 or more characters")
            }
            RegisterOutcome::PasswordMismatch => Reply::error("Confirm password did not match"),
            RegisterOutcome::StoreConnectionFailed => Reply::error("Error connecting to database"),
            RegisterOutcome::InternalError => Reply::error("Internal Server Error"),
            RegisterOutcome::Registered => Reply::success("User registered successfully"),
        }
    }
}

#[utoipa::path(
    post,
    path= "/signup",
    request_body(content = RegisterForm, content_type = "application/x-www-form-urlencoded"),
    responses (
        (status = 200, description = "Registration outcome, success or error", body = [Reply], content_type = "application/json"),
        (status = 400, description = "Missing or undecodable form body"),
    ),
    tag= "signup"
)]
// axum handler for signup
#[instrument(skip(store))]
pub async fn register(
    store: Extension<Arc<dyn CredentialStore>>,
    payload: Option<Form<RegisterForm>>,
) -> Response {
    let form: RegisterForm = match payload {
        Some(Form(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing form body".to_string()).into_response(),
    };

    debug!("form: {:?}", form);

    let outcome = validate_and_register(store.0.as_ref(), &form).await;

    (StatusCode::OK, Json(Reply::from(outcome))).into_response()
}

/// Validate the five registration fields and, if they pass, insert a single
/// credential record. Checks run in order and the first failure wins; the
/// store is only reached once validation is through.
pub async fn validate_and_register(
    store: &dyn CredentialStore,
    form: &RegisterForm,
) -> RegisterOutcome {
    if form.username.is_empty()
        || form.password.is_empty()
        || form.fname.is_empty()
        || form.lname.is_empty()
        || form.cpassword.is_empty()
    {
        return RegisterOutcome::AllFieldsRequired;
    }

    if form.password.len() < 6 {
        return RegisterOutcome::PasswordTooShort;
    }

    if form.password != form.cpassword {
        return RegisterOutcome::PasswordMismatch;
    }

    let credential = NewCredential {
        first_name: form.fname.clone(),
        last_name: form.lname.clone(),
        username: form.username.clone(),
        password: form.password.clone(),
    };

    match store.insert_credential(&credential).await {
        Ok(id) => {
            debug!("credential stored with id {id}");

            RegisterOutcome::Registered
        }

        Err(error @ StoreError::Unavailable(_)) => {
            error!("Error connecting to credential store: {error}");

            RegisterOutcome::StoreConnectionFailed
        }

        Err(error) => {
            error!("Error inserting credential: {error}");

            RegisterOutcome::InternalError
        }
    }
}
