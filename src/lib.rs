//! # Turnstile
//!
//! `turnstile` is a small form-based authentication backend. Browsers POST
//! urlencoded registration and login forms; the service validates the
//! submission and answers with a JSON envelope the frontend renders.
//! Credential records live in `PostgreSQL`.
//!
//! ## Endpoints
//!
//! - `POST /signup`: validate the five registration fields and create a
//!   credential record.
//! - `POST /signin`: match username and password against stored records.
//! - `GET /health`: store connectivity and build information.
//!
//! ## Credential model
//!
//! Passwords are stored and compared as plain text, exactly as submitted.
//! Usernames are not unique. Both are documented properties of the service,
//! not oversights; see DESIGN.md before depending on either.

pub mod cli;
pub mod turnstile;
