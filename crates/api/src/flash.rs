//! Flash messages over the signed `messages` cookie.
//!
//! A handler that redirects stores its messages with
//! [`redirect_with_messages`]; the next rendered page reads them through
//! [`PendingMessages`] and clears the cookie with [`render_page`].

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::header::SET_COOKIE;
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use smuggler_core::messages::{Message, MESSAGES_COOKIE};

use crate::cookies::{expire_cookie, read_cookie, set_cookie};
use crate::error::AppResult;
use crate::state::AppState;

/// Messages queued by the previous request.
#[derive(Debug, Default)]
pub struct PendingMessages(pub Vec<Message>);

impl FromRequestParts<AppState> for PendingMessages {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let messages = read_cookie(&parts.headers, MESSAGES_COOKIE)
            .map(|value| state.flash.decode(&value))
            .unwrap_or_default();
        Ok(PendingMessages(messages))
    }
}

/// `303 See Other` to `location`, carrying `messages` to the next page.
pub fn redirect_with_messages(state: &AppState, location: &str, messages: &[Message]) -> Response {
    let mut response = Redirect::to(location).into_response();
    if let Some(cookie) = set_cookie(MESSAGES_COOKIE, &state.flash.encode(messages), None) {
        response.headers_mut().append(SET_COOKIE, cookie);
    }
    response
}

/// Render a template with the given status.
///
/// When the page consumed pending messages the cookie is cleared so they
/// are shown once.
pub fn render_page(
    state: &AppState,
    status: StatusCode,
    template: &str,
    ctx: &tera::Context,
    consumed_messages: bool,
) -> AppResult<Response> {
    let body = state.templates.render(template, ctx)?;
    let mut response = (status, Html(body)).into_response();
    if consumed_messages {
        if let Some(cookie) = expire_cookie(MESSAGES_COOKIE) {
            response.headers_mut().append(SET_COOKIE, cookie);
        }
    }
    Ok(response)
}
