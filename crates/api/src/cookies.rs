//! Reading request cookies and building `Set-Cookie` values.

use axum::http::header::COOKIE;
use axum::http::{HeaderMap, HeaderValue};
use cookie::{Cookie, SameSite};

/// Value of the named cookie, searching every `Cookie` header.
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .find(|c| c.name() == name)
        .map(|c| c.value().to_string())
}

/// A site-wide, HTTP-only cookie.
///
/// `max_age_secs == 0` expires the cookie immediately.
pub fn set_cookie(name: &str, value: &str, max_age_secs: Option<i64>) -> Option<HeaderValue> {
    let mut builder = Cookie::build((name.to_string(), value.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax);
    if let Some(secs) = max_age_secs {
        builder = builder.max_age(cookie::time::Duration::seconds(secs));
    }
    let rendered = builder.build().to_string();
    match HeaderValue::from_str(&rendered) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(cookie = name, error = %e, "Cookie value is not a valid header");
            None
        }
    }
}

/// A `Set-Cookie` value removing the named cookie.
pub fn expire_cookie(name: &str) -> Option<HeaderValue> {
    set_cookie(name, "", Some(0))
}
