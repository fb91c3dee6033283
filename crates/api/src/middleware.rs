use axum::{
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};

use imfo_booking::CurrentUser;
use imfo_core::UserId;

use crate::app::errors;
use crate::context::UserContext;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_EMAIL_HEADER: &str = "x-user-email";
pub const USER_PHONE_HEADER: &str = "x-user-phone";

/// Derive the request's [`UserContext`] from the `x-user-*` headers.
///
/// A request without `x-user-id` is anonymous; malformed headers are a 400.
pub async fn user_context(
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, Response> {
    let ctx = extract_user(req.headers())
        .map_err(|msg| errors::json_error(StatusCode::BAD_REQUEST, "invalid_user_context", msg))?;

    req.extensions_mut().insert(ctx);
    Ok(next.run(req).await)
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Result<Option<&'a str>, String> {
    let Some(value) = headers.get(name) else {
        return Ok(None);
    };
    let value = value
        .to_str()
        .map_err(|_| format!("{name} must be visible ASCII"))?
        .trim();
    Ok((!value.is_empty()).then_some(value))
}

fn extract_user(headers: &HeaderMap) -> Result<UserContext, String> {
    let Some(id) = header(headers, USER_ID_HEADER)? else {
        return Ok(UserContext::anonymous());
    };

    let id = UserId::new(id).map_err(|e| e.to_string())?;
    let mut user = CurrentUser::new(id);
    if let Some(email) = header(headers, USER_EMAIL_HEADER)? {
        user = user.with_email(email);
    }
    if let Some(phone) = header(headers, USER_PHONE_HEADER)? {
        user = user.with_phone(phone);
    }
    Ok(UserContext::signed_in(user))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn no_user_header_means_anonymous() {
        let ctx = extract_user(&HeaderMap::new()).unwrap();
        assert_eq!(ctx, UserContext::anonymous());
    }

    #[test]
    fn user_headers_build_current_user() {
        let mut headers = HeaderMap::new();
        headers.insert(USER_ID_HEADER, HeaderValue::from_static("user-7"));
        headers.insert(USER_EMAIL_HEADER, HeaderValue::from_static("kofi@x.com"));
        headers.insert(USER_PHONE_HEADER, HeaderValue::from_static(" "));

        let ctx = extract_user(&headers).unwrap();
        let user = ctx.user().unwrap();
        assert_eq!(user.id.as_str(), "user-7");
        assert_eq!(user.email.as_deref(), Some("kofi@x.com"));
        assert_eq!(user.phone, None);
    }

    #[test]
    fn non_ascii_header_is_rejected() {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_ID_HEADER,
            HeaderValue::from_bytes("ámà".as_bytes()).unwrap(),
        );
        assert!(extract_user(&headers).is_err());
    }
}
