//! Signed admin session cookie.
//!
//! The cookie value is `<issued-at unix seconds>.<hex HMAC-SHA256>`, keyed by
//! the configured `SECRET_KEY`. Nothing else is stored server-side: a valid
//! signature younger than the session TTL is a logged-in admin.

use actix_web::cookie::{Cookie, SameSite};
use actix_web::http::header;
use actix_web::{HttpRequest, HttpResponse};
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::config::AppConfig;

pub const SESSION_COOKIE: &str = "aidoshop_admin";
pub const LOGIN_PATH: &str = "/admin/login";

type HmacSha256 = Hmac<Sha256>;

fn mac_for(secret: &str, issued_at: i64) -> Option<HmacSha256> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(format!("admin:{}", issued_at).as_bytes());
    Some(mac)
}

/// Session token for a login happening at `issued_at`.
pub fn sign(secret: &str, issued_at: i64) -> Option<String> {
    let mac = mac_for(secret, issued_at)?;
    Some(format!(
        "{}.{}",
        issued_at,
        hex::encode(mac.finalize().into_bytes())
    ))
}

/// Checks the signature and the age of a session token.
pub fn verify(secret: &str, token: &str, ttl: Duration, now: i64) -> bool {
    let Some((issued, signature)) = token.split_once('.') else {
        return false;
    };
    let Ok(issued_at) = issued.parse::<i64>() else {
        return false;
    };
    let Ok(signature) = hex::decode(signature) else {
        return false;
    };
    if issued_at > now || now - issued_at > ttl.num_seconds() {
        return false;
    }
    mac_for(secret, issued_at).is_some_and(|mac| mac.verify_slice(&signature).is_ok())
}

pub fn is_logged_in(req: &HttpRequest, config: &AppConfig) -> bool {
    req.cookie(SESSION_COOKIE).is_some_and(|cookie| {
        verify(
            &config.secret_key,
            cookie.value(),
            config.session_ttl(),
            Utc::now().timestamp(),
        )
    })
}

pub fn session_cookie(config: &AppConfig) -> Option<Cookie<'static>> {
    let token = sign(&config.secret_key, Utc::now().timestamp())?;
    Some(
        Cookie::build(SESSION_COOKIE, token)
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .finish(),
    )
}

pub fn removal_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::build(SESSION_COOKIE, "")
        .path("/")
        .http_only(true)
        .finish();
    cookie.make_removal();
    cookie
}

/// Redirect to the login page, remembering where the admin was headed.
pub fn login_redirect(req: &HttpRequest) -> HttpResponse {
    let target = req
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| req.path());
    redirect(&login_url(Some(target)))
}

/// Login page URL; `next` is percent-encoded so its own query survives.
pub fn login_url(next: Option<&str>) -> String {
    match next {
        Some(next) => format!("{}?next={}", LOGIN_PATH, urlencoding::encode(next)),
        None => LOGIN_PATH.to_string(),
    }
}

pub fn redirect(location: &str) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, location))
        .finish()
}

/// Only same-site absolute paths are followed after login.
pub fn safe_next(next: Option<&str>) -> Option<&str> {
    next.map(str::trim)
        .filter(|n| n.starts_with('/') && !n.starts_with("//") && !n.contains('\\'))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn signed_token_verifies() {
        let token = sign(SECRET, 1_700_000_000).unwrap();
        assert!(verify(SECRET, &token, Duration::hours(1), 1_700_000_100));
    }

    #[test]
    fn wrong_secret_or_tampered_token_fails() {
        let token = sign(SECRET, 1_700_000_000).unwrap();
        assert!(!verify("other", &token, Duration::hours(1), 1_700_000_100));

        let forged = token.replacen("1700000000", "1700000050", 1);
        assert!(!verify(SECRET, &forged, Duration::hours(1), 1_700_000_100));

        assert!(!verify(SECRET, "garbage", Duration::hours(1), 1_700_000_100));
        assert!(!verify(SECRET, "1700000000.zz", Duration::hours(1), 1_700_000_100));
    }

    #[test]
    fn expired_or_future_token_fails() {
        let token = sign(SECRET, 1_700_000_000).unwrap();
        assert!(!verify(SECRET, &token, Duration::hours(1), 1_700_000_000 + 3601));
        assert!(!verify(SECRET, &token, Duration::hours(1), 1_699_999_000));
    }

    #[test]
    fn login_url_encodes_next() {
        assert_eq!(login_url(None), "/admin/login");
        assert_eq!(
            login_url(Some("/admin/members?focus=a&search=b")),
            "/admin/login?next=%2Fadmin%2Fmembers%3Ffocus%3Da%26search%3Db"
        );
    }

    #[test]
    fn next_must_be_a_local_path() {
        assert_eq!(safe_next(Some("/admin/members/export")), Some("/admin/members/export"));
        assert_eq!(safe_next(Some("https://evil.example")), None);
        assert_eq!(safe_next(Some("//evil.example")), None);
        assert_eq!(safe_next(None), None);
    }
}
