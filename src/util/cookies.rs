//! Cookie header codec and the token cookie policy.
//!
//! `Set-Cookie` strings are assembled by hand so the attribute order is
//! stable (`HttpOnly`, `Secure`, `SameSite`, `Max-Age`, `Path`, `Domain`).
//! Incoming `Cookie` headers are client-controlled: parsing never fails,
//! malformed pairs are simply dropped.

use std::collections::HashMap;
use std::fmt;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};

/// Name of the short-lived access token cookie.
pub const ACCESS_TOKEN_COOKIE: &str = "access_token";

/// Name of the long-lived refresh token cookie.
pub const REFRESH_TOKEN_COOKIE: &str = "refresh_token";

/// Bytes escaped by `encodeURIComponent`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// `SameSite` cookie attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SameSite {
    /// Only sent on same-site requests.
    Strict,
    /// Sent on same-site requests and top-level navigations.
    Lax,
    /// Sent on every request (requires `Secure` in browsers).
    None,
}

impl SameSite {
    /// Attribute value as written in the header.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Strict => "strict",
            Self::Lax => "lax",
            Self::None => "none",
        }
    }
}

impl fmt::Display for SameSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Optional attributes attached to a `Set-Cookie` value.
///
/// Absent or `false` attributes are not emitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookieOptions {
    /// Hide the cookie from client-side scripts.
    pub http_only: bool,
    /// Only send over HTTPS.
    pub secure: bool,
    /// Cross-site sending policy.
    pub same_site: Option<SameSite>,
    /// Lifetime in seconds.
    pub max_age: Option<i64>,
    /// Path scope.
    pub path: Option<String>,
    /// Domain scope.
    pub domain: Option<String>,
}

impl CookieOptions {
    /// Returns a copy with `Max-Age` set to `seconds`.
    #[must_use]
    pub fn with_max_age(&self, seconds: i64) -> Self {
        Self {
            max_age: Some(seconds),
            ..self.clone()
        }
    }
}

/// Serializes a cookie into a `Set-Cookie` header value.
///
/// The value is percent-encoded; attributes follow in a fixed order,
/// separated by `"; "`.
#[must_use]
pub fn build_cookie_string(name: &str, value: &str, options: &CookieOptions) -> String {
    let mut parts = vec![format!(
        "{name}={}",
        utf8_percent_encode(value, URI_COMPONENT)
    )];
    if options.http_only {
        parts.push("HttpOnly".to_string());
    }
    if options.secure {
        parts.push("Secure".to_string());
    }
    if let Some(same_site) = options.same_site {
        parts.push(format!("SameSite={same_site}"));
    }
    if let Some(max_age) = options.max_age {
        parts.push(format!("Max-Age={max_age}"));
    }
    if let Some(path) = &options.path {
        parts.push(format!("Path={path}"));
    }
    if let Some(domain) = &options.domain {
        parts.push(format!("Domain={domain}"));
    }
    parts.join("; ")
}

/// Serializes a cookie that tells the client to drop `name` immediately.
#[must_use]
pub fn build_clear_cookie_string(name: &str, options: &CookieOptions) -> String {
    build_cookie_string(name, "", &options.with_max_age(0))
}

/// Parses a `Cookie` request header into a name → value map.
///
/// Pairs without `=`, with an empty name, or whose value is not valid
/// percent-encoded UTF-8 are skipped. A missing header yields an empty map.
#[must_use]
pub fn parse_cookies(header: Option<&str>) -> HashMap<String, String> {
    let mut cookies = HashMap::new();
    let Some(header) = header else {
        return cookies;
    };
    for pair in header.split(';') {
        let Some((name, value)) = pair.trim().split_once('=') else {
            continue;
        };
        let name = name.trim();
        if name.is_empty() {
            continue;
        }
        let Ok(value) = percent_decode_str(value.trim()).decode_utf8() else {
            continue;
        };
        cookies.insert(name.to_string(), value.into_owned());
    }
    cookies
}

/// Looks up a single cookie value in a `Cookie` header.
#[must_use]
pub fn get_token_from_cookies(header: Option<&str>, name: &str) -> Option<String> {
    parse_cookies(header).remove(name)
}

/// Attribute preset and lifetimes for the access/refresh token cookies.
///
/// In production cookies are `Secure` and `SameSite=strict`; elsewhere they
/// drop `Secure` and relax to `SameSite=lax` so plain-HTTP local
/// development keeps working. `HttpOnly` and `Path=/` are always set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookiePolicy {
    base: CookieOptions,
    access_ttl_secs: i64,
    refresh_ttl_secs: i64,
}

impl CookiePolicy {
    /// Builds the policy for the given deployment mode and token lifetimes.
    #[must_use]
    pub fn new(production: bool, access_ttl_secs: i64, refresh_ttl_secs: i64) -> Self {
        Self {
            base: Self::default_options(production),
            access_ttl_secs,
            refresh_ttl_secs,
        }
    }

    /// Shared attribute preset for token cookies.
    #[must_use]
    pub fn default_options(production: bool) -> CookieOptions {
        CookieOptions {
            http_only: true,
            secure: production,
            same_site: Some(if production {
                SameSite::Strict
            } else {
                SameSite::Lax
            }),
            max_age: None,
            path: Some("/".to_string()),
            domain: None,
        }
    }

    /// Attribute preset without a lifetime.
    #[must_use]
    pub fn base_options(&self) -> &CookieOptions {
        &self.base
    }

    /// `Set-Cookie` value carrying an access token.
    #[must_use]
    pub fn access_token_cookie(&self, token: &str) -> String {
        build_cookie_string(
            ACCESS_TOKEN_COOKIE,
            token,
            &self.base.with_max_age(self.access_ttl_secs),
        )
    }

    /// `Set-Cookie` value carrying a refresh token.
    #[must_use]
    pub fn refresh_token_cookie(&self, token: &str) -> String {
        build_cookie_string(
            REFRESH_TOKEN_COOKIE,
            token,
            &self.base.with_max_age(self.refresh_ttl_secs),
        )
    }

    /// `Set-Cookie` values expiring both token cookies.
    #[must_use]
    pub fn clear_token_cookies(&self) -> [String; 2] {
        [
            build_clear_cookie_string(ACCESS_TOKEN_COOKIE, &self.base),
            build_clear_cookie_string(REFRESH_TOKEN_COOKIE, &self.base),
        ]
    }
}
