/// Authentication handlers
///
/// Thin transport layer: decode the request, hand it to the session service,
/// carry the refresh token in an HttpOnly cookie. The cookie attributes are
/// dictated by the session module's constants; only the Secure flag comes
/// from configuration.
use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use validator::Validate;

use crate::error::AuthError;
use crate::models::{LoginRequest, RegisterRequest, TokenPair};
use crate::services::session::{self, REFRESH_COOKIE};
use crate::AppState;

pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, CookieJar, Json<TokenPair>), AuthError> {
    payload
        .validate()
        .map_err(|e| AuthError::Validation(e.to_string()))?;

    let pair = state.sessions.register(&payload).await?;

    let jar = jar.add(refresh_cookie(&pair.refresh_token, state.cookie_secure));
    Ok((StatusCode::CREATED, jar, Json(pair)))
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<LoginRequest>,
) -> Result<(CookieJar, Json<TokenPair>), AuthError> {
    payload
        .validate()
        .map_err(|e| AuthError::Validation(e.to_string()))?;

    let pair = state.sessions.login(&payload).await?;

    let jar = jar.add(refresh_cookie(&pair.refresh_token, state.cookie_secure));
    Ok((jar, Json(pair)))
}

pub async fn refresh(
    State(state): State<AppState>,
    jar: CookieJar,
    headers: HeaderMap,
) -> Result<(CookieJar, Json<TokenPair>), AuthError> {
    let (access_token, refresh_token) = presented_pair(&headers, &jar)?;

    let pair = state.sessions.refresh(&access_token, &refresh_token).await?;

    let jar = jar.add(refresh_cookie(&pair.refresh_token, state.cookie_secure));
    Ok((jar, Json(pair)))
}

pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
    headers: HeaderMap,
) -> Result<(StatusCode, CookieJar), AuthError> {
    let (_access_token, refresh_token) = presented_pair(&headers, &jar)?;

    state.sessions.logout(&refresh_token).await;

    let jar = jar.add(clear_refresh_cookie(state.cookie_secure));
    Ok((StatusCode::NO_CONTENT, jar))
}

/// Refresh and logout require both halves of the pair: a bearer access token
/// in the Authorization header and the refresh token cookie. Absence of
/// either is a terminal auth failure for these operations.
fn presented_pair(headers: &HeaderMap, jar: &CookieJar) -> Result<(String, String), AuthError> {
    let access_token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .filter(|t| !t.is_empty())
        .ok_or(AuthError::InvalidToken)?
        .to_string();

    let refresh_token = jar
        .get(REFRESH_COOKIE)
        .map(|c| c.value().to_string())
        .ok_or(AuthError::InvalidRefreshToken)?;

    Ok((access_token, refresh_token))
}

fn refresh_cookie(token: &str, secure: bool) -> Cookie<'static> {
    Cookie::build((REFRESH_COOKIE, token.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Strict)
        .secure(secure)
        .max_age(time::Duration::seconds(
            session::refresh_token_ttl().num_seconds(),
        ))
        .build()
}

/// Same Path/HttpOnly/SameSite as issuance with an expiry in the past, so
/// the browser unambiguously removes it.
fn clear_refresh_cookie(secure: bool) -> Cookie<'static> {
    let mut cookie = Cookie::build((REFRESH_COOKIE, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Strict)
        .secure(secure)
        .build();
    cookie.make_removal();
    cookie
}
