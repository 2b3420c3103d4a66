use actix_web::http::header;
use actix_web::HttpRequest;

/// Client address as seen by the server.
///
/// Uses realip_remote_addr(), which honours Forwarded/X-Forwarded-For only
/// when a trusted proxy is configured, so the value feeding the login
/// throttle cannot be spoofed by an ordinary client.
pub fn client_ip(req: &HttpRequest) -> Option<String> {
    req.connection_info()
        .realip_remote_addr()
        .map(|addr| addr.to_string())
}

/// Device fingerprint for refresh sessions. One live refresh token exists
/// per (user, fingerprint) pair, so clients without a User-Agent header
/// share the "unknown" slot.
pub fn user_agent(req: &HttpRequest) -> String {
    req.headers()
        .get(header::USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown")
        .to_string()
}
