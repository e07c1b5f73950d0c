use actix_web::HttpRequest;

/// The host the client addressed, taken from the request itself.
///
/// Reads the `Host` header (or the URI authority for requests that carry
/// one) and deliberately ignores `Forwarded`/`X-Forwarded-Host`: the gate
/// is the trust boundary for forwarding metadata, so client-supplied
/// values must influence neither routing nor the headers stamped onto
/// upstream requests.
pub fn request_host(req: &HttpRequest) -> String {
    req.headers()
        .get(actix_web::http::header::HOST)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
        .or_else(|| req.uri().authority().map(|authority| authority.to_string()))
        .unwrap_or_default()
}

/// Normalizes a request host for matching: strips any port and lowercases.
///
/// Route hosts are stored lowercase without ports, so
/// `API.Example.com:8080` must compare equal to a route host of
/// `api.example.com`. Bracketed IPv6 literals keep their brackets' content
/// and lose the port after the closing bracket.
///
/// # Examples
///
/// ```rust
/// use infra_gate::utils::host::normalize_host;
///
/// assert_eq!(normalize_host("api.example.com:8080"), "api.example.com");
/// assert_eq!(normalize_host("API.Example.com"), "api.example.com");
/// assert_eq!(normalize_host("[::1]:8080"), "::1");
/// assert_eq!(normalize_host("localhost"), "localhost");
/// ```
pub fn normalize_host(raw: &str) -> String {
    let host = raw.trim();

    let without_port = if let Some(rest) = host.strip_prefix('[') {
        // Bracketed IPv6 literal; the port, if any, follows the bracket.
        match rest.find(']') {
            Some(end) => &rest[..end],
            None => host,
        }
    } else if let Some((name, port)) = host.rsplit_once(':') {
        if !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit()) {
            name
        } else {
            host
        }
    } else {
        host
    };

    without_port.to_ascii_lowercase()
}
