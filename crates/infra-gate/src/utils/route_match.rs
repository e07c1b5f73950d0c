use crate::models::route::Route;

/// Score awarded for an exact host match.
///
/// Chosen so that any host match outweighs any realistic path prefix; a
/// prefix would need to be longer than 100 characters to overcome it, and
/// the tie-break below orders host matches first anyway.
const HOST_MATCH_SCORE: u32 = 100;

/// Selects the best-matching route for a request, deterministically.
///
/// The caller passes the already-normalized request host (lowercase, port
/// stripped) and the raw request path. Scoring, summed per route:
///
/// - Non-empty route host equal to the request host: +100. Non-empty but
///   different: the route is disqualified.
/// - Non-empty path prefix that prefixes the request path byte for byte:
///   + the prefix length in characters. Non-empty but not a prefix: the
///   route is disqualified.
/// - Empty host and empty prefix is the catch-all, score 0.
///
/// Ties are broken by the higher (host score, prefix length, identifier)
/// triple; identifiers are unique per table, so the ordering is total and
/// repeated calls against an unchanged table always return the same route.
///
/// Returns `None` when no route qualifies.
///
/// # Examples
///
/// ```rust
/// use chrono::Utc;
/// use infra_gate::models::route::Route;
/// use infra_gate::utils::route_match::best_match;
///
/// let now = Utc::now();
/// let routes = vec![
///     Route {
///         id: "api".to_string(),
///         host: "api.example.com".to_string(),
///         path_prefix: "/v1".to_string(),
///         upstream: "http://127.0.0.1:8081".to_string(),
///         created_at: now,
///         updated_at: now,
///     },
///     Route {
///         id: "fallback".to_string(),
///         host: String::new(),
///         path_prefix: String::new(),
///         upstream: "http://127.0.0.1:9000".to_string(),
///         created_at: now,
///         updated_at: now,
///     },
/// ];
///
/// let hit = best_match(routes.iter(), "api.example.com", "/v1/users").unwrap();
/// assert_eq!(hit.id, "api");
///
/// let miss = best_match(routes.iter(), "other.example.com", "/v1/users").unwrap();
/// assert_eq!(miss.id, "fallback");
/// ```
pub fn best_match<'a, I>(routes: I, host: &str, path: &str) -> Option<&'a Route>
where
    I: IntoIterator<Item = &'a Route>,
{
    routes
        .into_iter()
        .filter_map(|route| score(route, host, path).map(|key| (key, route)))
        .max_by(|(a, _), (b, _)| a.cmp(b))
        .map(|(_, route)| route)
}

/// Scores a single route against a request, or disqualifies it.
///
/// The returned key orders candidates by summed score first, then by the
/// (host score, prefix length, identifier) tie-break triple, so the natural
/// tuple ordering on the key implements the whole selection rule.
fn score<'a>(route: &'a Route, host: &str, path: &str) -> Option<(u64, u32, usize, &'a str)> {
    let host_score = if route.host.is_empty() {
        0
    } else if route.host == host {
        HOST_MATCH_SCORE
    } else {
        return None;
    };

    let prefix_len = if route.path_prefix.is_empty() {
        0
    } else if path.as_bytes().starts_with(route.path_prefix.as_bytes()) {
        route.path_prefix.chars().count()
    } else {
        return None;
    };

    let total = u64::from(host_score) + prefix_len as u64;
    Some((total, host_score, prefix_len, route.id.as_str()))
}
