use log::debug;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

/// Path prefix intercepted by the gate for HTTP-01 challenges.
pub const CHALLENGE_PREFIX: &str = "/.well-known/acme-challenge/";

/// Extracts the challenge token from a request path.
///
/// Returns `None` both for paths outside the challenge prefix and for the
/// bare prefix with an empty token; an empty token falls through to normal
/// routing rather than being intercepted.
pub fn challenge_token(path: &str) -> Option<&str> {
    match path.strip_prefix(CHALLENGE_PREFIX) {
        Some("") | None => None,
        Some(token) => Some(token),
    }
}

/// Read side of the ACME collaborator.
///
/// The certificate manager owns challenge storage and lifecycle; the gate
/// only resolves tokens on demand while a validation is in flight. `None`
/// means the token is unknown and the gate answers 404.
pub trait ChallengeLookup: Send + Sync {
    /// Resolves a token to its key-authorization response body.
    fn response_for(&self, token: &str) -> Option<String>;
}

/// Challenge store backed by the certificate manager's cache directory.
///
/// Pending challenges are plain files named after their token; the gate
/// reads them fresh on every request so a challenge published mid-flight is
/// picked up without coordination. Tokens are restricted to the URL-safe
/// base64 alphabet, which also keeps lookups from escaping the directory.
pub struct DirChallengeStore {
    dir: PathBuf,
}

impl DirChallengeStore {
    /// Creates a store over the certificate manager's challenge directory.
    /// The directory does not have to exist yet; lookups simply miss until
    /// the first challenge is written.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn token_is_safe(token: &str) -> bool {
        !token.is_empty()
            && token
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
    }
}

impl ChallengeLookup for DirChallengeStore {
    fn response_for(&self, token: &str) -> Option<String> {
        if !Self::token_is_safe(token) {
            debug!("rejecting challenge token with unexpected characters");
            return None;
        }
        std::fs::read_to_string(self.dir.join(token)).ok()
    }
}

/// In-memory challenge store for tests and embedders.
///
/// # Examples
///
/// ```rust
/// use infra_gate::services::acme::{ChallengeLookup, MemoryChallengeStore};
///
/// let store = MemoryChallengeStore::new();
/// store.publish("TOK", "TOK.fingerprint");
/// assert_eq!(store.response_for("TOK").as_deref(), Some("TOK.fingerprint"));
/// assert_eq!(store.response_for("other"), None);
/// ```
#[derive(Default)]
pub struct MemoryChallengeStore {
    responses: RwLock<HashMap<String, String>>,
}

impl MemoryChallengeStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Publishes a challenge response under a token.
    pub fn publish(&self, token: &str, response: &str) {
        self.responses
            .write()
            .unwrap()
            .insert(token.to_string(), response.to_string());
    }
}

impl ChallengeLookup for MemoryChallengeStore {
    fn response_for(&self, token: &str) -> Option<String> {
        self.responses.read().unwrap().get(token).cloned()
    }
}
