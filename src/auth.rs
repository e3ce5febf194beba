use tracing::warn;

/// Shared secret gating `/add` and `/remove`
#[derive(Debug, Clone)]
pub struct ApiKey(Option<String>);

impl ApiKey {
    pub fn new(key: Option<String>) -> Self {
        if key.is_none() {
            warn!("LOOP_API_KEY not configured - add and remove will reject every request");
        }
        Self(key)
    }

    /// An unconfigured key matches nothing, not even an empty string
    pub fn verify(&self, candidate: &str) -> bool {
        match &self.0 {
            Some(expected) => {
                let ok = expected == candidate;
                if !ok {
                    warn!("Rejected request with wrong key");
                }
                ok
            }
            None => false,
        }
    }
}
