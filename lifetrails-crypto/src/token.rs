//! The unwrapped remote-store access token.

use zeroize::{Zeroize, ZeroizeOnDrop};

/// A bearer credential for the remote record store.
///
/// Produced once per sign-in by unwrapping the user's secret artifact.
/// Held only in session-scoped storage, never written durably; zeroed on
/// drop and redacted in debug output.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_is_redacted() {
        let token = AccessToken::new("ghp_supersecret");
        assert_eq!(format!("{token:?}"), "AccessToken(***)");
    }
}
