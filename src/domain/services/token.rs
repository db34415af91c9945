use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::{rngs::OsRng, RngCore};

/// Random bytes behind every check-in token (192 bits).
pub const CHECKIN_TOKEN_BYTES: usize = 24;

/// Creates an opaque, URL-safe check-in token suitable for a QR code query
/// parameter. Uniqueness is enforced by storage; callers regenerate on
/// `AppError::TokenCollision`.
pub fn generate_checkin_token() -> String {
    let mut buf = [0u8; CHECKIN_TOKEN_BYTES];
    OsRng.fill_bytes(&mut buf);
    URL_SAFE_NO_PAD.encode(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_token_is_url_safe_and_long_enough() {
        let token = generate_checkin_token();
        assert_eq!(token.len(), 32);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn test_tokens_do_not_repeat() {
        let tokens: HashSet<String> = (0..2000).map(|_| generate_checkin_token()).collect();
        assert_eq!(tokens.len(), 2000);
    }
}
