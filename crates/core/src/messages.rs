//! One-shot flash messages.
//!
//! Messages are queued while handling one request and shown on the next
//! rendered page. Between the two they travel in a cookie whose value is
//! `base64url(json) "." hex(hmac_sha256(json))`; a value whose signature
//! does not verify decodes to no messages at all.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

/// Name of the cookie carrying pending messages.
pub const MESSAGES_COOKIE: &str = "messages";

type HmacSha256 = Hmac<Sha256>;

/// Message severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Debug,
    Info,
    Success,
    Warning,
    Error,
}

impl Level {
    /// CSS class / tag name used by the templates.
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Success => "success",
            Level::Warning => "warning",
            Level::Error => "error",
        }
    }
}

/// A single flash message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub level: Level,
    pub text: String,
}

impl Message {
    pub fn new(level: Level, text: impl Into<String>) -> Self {
        Self {
            level,
            text: text.into(),
        }
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self::new(Level::Info, text)
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::new(Level::Error, text)
    }
}

/// Signs and verifies the messages cookie.
#[derive(Clone)]
pub struct FlashCodec {
    secret: Vec<u8>,
}

impl std::fmt::Debug for FlashCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlashCodec").finish_non_exhaustive()
    }
}

impl FlashCodec {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self {
            secret: secret.as_ref().to_vec(),
        }
    }

    fn mac(&self) -> HmacSha256 {
        HmacSha256::new_from_slice(&self.secret).expect("HMAC accepts any key length")
    }

    /// Encode messages into a cookie value.
    pub fn encode(&self, messages: &[Message]) -> String {
        // Serializing plain strings and unit enums cannot fail.
        let json = serde_json::to_vec(messages).unwrap_or_default();
        let mut mac = self.mac();
        mac.update(&json);
        let signature = hex::encode(mac.finalize().into_bytes());
        format!("{}.{signature}", URL_SAFE_NO_PAD.encode(&json))
    }

    /// Decode a cookie value; tampered or garbled values yield no messages.
    pub fn decode(&self, value: &str) -> Vec<Message> {
        let Some((payload, signature)) = value.rsplit_once('.') else {
            return Vec::new();
        };
        let Ok(json) = URL_SAFE_NO_PAD.decode(payload) else {
            return Vec::new();
        };
        let Ok(signature) = hex::decode(signature) else {
            return Vec::new();
        };

        let mut mac = self.mac();
        mac.update(&json);
        if mac.verify_slice(&signature).is_err() {
            tracing::warn!("Discarding messages cookie with a bad signature");
            return Vec::new();
        }

        serde_json::from_slice(&json).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_survive_the_cookie() {
        let codec = FlashCodec::new("secret");
        let messages = vec![
            Message::info("0 object(s) from 1 file(s) loaded with success."),
            Message::error("An exception occurred while loading data: No JSON object could be decoded"),
        ];

        let value = codec.encode(&messages);
        assert!(value.is_ascii());
        assert!(!value.contains(';'));
        assert_eq!(codec.decode(&value), messages);
    }

    #[test]
    fn tampered_payload_is_dropped() {
        let codec = FlashCodec::new("secret");
        let value = codec.encode(&[Message::info("hello")]);
        let forged = FlashCodec::new("other").encode(&[Message::info("forged")]);
        let (forged_payload, _) = forged.rsplit_once('.').unwrap();
        let (_, signature) = value.rsplit_once('.').unwrap();

        assert!(codec.decode(&format!("{forged_payload}.{signature}")).is_empty());
        assert!(codec.decode(&forged).is_empty());
    }

    #[test]
    fn garbage_decodes_to_nothing() {
        let codec = FlashCodec::new("secret");
        assert!(codec.decode("").is_empty());
        assert!(codec.decode("no-dot-here").is_empty());
        assert!(codec.decode("!!!.zz").is_empty());
    }

    #[test]
    fn signature_is_lowercase_hex() {
        let codec = FlashCodec::new("secret");
        let value = codec.encode(&[Message::info("hello")]);
        let (payload, signature) = value.rsplit_once('.').unwrap();

        assert_eq!(signature.len(), 64);
        assert!(signature.chars().all(|c| matches!(c, '0'..='9' | 'a'..='f')));
        assert_eq!(codec.decode(&format!("{payload}.{}", signature.to_uppercase())).len(), 1);
        assert!(codec.decode(&format!("{payload}.{}", &signature[1..])).is_empty());
    }

    #[test]
    fn levels_have_template_names() {
        assert_eq!(Level::Info.as_str(), "info");
        assert_eq!(Level::Error.as_str(), "error");
    }
}
