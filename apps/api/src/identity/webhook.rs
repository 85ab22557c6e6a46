//! Svix webhook signature verification.
//!
//! The signed content is `"{svix-id}.{svix-timestamp}.{body}"`, MACed with
//! HMAC-SHA256 under the base64 secret that follows the `whsec_` prefix.
//! `svix-signature` holds space-separated `v1,<base64>` entries; any one
//! matching entry is enough.

use axum::http::HeaderMap;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use thiserror::Error;

use crate::errors::AppError;

type HmacSha256 = Hmac<Sha256>;

const SECRET_PREFIX: &str = "whsec_";
const TOLERANCE_SECS: i64 = 5 * 60;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WebhookError {
    #[error("webhook secret is not valid base64")]
    BadSecret,
    #[error("missing header {0}")]
    MissingHeader(&'static str),
    #[error("timestamp header is invalid")]
    BadTimestamp,
    #[error("timestamp outside the accepted window")]
    StaleTimestamp,
    #[error("no matching signature")]
    NoMatchingSignature,
}

impl From<WebhookError> for AppError {
    fn from(err: WebhookError) -> Self {
        tracing::warn!("Rejected webhook: {err}");
        AppError::Validation("Webhook Error".to_string())
    }
}

#[derive(Clone)]
pub struct WebhookVerifier {
    key: Vec<u8>,
}

impl WebhookVerifier {
    pub fn new(secret: &str) -> Result<Self, WebhookError> {
        let encoded = secret.strip_prefix(SECRET_PREFIX).unwrap_or(secret);
        let key = STANDARD
            .decode(encoded)
            .map_err(|_| WebhookError::BadSecret)?;
        Ok(Self { key })
    }

    pub fn verify(&self, headers: &HeaderMap, body: &[u8]) -> Result<(), WebhookError> {
        self.verify_at(headers, body, Utc::now())
    }

    fn verify_at(
        &self,
        headers: &HeaderMap,
        body: &[u8],
        now: DateTime<Utc>,
    ) -> Result<(), WebhookError> {
        let msg_id = header(headers, "svix-id")?;
        let timestamp = header(headers, "svix-timestamp")?;
        let signatures = header(headers, "svix-signature")?;

        let sent_at: i64 = timestamp
            .trim()
            .parse()
            .map_err(|_| WebhookError::BadTimestamp)?;
        if (now.timestamp() - sent_at).abs() > TOLERANCE_SECS {
            return Err(WebhookError::StaleTimestamp);
        }

        let expected = self.sign(msg_id, timestamp, body);
        let matched = signatures
            .split_whitespace()
            .filter_map(|entry| entry.split_once(','))
            .filter(|(version, _)| *version == "v1")
            .filter_map(|(_, sig)| STANDARD.decode(sig).ok())
            .any(|sig| sig.len() == expected.len() && bool::from(sig.ct_eq(&expected)));

        if matched {
            Ok(())
        } else {
            Err(WebhookError::NoMatchingSignature)
        }
    }

    fn sign(&self, msg_id: &str, timestamp: &str, body: &[u8]) -> Vec<u8> {
        let mut mac =
            HmacSha256::new_from_slice(&self.key).expect("HMAC accepts keys of any size");
        mac.update(msg_id.as_bytes());
        mac.update(b".");
        mac.update(timestamp.as_bytes());
        mac.update(b".");
        mac.update(body);
        mac.finalize().into_bytes().to_vec()
    }
}

#[cfg(test)]
impl WebhookVerifier {
    /// Headers a sender would attach to `body` right now.
    pub fn signed_headers(&self, msg_id: &str, body: &[u8]) -> HeaderMap {
        let ts = Utc::now().timestamp().to_string();
        let sig = STANDARD.encode(self.sign(msg_id, &ts, body));
        let mut headers = HeaderMap::new();
        for (name, value) in [
            ("svix-id", msg_id.to_string()),
            ("svix-timestamp", ts),
            ("svix-signature", format!("v1,{sig}")),
        ] {
            headers.insert(name, value.parse().unwrap());
        }
        headers
    }
}

fn header<'a>(headers: &'a HeaderMap, name: &'static str) -> Result<&'a str, WebhookError> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .ok_or(WebhookError::MissingHeader(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    const SECRET: &str = "whsec_MfKQ9r8GKYqrTwjUPD8ILPZIo2LaLaSw";
    const BODY: &[u8] = br#"{"type":"user.created","data":{"id":"user_1"}}"#;

    fn signed_headers(verifier: &WebhookVerifier, at: DateTime<Utc>, body: &[u8]) -> HeaderMap {
        let ts = at.timestamp().to_string();
        let sig = STANDARD.encode(verifier.sign("msg_1", &ts, body));
        let mut headers = HeaderMap::new();
        headers.insert("svix-id", HeaderValue::from_static("msg_1"));
        headers.insert("svix-timestamp", HeaderValue::from_str(&ts).unwrap());
        headers.insert(
            "svix-signature",
            HeaderValue::from_str(&format!("v1,bm9wZQ== v1,{sig}")).unwrap(),
        );
        headers
    }

    #[test]
    fn test_valid_signature_accepted() {
        let verifier = WebhookVerifier::new(SECRET).unwrap();
        let now = Utc::now();
        let headers = signed_headers(&verifier, now, BODY);
        assert_eq!(verifier.verify_at(&headers, BODY, now), Ok(()));
    }

    #[test]
    fn test_modified_body_rejected() {
        let verifier = WebhookVerifier::new(SECRET).unwrap();
        let now = Utc::now();
        let headers = signed_headers(&verifier, now, BODY);
        assert_eq!(
            verifier.verify_at(&headers, b"{}", now),
            Err(WebhookError::NoMatchingSignature)
        );
    }

    #[test]
    fn test_stale_timestamp_rejected() {
        let verifier = WebhookVerifier::new(SECRET).unwrap();
        let sent = Utc::now() - chrono::Duration::minutes(10);
        let headers = signed_headers(&verifier, sent, BODY);
        assert_eq!(
            verifier.verify_at(&headers, BODY, Utc::now()),
            Err(WebhookError::StaleTimestamp)
        );
    }

    #[test]
    fn test_missing_headers_rejected() {
        let verifier = WebhookVerifier::new(SECRET).unwrap();
        assert_eq!(
            verifier.verify_at(&HeaderMap::new(), BODY, Utc::now()),
            Err(WebhookError::MissingHeader("svix-id"))
        );
    }

    #[test]
    fn test_other_secret_rejected() {
        let signer = WebhookVerifier::new(SECRET).unwrap();
        let other = WebhookVerifier::new("whsec_c2Vjb25kLXNlY3JldA==").unwrap();
        let now = Utc::now();
        let headers = signed_headers(&signer, now, BODY);
        assert_eq!(
            other.verify_at(&headers, BODY, now),
            Err(WebhookError::NoMatchingSignature)
        );
    }

    #[test]
    fn test_bad_secret() {
        assert!(matches!(
            WebhookVerifier::new("whsec_***"),
            Err(WebhookError::BadSecret)
        ));
    }
}
