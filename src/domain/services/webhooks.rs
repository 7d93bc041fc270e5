use hmac::{Hmac, Mac};
use sha2::Sha256;

/// HTTPS always; plain HTTP only toward loopback for local development.
pub fn validate_webhook_url(url: &str) -> bool {
    let lower = url.trim().to_lowercase();
    if lower.starts_with("https://") {
        return true;
    }
    if lower.starts_with("http://") {
        return lower.starts_with("http://localhost") || lower.starts_with("http://127.0.0.1");
    }
    false
}

/// Value of the `X-Webhook-Signature` header: `sha256=<hex-hmac-sha256>`.
pub fn sign_payload(secret: &str, body: &str) -> String {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(body.as_bytes());
    format!("sha256={}", hex::encode(mac.finalize().into_bytes()))
}
