//! HMAC signing of outbound webhook bodies.

use hmac::{Hmac, Mac};
use sha2::Sha256;

/// Header carrying the body signature.
pub const SIGNATURE_HEADER: &str = "X-Storehooks-Signature";

/// Scheme prefix of the signature header value.
pub const SIGNATURE_SCHEME: &str = "sha256";

type HmacSha256 = Hmac<Sha256>;

/// Compute the hex-encoded HMAC-SHA256 of `body` under the subscription
/// secret.
pub fn compute_signature(secret: &str, body: &[u8]) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(body);
    hex::encode(mac.finalize().into_bytes())
}

/// Full header value, e.g. `sha256=3f0a...`.
pub fn signature_header_value(secret: &str, body: &[u8]) -> String {
    format!("{SIGNATURE_SCHEME}={}", compute_signature(secret, body))
}

mod hex {
    /// Encode bytes as a lowercase hex string.
    pub fn encode(bytes: impl AsRef<[u8]>) -> String {
        bytes.as_ref().iter().map(|b| format!("{b:02x}")).collect()
    }
}
