//! OAuth 1.0a request signing (HMAC-SHA1), as required by the Yelp v2 API.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use hmac::{Hmac, Mac};
use rand::{distributions::Alphanumeric, Rng};
use sha1::Sha1;

type HmacSha1 = Hmac<Sha1>;

const NONCE_LEN: usize = 32;

/// Consumer and access-token credentials for a single signed request.
#[derive(Debug, Clone, Copy)]
pub struct OAuthCredentials<'a> {
    pub consumer_key: &'a str,
    pub consumer_secret: &'a str,
    pub token: &'a str,
    pub token_secret: &'a str,
}

/// Builds the `Authorization` header for `method url?params`, using a fresh
/// nonce and the current time.
pub fn authorization_header(
    credentials: &OAuthCredentials,
    method: &str,
    url: &str,
    params: &[(&str, &str)],
) -> String {
    let nonce: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(NONCE_LEN)
        .map(char::from)
        .collect();
    let timestamp = chrono::Utc::now().timestamp().to_string();
    authorization_header_with(credentials, method, url, params, &nonce, &timestamp)
}

pub fn authorization_header_with(
    credentials: &OAuthCredentials,
    method: &str,
    url: &str,
    params: &[(&str, &str)],
    nonce: &str,
    timestamp: &str,
) -> String {
    let mut oauth_params = vec![
        ("oauth_consumer_key", credentials.consumer_key.to_string()),
        ("oauth_nonce", nonce.to_string()),
        ("oauth_signature_method", "HMAC-SHA1".to_string()),
        ("oauth_timestamp", timestamp.to_string()),
        ("oauth_token", credentials.token.to_string()),
        ("oauth_version", "1.0".to_string()),
    ];

    let mut all_params: Vec<(&str, &str)> = params.to_vec();
    all_params.extend(oauth_params.iter().map(|(k, v)| (*k, v.as_str())));
    let base = signature_base_string(method, url, &all_params);
    let signature = sign(&base, credentials.consumer_secret, credentials.token_secret);
    oauth_params.push(("oauth_signature", signature));

    let fields: Vec<String> = oauth_params
        .iter()
        .map(|(k, v)| format!("{}=\"{}\"", percent_encode(k), percent_encode(v)))
        .collect();
    format!("OAuth {}", fields.join(", "))
}

pub fn signature_base_string(method: &str, url: &str, params: &[(&str, &str)]) -> String {
    let mut encoded: Vec<(String, String)> = params
        .iter()
        .map(|(k, v)| (percent_encode(k), percent_encode(v)))
        .collect();
    encoded.sort();
    let normalized = encoded
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    format!(
        "{}&{}&{}",
        method.to_uppercase(),
        percent_encode(url),
        percent_encode(&normalized)
    )
}

pub fn sign(base_string: &str, consumer_secret: &str, token_secret: &str) -> String {
    let key = format!("{}&{}", percent_encode(consumer_secret), percent_encode(token_secret));
    hmac_sha1_base64(key.as_bytes(), base_string.as_bytes())
}

fn hmac_sha1_base64(key: &[u8], data: &[u8]) -> String {
    // HMAC accepts keys of any length
    let mut mac = HmacSha1::new_from_slice(key).unwrap();
    mac.update(data);
    STANDARD.encode(mac.finalize().into_bytes())
}

/// RFC 3986 percent-encoding: everything but `A-Z a-z 0-9 - . _ ~`.
pub fn percent_encode(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
        .replace('*', "%2A")
        .replace("%7E", "~")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_encoding_follows_rfc3986() {
        assert_eq!(percent_encode("Ladies + Gentlemen"), "Ladies%20%2B%20Gentlemen");
        assert_eq!(percent_encode("An encoded string!"), "An%20encoded%20string%21");
        assert_eq!(percent_encode("Dogs, Cats & Mice"), "Dogs%2C%20Cats%20%26%20Mice");
        assert_eq!(percent_encode("a*b~c-d.e_f"), "a%2Ab~c-d.e_f");
        assert_eq!(percent_encode("☃"), "%E2%98%83");
    }

    #[test]
    fn hmac_sha1_known_vector() {
        // RFC 2202 test case 2
        assert_eq!(
            hmac_sha1_base64(b"Jefe", b"what do ya want for nothing?"),
            "7/zfauXrL6LSdBbV8YTfnCWafHk="
        );
    }

    #[test]
    fn base_string_sorts_and_encodes() {
        let base = signature_base_string(
            "get",
            "https://api.yelp.com/v2/search",
            &[("term", "sushi food"), ("location", "Boulder, Colorado")],
        );
        assert_eq!(
            base,
            "GET&https%3A%2F%2Fapi.yelp.com%2Fv2%2Fsearch&location%3DBoulder%252C%2520Colorado%26term%3Dsushi%2520food"
        );
    }

    #[test]
    fn header_carries_all_oauth_fields() {
        let credentials = OAuthCredentials {
            consumer_key: "ck",
            consumer_secret: "cs",
            token: "tk",
            token_secret: "ts",
        };
        let header = authorization_header_with(
            &credentials,
            "GET",
            "https://api.yelp.com/v2/search",
            &[("term", "pizza food")],
            "abc123",
            "1400000000",
        );
        assert!(header.starts_with("OAuth "));
        for field in [
            "oauth_consumer_key=\"ck\"",
            "oauth_nonce=\"abc123\"",
            "oauth_signature_method=\"HMAC-SHA1\"",
            "oauth_timestamp=\"1400000000\"",
            "oauth_token=\"tk\"",
            "oauth_version=\"1.0\"",
            "oauth_signature=\"",
        ] {
            assert!(header.contains(field), "{} missing from {}", field, header);
        }

        let again = authorization_header_with(
            &credentials,
            "GET",
            "https://api.yelp.com/v2/search",
            &[("term", "pizza food")],
            "abc123",
            "1400000000",
        );
        assert_eq!(header, again);
    }

    #[test]
    fn fresh_nonces_change_the_signature() {
        let credentials = OAuthCredentials {
            consumer_key: "ck",
            consumer_secret: "cs",
            token: "tk",
            token_secret: "ts",
        };
        let a = authorization_header(&credentials, "GET", "https://api.yelp.com/v2/search", &[]);
        let b = authorization_header(&credentials, "GET", "https://api.yelp.com/v2/search", &[]);
        assert_ne!(a, b);
    }
}
