//! Helpers for API secret resolution, endpoint URLs, client ids and CLI params.

use crate::secret::SecretBackend;
use rand::Rng;
use serde_json::Value;

/// Where the API secret came from (for diagnostics).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiSecretSource {
    Explicit,
    Backend(SecretBackend),
}

/// Resolve the Measurement Protocol API secret.
///
/// An explicit value (CLI flag or `GA4_API_SECRET`) wins; otherwise each
/// secret backend is tried in order (see [crate::secret]).
pub fn get_api_secret(explicit: Option<&str>) -> Result<(String, ApiSecretSource), String> {
    if let Some(s) = explicit.map(str::trim).filter(|s| !s.is_empty()) {
        return Ok((s.to_string(), ApiSecretSource::Explicit));
    }
    for backend in SecretBackend::ALL {
        if let Some(s) = backend.read() {
            return Ok((s, ApiSecretSource::Backend(backend)));
        }
    }
    Err(
        "API secret not found. Pass --api-secret / GA4_API_SECRET or configure a secret backend: \
         GA4_OP_ENTRY_PATH (1Password), GA4_BW_ITEM_ID (Bitwarden), or GA4_KPXC_DB+GA4_KPXC_ENTRY (KeePassXC)."
            .to_string(),
    )
}

/// Collection URL for production or validation, `api_secret` before `measurement_id`.
pub fn collect_url(endpoint: &str, debug: bool, api_secret: &str, measurement_id: &str) -> String {
    let path = if debug { "debug/mp/collect" } else { "mp/collect" };
    format!(
        "{}/{}?api_secret={}&measurement_id={}",
        endpoint.trim_end_matches('/'),
        path,
        urlencoding::encode(api_secret),
        urlencoding::encode(measurement_id)
    )
}

/// Synthetic per-call client id: `<random 31-bit int>.<unix seconds>`.
pub fn client_id<R: Rng + ?Sized>(rng: &mut R, unix_secs: i64) -> String {
    let n: u32 = rng.gen_range(0..1u32 << 31);
    format!("{}.{}", n, unix_secs)
}

/// Parse a `key=value` event param. The value is taken as JSON when it parses
/// (`n=3`, `ok=true`, `tags=["a"]`), otherwise as a plain string.
pub fn parse_param(s: &str) -> Result<(String, Value), String> {
    let (key, raw) = s
        .split_once('=')
        .ok_or_else(|| format!("Invalid param (expected key=value): {}", s))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("Invalid param (empty key): {}", s));
    }
    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok((key.to_string(), value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_collect_url_production() {
        let u = collect_url("https://www.google-analytics.com", false, "secret1", "G-TEST123");
        assert_eq!(
            u,
            "https://www.google-analytics.com/mp/collect?api_secret=secret1&measurement_id=G-TEST123"
        );
    }

    #[test]
    fn test_collect_url_debug_trims_slash_and_encodes() {
        let u = collect_url("http://127.0.0.1:9/", true, "a b&c", "G-1");
        assert_eq!(
            u,
            "http://127.0.0.1:9/debug/mp/collect?api_secret=a%20b%26c&measurement_id=G-1"
        );
    }

    #[test]
    fn test_client_id_shape() {
        let mut rng = StdRng::seed_from_u64(7);
        let id = client_id(&mut rng, 1_700_000_000);
        let (n, secs) = id.split_once('.').unwrap();
        assert!(n.parse::<u32>().unwrap() < 1 << 31);
        assert_eq!(secs, "1700000000");
    }

    #[test]
    fn test_client_id_deterministic_under_seed() {
        let a = client_id(&mut StdRng::seed_from_u64(42), 1);
        let b = client_id(&mut StdRng::seed_from_u64(42), 1);
        assert_eq!(a, b);
    }

    #[test]
    fn test_parse_param() {
        assert_eq!(
            parse_param("method=email").unwrap(),
            ("method".to_string(), Value::from("email"))
        );
        assert_eq!(
            parse_param("count=3").unwrap(),
            ("count".to_string(), Value::from(3))
        );
        assert_eq!(
            parse_param("note=a=b").unwrap(),
            ("note".to_string(), Value::from("a=b"))
        );
        assert!(parse_param("novalue").is_err());
        assert!(parse_param("=x").is_err());
    }

    #[test]
    fn test_explicit_secret_wins() {
        let (s, src) = get_api_secret(Some(" secret1 ")).unwrap();
        assert_eq!(s, "secret1");
        assert_eq!(src, ApiSecretSource::Explicit);
    }
}
