/// URL validation for outbound endpoints and rendered links
use super::ValidationError;
use url::Url;

/// Schemes a widget may fetch from or link to
const ALLOWED_SCHEMES: &[&str] = &["http", "https"];

fn host_matches(host: &str, domain: &str) -> bool {
    host == domain
        || host
            .strip_suffix(domain)
            .is_some_and(|prefix| prefix.ends_with('.'))
}

/// Parse and check a URL, returning the parsed form on success.
///
/// - must parse as an absolute URL with a host
/// - scheme must be `http` or `https`
/// - with a non-empty `allowed_domains`, the host must equal one of the
///   domains or be a subdomain of it (case-insensitive, anchored on a `.`)
pub fn check_url(url: &str, allowed_domains: &[String]) -> Result<Url, ValidationError> {
    if url.trim().is_empty() {
        return Err(ValidationError::Empty {
            field: "url".to_string(),
        });
    }

    let parsed = Url::parse(url.trim()).map_err(|e| ValidationError::InvalidFormat {
        field: "url".to_string(),
        expected: "absolute http(s) URL".to_string(),
        got: e.to_string(),
    })?;

    if !ALLOWED_SCHEMES.contains(&parsed.scheme()) {
        return Err(ValidationError::Suspicious {
            field: "url".to_string(),
            reason: format!("scheme '{}' is not allowed", parsed.scheme()),
        });
    }

    let host = match parsed.host_str() {
        Some(host) if !host.is_empty() => host.to_ascii_lowercase(),
        _ => {
            return Err(ValidationError::InvalidFormat {
                field: "url".to_string(),
                expected: "URL with a host".to_string(),
                got: url.to_string(),
            })
        }
    };

    if !allowed_domains.is_empty() {
        let allowed = allowed_domains
            .iter()
            .map(|d| d.trim().trim_start_matches('.').to_ascii_lowercase())
            .filter(|d| !d.is_empty())
            .any(|d| host_matches(&host, &d));

        if !allowed {
            return Err(ValidationError::Suspicious {
                field: "url".to_string(),
                reason: format!("host '{}' is not in the allowed domains", host),
            });
        }
    }

    Ok(parsed)
}

/// Whether `url` is a safe, fetchable http(s) URL, optionally restricted to
/// `allowed_domains` and their subdomains. An empty list allows any host.
pub fn validate_url(url: &str, allowed_domains: &[String]) -> bool {
    check_url(url, allowed_domains).is_ok()
}
