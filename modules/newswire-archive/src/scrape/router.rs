// Domain classification: which hosts skip straight to managed extraction.

/// Hosts known to run strong bot defenses. Plain and rendered fetches
/// against them only burn latency.
#[derive(Debug, Clone, Default)]
pub struct DomainRouter {
    hardened: Vec<String>,
}

impl DomainRouter {
    pub fn new<I, S>(domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let hardened = domains
            .into_iter()
            .map(|d| normalize_host(d.as_ref()))
            .filter(|d| !d.is_empty())
            .collect();
        Self { hardened }
    }

    /// True when the URL's host is a hardened domain or one of its subdomains.
    /// Unparseable URLs are never hardened.
    pub fn is_hardened(&self, url: &str) -> bool {
        let Some(host) = host_of(url) else {
            return false;
        };
        self.hardened.iter().any(|domain| {
            host == *domain
                || host
                    .strip_suffix(domain.as_str())
                    .is_some_and(|prefix| prefix.ends_with('.'))
        })
    }
}

fn host_of(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url.trim()).ok()?;
    parsed.host_str().map(normalize_host)
}

fn normalize_host(host: &str) -> String {
    let host = host.trim().trim_end_matches('.').to_lowercase();
    host.strip_prefix("www.").map(str::to_string).unwrap_or(host)
}
