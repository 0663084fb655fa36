use reqwest::{Client, ClientBuilder};
use std::collections::HashSet;
use std::time::Duration;
use url::Url;

use crate::error::DockprepError;

/// A sandbox-capped HTTP client that only allows requests to approved
/// domains. Network capability capping: the pipeline talks to a handful of
/// well-known scientific hosts and nothing else.
#[derive(Debug, Clone)]
pub struct SandboxClient {
    client: Client,
    allowlist: HashSet<String>,
}

impl SandboxClient {
    /// Creates a new SandboxClient with the default allowlist of RCSB hosts.
    pub fn new() -> Result<Self, DockprepError> {
        let mut allowlist = HashSet::new();
        // Default dockprep allowlist
        let domains = vec![
            "search.rcsb.org", // PDB Search API
            "files.rcsb.org",  // PDB bulk download (entries + ligands)
            "data.rcsb.org",   // PDB Data API
            "localhost",       // Test fixtures
            "127.0.0.1",       // Localhost alt
        ];

        for d in domains {
            allowlist.insert(d.to_string());
        }

        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| {
                DockprepError::Config(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self { client, allowlist })
    }

    /// Appends an exact hostname to the allowlist.
    pub fn allow_domain(&mut self, domain: &str) {
        self.allowlist.insert(domain.to_string());
    }

    /// Validates if a URL is permitted under the current sandbox policy.
    pub fn is_allowed(&self, url: &str) -> bool {
        if let Ok(parsed) = Url::parse(url) {
            if let Some(host) = parsed.host_str() {
                // Exact match or a subdomain of an allowed domain
                for allowed in &self.allowlist {
                    if host == allowed || host.ends_with(&format!(".{}", allowed)) {
                        return true;
                    }
                }
            }
        }
        false
    }

    /// Exposes the inner `reqwest::Client` builder pattern safely for GET requests.
    pub fn get(&self, url: &str) -> Result<reqwest::RequestBuilder, DockprepError> {
        if !self.is_allowed(url) {
            return Err(DockprepError::Security(format!(
                "Network capabilities capped: domain not in allowlist for URL {}",
                url
            )));
        }

        Ok(self.client.get(url))
    }

    /// Exposes the inner `reqwest::Client` builder pattern safely for POST requests.
    pub fn post(&self, url: &str) -> Result<reqwest::RequestBuilder, DockprepError> {
        if !self.is_allowed(url) {
            return Err(DockprepError::Security(format!(
                "Network capabilities capped: domain not in allowlist for URL {}",
                url
            )));
        }

        Ok(self.client.post(url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rcsb_hosts_allowed() {
        let client = SandboxClient::new().unwrap();
        assert!(client.is_allowed("https://search.rcsb.org/rcsbsearch/v2/query"));
        assert!(client.is_allowed("https://files.rcsb.org/download/2zq2.pdb"));
        assert!(client.is_allowed("https://files.rcsb.org/ligands/download/0CA_ideal.sdf"));
    }

    #[test]
    fn test_unknown_host_rejected() {
        let client = SandboxClient::new().unwrap();
        assert!(!client.is_allowed("https://example.com/2zq2.pdb"));
        assert!(client.get("https://example.com/2zq2.pdb").is_err());
    }

    #[test]
    fn test_allow_domain_extends_policy() {
        let mut client = SandboxClient::new().unwrap();
        assert!(!client.is_allowed("https://alphafold.ebi.ac.uk/files/x.pdb"));
        client.allow_domain("alphafold.ebi.ac.uk");
        assert!(client.is_allowed("https://alphafold.ebi.ac.uk/files/x.pdb"));
    }

    #[test]
    fn test_lookalike_host_rejected() {
        let client = SandboxClient::new().unwrap();
        assert!(!client.is_allowed("https://notfiles.rcsb.org.evil.com/x"));
    }
}
