use anyhow::{Result, anyhow};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::ResourceDiscovery;
use super::client::{ApiService, TencentCloudClient};
use crate::config::TencentCloudConfig;
use crate::core::types::DomainBinding;

const CDN_SERVICE: ApiService = ApiService {
    service: "cdn",
    version: "2018-06-06",
    label: "Tencent CDN",
};

const PAGE_SIZE: u32 = 1000;

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct DescribeDomainsConfigRequest<'a> {
    offset: u32,
    limit: u32,
    filters: Vec<DomainFilter<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct DomainFilter<'a> {
    name: &'a str,
    value: &'a [String],
    fuzzy: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DescribeDomainsConfigResponse {
    #[serde(default)]
    domains: Vec<CdnDomain>,
    #[serde(default)]
    total_number: u32,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CdnDomain {
    domain: String,
    #[serde(default)]
    https: Option<CdnHttps>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CdnHttps {
    #[serde(default)]
    cert_info: Option<CdnCertInfo>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CdnCertInfo {
    #[serde(default)]
    cert_id: Option<String>,
}

impl CdnDomain {
    fn into_binding(self) -> DomainBinding {
        let cert_id = self
            .https
            .and_then(|https| https.cert_info)
            .and_then(|info| info.cert_id);
        DomainBinding::new(self.domain, cert_id.as_deref())
    }
}

/// Looks up the certificate bound to each CDN domain.
pub struct CdnDiscoveryAdapter {
    client: TencentCloudClient,
}

impl CdnDiscoveryAdapter {
    pub fn new(config: &TencentCloudConfig) -> Self {
        Self {
            client: TencentCloudClient::new(config, &config.cdn_endpoint, CDN_SERVICE),
        }
    }

    fn fetch_page(&self, domains: &[String], offset: u32) -> Result<DescribeDomainsConfigResponse> {
        let request = DescribeDomainsConfigRequest {
            offset,
            limit: PAGE_SIZE,
            filters: vec![DomainFilter {
                name: "domain",
                value: domains,
                fuzzy: false,
            }],
        };
        self.client.call("DescribeDomainsConfig", &request)
    }
}

impl ResourceDiscovery for CdnDiscoveryAdapter {
    fn describe_bindings(&self, domains: &[String]) -> Result<Vec<DomainBinding>> {
        if domains.is_empty() {
            return Err(anyhow!("no domains to describe"));
        }

        let mut found: Vec<CdnDomain> = Vec::new();
        let mut offset = 0;
        loop {
            let page = self.fetch_page(domains, offset)?;
            let received = page.domains.len() as u32;
            debug!(
                "[tencent-cdn] DescribeDomainsConfig offset={} returned {} of {} domain(s)",
                offset, received, page.total_number
            );
            found.extend(page.domains);
            offset += received;
            if received == 0 || offset >= page.total_number {
                break;
            }
        }

        Ok(merge_bindings(domains, found))
    }
}

/// Keeps only the requested domains and reports requested domains the CDN
/// does not know as unbound.
fn merge_bindings(requested: &[String], found: Vec<CdnDomain>) -> Vec<DomainBinding> {
    let mut bindings: Vec<DomainBinding> = found
        .into_iter()
        .filter(|domain| requested.iter().any(|r| r.eq_ignore_ascii_case(&domain.domain)))
        .map(CdnDomain::into_binding)
        .collect();

    for domain in requested {
        if !bindings.iter().any(|b| b.domain.eq_ignore_ascii_case(domain)) {
            warn!("[tencent-cdn] {domain} is not a CDN domain of this account");
            bindings.push(DomainBinding::new(domain.clone(), None));
        }
    }
    bindings
}
