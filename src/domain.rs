use anyhow::{Result, anyhow};

/// Splits a free-form domain list on any whitespace (spaces, tabs, newlines)
/// and removes repeats while keeping first-seen order.
pub fn split_domain_list(raw: &str) -> Vec<String> {
    let mut domains: Vec<String> = Vec::new();
    for candidate in raw.split_whitespace() {
        let candidate = candidate.trim_end_matches('.');
        if candidate.is_empty() {
            continue;
        }
        if !domains.iter().any(|existing| existing == candidate) {
            domains.push(candidate.to_string());
        }
    }
    domains
}

/// Joins several raw inputs (repeated flags, CI multi-line values) into one
/// de-duplicated domain list. Fails when nothing usable remains.
pub fn normalize_domain_inputs(inputs: &[String]) -> Result<Vec<String>> {
    let domains = split_domain_list(&inputs.join("\n"));
    if domains.is_empty() {
        return Err(anyhow!("at least one domain is required"));
    }
    Ok(domains)
}

/// Splits a newline-separated host list, trimming each line and dropping
/// blank ones. Fails when no host remains.
pub fn normalize_host_list(raw: &str) -> Result<Vec<String>> {
    let hosts: Vec<String> = raw
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();
    if hosts.is_empty() {
        return Err(anyhow!("no hosts provided"));
    }
    Ok(hosts)
}
