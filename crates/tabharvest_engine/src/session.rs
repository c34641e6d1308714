use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;
use std::sync::Arc;

use engine_logging::{engine_info, engine_warn};
use reqwest::cookie::Jar;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("credential file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("cookie domain {0:?} does not form a valid url")]
    InvalidDomain(String),
}

#[derive(Debug, Deserialize)]
struct CookieEntry {
    name: String,
    value: String,
    #[serde(default)]
    domain: Option<String>,
    #[serde(default)]
    path: Option<String>,
}

/// Exported browser cookies: either a list of cookie objects or a plain
/// `name -> value` map scoped to the base URL.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CookieFile {
    List(Vec<CookieEntry>),
    Map(BTreeMap<String, String>),
}

/// Loads cookies from `path` into a jar shared by every request.
/// Returns the jar and the number of cookies installed.
pub fn load_cookie_jar(path: &Path, base_url: &Url) -> Result<(Arc<Jar>, usize), SessionError> {
    let content = fs::read_to_string(path)?;
    let file: CookieFile = serde_json::from_str(&content)?;
    let jar = Jar::default();

    let count = match file {
        CookieFile::List(entries) => {
            for entry in &entries {
                let scope = cookie_scope(entry, base_url)?;
                jar.add_cookie_str(&cookie_header(entry), &scope);
            }
            entries.len()
        }
        CookieFile::Map(pairs) => {
            for (name, value) in &pairs {
                jar.add_cookie_str(&format!("{name}={value}; Path=/"), base_url);
            }
            pairs.len()
        }
    };
    Ok((Arc::new(jar), count))
}

/// Best-effort variant used by the fetch run: a missing or unreadable file
/// only produces a warning and an unauthenticated session.
pub fn load_session(path: &Path, base_url: &Url) -> Option<Arc<Jar>> {
    if !path.exists() {
        engine_warn!("Cookie file {:?} not found!", path);
        return None;
    }
    match load_cookie_jar(path, base_url) {
        Ok((jar, count)) => {
            engine_info!("Loaded {} authentication cookies from {:?}", count, path);
            Some(jar)
        }
        Err(err) => {
            engine_warn!("Error loading cookies: {}", err);
            engine_warn!("Proceeding without cookies (might fail if auth required)");
            None
        }
    }
}

fn cookie_header(entry: &CookieEntry) -> String {
    let mut header = format!("{}={}", entry.name, entry.value);
    if let Some(domain) = entry.domain.as_deref().filter(|d| !d.is_empty()) {
        header.push_str(&format!("; Domain={domain}"));
    }
    header.push_str(&format!("; Path={}", entry.path.as_deref().unwrap_or("/")));
    header
}

fn cookie_scope(entry: &CookieEntry, base_url: &Url) -> Result<Url, SessionError> {
    match entry.domain.as_deref().map(|d| d.trim_start_matches('.')) {
        Some(domain) if !domain.is_empty() => {
            Url::parse(&format!("{}://{}/", base_url.scheme(), domain))
                .map_err(|_| SessionError::InvalidDomain(domain.to_string()))
        }
        _ => Ok(base_url.clone()),
    }
}
