use std::sync::{Arc, RwLock};

use tracing::info;

pub const DEFAULT_CDN: &str = "https://img.ophim.live";
pub const UPLOAD_PREFIX: &str = "uploads/movies/";
pub const CDN_FIELD: &str = "APP_DOMAIN_CDN_IMAGE";

#[derive(Debug, Clone)]
pub struct CdnBase {
    inner: Arc<RwLock<String>>,
}

impl CdnBase {
    pub fn new(initial: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(initial.into())),
        }
    }

    pub fn get(&self) -> String {
        self.inner
            .read()
            .map(|cdn| cdn.clone())
            .unwrap_or_else(|_| DEFAULT_CDN.to_string())
    }

    /// Last writer wins; empty values are ignored.
    pub fn set(&self, value: &str) {
        if value.is_empty() {
            return;
        }
        if let Ok(mut cdn) = self.inner.write() {
            if *cdn != value {
                info!(from = %*cdn, to = %value, "image CDN changed");
                *cdn = value.to_string();
            }
        }
    }

    pub fn resolve(&self, path: &str, response_cdn: Option<&str>) -> String {
        resolve_image_url(path, response_cdn, &self.get())
    }
}

impl Default for CdnBase {
    fn default() -> Self {
        Self::new(DEFAULT_CDN)
    }
}

pub fn resolve_image_url(path: &str, response_cdn: Option<&str>, global_cdn: &str) -> String {
    if path.is_empty() {
        return String::new();
    }
    if path.starts_with("http") {
        return path.to_string();
    }

    let clean = path.strip_prefix('/').unwrap_or(path);
    let clean = clean.strip_prefix(UPLOAD_PREFIX).unwrap_or(clean);

    let cdn = response_cdn
        .filter(|c| !c.is_empty())
        .or(Some(global_cdn).filter(|c| !c.is_empty()))
        .unwrap_or(DEFAULT_CDN);
    let base = cdn.strip_suffix('/').unwrap_or(cdn);

    format!("{}/{}{}", base, UPLOAD_PREFIX, clean)
}

pub fn embedded_cdn(envelope: &serde_json::Value) -> Option<String> {
    let lookup = |value: &serde_json::Value| {
        value
            .get(CDN_FIELD)
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .map(String::from)
    };
    lookup(envelope).or_else(|| envelope.get("data").and_then(lookup))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn relative_upload_path_uses_global_cdn() {
        let url = resolve_image_url("/uploads/movies/abc.jpg", None, "https://img.example.com");
        assert_eq!(url, "https://img.example.com/uploads/movies/abc.jpg");
    }

    #[test]
    fn bare_file_name_gets_upload_prefix() {
        let url = resolve_image_url("abc-thumb.jpg", None, "https://img.example.com/");
        assert_eq!(url, "https://img.example.com/uploads/movies/abc-thumb.jpg");
    }

    #[test]
    fn absolute_path_is_returned_unchanged() {
        let url = resolve_image_url("https://x.test/p.jpg", Some("https://cdn.test"), "https://g.test");
        assert_eq!(url, "https://x.test/p.jpg");
    }

    #[test]
    fn empty_path_resolves_to_empty() {
        assert_eq!(resolve_image_url("", Some("https://cdn.test"), "https://g.test"), "");
    }

    #[test]
    fn response_override_beats_global_and_default() {
        assert_eq!(
            resolve_image_url("a.jpg", Some("https://resp.test/"), "https://g.test"),
            "https://resp.test/uploads/movies/a.jpg"
        );
        assert_eq!(
            resolve_image_url("a.jpg", Some(""), ""),
            "https://img.ophim.live/uploads/movies/a.jpg"
        );
    }

    #[test]
    fn embedded_cdn_checks_top_level_then_data() {
        let top = json!({ "APP_DOMAIN_CDN_IMAGE": "https://top.test", "data": { "APP_DOMAIN_CDN_IMAGE": "https://nested.test" } });
        assert_eq!(embedded_cdn(&top).as_deref(), Some("https://top.test"));

        let nested = json!({ "status": true, "data": { "APP_DOMAIN_CDN_IMAGE": "https://nested.test" } });
        assert_eq!(embedded_cdn(&nested).as_deref(), Some("https://nested.test"));

        assert_eq!(embedded_cdn(&json!({ "data": { "APP_DOMAIN_CDN_IMAGE": "" } })), None);
    }

    #[test]
    fn cdn_base_is_instance_scoped() {
        let first = CdnBase::default();
        let second = CdnBase::default();
        first.set("https://moved.test");
        first.set("");

        assert_eq!(first.get(), "https://moved.test");
        assert_eq!(second.get(), DEFAULT_CDN);
        assert_eq!(
            first.resolve("/uploads/movies/x.jpg", None),
            "https://moved.test/uploads/movies/x.jpg"
        );
    }
}
