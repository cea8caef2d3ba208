use crate::stats::CyclePolicy;

pub const DEFAULT_SERVER_URL: &str = "http://localhost:4848/";

const STATS_PARAM: &str = "s";
const SERVER_PARAM: &str = "server";
const CYCLE_PARAM: &str = "cycle";

/// Startup options, read from the page's query string.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientOptions {
    /// Stats channel to show at startup. Unknown ids hide the overlay.
    pub stats_channel: Option<String>,
    pub server_url: String,
    pub cycle_policy: CyclePolicy,
}

impl ClientOptions {
    pub fn from_query(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let stats_channel = lookup(STATS_PARAM)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());
        let server_url = lookup(SERVER_PARAM)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| default_server_url().to_string());
        let cycle_policy = lookup(CYCLE_PARAM)
            .map(|value| value.trim().to_ascii_lowercase())
            .map(|value| match value.as_str() {
                "wrap" => CyclePolicy::WrapToFirst,
                _ => CyclePolicy::HideAfterLast,
            })
            .unwrap_or_default();

        Self {
            stats_channel,
            server_url,
            cycle_policy,
        }
    }

    pub fn from_location() -> Self {
        let search = web_sys::window()
            .and_then(|w| w.location().search().ok())
            .unwrap_or_default();
        let params = web_sys::UrlSearchParams::new_with_str(&search).ok();
        Self::from_query(|key| params.as_ref().and_then(|p| p.get(key)))
    }

    /// Base URL of the HTTP API, always ending in `/`.
    pub fn api_url(&self) -> String {
        if self.server_url.ends_with('/') {
            self.server_url.clone()
        } else {
            format!("{}/", self.server_url)
        }
    }

    pub fn config_url(&self) -> String {
        format!("{}config", self.api_url())
    }

    pub fn socket_url(&self) -> String {
        let api = self.api_url();
        if let Some(rest) = api.strip_prefix("https://") {
            format!("wss://{rest}")
        } else if let Some(rest) = api.strip_prefix("http://") {
            format!("ws://{rest}")
        } else {
            api
        }
    }
}

fn default_server_url() -> &'static str {
    option_env!("TOWNVIEW_SERVER_URL")
        .filter(|value| !value.trim().is_empty())
        .unwrap_or(DEFAULT_SERVER_URL)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn options(pairs: &[(&str, &str)]) -> ClientOptions {
        let query: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ClientOptions::from_query(|key| query.get(key).cloned())
    }

    #[test]
    fn defaults_without_query() {
        let opts = options(&[]);
        assert_eq!(opts.stats_channel, None);
        assert_eq!(opts.server_url, default_server_url());
        assert_eq!(opts.cycle_policy, CyclePolicy::HideAfterLast);
    }

    #[test]
    fn empty_stats_param_is_ignored() {
        assert_eq!(options(&[("s", "")]).stats_channel, None);
        assert_eq!(
            options(&[("s", "ping")]).stats_channel.as_deref(),
            Some("ping")
        );
    }

    #[test]
    fn urls_derive_from_server_base() {
        let opts = options(&[("server", "https://town.example.org/api")]);
        assert_eq!(opts.api_url(), "https://town.example.org/api/");
        assert_eq!(opts.config_url(), "https://town.example.org/api/config");
        assert_eq!(opts.socket_url(), "wss://town.example.org/api/");

        let opts = options(&[("server", "http://localhost:4848/")]);
        assert_eq!(opts.socket_url(), "ws://localhost:4848/");
    }

    #[test]
    fn cycle_param_selects_policy() {
        assert_eq!(
            options(&[("cycle", "WRAP")]).cycle_policy,
            CyclePolicy::WrapToFirst
        );
        assert_eq!(
            options(&[("cycle", "other")]).cycle_policy,
            CyclePolicy::HideAfterLast
        );
    }
}
