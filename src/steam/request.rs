//! Profile feed request construction

use chrono::Utc;
use url::Url;

use crate::config::SteamConfig;
use crate::error::AppResult;

/// One GET against the community profile XML feed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileRequest {
    pub url: Url,
    pub headers: Vec<(&'static str, String)>,
}

impl ProfileRequest {
    /// Build `{base}/id/{steam_id}/?xml=1`, plus `&nocache={unix time}` and
    /// no-cache headers when cache busting is on.
    pub fn build(config: &SteamConfig, steam_id: &str) -> AppResult<Self> {
        let nocache = config.cache_bust.then(|| Utc::now().timestamp());
        Self::build_at(config, steam_id, nocache)
    }

    fn build_at(config: &SteamConfig, steam_id: &str, nocache: Option<i64>) -> AppResult<Self> {
        let mut url = Url::parse(&config.base_url)?;
        url.path_segments_mut()
            .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
            .pop_if_empty()
            .extend(["id", steam_id, ""]);

        let mut query = String::from("xml=1");
        if let Some(ts) = nocache {
            query.push_str(&format!("&nocache={}", ts));
        }
        url.set_query(Some(&query));

        let mut headers = vec![("User-Agent", config.user_agent.clone())];
        if nocache.is_some() {
            headers.push(("Cache-Control", "no-cache".to_string()));
            headers.push(("Pragma", "no-cache".to_string()));
        }

        Ok(Self { url, headers })
    }
}
