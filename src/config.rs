//! Environment-sourced configuration, one block per data source.
//!
//! Each pipeline owns its variables and loads them lazily, so a missing key
//! for one source never blocks another. `.env` files are honored for local
//! runs (see `.env.example`).

use crate::error::AppError;

/// User agent sent to APIs that want an identifying client string.
pub const DEFAULT_USER_AGENT: &str =
    concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone)]
pub struct NeteaseConfig {
    /// Account whose play record is fetched; optional when only the favorite
    /// playlist is wanted.
    pub user_id: Option<String>,
    pub favorite_id: Option<String>,
}

impl NeteaseConfig {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        let user_id = env_opt("NETEASE_ID");
        let favorite_id = env_opt("NETEASE_FAVORITE_ID");
        if user_id.is_none() && favorite_id.is_none() {
            return Err(AppError::Config(
                "NETEASE_ID or NETEASE_FAVORITE_ID must be set".into(),
            ));
        }
        Ok(Self {
            user_id,
            favorite_id,
        })
    }
}

#[derive(Debug, Clone)]
pub struct BilibiliConfig {
    /// Id of the public favorites folder to publish.
    pub media_id: String,
}

impl BilibiliConfig {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Ok(Self {
            media_id: env_required("BILIBILI_MEDIA_ID")?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct BangumiConfig {
    pub user_id: String,
    /// The API asks clients to identify themselves; defaults to this crate's
    /// name and version.
    pub user_agent: String,
}

impl BangumiConfig {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Ok(Self {
            user_id: env_required("BANGUMI_ID")?,
            user_agent: env_opt("BANGUMI_USER_AGENT")
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
        })
    }
}

#[derive(Debug, Clone)]
pub struct GithubConfig {
    pub username: String,
    pub token: String,
    /// Repository names left out of the language and release aggregation.
    pub exclude_repos: Vec<String>,
}

impl GithubConfig {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Ok(Self {
            username: env_required("GITHUB_USERNAME")?,
            token: env_required("GITHUB_TOKEN")?,
            exclude_repos: env_opt("GITHUB_EXCLUDE_REPOS")
                .map(|raw| parse_name_list(&raw))
                .unwrap_or_default(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct SteamConfig {
    pub id: String,
    pub key: String,
    /// App ids dropped from the published library.
    pub exclude_apps: Vec<u32>,
}

impl SteamConfig {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        let exclude_apps = match env_opt("STEAM_GAMES_EXCLUDE") {
            Some(raw) => parse_id_list("STEAM_GAMES_EXCLUDE", &raw)?,
            None => Vec::new(),
        };
        Ok(Self {
            id: env_required("STEAM_ID")?,
            key: env_required("STEAM_KEY")?,
            exclude_apps,
        })
    }
}

/// Read a variable, treating unset and blank the same way.
fn env_opt(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_required(name: &str) -> Result<String, AppError> {
    env_opt(name).ok_or_else(|| AppError::Config(format!("{name} is not set")))
}

/// Parse a comma-separated list of numeric ids. Blank segments are skipped;
/// anything non-numeric is a configuration error rather than a silent zero.
fn parse_id_list(name: &str, raw: &str) -> Result<Vec<u32>, AppError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<u32>().map_err(|_| {
                AppError::Config(format!("{name} contains a non-numeric id: '{s}'"))
            })
        })
        .collect()
}

fn parse_name_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
