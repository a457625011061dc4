//! Game library integration: player summary, owned games, localized store
//! titles.
//!
//! Localized titles are not in the Web API at all; they are scraped off the
//! store pages. Resolution is two-phase so it stays testable and cheap: read
//! the persisted name cache, fan out only for the misses, then rewrite the
//! cache once if anything new was resolved.

use rayon::prelude::*;
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT_LANGUAGE, USER_AGENT};
use scraper::{Html, Selector};
use serde::Deserialize;
use tracing::{debug, info};

use crate::config::SteamConfig;
use crate::data::ensure_success;
use crate::domain::{SteamGame, SteamUser};
use crate::error::AppError;
use crate::io::NameCache;

const PLAYER_SUMMARY_URL: &str =
    "https://api.steampowered.com/ISteamUser/GetPlayerSummaries/v0002/";
const OWNED_GAMES_URL: &str = "https://api.steampowered.com/IPlayerService/GetOwnedGames/v0001/";
const STORE_APP_URL: &str = "https://store.steampowered.com/app";
const ICON_BASE: &str = "http://media.steampowered.com/steamcommunity/public/images/apps";

/// Store pages are requested with this language preference, so the scraped
/// title is the localized one.
const STORE_ACCEPT_LANGUAGE: &str = "zh-CN,zh;q=0.9";
const STORE_USER_AGENT: &str = "Mozilla/5.0";
const STORE_TITLE_PREFIX: &str = "Steam 上的 ";

pub fn fetch_player_summary(client: &Client, cfg: &SteamConfig) -> Result<SteamUser, AppError> {
    let resp = client
        .get(PLAYER_SUMMARY_URL)
        .query(&[("key", cfg.key.as_str()), ("steamids", cfg.id.as_str())])
        .send()
        .map_err(|e| AppError::Network(format!("Player summary request failed: {e}")))?;
    ensure_success(&resp)?;

    let body: PlayerSummaryResponse = resp
        .json()
        .map_err(|e| AppError::UpstreamFormat(format!("Failed to parse player summary: {e}")))?;

    let player = body
        .response
        .players
        .into_iter()
        .next()
        .ok_or_else(|| AppError::UpstreamFormat("Player summary contained no players".into()))?;

    Ok(SteamUser {
        id: player.steamid,
        name: player.personaname,
        avatar: player.avatarfull,
        created_time: player.timecreated,
        last_log_off_time: player.lastlogoff,
    })
}

/// Fetch owned games with app metadata, dropping configured exclusions.
pub fn fetch_owned_games(client: &Client, cfg: &SteamConfig) -> Result<Vec<OwnedGame>, AppError> {
    let resp = client
        .get(OWNED_GAMES_URL)
        .query(&[
            ("key", cfg.key.as_str()),
            ("steamid", cfg.id.as_str()),
            ("format", "json"),
            ("include_appinfo", "true"),
            ("include_played_free_games", "true"),
        ])
        .send()
        .map_err(|e| AppError::Network(format!("Owned games request failed: {e}")))?;
    ensure_success(&resp)?;

    let body: OwnedGamesResponse = resp
        .json()
        .map_err(|e| AppError::UpstreamFormat(format!("Failed to parse owned games: {e}")))?;

    Ok(drop_excluded(body.response.games, &cfg.exclude_apps))
}

fn drop_excluded(games: Vec<OwnedGame>, exclude: &[u32]) -> Vec<OwnedGame> {
    games
        .into_iter()
        .filter(|g| !exclude.contains(&g.appid))
        .collect()
}

/// Resolve localized names for every game and build the published list.
///
/// Cache misses are scraped in parallel; a miss that cannot be resolved
/// falls back to the API name, and that fallback is cached too so the store
/// is not re-asked on every run.
pub fn resolve_games(
    client: &Client,
    games: Vec<OwnedGame>,
    cache: &mut NameCache,
) -> Vec<SteamGame> {
    let misses: Vec<(u32, String)> = games
        .iter()
        .filter(|g| cache.get(g.appid).is_none())
        .map(|g| (g.appid, g.name.clone()))
        .collect();

    if !misses.is_empty() {
        info!("resolving {} store titles missing from the name cache", misses.len());
        let resolved: Vec<(u32, String)> = misses
            .into_par_iter()
            .map(|(appid, api_name)| {
                let title = fetch_store_title(client, appid).unwrap_or(api_name);
                (appid, title)
            })
            .collect();
        for (appid, title) in resolved {
            cache.insert(appid, title);
        }
    }

    games
        .into_iter()
        .map(|game| build_game(game, cache))
        .collect()
}

fn build_game(game: OwnedGame, cache: &NameCache) -> SteamGame {
    let icon = icon_url(&game);
    let name_cn = cache
        .get(game.appid)
        .map(str::to_string)
        .unwrap_or_else(|| game.name.clone());
    SteamGame {
        id: game.appid,
        name: game.name,
        name_cn,
        playtime_forever: game.playtime_forever,
        playtime_2weeks: game.playtime_2weeks,
        time_last_played: game.rtime_last_played,
        icon,
    }
}

/// Build the community icon URL from the icon hash, falling back to the logo
/// hash; games with neither publish no icon at all.
fn icon_url(game: &OwnedGame) -> Option<String> {
    let hash = [&game.img_icon_url, &game.img_logo_url]
        .into_iter()
        .flatten()
        .find(|h| !h.is_empty())?;
    Some(format!("{ICON_BASE}/{}/{hash}.jpg", game.appid))
}

/// Scrape the localized title off a store page. Any failure (region lock,
/// age-gate redirect, delisted app) resolves to `None`.
fn fetch_store_title(client: &Client, appid: u32) -> Option<String> {
    let url = format!("{STORE_APP_URL}/{appid}");
    let resp = client
        .get(&url)
        .header(USER_AGENT, STORE_USER_AGENT)
        .header(ACCEPT_LANGUAGE, STORE_ACCEPT_LANGUAGE)
        .send()
        .ok()?;
    if !resp.status().is_success() {
        debug!("store page for {appid} answered {}", resp.status());
        return None;
    }
    let html = resp.text().ok()?;
    extract_store_title(&html)
}

/// Pull the app title out of store-page HTML: the app hub heading when
/// present, else the document title with its localized prefix stripped.
fn extract_store_title(html: &str) -> Option<String> {
    let document = Html::parse_document(html);

    let heading = Selector::parse("#appHubAppName").ok()?;
    if let Some(el) = document.select(&heading).next() {
        let name = el.text().collect::<String>().trim().to_string();
        if !name.is_empty() {
            return Some(name);
        }
    }

    let title_sel = Selector::parse("title").ok()?;
    let title = document.select(&title_sel).next()?;
    let text = title.text().collect::<String>().trim().to_string();
    let stripped = text
        .strip_prefix(STORE_TITLE_PREFIX)
        .unwrap_or(&text)
        .to_string();
    (!stripped.is_empty()).then_some(stripped)
}

#[derive(Debug, Deserialize)]
struct PlayerSummaryResponse {
    response: PlayerList,
}

#[derive(Debug, Deserialize)]
struct PlayerList {
    #[serde(default)]
    players: Vec<PlayerWire>,
}

#[derive(Debug, Deserialize)]
struct PlayerWire {
    steamid: String,
    personaname: String,
    avatarfull: String,
    timecreated: Option<i64>,
    lastlogoff: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct OwnedGamesResponse {
    response: OwnedGamesBody,
}

#[derive(Debug, Deserialize)]
struct OwnedGamesBody {
    #[serde(default)]
    games: Vec<OwnedGame>,
}

/// One owned game as the API reports it, before name resolution.
#[derive(Debug, Clone, Deserialize)]
pub struct OwnedGame {
    appid: u32,
    name: String,
    #[serde(default)]
    img_icon_url: Option<String>,
    #[serde(default)]
    img_logo_url: Option<String>,
    #[serde(default)]
    playtime_forever: u32,
    playtime_2weeks: Option<u32>,
    rtime_last_played: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn owned_game(value: serde_json::Value) -> OwnedGame {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn hub_heading_wins_over_the_document_title() {
        let html = r#"<html><head><title>Steam 上的 Portal 2</title></head>
            <body><div id="appHubAppName">传送门 2</div></body></html>"#;
        assert_eq!(extract_store_title(html), Some("传送门 2".to_string()));
    }

    #[test]
    fn document_title_loses_its_store_prefix() {
        let html = "<html><head><title>Steam 上的 Portal 2</title></head><body></body></html>";
        assert_eq!(extract_store_title(html), Some("Portal 2".to_string()));
    }

    #[test]
    fn unprefixed_titles_are_kept_whole() {
        let html = "<html><head><title>Portal 2 on Steam</title></head><body></body></html>";
        assert_eq!(extract_store_title(html), Some("Portal 2 on Steam".to_string()));
    }

    #[test]
    fn pages_without_usable_titles_resolve_to_none() {
        assert_eq!(extract_store_title("<html><body></body></html>"), None);
        assert_eq!(
            extract_store_title("<html><head><title>  </title></head></html>"),
            None
        );
    }

    #[test]
    fn icon_url_prefers_the_icon_hash_and_skips_blanks() {
        let with_icon = owned_game(json!({
            "appid": 620, "name": "Portal 2",
            "img_icon_url": "abc123", "img_logo_url": "def456",
            "playtime_forever": 814
        }));
        assert_eq!(
            icon_url(&with_icon).unwrap(),
            "http://media.steampowered.com/steamcommunity/public/images/apps/620/abc123.jpg"
        );

        let blank_icon = owned_game(json!({
            "appid": 70, "name": "Half-Life",
            "img_icon_url": "", "img_logo_url": "logo70",
            "playtime_forever": 120
        }));
        assert_eq!(
            icon_url(&blank_icon).unwrap(),
            "http://media.steampowered.com/steamcommunity/public/images/apps/70/logo70.jpg"
        );

        let none = owned_game(json!({
            "appid": 1, "name": "ghost", "playtime_forever": 0
        }));
        assert!(icon_url(&none).is_none());
    }

    #[test]
    fn excluded_app_ids_are_dropped() {
        let games = vec![
            owned_game(json!({"appid": 620, "name": "Portal 2", "playtime_forever": 814})),
            owned_game(json!({"appid": 400, "name": "Portal", "playtime_forever": 300})),
        ];

        let kept = drop_excluded(games, &[400]);

        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].appid, 620);
    }

    #[test]
    fn cached_names_flow_into_the_published_game() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = NameCache::load(&dir.path().join("names.json"));
        cache.insert(620, "传送门 2".to_string());

        let game = owned_game(json!({
            "appid": 620, "name": "Portal 2",
            "img_icon_url": "abc123",
            "playtime_forever": 814, "playtime_2weeks": 30,
            "rtime_last_played": 1700000000
        }));

        let published = build_game(game, &cache);

        assert_eq!(published.id, 620);
        assert_eq!(published.name, "Portal 2");
        assert_eq!(published.name_cn, "传送门 2");
        assert_eq!(published.playtime_2weeks, Some(30));
        assert_eq!(published.time_last_played, Some(1700000000));
    }

    #[test]
    fn unresolved_names_fall_back_to_the_api_name() {
        let dir = tempfile::tempdir().unwrap();
        let cache = NameCache::load(&dir.path().join("names.json"));

        let game = owned_game(json!({
            "appid": 220, "name": "Half-Life 2", "playtime_forever": 99
        }));

        let published = build_game(game, &cache);

        assert_eq!(published.name_cn, "Half-Life 2");
        assert_eq!(published.playtime_2weeks, None);
        let value = serde_json::to_value(&published).unwrap();
        assert!(
            value.get("playtime2Weeks").is_none() && value.get("icon").is_none(),
            "absent optionals must drop their keys entirely: {value}"
        );
    }
}
