//! Shared domain types.
//!
//! Every struct here mirrors a published JSON snapshot shape, so field names
//! (and renames) follow the files the site consumes, not Rust conventions.
//! Optional fields that the upstream omits are skipped on serialize wherever
//! the published format drops the key entirely instead of writing `null`.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One calendar day's recorded activity on the contributions calendar.
///
/// `level` is the upstream's own intensity bucket for heatmap coloring; it is
/// passed through untouched, never recomputed from `count`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityDay {
    pub date: NaiveDate,
    pub count: u32,
    pub level: u8,
}

/// The normalized contribution window: ~370 trailing days bucketed into
/// 7-day groups, oldest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributionWindow {
    pub total: u64,
    pub weeks: Vec<Vec<ActivityDay>>,
}

/// One track, either from the recent-play record or a favorite playlist.
///
/// `score` is the upstream's relative play-frequency value and only exists for
/// the recent-play list.
#[derive(Debug, Clone, Serialize)]
pub struct SongInfo {
    pub name: String,
    /// All credited artists joined with `/`.
    pub artist: String,
    pub album: String,
    pub pic: String,
    pub id: u64,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<u32>,
}

/// Counter block attached to a favorited video, passed through as-is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoStats {
    pub collect: u64,
    pub play: u64,
    pub danmaku: u64,
    pub vt: u64,
    pub play_switch: u64,
    pub reply: u64,
    pub view_text_1: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FavoriteVideo {
    pub title: String,
    pub cover: String,
    pub intro: String,
    pub id: u64,
    pub bvid: String,
    pub link: String,
    pub duration: u32,
    pub stats: VideoStats,
}

#[derive(Debug, Clone, Serialize)]
pub struct BilibiliSnapshot {
    #[serde(rename = "musicLiked")]
    pub music_liked: Vec<FavoriteVideo>,
}

/// A user-supplied tag on an anime subject.
///
/// The upstream collection payload carries tag names only; `total` stays
/// `None` and the published entries contain just the name.
#[derive(Debug, Clone, Serialize)]
pub struct AnimeTag {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<u32>,
}

/// One entry of a watch-status list (watching / to-watch / watched).
#[derive(Debug, Clone, Serialize)]
pub struct AnimeEntry {
    pub id: u64,
    /// Air date, absent for unaired subjects.
    pub date: Option<String>,
    pub name: String,
    pub name_cn: String,
    pub summary: String,
    pub tags: Vec<AnimeTag>,
    pub pic: String,
    pub updated_at: String,
}

/// Aggregated byte count for one programming language across all repositories.
#[derive(Debug, Clone, Serialize)]
pub struct LanguageInfo {
    pub bytes: u64,
    /// Display color from the shared language color table, `#000000` when the
    /// table has no entry.
    pub color: String,
    /// Share of the grand total, in percent.
    pub percentage: f64,
}

/// Language name -> aggregate, ordered by name so the snapshot is stable
/// across runs.
pub type LanguageDistribution = BTreeMap<String, LanguageInfo>;

/// One published release, flattened for the site's activity feed.
#[derive(Debug, Clone, Serialize)]
pub struct ReleaseInfo {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub repo: String,
    #[serde(rename = "isOrg")]
    pub is_org: bool,
    /// Release name, falling back to the tag when unnamed.
    pub title: String,
    pub sha: String,
    /// URL of the release tag page.
    pub commit: String,
    /// Publish time in epoch milliseconds.
    pub created_at: i64,
    pub version: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SteamUser {
    pub id: String,
    pub name: String,
    pub avatar: String,
    #[serde(rename = "createdTime", skip_serializing_if = "Option::is_none")]
    pub created_time: Option<i64>,
    #[serde(rename = "lastLogOffTime", skip_serializing_if = "Option::is_none")]
    pub last_log_off_time: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SteamGame {
    pub id: u32,
    pub name: String,
    /// Localized store title, falling back to `name` when unresolved.
    #[serde(rename = "nameCN")]
    pub name_cn: String,
    /// Total playtime in minutes.
    #[serde(rename = "playtimeForever")]
    pub playtime_forever: u32,
    #[serde(rename = "playtime2Weeks", skip_serializing_if = "Option::is_none")]
    pub playtime_2weeks: Option<u32>,
    #[serde(rename = "timeLastPlayed", skip_serializing_if = "Option::is_none")]
    pub time_last_played: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SteamSnapshot {
    pub user: SteamUser,
    pub games: Vec<SteamGame>,
}
