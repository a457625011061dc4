//! Anime collection integration.
//!
//! The API returns one flat list with a numeric collection status; the site
//! consumes three separate files, one per watch status.

use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, USER_AGENT};
use serde::Deserialize;

use crate::config::BangumiConfig;
use crate::data::ensure_success;
use crate::domain::{AnimeEntry, AnimeTag};
use crate::error::AppError;

const API_BASE: &str = "https://api.bgm.tv";
/// Subject type filter: anime.
const SUBJECT_TYPE_ANIME: &str = "2";

/// Statuses the site publishes; on-hold and dropped entries are left out.
const STATUS_TO_WATCH: u8 = 1;
const STATUS_WATCHED: u8 = 2;
const STATUS_WATCHING: u8 = 3;

/// The three published watch-status lists.
#[derive(Debug, Default)]
pub struct CollectionBuckets {
    pub watching: Vec<AnimeEntry>,
    pub to_watch: Vec<AnimeEntry>,
    pub watched: Vec<AnimeEntry>,
}

/// Fetch every anime collection of `cfg.user_id`, split by watch status.
pub fn fetch_collections(
    client: &Client,
    cfg: &BangumiConfig,
) -> Result<CollectionBuckets, AppError> {
    let url = format!("{API_BASE}/v0/users/{}/collections", cfg.user_id);
    let resp = client
        .get(&url)
        .query(&[("subject_type", SUBJECT_TYPE_ANIME)])
        .header(ACCEPT, "application/json")
        .header(USER_AGENT, cfg.user_agent.as_str())
        .send()
        .map_err(|e| AppError::Network(format!("Collections request failed: {e}")))?;
    ensure_success(&resp)?;

    let body: CollectionsResponse = resp
        .json()
        .map_err(|e| AppError::UpstreamFormat(format!("Failed to parse collections response: {e}")))?;

    Ok(split_by_status(body.data))
}

fn split_by_status(items: Vec<CollectionWire>) -> CollectionBuckets {
    let mut buckets = CollectionBuckets::default();
    for item in items {
        match item.kind {
            STATUS_WATCHING => buckets.watching.push(map_entry(item)),
            STATUS_TO_WATCH => buckets.to_watch.push(map_entry(item)),
            STATUS_WATCHED => buckets.watched.push(map_entry(item)),
            _ => {}
        }
    }
    buckets
}

fn map_entry(item: CollectionWire) -> AnimeEntry {
    let subject = item.subject;
    AnimeEntry {
        id: item.subject_id,
        date: subject.date,
        name: subject.name,
        name_cn: subject.name_cn,
        summary: subject.short_summary,
        tags: subject
            .tags
            .into_iter()
            .map(|t| AnimeTag {
                name: t.name,
                total: t.total,
            })
            .collect(),
        pic: subject.images.common,
        updated_at: item.updated_at,
    }
}

#[derive(Debug, Deserialize)]
struct CollectionsResponse {
    #[serde(default)]
    data: Vec<CollectionWire>,
}

#[derive(Debug, Deserialize)]
struct CollectionWire {
    updated_at: String,
    #[serde(rename = "type")]
    kind: u8,
    subject_id: u64,
    subject: SubjectWire,
}

#[derive(Debug, Deserialize)]
struct SubjectWire {
    date: Option<String>,
    name: String,
    name_cn: String,
    short_summary: String,
    #[serde(default)]
    tags: Vec<TagWire>,
    images: ImagesWire,
}

// The collection payload's tags carry vote counts under `count`; the
// published files never had totals, so only the name is read.
#[derive(Debug, Deserialize)]
struct TagWire {
    name: String,
    #[serde(default)]
    total: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ImagesWire {
    common: String,
}
