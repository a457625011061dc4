//! Code-hosting integration: repository listing, language bytes, releases
//! and the raw contribution calendar.
//!
//! The repository listing is fetched once and shared by the language and
//! release aggregations, so fork/exclusion filtering applies uniformly.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate};
use rayon::prelude::*;
use regex::Regex;
use reqwest::blocking::{Client, Response};
use reqwest::header::{ACCEPT, AUTHORIZATION};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::config::GithubConfig;
use crate::data::ensure_success;
use crate::domain::{ActivityDay, LanguageDistribution, LanguageInfo, ReleaseInfo};
use crate::error::AppError;

const API_BASE: &str = "https://api.github.com";
const CONTRIBUTIONS_API: &str = "https://github-contributions-api.jogruber.de/v4";
const COLORS_URL: &str = "https://raw.githubusercontent.com/ozh/github-colors/master/colors.json";
const API_ACCEPT: &str = "application/vnd.github.v3+json";
const FALLBACK_COLOR: &str = "#000000";
const RELEASE_LIMIT: usize = 500;

static VERSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"v?(\d+\.\d+\.\d+(?:-[\w.]+)?)").expect("Invalid version regex pattern")
});

/// Repository handle shared by the language and release fan-outs.
#[derive(Debug, Clone)]
pub struct Repo {
    pub name: String,
    pub full_name: String,
    pub is_org: bool,
}

/// List the user's own repositories, newest activity first, with forks and
/// configured exclusions dropped.
pub fn fetch_repos(client: &Client, cfg: &GithubConfig) -> Result<Vec<Repo>, AppError> {
    let url = format!("{API_BASE}/users/{}/repos", cfg.username);
    let resp = client
        .get(&url)
        .query(&[
            ("type", "owner"),
            ("per_page", "100"),
            ("sort", "updated"),
            ("direction", "desc"),
        ])
        .header(AUTHORIZATION, format!("token {}", cfg.token))
        .header(ACCEPT, API_ACCEPT)
        .send()
        .map_err(|e| AppError::Network(format!("Repository listing failed: {e}")))?;
    ensure_success(&resp)?;

    let body: Vec<RepoWire> = resp
        .json()
        .map_err(|e| AppError::UpstreamFormat(format!("Failed to parse repository listing: {e}")))?;

    Ok(filter_repos(body, &cfg.exclude_repos))
}

fn filter_repos(repos: Vec<RepoWire>, exclude: &[String]) -> Vec<Repo> {
    repos
        .into_iter()
        .filter(|r| !r.fork && !exclude.iter().any(|x| x == &r.name))
        .map(|r| Repo {
            is_org: r.organization.as_ref().is_some_and(|v| !v.is_null()),
            name: r.name,
            full_name: r.full_name,
        })
        .collect()
}

/// Aggregate language byte counts across `repos` into the published
/// distribution. Any failed sub-request fails the whole aggregation; a
/// partial byte count would silently skew every percentage.
pub fn fetch_language_distribution(
    client: &Client,
    cfg: &GithubConfig,
    repos: &[Repo],
) -> Result<LanguageDistribution, AppError> {
    let colors = fetch_language_colors(client)?;

    let per_repo: Vec<HashMap<String, u64>> = repos
        .par_iter()
        .map(|repo| fetch_repo_languages(client, &cfg.token, repo))
        .collect::<Result<_, _>>()?;

    Ok(merge_language_bytes(per_repo, &colors))
}

fn fetch_repo_languages(
    client: &Client,
    token: &str,
    repo: &Repo,
) -> Result<HashMap<String, u64>, AppError> {
    let url = format!("{API_BASE}/repos/{}/languages", repo.full_name);
    api_get(client, token, &url)?.json().map_err(|e| {
        AppError::UpstreamFormat(format!("Failed to parse languages for {}: {e}", repo.name))
    })
}

fn fetch_language_colors(client: &Client) -> Result<HashMap<String, String>, AppError> {
    let resp = client
        .get(COLORS_URL)
        .send()
        .map_err(|e| AppError::Network(format!("Color table request failed: {e}")))?;
    ensure_success(&resp)?;

    let table: HashMap<String, ColorWire> = resp
        .json()
        .map_err(|e| AppError::UpstreamFormat(format!("Failed to parse color table: {e}")))?;

    Ok(table
        .into_iter()
        .map(|(lang, info)| {
            let color = info.color.unwrap_or_else(|| FALLBACK_COLOR.to_string());
            (lang, color)
        })
        .collect())
}

/// Merge per-repository byte counts. Summation is commutative, so the
/// parallel fan-out needs no ordering guarantees.
fn merge_language_bytes(
    per_repo: Vec<HashMap<String, u64>>,
    colors: &HashMap<String, String>,
) -> LanguageDistribution {
    let mut merged: LanguageDistribution = BTreeMap::new();
    for langs in per_repo {
        for (language, bytes) in langs {
            let color = colors
                .get(&language)
                .cloned()
                .unwrap_or_else(|| FALLBACK_COLOR.to_string());
            let info = merged.entry(language).or_insert_with(|| LanguageInfo {
                bytes: 0,
                color,
                percentage: 0.0,
            });
            info.bytes += bytes;
        }
    }

    let total: u64 = merged.values().map(|info| info.bytes).sum();
    if total > 0 {
        for info in merged.values_mut() {
            info.percentage = info.bytes as f64 / total as f64 * 100.0;
        }
    }
    merged
}

/// Collect releases across `repos`, newest first, capped at [`RELEASE_LIMIT`].
/// A repository that errors (no access, disabled releases) is skipped with a
/// log line instead of failing the run.
pub fn fetch_releases(client: &Client, cfg: &GithubConfig, repos: &[Repo]) -> Vec<ReleaseInfo> {
    info!("checking {} repositories for releases", repos.len());

    let mut infos = Vec::new();
    for repo in repos {
        match fetch_repo_releases(client, &cfg.token, repo) {
            Ok(mut releases) => {
                debug!("{}: found {} releases", repo.name, releases.len());
                infos.append(&mut releases);
            }
            Err(err) => debug!("{}: no releases or access error ({err})", repo.name),
        }
    }

    finalize_releases(infos)
}

fn fetch_repo_releases(
    client: &Client,
    token: &str,
    repo: &Repo,
) -> Result<Vec<ReleaseInfo>, AppError> {
    let url = format!("{API_BASE}/repos/{}/releases", repo.full_name);
    let releases: Vec<ReleaseWire> = api_get(client, token, &url)?.json().map_err(|e| {
        AppError::UpstreamFormat(format!("Failed to parse releases for {}: {e}", repo.name))
    })?;

    Ok(releases
        .into_iter()
        .filter_map(|release| map_release(release, repo))
        .collect())
}

/// Map one wire release; tags without a semver-looking version are dropped.
fn map_release(release: ReleaseWire, repo: &Repo) -> Option<ReleaseInfo> {
    let version = extract_version(&release.tag_name)?;
    let timestamp = release.published_at.as_deref().unwrap_or(&release.created_at);
    let created_at = parse_epoch_millis(timestamp)?;

    Some(ReleaseInfo {
        id: release.id.to_string(),
        kind: "ReleaseEvent".to_string(),
        repo: repo.name.clone(),
        is_org: repo.is_org,
        title: release
            .name
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| release.tag_name.clone()),
        sha: release.target_commitish.unwrap_or_default(),
        commit: format!(
            "https://github.com/{}/releases/tag/{}",
            repo.full_name, release.tag_name
        ),
        created_at,
        version,
    })
}

/// Pull `x.y.z` (with optional pre-release suffix) out of a tag name.
fn extract_version(tag: &str) -> Option<String> {
    VERSION_RE.captures(tag).map(|caps| caps[1].to_string())
}

fn parse_epoch_millis(timestamp: &str) -> Option<i64> {
    DateTime::parse_from_rfc3339(timestamp)
        .ok()
        .map(|dt| dt.timestamp_millis())
}

/// Shape the merged feed for publication: drop repeats, order newest first,
/// cap at [`RELEASE_LIMIT`] entries.
fn finalize_releases(mut infos: Vec<ReleaseInfo>) -> Vec<ReleaseInfo> {
    dedup_releases(&mut infos);
    infos.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    infos.truncate(RELEASE_LIMIT);
    infos
}

/// Drop repeated (repo, version, sha) triples, keeping the first occurrence.
fn dedup_releases(infos: &mut Vec<ReleaseInfo>) {
    let mut seen = HashSet::new();
    infos.retain(|r| seen.insert((r.repo.clone(), r.version.clone(), r.sha.clone())));
}

/// Fetch the raw per-day contribution counts for `username`. Unparseable
/// dates are rejected here so sort order downstream can never be corrupted.
pub fn fetch_contributions(client: &Client, username: &str) -> Result<Vec<ActivityDay>, AppError> {
    let url = format!("{CONTRIBUTIONS_API}/{username}");
    let resp = client
        .get(&url)
        .send()
        .map_err(|e| AppError::Network(format!("Contributions request failed: {e}")))?;
    ensure_success(&resp)?;

    let body: ContributionsResponse = resp.json().map_err(|e| {
        AppError::UpstreamFormat(format!("Failed to parse contributions response: {e}"))
    })?;

    body.contributions.into_iter().map(parse_day).collect()
}

fn parse_day(raw: ContributionDayWire) -> Result<ActivityDay, AppError> {
    let date = NaiveDate::parse_from_str(&raw.date, "%Y-%m-%d").map_err(|e| {
        AppError::MalformedInput(format!("Invalid contribution date '{}': {e}", raw.date))
    })?;
    Ok(ActivityDay {
        date,
        count: raw.count,
        level: raw.level,
    })
}

fn api_get(client: &Client, token: &str, url: &str) -> Result<Response, AppError> {
    let resp = client
        .get(url)
        .header(AUTHORIZATION, format!("token {token}"))
        .header(ACCEPT, API_ACCEPT)
        .send()
        .map_err(|e| AppError::Network(format!("Request to {url} failed: {e}")))?;
    ensure_success(&resp)?;
    Ok(resp)
}

#[derive(Debug, Deserialize)]
struct RepoWire {
    name: String,
    full_name: String,
    #[serde(default)]
    fork: bool,
    #[serde(default)]
    organization: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct ColorWire {
    color: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ReleaseWire {
    id: u64,
    tag_name: String,
    name: Option<String>,
    target_commitish: Option<String>,
    published_at: Option<String>,
    created_at: String,
}

#[derive(Debug, Deserialize)]
struct ContributionsResponse {
    contributions: Vec<ContributionDayWire>,
}

#[derive(Debug, Deserialize)]
struct ContributionDayWire {
    date: String,
    count: u32,
    level: u8,
}
