//! Per-source fetch pipelines shared by the single-source subcommands and `all`.
//!
//! Every pipeline reads its configuration from the environment, fetches over a
//! shared blocking client, maps into the published snapshot types and writes
//! JSON files under the output directory. Pipelines are independent: one
//! failing never blocks another's run or corrupts another's files.

use std::path::Path;

use chrono::{Local, NaiveDate};
use tracing::{error, info, warn};

use crate::calendar;
use crate::config::{BangumiConfig, BilibiliConfig, GithubConfig, NeteaseConfig, SteamConfig};
use crate::data::{self, bangumi, bilibili, github, netease, steam};
use crate::domain::{ActivityDay, BilibiliSnapshot, ContributionWindow, SteamSnapshot};
use crate::error::AppError;
use crate::io::{NameCache, snapshot};

/// Fetch the music play record and the favorite playlist.
///
/// Each list is fetched only when its id is configured; the two fetches run
/// in parallel. A failing favorite fetch degrades to an empty list inside
/// `fetch_favorite`, a failing play-record fetch fails the pipeline.
pub fn run_netease(out_dir: &Path) -> Result<(), AppError> {
    let cfg = NeteaseConfig::from_env()?;
    let client = data::build_client()?;

    let (recent, favorite) = rayon::join(
        || {
            cfg.user_id
                .as_deref()
                .map(|id| netease::fetch_recent_played(&client, id))
                .transpose()
        },
        || {
            cfg.favorite_id
                .as_deref()
                .map(|id| netease::fetch_favorite(&client, id))
        },
    );

    if let Some(songs) = recent? {
        let path = out_dir.join("netease/recentPlayed.json");
        snapshot::write_json(&path, &songs)?;
        info!("wrote {} recently played songs to {}", songs.len(), path.display());
    }
    if let Some(songs) = favorite {
        let path = out_dir.join("netease/favorite.json");
        snapshot::write_json(&path, &songs)?;
        info!("wrote {} favorite songs to {}", songs.len(), path.display());
    }
    Ok(())
}

/// Fetch the favorite video folder into `bilibili.json`.
pub fn run_bilibili(out_dir: &Path) -> Result<(), AppError> {
    let cfg = BilibiliConfig::from_env()?;
    let client = data::build_client()?;

    let videos = bilibili::fetch_favorite_videos(&client, &cfg.media_id)?;
    let path = out_dir.join("bilibili.json");
    snapshot::write_json(&path, &BilibiliSnapshot { music_liked: videos })?;
    info!("wrote {}", path.display());
    Ok(())
}

/// Fetch anime collections and write one file per watch status.
pub fn run_bangumi(out_dir: &Path) -> Result<(), AppError> {
    let cfg = BangumiConfig::from_env()?;
    let client = data::build_client()?;

    let buckets = bangumi::fetch_collections(&client, &cfg)?;
    info!(
        "collections: {} watching, {} to watch, {} watched",
        buckets.watching.len(),
        buckets.to_watch.len(),
        buckets.watched.len()
    );

    snapshot::write_json(&out_dir.join("bangumi/watching.json"), &buckets.watching)?;
    snapshot::write_json(&out_dir.join("bangumi/toWatch.json"), &buckets.to_watch)?;
    snapshot::write_json(&out_dir.join("bangumi/watched.json"), &buckets.watched)?;
    Ok(())
}

/// Fetch code-activity snapshots: language distribution, releases and the
/// contribution window.
pub fn run_github(out_dir: &Path) -> Result<(), AppError> {
    let cfg = GithubConfig::from_env()?;
    let client = data::build_client()?;

    // 1) One filtered repository listing feeds both languages and releases.
    let repos = github::fetch_repos(&client, &cfg)?;
    info!("{} repositories after filtering", repos.len());

    // 2) Language distribution; any per-repo failure fails the pipeline
    //    rather than publishing skewed percentages.
    let languages = github::fetch_language_distribution(&client, &cfg, &repos)?;
    let path = out_dir.join("github/languageDistribution.json");
    snapshot::write_json(&path, &languages)?;
    info!("wrote {} languages to {}", languages.len(), path.display());

    // 3) Releases; per-repo failures are skipped inside fetch_releases.
    let releases = github::fetch_releases(&client, &cfg, &repos);
    let path = out_dir.join("github/releases.json");
    snapshot::write_json(&path, &releases)?;
    info!("wrote {} releases to {}", releases.len(), path.display());

    // 4) Contribution window, falling back to the previous snapshot.
    let path = out_dir.join("github/lastYearContributions.json");
    publish_contributions(
        github::fetch_contributions(&client, &cfg.username),
        &path,
        Local::now().date_naive(),
    )?;
    Ok(())
}

/// Publish the contribution window for `today`, re-serving whatever snapshot
/// already sits at `path` when the fetch failed. A flaky contributions API
/// must never blank the published calendar; with no previous snapshot either,
/// nothing is published this run.
fn publish_contributions(
    fetched: Result<Vec<ActivityDay>, AppError>,
    path: &Path,
    today: NaiveDate,
) -> Result<(), AppError> {
    match fetched {
        Ok(days) => {
            let window = calendar::build_window(days, today);
            snapshot::write_json(path, &window)?;
            info!("wrote contribution window ({} total) to {}", window.total, path.display());
        }
        Err(err) => {
            warn!("contribution fetch failed: {err}");
            match snapshot::read_json::<ContributionWindow>(path) {
                Ok(previous) => {
                    snapshot::write_json(path, &previous)?;
                    warn!("re-served the previous contribution snapshot");
                }
                Err(_) => warn!("no previous contribution snapshot to fall back to"),
            }
        }
    }
    Ok(())
}

/// Fetch the player summary and the owned-games library into `steam.json`,
/// resolving localized titles through the persisted name cache.
pub fn run_steam(out_dir: &Path) -> Result<(), AppError> {
    let cfg = SteamConfig::from_env()?;
    let client = data::build_client()?;

    let (user, games) = rayon::join(
        || steam::fetch_player_summary(&client, &cfg),
        || steam::fetch_owned_games(&client, &cfg),
    );
    let (user, games) = (user?, games?);

    let mut cache = NameCache::load(&out_dir.join("steam_namecn_map.json"));
    let games = steam::resolve_games(&client, games, &mut cache);
    if cache.save_if_dirty()? {
        info!("name cache rewritten with {} entries", cache.len());
    }

    let path = out_dir.join("steam.json");
    snapshot::write_json(&path, &SteamSnapshot { user, games })?;
    info!("wrote {}", path.display());
    Ok(())
}

/// Run every pipeline. A failing source is logged and counted; the rest keep
/// going, and the combined run reports partial failure at the end.
pub fn run_all(out_dir: &Path) -> Result<(), AppError> {
    let pipelines: [(&str, fn(&Path) -> Result<(), AppError>); 5] = [
        ("netease", run_netease),
        ("bilibili", run_bilibili),
        ("bangumi", run_bangumi),
        ("github", run_github),
        ("steam", run_steam),
    ];
    let total = pipelines.len();

    let mut failed = 0;
    for (name, run) in pipelines {
        info!("running {name} pipeline");
        if let Err(err) = run(out_dir) {
            error!("{name} pipeline failed: {err}");
            failed += 1;
        }
    }

    if failed > 0 {
        return Err(AppError::Sources { failed, total });
    }
    Ok(())
}
