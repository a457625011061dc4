//! Video favorites folder integration.

use reqwest::blocking::Client;
use serde::Deserialize;

use crate::data::ensure_success;
use crate::domain::{FavoriteVideo, VideoStats};
use crate::error::AppError;

const FAV_LIST_URL: &str = "https://api.bilibili.com/x/v3/fav/resource/list";
/// Number of entries the site shows; the folder itself can be larger.
const PAGE_SIZE: &str = "6";

/// Fetch the newest entries of a public favorites folder.
pub fn fetch_favorite_videos(
    client: &Client,
    media_id: &str,
) -> Result<Vec<FavoriteVideo>, AppError> {
    let resp = client
        .get(FAV_LIST_URL)
        .query(&[("media_id", media_id), ("ps", PAGE_SIZE), ("platform", "web")])
        .send()
        .map_err(|e| AppError::Network(format!("Favorites list request failed: {e}")))?;
    ensure_success(&resp)?;

    let body: FavListResponse = resp
        .json()
        .map_err(|e| AppError::UpstreamFormat(format!("Failed to parse favorites response: {e}")))?;

    Ok(unwrap_envelope(body)?.into_iter().map(map_video).collect())
}

/// Peel the `code`/`message` envelope every response wears.
fn unwrap_envelope(body: FavListResponse) -> Result<Vec<MediaWire>, AppError> {
    if body.code != 0 {
        return Err(AppError::UpstreamFormat(format!(
            "Favorites API error {}: {}",
            body.code, body.message
        )));
    }
    let data = body
        .data
        .ok_or_else(|| AppError::UpstreamFormat("Favorites response carried no data".into()))?;
    // An empty folder comes back as `"medias": null`, not an empty array.
    Ok(data.medias.unwrap_or_default())
}

fn map_video(media: MediaWire) -> FavoriteVideo {
    let link = format!("https://www.bilibili.com/video/{}", media.bvid);
    FavoriteVideo {
        title: media.title,
        cover: media.cover,
        intro: media.intro,
        id: media.id,
        bvid: media.bvid,
        link,
        duration: media.duration,
        stats: media.cnt_info,
    }
}

#[derive(Debug, Deserialize)]
struct FavListResponse {
    code: i64,
    #[serde(default)]
    message: String,
    data: Option<FavData>,
}

#[derive(Debug, Deserialize)]
struct FavData {
    medias: Option<Vec<MediaWire>>,
}

#[derive(Debug, Deserialize)]
struct MediaWire {
    id: u64,
    title: String,
    cover: String,
    intro: String,
    duration: u32,
    bvid: String,
    cnt_info: VideoStats,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn videos_map_with_a_link_built_from_the_bvid() {
        let media: MediaWire = serde_json::from_value(json!({
            "id": 113019588,
            "title": "【钢琴】夜的第七章",
            "cover": "https://i1.hdslb.com/bfs/archive/x.jpg",
            "intro": "翻弹",
            "duration": 254,
            "bvid": "BV1xx411c7mD",
            "cnt_info": {
                "collect": 3282,
                "play": 1234567,
                "danmaku": 500,
                "vt": 0,
                "play_switch": 0,
                "reply": 77,
                "view_text_1": "123.4万"
            }
        }))
        .unwrap();

        let video = map_video(media);

        assert_eq!(video.link, "https://www.bilibili.com/video/BV1xx411c7mD");
        assert_eq!(video.bvid, "BV1xx411c7mD");
        assert_eq!(video.stats.collect, 3282);
        assert_eq!(video.stats.view_text_1, "123.4万");
    }

    #[test]
    fn non_zero_envelope_code_is_an_upstream_error() {
        let body: FavListResponse = serde_json::from_value(json!({
            "code": -403,
            "message": "访问权限不足",
            "ttl": 1,
            "data": null
        }))
        .unwrap();

        let err = unwrap_envelope(body).unwrap_err();
        assert!(matches!(err, AppError::UpstreamFormat(_)));
        assert!(
            err.to_string().contains("访问权限不足"),
            "error should carry the API message: {err}"
        );
    }

    #[test]
    fn null_medias_unwraps_to_an_empty_list() {
        let body: FavListResponse = serde_json::from_value(json!({
            "code": 0,
            "message": "0",
            "data": {"info": {}, "medias": null, "has_more": false}
        }))
        .unwrap();

        assert!(unwrap_envelope(body).unwrap().is_empty());
    }
}
