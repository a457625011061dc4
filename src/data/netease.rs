//! Music service integration: recent plays and the favorite playlist.
//!
//! The play-record endpoint only answers the web player, whose request bodies
//! are double AES-128-CBC encrypted and base64 wrapped (the `weapi`
//! transport). Keys, IV and the pre-negotiated RSA blob are fixed client-side
//! constants, so no key exchange happens here.

use aes::Aes128;
use aes::cipher::{BlockEncryptMut, KeyIvInit, block_padding::Pkcs7};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use reqwest::blocking::Client;
use reqwest::header::{REFERER, USER_AGENT};
use serde::Deserialize;
use tracing::warn;

use crate::data::{BROWSER_USER_AGENT, ensure_success};
use crate::domain::SongInfo;
use crate::error::AppError;

const PLAY_RECORD_URL: &str = "https://music.163.com/weapi/v1/play/record?csrf_token=";
const PLAYLIST_DETAIL_URL: &str = "https://music.163.com/api/v3/playlist/detail";
const MUSIC_REFERER: &str = "https://music.163.com/";

const NONCE_KEY: &[u8; 16] = b"0CoJUm6Qyw8W8jud";
const SECRET_KEY: &[u8; 16] = b"TA3YiYCfY2dDJQgg";
const IV: &[u8; 16] = b"0102030405060708";
const ENC_SEC_KEY: &str = "84ca47bca10bad09a6b04c5c927ef077d9b9f1e37098aa3eac6ea70eb59df0aa28b691b7e75e4f1f9831754919ea784c8f74fbfadf2898b0be17849fd656060162857830e241aba44991601f137624094c114ea8d17bce815b0cd4e5b8e2fbaba978c6d1d14dc3d1faf852bdd28818031ccdaaa13a6018e1024e2aae98844210";

type Aes128CbcEnc = cbc::Encryptor<Aes128>;

fn aes_encrypt(key: &[u8; 16], plain: &[u8]) -> String {
    let cipher = Aes128CbcEnc::new(key.into(), IV.into());
    BASE64.encode(cipher.encrypt_padded_vec_mut::<Pkcs7>(plain))
}

/// Build the `params`/`encSecKey` form pair carrying an encrypted payload.
fn weapi_form(payload: &str) -> [(&'static str, String); 2] {
    let inner = aes_encrypt(NONCE_KEY, payload.as_bytes());
    let params = aes_encrypt(SECRET_KEY, inner.as_bytes());
    [("params", params), ("encSecKey", ENC_SEC_KEY.to_string())]
}

/// JSON payload for the play-record call; type 1 selects the weekly window.
/// The id is environment-supplied and may carry reserved JSON characters.
fn play_record_payload(user_id: &str) -> String {
    serde_json::json!({"uid": user_id, "type": "1"}).to_string()
}

/// Fetch the weekly play record for `user_id`, most played first.
pub fn fetch_recent_played(client: &Client, user_id: &str) -> Result<Vec<SongInfo>, AppError> {
    let payload = play_record_payload(user_id);
    let resp = client
        .post(PLAY_RECORD_URL)
        .header(REFERER, MUSIC_REFERER)
        .header(USER_AGENT, BROWSER_USER_AGENT)
        .form(&weapi_form(&payload))
        .send()
        .map_err(|e| AppError::Network(format!("Play record request failed: {e}")))?;
    ensure_success(&resp)?;

    let body: PlayRecordResponse = resp
        .json()
        .map_err(|e| AppError::UpstreamFormat(format!("Failed to parse play record response: {e}")))?;

    Ok(body
        .week_data
        .into_iter()
        .map(|entry| map_song(entry.song, Some(entry.score)))
        .collect())
}

/// Fetch the favorite playlist. Any failure degrades to an empty list so a
/// private or deleted playlist never takes the rest of the run down.
pub fn fetch_favorite(client: &Client, favorite_id: &str) -> Vec<SongInfo> {
    match try_fetch_favorite(client, favorite_id) {
        Ok(songs) => songs,
        Err(err) => {
            warn!("favorite playlist fetch failed, publishing an empty list: {err}");
            Vec::new()
        }
    }
}

fn try_fetch_favorite(client: &Client, favorite_id: &str) -> Result<Vec<SongInfo>, AppError> {
    let resp = client
        .post(PLAYLIST_DETAIL_URL)
        .header(REFERER, MUSIC_REFERER)
        .header(USER_AGENT, BROWSER_USER_AGENT)
        .form(&[("id", favorite_id), ("n", "1000"), ("s", "8")])
        .send()
        .map_err(|e| AppError::Network(format!("Playlist detail request failed: {e}")))?;
    ensure_success(&resp)?;

    let body: PlaylistDetailResponse = resp
        .json()
        .map_err(|e| AppError::UpstreamFormat(format!("Failed to parse playlist response: {e}")))?;

    Ok(body
        .playlist
        .tracks
        .into_iter()
        .map(|song| map_song(song, None))
        .collect())
}

fn map_song(song: SongWire, score: Option<u32>) -> SongInfo {
    let SongWire {
        name,
        id,
        artists,
        album,
    } = song;
    SongInfo {
        name,
        artist: artists
            .into_iter()
            .map(|a| a.name)
            .collect::<Vec<_>>()
            .join("/"),
        album: album.name,
        pic: album.pic_url,
        id,
        url: format!("https://music.163.com/#/song?id={id}"),
        score,
    }
}

#[derive(Debug, Deserialize)]
struct PlayRecordResponse {
    #[serde(rename = "weekData", default)]
    week_data: Vec<PlayRecordEntry>,
}

#[derive(Debug, Deserialize)]
struct PlayRecordEntry {
    score: u32,
    song: SongWire,
}

#[derive(Debug, Deserialize)]
struct SongWire {
    name: String,
    id: u64,
    #[serde(rename = "ar", default)]
    artists: Vec<ArtistWire>,
    #[serde(rename = "al")]
    album: AlbumWire,
}

#[derive(Debug, Deserialize)]
struct ArtistWire {
    name: String,
}

#[derive(Debug, Deserialize)]
struct AlbumWire {
    name: String,
    #[serde(rename = "picUrl")]
    pic_url: String,
}

#[derive(Debug, Deserialize)]
struct PlaylistDetailResponse {
    playlist: PlaylistWire,
}

#[derive(Debug, Deserialize)]
struct PlaylistWire {
    #[serde(default)]
    tracks: Vec<SongWire>,
}
