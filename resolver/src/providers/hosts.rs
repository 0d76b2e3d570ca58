//! 播放器页面类视频源

/*
 * Copyright (c) 2025 fltLi
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ORIGIN, REFERER};
use resolver_derive::Provider;

use super::page::scan_page;
use crate::error::*;
use crate::http::Context;
use crate::models::*;
use crate::traits::{Extractor, Provider};

#[derive(Provider)]
#[provider(name = "Voe", patterns = ["voe"])]
pub struct Voe;

#[derive(Provider)]
#[provider(name = "Okru", patterns = ["ok.ru", "okru"])]
pub struct Okru;

#[derive(Provider)]
#[provider(name = "Filemoon", patterns = ["filemoon", "moonplayer"])]
pub struct Filemoon;

#[derive(Provider)]
#[provider(name = "Uqload", patterns = ["uqload"])]
pub struct Uqload;

#[derive(Provider)]
#[provider(name = "Mp4Upload", patterns = ["mp4upload"])]
pub struct Mp4Upload;

#[derive(Provider)]
#[provider(name = "StreamWish", patterns = ["wishembed", "embedwish", "streamwish", "strwish", "wish"])]
pub struct StreamWish;

#[derive(Provider)]
#[provider(name = "DoodStream", patterns = ["doodstream", "dood."])]
pub struct DoodStream;

#[derive(Provider)]
#[provider(name = "Streamlare", patterns = ["streamlare"])]
pub struct Streamlare;

#[derive(Provider)]
#[provider(name = "YourUpload", patterns = ["yourupload", "upload"])]
pub struct YourUpload;

#[derive(Provider)]
#[provider(name = "BurstCloud", patterns = ["burstcloud", "burst"])]
pub struct BurstCloud;

#[derive(Provider)]
#[provider(name = "Fastream", patterns = ["fastream"])]
pub struct Fastream;

#[derive(Provider)]
#[provider(name = "Upstream", patterns = ["upstream"])]
pub struct Upstream;

#[derive(Provider)]
#[provider(name = "StreamTape", patterns = ["streamtape", "stp", "stape"])]
pub struct StreamTape;

#[derive(Provider)]
#[provider(name = "StreamHideVid", patterns = ["ahvsh", "streamhide"])]
pub struct StreamHideVid;

#[derive(Provider)]
#[provider(name = "FileLions", patterns = ["filelions", "lion"])]
pub struct FileLions;

#[derive(Provider)]
#[provider(name = "VidHide", patterns = ["vidhide"])]
pub struct VidHide;

#[derive(Provider)]
#[provider(name = "MixDrop", patterns = ["mixdrop"])]
pub struct MixDrop;

/// 只需扫描播放器页面的视频源
macro_rules! scan_only {
    ($($host:ident),* $(,)?) => {
        $(
            #[async_trait]
            impl Extractor for $host {
                async fn videos(&self, ctx: &Context, url: &str) -> Result<Vec<StreamCandidate>> {
                    scan_page(ctx, url, <$host as Provider>::NAME, &HeaderMap::new()).await
                }
            }
        )*
    };
}

scan_only!(
    Voe,
    Okru,
    Uqload,
    Mp4Upload,
    DoodStream,
    Streamlare,
    YourUpload,
    BurstCloud,
    Fastream,
    Upstream,
    StreamTape,
    StreamHideVid,
    FileLions,
    VidHide,
    MixDrop,
);

/// `Origin` 与 `Referer` 指向同一站点
fn origin_headers(origin: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    if let Ok(value) = HeaderValue::from_str(origin) {
        headers.insert(ORIGIN, value);
    }
    if let Ok(value) = HeaderValue::from_str(&format!("{origin}/")) {
        headers.insert(REFERER, value);
    }
    headers
}

#[async_trait]
impl Extractor for Filemoon {
    async fn videos(&self, ctx: &Context, url: &str) -> Result<Vec<StreamCandidate>> {
        let host = url::Url::parse(url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
            .ok_or_else(|| Error::extract(Self::NAME, ExtractErrorKind::InvalidUrl(url.to_string())))?;
        scan_page(ctx, url, Self::NAME, &origin_headers(&format!("https://{host}"))).await
    }
}

#[async_trait]
impl Extractor for StreamWish {
    async fn videos(&self, ctx: &Context, url: &str) -> Result<Vec<StreamCandidate>> {
        scan_page(ctx, url, Self::NAME, &origin_headers("https://streamwish.to")).await
    }
}
