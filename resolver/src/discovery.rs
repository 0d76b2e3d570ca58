//! 嵌入链接发现

/*
 * Copyright (c) 2025 fltLi
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use serde::Deserialize;

use crate::error::*;
use crate::http::Context;
use crate::models::*;
use crate::resolve::DEFAULT_CONCURRENCY;
use crate::utils::*;

// 标题中的季与集, 如 1x5
static SEASON_EPISODE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)x(\d+)").unwrap());

// iframe 地址中的视频 ID
static EMBED_ID_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"/e/(\d+)").unwrap());

/// 从详情页发现嵌入链接, 任何失败都只会减少结果
#[async_trait]
pub trait EmbedDiscovery: Send + Sync {
    async fn discover(&self, ctx: &Context, markup: &str) -> Vec<EmbedReference>;
}

/// 内联脚本数组 + 一层包装页
///
/// 播放器列表写在形如 `tabsArray[1] = "<iframe src='...'>"` 的脚本里,
/// 每个地址指向一个包装页, 包装页首个脚本中的 `src="..."` 才是真正的播放器.
#[derive(Debug, Clone)]
pub struct ScriptTabs {
    /// 用于定位脚本的标记
    pub marker: &'static str,
    /// 数组元素分隔
    pub delimiter: &'static str,
    pub concurrency: usize,
}

impl Default for ScriptTabs {
    fn default() -> Self {
        Self {
            marker: "var tabsArray",
            delimiter: "tabsArray",
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

impl ScriptTabs {
    /// 解析脚本中的包装页地址 (已解码)
    pub fn parse_tab_sources(&self, markup: &str) -> Vec<String> {
        let document = Html::parse_document(markup);
        let Ok(script_sel) = Selector::parse("script") else {
            return Vec::new();
        };

        let Some(data) = document
            .select(&script_sel)
            .map(|el| el.text().collect::<String>())
            .find(|data| data.contains(self.marker))
        else {
            return Vec::new();
        };

        data.split(self.delimiter)
            .map(|part| substring_before(substring_after(part, "src='"), "'").replace("amp;", ""))
            .filter(|src| src.contains("https"))
            .map(|src| normalize_embed_url(&src))
            .collect()
    }

    /// 从包装页中取真正的播放器地址
    pub fn parse_wrapper(markup: &str) -> Option<String> {
        let document = Html::parse_document(markup);
        let script_sel = Selector::parse("script").ok()?;
        let data = document
            .select(&script_sel)
            .next()?
            .text()
            .collect::<String>();

        if !data.contains("src=\"") {
            return None;
        }
        let src = substring_before(substring_after(&data, "src=\""), "\"");
        if src.trim().is_empty() {
            return None;
        }
        Some(normalize_embed_url(src))
    }

    async fn follow_wrapper(ctx: &Context, wrapper: String) -> Option<EmbedReference> {
        match ctx.get(&wrapper).await {
            Ok(response) if response.status == 200 => {
                let player = Self::parse_wrapper(&response.body);
                if player.is_none() {
                    log::warn!("no player script in wrapper {wrapper}");
                }
                player.map(EmbedReference::new)
            }
            Ok(response) => {
                log::warn!("wrapper {wrapper} returned {}", response.status);
                None
            }
            Err(e) => {
                log::warn!("wrapper {wrapper} skipped: {e}");
                None
            }
        }
    }
}

#[async_trait]
impl EmbedDiscovery for ScriptTabs {
    async fn discover(&self, ctx: &Context, markup: &str) -> Vec<EmbedReference> {
        let wrappers = self.parse_tab_sources(markup);
        log::debug!("found {} tab sources", wrappers.len());

        stream::iter(wrappers)
            .map(|wrapper| Self::follow_wrapper(ctx, wrapper))
            .buffered(self.concurrency.max(1))
            .filter_map(|embed| async move { embed })
            .collect()
            .await
    }
}

/// iframe 编号 + 站点接口
///
/// 从 iframe 地址取视频 ID, 结合标题中的季与集调用接口, 接口直接返回 `{url, tipo}` 列表.
#[derive(Debug, Clone)]
pub struct IframeFeed {
    pub selector: &'static str,
    /// 接口路径, 相对站点根地址
    pub feed_path: &'static str,
    pub concurrency: usize,
}

impl Default for IframeFeed {
    fn default() -> Self {
        Self {
            selector: ".video-player iframe",
            feed_path: "/wp-json/enlace/v1/e",
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

/// 接口返回的条目
#[derive(Debug, Deserialize)]
struct FeedEntry {
    url: String,
    tipo: String,
}

impl IframeFeed {
    /// 解析标题中的季与集, 以及各 iframe 的视频 ID
    pub fn parse_iframe_ids(&self, markup: &str) -> (Option<(u32, u32)>, Vec<String>) {
        let document = Html::parse_document(markup);

        let season_episode = Selector::parse("title")
            .ok()
            .and_then(|sel| document.select(&sel).next())
            .map(|el| el.text().collect::<String>())
            .and_then(|title| {
                let caps = SEASON_EPISODE_REGEX.captures(&title)?;
                Some((caps[1].parse::<u32>().ok()?, caps[2].parse::<u32>().ok()?))
            });

        let Ok(iframe_sel) = Selector::parse(self.selector) else {
            return (season_episode, Vec::new());
        };

        let ids = document
            .select(&iframe_sel)
            .filter_map(|iframe| {
                let src = iframe
                    .value()
                    .attr("src")
                    .filter(|s| !s.is_empty())
                    .or_else(|| iframe.value().attr("data-src"))?;
                let src = decode_url(src);
                EMBED_ID_REGEX
                    .captures(&src)
                    .and_then(|c| c.get(1))
                    .map(|m| m.as_str().to_string())
            })
            .collect();

        (season_episode, ids)
    }

    pub fn feed_url(&self, ctx: &Context, id: &str, season_episode: Option<(u32, u32)>) -> String {
        let base = ctx.absolute(self.feed_path);
        match season_episode {
            Some((season, episode)) => {
                format!("{base}?id={id}&season={season}&episode={episode}")
            }
            None => format!("{base}?id={id}"),
        }
    }

    /// 解析接口返回的 JSON 数组
    pub fn parse_feed(body: &str) -> Result<Vec<EmbedReference>> {
        let entries: Vec<FeedEntry> = serde_json::from_str(body)
            .map_err(|e| Error::Extract(ExtractError::new(ExtractErrorKind::Json(e.to_string()))))?;

        Ok(entries
            .into_iter()
            .filter(|entry| !entry.url.trim().is_empty())
            .map(|entry| {
                EmbedReference::new(normalize_embed_url(&entry.url))
                    .with_language(Language::from_tipo(&entry.tipo))
            })
            .collect())
    }

    async fn fetch_feed(&self, ctx: &Context, url: String) -> Vec<EmbedReference> {
        let response = match ctx.get(&url).await {
            Ok(response) if response.is_success() => response,
            Ok(response) => {
                log::warn!("feed {url} returned {}", response.status);
                return Vec::new();
            }
            Err(e) => {
                log::warn!("feed {url} skipped: {e}");
                return Vec::new();
            }
        };

        Self::parse_feed(&response.body).unwrap_or_else(|e| {
            log::warn!("feed {url} unreadable: {e}");
            Vec::new()
        })
    }
}

#[async_trait]
impl EmbedDiscovery for IframeFeed {
    async fn discover(&self, ctx: &Context, markup: &str) -> Vec<EmbedReference> {
        let (season_episode, ids) = self.parse_iframe_ids(markup);
        log::debug!("found {} player ids, season/episode {season_episode:?}", ids.len());

        let urls: Vec<String> = ids
            .iter()
            .map(|id| self.feed_url(ctx, id, season_episode))
            .collect();

        stream::iter(urls)
            .map(|url| self.fetch_feed(ctx, url))
            .buffered(self.concurrency.max(1))
            .flat_map(stream::iter)
            .collect()
            .await
    }
}
