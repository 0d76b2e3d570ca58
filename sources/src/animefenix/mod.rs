//! AnimeFenix

/*
 * Copyright (c) 2025 fltLi
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

mod filters;

use async_trait::async_trait;
use scraper::Html;
use std::sync::Arc;

use resolver::models::*;
use resolver::providers::*;
use resolver::{Context, EmbedDiscovery, HttpClient, RankFacets, Registry, ScriptTabs, rank, resolve_all};

use crate::config::SourceConfig;
use crate::error::*;
use crate::models::*;
use crate::parse::*;
use crate::AnimeSource;

pub use filters::AnimefenixFilters;

pub const BASE_URL: &str = "https://www.animefenix.tv";

pub const PREFERENCES: PreferenceDefaults = PreferenceDefaults {
    quality: Quality::P1080,
    server: "Amazon",
    servers: &[
        "YourUpload", "Voe", "Mp4Upload", "Doodstream", "Upload", "BurstCloud", "Upstream",
        "StreamTape", "Fastream", "Filemoon", "StreamWish", "Okru", "Amazon", "AmazonES",
        "Fireload", "FileLions",
    ],
    language: None,
};

/// 脚本数组发现播放器, 完整视频源表加兜底
pub struct Animefenix {
    ctx: Context,
    prefs: Preferences,
    registry: Registry,
    discovery: ScriptTabs,
    concurrency: usize,
}

impl Animefenix {
    pub fn new(client: Arc<dyn HttpClient>, prefs: Preferences) -> Self {
        Self::with_base_url(client, prefs, BASE_URL)
    }

    pub fn with_base_url(client: Arc<dyn HttpClient>, prefs: Preferences, base_url: &str) -> Self {
        let ctx = Context::new(client, base_url);
        let referer = format!("{}/", ctx.base_url);
        Self {
            ctx: ctx.with_header("Referer", &referer),
            prefs,
            registry: Self::registry(),
            discovery: ScriptTabs::default(),
            concurrency: resolver::DEFAULT_CONCURRENCY,
        }
    }

    pub fn from_config(config: &SourceConfig, store: &impl PreferenceStore) -> Result<Self> {
        let client = config.build_client()?;
        let prefs = Preferences::load(store, &PREFERENCES);
        let source = Self::with_base_url(Arc::new(client), prefs, &config.base_url_or(BASE_URL));
        Ok(source.with_concurrency(config.max_concurrency))
    }

    pub fn with_concurrency(mut self, limit: usize) -> Self {
        self.concurrency = limit.max(1);
        self.discovery.concurrency = self.concurrency;
        self
    }

    /// 替换视频源表, 用于宿主追加或覆盖提取器
    pub fn with_registry(mut self, registry: Registry) -> Self {
        self.registry = registry;
        self
    }

    pub fn preferences(&self) -> &Preferences {
        &self.prefs
    }

    /// 视频源按匹配顺序排列, 兜底为通用扫描
    pub fn registry() -> Registry {
        Registry::builder()
            .provider::<Voe>()
            .provider::<Amazon>()
            .provider::<Okru>()
            .provider::<Filemoon>()
            .provider::<Uqload>()
            .provider::<Mp4Upload>()
            .provider::<StreamWish>()
            .provider::<DoodStream>()
            .provider::<Streamlare>()
            .provider::<YourUpload>()
            .provider::<BurstCloud>()
            .provider::<Fastream>()
            .provider::<Upstream>()
            .provider::<StreamTape>()
            .provider::<StreamHideVid>()
            .provider::<FireLoad>()
            .provider::<FileLions>()
            .fallback::<Universal>()
            .build()
    }

    fn popular_url(&self, page: u32) -> String {
        self.ctx.absolute(&format!("/animes?order=likes&page={page}"))
    }

    fn search_url(&self, page: u32, query: &str, filters: &AnimefenixFilters) -> String {
        let query = query.trim();
        if !query.is_empty() {
            self.ctx.absolute(&format!(
                "/animes?q={}&page={page}",
                urlencoding::encode(query)
            ))
        } else if !filters.is_empty() {
            self.ctx
                .absolute(&format!("/animes{}&page={page}", filters.to_query()))
        } else {
            self.popular_url(page)
        }
    }

    pub fn parse_listing(base: &str, markup: &str) -> AnimesPage {
        let document = Html::parse_document(markup);
        let root = document.root_element();

        let entries = select_all(root, "article.serie-card")
            .into_iter()
            .map(|card| ListingEntry {
                url: select_attr(card, "figure.image a", "href")
                    .map(|href| without_domain(base, &href))
                    .unwrap_or_default(),
                title: select_text(card, "div.title h3 a"),
                thumbnail_url: select_attr(card, "figure.image a img", "src")
                    .and_then(|src| absolute(base, &src)),
                description: Some(select_text(card, "div.serie-card__information p"))
                    .filter(|d| !d.is_empty()),
            })
            .collect();

        let has_next_page = select_all(root, "ul.pagination-list li a.pagination-link")
            .into_iter()
            .any(|a| text(a).contains("Siguiente"));

        AnimesPage {
            entries,
            has_next_page,
        }
    }

    pub fn parse_episodes(base: &str, markup: &str) -> Vec<EpisodeEntry> {
        let document = Html::parse_document(markup);
        select_all(document.root_element(), "ul.anime-page__episode-list.is-size-6 li")
            .into_iter()
            .map(|item| {
                let number = select_text(item, "a span").replace("Episodio", "");
                let number = number.trim();
                let url = select_attr(item, "a", "href")
                    .map(|href| without_domain(base, &href))
                    .unwrap_or_default();
                EpisodeEntry::new(
                    url,
                    format!("Episodio {number}"),
                    number.parse().unwrap_or(0.0),
                )
            })
            .collect()
    }

    pub fn parse_details(markup: &str) -> MediaDetails {
        let document = Html::parse_document(markup);
        let root = document.root_element();

        let genres = select_all(root, "a.button.is-small.is-orange.is-outlined.is-roundedX")
            .into_iter()
            .map(text)
            .filter(|g| !g.is_empty())
            .collect();
        let status = select_text(
            root,
            "div.column.is-12-mobile.xis-3-tablet.xis-3-desktop.xhas-background-danger.is-narrow-tablet.is-narrow-desktop a",
        );

        MediaDetails {
            title: select_text(root, "h1.title.has-text-orange"),
            genres,
            status: Status::classify(&status),
            ..Default::default()
        }
    }

    async fn fetch_listing(&self, url: &str) -> Result<AnimesPage> {
        let response = fetch_page(&self.ctx, url).await?;
        Ok(Self::parse_listing(&self.ctx.base_url, &response.body))
    }
}

#[async_trait]
impl AnimeSource for Animefenix {
    type Filters = AnimefenixFilters;

    fn name(&self) -> &'static str {
        "AnimeFenix"
    }

    fn base_url(&self) -> &str {
        &self.ctx.base_url
    }

    fn episode_order(&self) -> EpisodeOrder {
        EpisodeOrder::Descending
    }

    async fn list_popular(&self, page: u32) -> Result<AnimesPage> {
        self.fetch_listing(&self.popular_url(page)).await
    }

    async fn list_latest(&self, page: u32) -> Result<AnimesPage> {
        let url = self
            .ctx
            .absolute(&format!("/animes?order=added&page={page}"));
        self.fetch_listing(&url).await
    }

    async fn search(&self, page: u32, query: &str, filters: &AnimefenixFilters) -> Result<AnimesPage> {
        self.fetch_listing(&self.search_url(page, query, filters))
            .await
    }

    async fn get_details(&self, entry_url: &str) -> Result<MediaDetails> {
        let response = fetch_page(&self.ctx, &self.ctx.absolute(entry_url)).await?;
        Ok(Self::parse_details(&response.body))
    }

    async fn list_episodes(&self, entry_url: &str) -> Result<Vec<EpisodeEntry>> {
        let response = fetch_page(&self.ctx, &self.ctx.absolute(entry_url)).await?;
        let mut episodes = Self::parse_episodes(&self.ctx.base_url, &response.body);
        self.episode_order().apply(&mut episodes);
        Ok(episodes)
    }

    async fn list_streams(&self, episode_url: &str) -> Result<Vec<StreamCandidate>> {
        let response = fetch_page(&self.ctx, &self.ctx.absolute(episode_url)).await?;
        let embeds = self.discovery.discover(&self.ctx, &response.body).await;
        log::debug!("{} embeds on {episode_url}", embeds.len());

        let candidates = resolve_all(&self.ctx, &self.registry, embeds, self.concurrency).await;
        Ok(rank(candidates, &self.prefs, RankFacets::default()))
    }
}
