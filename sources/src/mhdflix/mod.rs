//! MhdFlix

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
use resolver::utils::substring_after;
use resolver::{
    Context, EmbedDiscovery, HttpClient, IframeFeed, Pattern, RankFacets, Registry, rank,
    resolve_all,
};

use crate::config::SourceConfig;
use crate::error::*;
use crate::models::*;
use crate::parse::*;
use crate::AnimeSource;

pub use filters::MhdFlixFilters;

pub const BASE_URL: &str = "https://ww2.mhdflix.com";

pub const PREFERENCES: PreferenceDefaults = PreferenceDefaults {
    quality: Quality::P1080,
    server: "StreamWish",
    servers: &[
        "StreamWish", "VidHide", "Voe", "Uqload", "StreamTape", "Doodstream", "MixDrop",
        "filelions",
    ],
    language: Some(Language::Lat),
};

/// 播放器编号经站点接口换取嵌入链接, 按语言优先排序
pub struct MhdFlix {
    ctx: Context,
    prefs: Preferences,
    registry: Registry,
    discovery: IframeFeed,
    concurrency: usize,
}

impl MhdFlix {
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
            discovery: IframeFeed::default(),
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

    pub fn with_registry(mut self, registry: Registry) -> Self {
        self.registry = registry;
        self
    }

    pub fn preferences(&self) -> &Preferences {
        &self.prefs
    }

    /// 没有兜底项, 未命中的嵌入链接直接忽略
    pub fn registry() -> Registry {
        Registry::builder()
            .provider::<VidHide>()
            .provider::<Voe>()
            .provider::<Uqload>()
            .provider_with::<StreamTape>(Pattern::new(&["streamtape"], &[]))
            .provider_with::<DoodStream>(Pattern::new(&["dood"], &[]))
            .provider_with::<StreamWish>(Pattern::new(&["streamwish"], &[]))
            .provider::<MixDrop>()
            .provider_with::<FileLions>(Pattern::new(&["filelions"], &[]))
            .build()
    }

    fn popular_url(&self, page: u32) -> String {
        self.ctx.absolute(&format!("/movies/page/{page}"))
    }

    fn search_url(&self, page: u32, query: &str, filters: &MhdFlixFilters) -> String {
        let query = query.trim();
        let path = filters.path();
        if !query.is_empty() {
            self.ctx
                .absolute(&format!("/?s={}&page={page}", urlencoding::encode(query)))
        } else if !path.is_empty() {
            self.ctx.absolute(&format!("{path}/page/{page}"))
        } else {
            self.popular_url(page)
        }
    }

    pub fn parse_listing(base: &str, markup: &str) -> AnimesPage {
        let document = Html::parse_document(markup);
        let root = document.root_element();

        let entries = select_all(root, r#"#movies-a li[id*="post-"]"#)
            .into_iter()
            .map(|item| ListingEntry {
                url: select_attr(item, "article > a", "href")
                    .map(|href| without_domain(base, &href))
                    .unwrap_or_default(),
                title: select_first(item, "article .entry-header .entry-title")
                    .map(text)
                    .unwrap_or_default(),
                thumbnail_url: select_first(item, "article .post-thumbnail figure img")
                    .and_then(|img| image_url(base, img)),
                description: None,
            })
            .collect();

        AnimesPage {
            entries,
            has_next_page: exists(root, ".pagination .nav-links .current ~ a:not(.page-link)"),
        }
    }

    pub fn parse_details(base: &str, markup: &str) -> MediaDetails {
        let document = Html::parse_document(markup);
        let root = document.root_element();

        let mut details = MediaDetails {
            title: select_first(root, ".alg-cr .entry-header .entry-title")
                .map(text)
                .unwrap_or_default(),
            description: Some(select_text(root, ".alg-cr .description")).filter(|d| !d.is_empty()),
            thumbnail_url: select_first(root, ".alg-cr .post-thumbnail img")
                .and_then(|img| image_url(base, img)),
            genres: select_all(root, ".genres a")
                .into_iter()
                .map(text)
                .filter(|g| !g.is_empty())
                .collect(),
            status: Status::Unknown,
            ..Default::default()
        };

        for member in select_all(root, ".cast-lst li") {
            let role = select_text(member, "span").to_lowercase();
            let name = select_first(member, "p > a").map(text);
            if role.contains("director") {
                details.author = name.clone();
            }
            if role.contains("actores") {
                details.artist = name;
            }
        }

        details
    }

    /// 没有剧集列表时视为电影, 返回指向本页的单集
    pub fn parse_episodes(base: &str, page_url: &str, markup: &str) -> Vec<EpisodeEntry> {
        let document = Html::parse_document(markup);
        let items = select_all(document.root_element(), "section.episodes ul#episode_by_temp li");

        if items.is_empty() {
            return vec![EpisodeEntry::new(
                without_domain(base, page_url),
                "Película",
                1.0,
            )];
        }

        items
            .into_iter()
            .map(|item| {
                let url = select_attr(item, "a.lnk-blk", "href")
                    .map(|href| without_domain(base, &href))
                    .unwrap_or_default();
                let name = select_first(item, "header.entry-header h2.entry-title")
                    .map(text)
                    .unwrap_or_else(|| "Episodio Desconocido".to_string());
                let number = select_first(item, "span.num-epi")
                    .map(text)
                    .and_then(|n| substring_after(&n, "x").trim().parse().ok())
                    .unwrap_or(0.0);
                EpisodeEntry::new(url, name, number)
            })
            .collect()
    }

    async fn fetch_listing(&self, url: &str) -> Result<AnimesPage> {
        let response = fetch_page(&self.ctx, url).await?;
        Ok(Self::parse_listing(&self.ctx.base_url, &response.body))
    }
}

#[async_trait]
impl AnimeSource for MhdFlix {
    type Filters = MhdFlixFilters;

    fn name(&self) -> &'static str {
        "MhdFlix"
    }

    fn base_url(&self) -> &str {
        &self.ctx.base_url
    }

    fn supports_latest(&self) -> bool {
        false
    }

    fn episode_order(&self) -> EpisodeOrder {
        EpisodeOrder::Descending
    }

    async fn list_popular(&self, page: u32) -> Result<AnimesPage> {
        self.fetch_listing(&self.popular_url(page)).await
    }

    /// 站点没有最新列表, 返回热门列表
    async fn list_latest(&self, page: u32) -> Result<AnimesPage> {
        self.list_popular(page).await
    }

    async fn search(&self, page: u32, query: &str, filters: &MhdFlixFilters) -> Result<AnimesPage> {
        self.fetch_listing(&self.search_url(page, query, filters))
            .await
    }

    async fn get_details(&self, entry_url: &str) -> Result<MediaDetails> {
        let response = fetch_page(&self.ctx, &self.ctx.absolute(entry_url)).await?;
        Ok(Self::parse_details(&self.ctx.base_url, &response.body))
    }

    async fn list_episodes(&self, entry_url: &str) -> Result<Vec<EpisodeEntry>> {
        let url = self.ctx.absolute(entry_url);
        let response = fetch_page(&self.ctx, &url).await?;
        let mut episodes = Self::parse_episodes(&self.ctx.base_url, &response.url, &response.body);
        self.episode_order().apply(&mut episodes);
        Ok(episodes)
    }

    async fn list_streams(&self, episode_url: &str) -> Result<Vec<StreamCandidate>> {
        let response = fetch_page(&self.ctx, &self.ctx.absolute(episode_url)).await?;
        let embeds = self.discovery.discover(&self.ctx, &response.body).await;
        log::debug!("{} embeds on {episode_url}", embeds.len());

        let candidates = resolve_all(&self.ctx, &self.registry, embeds, self.concurrency).await;
        Ok(rank(candidates, &self.prefs, RankFacets { language: true }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use resolver::http::StubClient;

    const LISTING: &str = r#"
        <html><body>
        <ul id="movies-a">
            <li id="post-101">
                <article>
                    <header class="entry-header"><h2 class="entry-title">El Padrino</h2></header>
                    <div class="post-thumbnail"><figure><img src="/wp-content/small.jpg" srcset="https://img.example/w185/a.jpg 185w, https://img.example/w342/a.jpg 342w"></figure></div>
                    <a href="https://ww2.mhdflix.com/movies/el-padrino/"></a>
                </article>
            </li>
            <li id="post-102">
                <article>
                    <header class="entry-header"><h2 class="entry-title">Dark</h2></header>
                    <div class="post-thumbnail"><figure><img src="/wp-content/dark.jpg"></figure></div>
                    <a href="https://ww2.mhdflix.com/series/dark/"></a>
                </article>
            </li>
            <li class="ad"><article>anuncio</article></li>
        </ul>
        <nav class="pagination"><div class="nav-links">
            <a class="page-link">1</a><span class="current">2</span><a class="page-link">3</a><a href="/movies/page/3">Siguiente</a>
        </div></nav>
        </body></html>"#;

    const DETAILS: &str = r#"
        <div class="alg-cr">
            <header class="entry-header"><h1 class="entry-title">Dark</h1></header>
            <div class="description"><p>Un niño desaparece.</p></div>
            <div class="post-thumbnail"><img src="/wp-content/dark.jpg"></div>
        </div>
        <p class="genres"><a>Drama</a><a>Misterio</a></p>
        <ul class="cast-lst">
            <li><span>Director</span><p><a>Baran bo Odar</a></p></li>
            <li><span>Actores</span><p><a>Louis Hofmann</a><a>Lisa Vicari</a></p></li>
        </ul>"#;

    const EPISODES: &str = r#"
        <section class="episodes"><ul id="episode_by_temp">
            <li><article><header class="entry-header"><h2 class="entry-title">Secretos</h2></header><span class="num-epi">1x1</span><a class="lnk-blk" href="https://ww2.mhdflix.com/episode/dark-1x1/"></a></article></li>
            <li><article><span class="num-epi">1x3</span><a class="lnk-blk" href="https://ww2.mhdflix.com/episode/dark-1x3/"></a></article></li>
            <li><article><header class="entry-header"><h2 class="entry-title">Mentiras</h2></header><span class="num-epi">1x2</span><a class="lnk-blk" href="https://ww2.mhdflix.com/episode/dark-1x2/"></a></article></li>
        </ul></section>"#;

    fn source(client: StubClient) -> MhdFlix {
        MhdFlix::new(Arc::new(client), Preferences::from_defaults(&PREFERENCES))
    }

    #[test]
    fn test_parse_listing() {
        let page = MhdFlix::parse_listing(BASE_URL, LISTING);
        assert!(page.has_next_page);
        assert_eq!(page.entries.len(), 2);
        assert_eq!(page.entries[0].url, "/movies/el-padrino/");
        assert_eq!(page.entries[0].title, "El Padrino");
        assert_eq!(
            page.entries[0].thumbnail_url.as_deref(),
            Some("https://img.example/w342/a.jpg")
        );
        assert_eq!(
            page.entries[1].thumbnail_url.as_deref(),
            Some("https://ww2.mhdflix.com/wp-content/dark.jpg")
        );

        let last = MhdFlix::parse_listing(
            BASE_URL,
            r#"<nav class="pagination"><div class="nav-links"><a class="page-link">1</a><span class="current">2</span></div></nav>"#,
        );
        assert!(!last.has_next_page);
    }

    #[test]
    fn test_parse_details() {
        let details = MhdFlix::parse_details(BASE_URL, DETAILS);
        assert_eq!(details.title, "Dark");
        assert_eq!(details.description.as_deref(), Some("Un niño desaparece."));
        assert_eq!(details.genres, vec!["Drama", "Misterio"]);
        assert_eq!(details.author.as_deref(), Some("Baran bo Odar"));
        assert_eq!(details.artist.as_deref(), Some("Louis Hofmann"));
        assert_eq!(details.status, Status::Unknown);
    }

    #[test]
    fn test_parse_episodes() {
        let episodes = MhdFlix::parse_episodes(BASE_URL, "https://ww2.mhdflix.com/series/dark/", EPISODES);
        assert_eq!(episodes.len(), 3);
        assert_eq!(episodes[0].name, "Secretos");
        assert_eq!(episodes[1].name, "Episodio Desconocido");
        assert_eq!(episodes[1].episode_number, 3.0);
        assert_eq!(episodes[2].url, "/episode/dark-1x2/");
    }

    #[tokio::test]
    async fn test_movie_fallback_episode() {
        let client = StubClient::new().route(
            "https://ww2.mhdflix.com/movies/el-padrino/",
            200,
            "<html><body><div class=\"video-player\"></div></body></html>",
        );
        let episodes = source(client)
            .list_episodes("/movies/el-padrino/")
            .await
            .unwrap();
        assert_eq!(
            episodes,
            vec![EpisodeEntry::new("/movies/el-padrino/", "Película", 1.0)]
        );
    }

    #[tokio::test]
    async fn test_list_episodes_descending() {
        let client = StubClient::new().route("https://ww2.mhdflix.com/series/dark/", 200, EPISODES);
        let episodes = source(client).list_episodes("/series/dark/").await.unwrap();
        let numbers: Vec<f32> = episodes.iter().map(|e| e.episode_number).collect();
        assert_eq!(numbers, vec![3.0, 2.0, 1.0]);
    }

    #[test]
    fn test_search_urls() {
        let source = source(StubClient::new());
        assert!(!source.supports_latest());
        assert_eq!(
            source.search_url(1, "el padrino", &MhdFlixFilters::default()),
            "https://ww2.mhdflix.com/?s=el%20padrino&page=1"
        );
        assert_eq!(
            source.search_url(2, "", &MhdFlixFilters::genre("accion")),
            "https://ww2.mhdflix.com/category/accion/page/2"
        );
        assert_eq!(
            source.search_url(4, "", &MhdFlixFilters::default()),
            "https://ww2.mhdflix.com/movies/page/4"
        );
    }

    #[test]
    fn test_registry_has_no_fallback() {
        let registry = MhdFlix::registry();
        assert!(registry.find("https://unknown.example/e/1").is_none());
        assert_eq!(registry.find("https://dood.li/e/1").map(|e| e.name), Some("DoodStream"));
        // 站点只认完整的 filelions
        assert!(registry.find("https://lion.example/e/1").is_none());
        assert_eq!(registry.names().len(), 8);
    }

    const EPISODE_PAGE: &str = r#"
        <html><head><title>Dark 1x2 - MhdFlix</title></head><body>
        <div class="video-player"><iframe data-src="https://ww2.mhdflix.com/e/55" src=""></iframe></div>
        </body></html>"#;

    #[tokio::test]
    async fn test_list_streams_prefers_language() {
        let client = StubClient::new()
            .route("https://ww2.mhdflix.com/episode/dark-1x2/", 200, EPISODE_PAGE)
            .route(
                "https://ww2.mhdflix.com/wp-json/enlace/v1/e?id=55&season=1&episode=2",
                200,
                r#"[
                    {"url": "https://voe.sx/e/b", "tipo": "Sub lat"},
                    {"url": "https://streamwish.to/e/a", "tipo": "Latino"},
                    {"url": "https://unknown.example/e/c", "tipo": "Latino"}
                ]"#,
            )
            .route(
                "https://voe.sx/e/b",
                200,
                r#"<script>sources: [{file:"https://delivery.example/b.m3u8",label:"1080p"}]</script>"#,
            )
            .route(
                "https://streamwish.to/e/a",
                200,
                r#"<script>sources: [{file:"https://delivery.example/a.m3u8",label:"720p"}]</script>"#,
            );

        let streams = source(client)
            .list_streams("/episode/dark-1x2/")
            .await
            .unwrap();
        let labels: Vec<&str> = streams.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["[LAT] - StreamWish:720p", "[SUB] - Voe:1080p"]);
    }
}
