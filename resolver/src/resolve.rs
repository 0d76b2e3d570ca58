//! 并发解析

/*
 * Copyright (c) 2025 fltLi
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use futures::FutureExt;
use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use std::panic::AssertUnwindSafe;

use crate::error::*;
use crate::http::Context;
use crate::models::*;
use crate::registry::Registry;

/// 默认并发上限
pub const DEFAULT_CONCURRENCY: usize = 10;

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}

async fn resolve_one(ctx: &Context, registry: &Registry, embed: EmbedReference) -> Vec<StreamCandidate> {
    let outcome = AssertUnwindSafe(registry.resolve(ctx, &embed.raw_url))
        .catch_unwind()
        .await
        .unwrap_or_else(|payload| {
            Err(Error::Extract(ExtractError::new(ExtractErrorKind::Panicked(
                panic_message(payload.as_ref()),
            ))))
        });

    match outcome {
        Ok(candidates) => match embed.language {
            Some(language) => candidates
                .into_iter()
                .map(|c| c.with_language(language.clone()))
                .collect(),
            None => candidates,
        },
        Err(e) => {
            log::warn!("embed {} dropped: {e}", embed.raw_url);
            Vec::new()
        }
    }
}

/// 并发解析全部嵌入链接, 单个失败只会使其贡献为空
///
/// 结果顺序不作保证, 交给排序决定. 不可播放的链接会被过滤,
/// 地址, 服务器与语言均相同的候选只保留最先完成的一个.
pub async fn resolve_all(
    ctx: &Context,
    registry: &Registry,
    embeds: Vec<EmbedReference>,
    limit: usize,
) -> Vec<StreamCandidate> {
    let total = embeds.len();

    let candidates: Vec<StreamCandidate> = stream::iter(embeds)
        .map(|embed| resolve_one(ctx, registry, embed))
        .buffer_unordered(limit.max(1))
        .flat_map(stream::iter)
        .collect()
        .await;

    let found = candidates.len();
    let mut seen = HashSet::new();
    let playable: Vec<StreamCandidate> = candidates
        .into_iter()
        .filter(|c| {
            if !c.has_playable_url() {
                log::debug!("discarding unplayable url {:?} from {}", c.url, c.server);
                return false;
            }
            seen.insert((c.url.clone(), c.server.clone(), c.language.clone()))
        })
        .collect();

    log::info!(
        "resolved {total} embeds into {} candidates ({} discarded or merged)",
        playable.len(),
        found - playable.len()
    );
    playable
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::StubClient;
    use crate::traits::Extractor;
    use async_trait::async_trait;
    use resolver_derive::Provider;
    use std::sync::Arc;

    #[derive(Provider)]
    #[provider(name = "Good", patterns = ["good"])]
    struct Good;

    #[async_trait]
    impl Extractor for Good {
        async fn videos(&self, _ctx: &Context, url: &str) -> Result<Vec<StreamCandidate>> {
            Ok(vec![StreamCandidate::new(
                format!("https://cdn.example/{}", url.rsplit('/').next().unwrap_or_default()),
                "Good:720p",
                "Good",
            )])
        }
    }

    #[derive(Provider)]
    #[provider(name = "Broken", patterns = ["broken"])]
    struct Broken;

    #[async_trait]
    impl Extractor for Broken {
        async fn videos(&self, _ctx: &Context, _url: &str) -> Result<Vec<StreamCandidate>> {
            Err(Error::extract("Broken", ExtractErrorKind::EmptyContent))
        }
    }

    #[derive(Provider)]
    #[provider(name = "Panicky", patterns = ["panicky"])]
    struct Panicky;

    #[async_trait]
    impl Extractor for Panicky {
        async fn videos(&self, _ctx: &Context, _url: &str) -> Result<Vec<StreamCandidate>> {
            panic!("unexpected markup")
        }
    }

    #[derive(Provider)]
    #[provider(name = "Relative", patterns = ["relative"])]
    struct Relative;

    #[async_trait]
    impl Extractor for Relative {
        async fn videos(&self, _ctx: &Context, _url: &str) -> Result<Vec<StreamCandidate>> {
            Ok(vec![
                StreamCandidate::new("/local/video.mp4", "Relative", "Relative"),
                StreamCandidate::new("", "Relative", "Relative"),
            ])
        }
    }

    fn setup() -> (Context, Registry) {
        let ctx = Context::new(Arc::new(StubClient::new()), "https://site.example");
        let registry = Registry::builder()
            .provider::<Good>()
            .provider::<Broken>()
            .provider::<Panicky>()
            .provider::<Relative>()
            .build();
        (ctx, registry)
    }

    #[tokio::test]
    async fn test_failures_are_isolated() {
        let (ctx, registry) = setup();
        let embeds = vec![
            EmbedReference::new("https://good.example/e/1"),
            EmbedReference::new("https://broken.example/e/2"),
            EmbedReference::new("https://good.example/e/3"),
            EmbedReference::new("https://panicky.example/e/4"),
            EmbedReference::new("https://unknown.example/e/5"),
        ];

        let mut urls: Vec<String> = resolve_all(&ctx, &registry, embeds, 2)
            .await
            .into_iter()
            .map(|c| c.url)
            .collect();
        urls.sort();
        assert_eq!(urls, vec!["https://cdn.example/1", "https://cdn.example/3"]);
    }

    #[tokio::test]
    async fn test_unplayable_urls_are_dropped() {
        let (ctx, registry) = setup();
        let embeds = vec![
            EmbedReference::new("https://relative.example/e/1"),
            EmbedReference::new("https://good.example/e/2"),
        ];

        let found = resolve_all(&ctx, &registry, embeds, 0).await;
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].server, "Good");
    }

    #[tokio::test]
    async fn test_language_is_attached() {
        let (ctx, registry) = setup();
        let embeds = vec![EmbedReference::new("https://good.example/e/7").with_language(Language::Cast)];

        let found = resolve_all(&ctx, &registry, embeds, DEFAULT_CONCURRENCY).await;
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].language, Some(Language::Cast));
        assert_eq!(found[0].label, "[CAST] - Good:720p");
        assert_eq!(found[0].quality, Some(720));
    }

    #[tokio::test]
    async fn test_duplicates_are_merged() {
        let (ctx, registry) = setup();
        let embeds = vec![
            EmbedReference::new("https://good.example/e/1"),
            EmbedReference::new("https://good.example/e/1"),
            EmbedReference::new("https://good.example/e/1").with_language(Language::Lat),
        ];

        let found = resolve_all(&ctx, &registry, embeds, 3).await;
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|c| c.url == "https://cdn.example/1"));
        assert!(found.iter().any(|c| c.language == Some(Language::Lat)));
        assert!(found.iter().any(|c| c.language.is_none()));
    }

    #[tokio::test]
    async fn test_empty_input() {
        let (ctx, registry) = setup();
        assert!(resolve_all(&ctx, &registry, Vec::new(), 4).await.is_empty());
    }
}
