//! 兜底视频源

/*
 * Copyright (c) 2025 fltLi
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use resolver_derive::Provider;

use super::page::scan_page;
use crate::error::*;
use crate::http::Context;
use crate::models::*;
use crate::traits::{Extractor, Provider};

/// 对任意播放器页面做通用媒体扫描, 只应注册为兜底项
#[derive(Provider)]
#[provider(name = "Universal")]
pub struct Universal;

#[async_trait]
impl Extractor for Universal {
    async fn videos(&self, ctx: &Context, url: &str) -> Result<Vec<StreamCandidate>> {
        scan_page(ctx, url, Self::NAME, &HeaderMap::new()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::StubClient;
    use crate::providers::Voe;
    use crate::registry::Registry;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_fallback_scan() {
        let client = StubClient::new().route(
            "https://unknown.example/embed/1",
            200,
            r#"<video><source src="https://media.unknown.example/1.mp4"></video>"#,
        );
        let ctx = Context::new(Arc::new(client), "https://site.example");
        let registry = Registry::builder()
            .provider::<Voe>()
            .fallback::<Universal>()
            .build();

        let found = registry
            .resolve(&ctx, "https://unknown.example/embed/1")
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].server, "Universal");
        assert_eq!(found[0].url, "https://media.unknown.example/1.mp4");
    }

    #[test]
    fn test_never_matches_directly() {
        assert!(!Universal::pattern().matches("https://anything.example"));
    }
}
