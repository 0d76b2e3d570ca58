//! FireLoad 直链

/*
 * Copyright (c) 2025 fltLi
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use async_trait::async_trait;
use resolver_derive::Provider;

use crate::error::*;
use crate::http::Context;
use crate::models::*;
use crate::traits::{Extractor, Provider};
use crate::utils::*;

/// 嵌入链接的 `v=` 参数即为直链, 探测为 200 才返回
#[derive(Provider)]
#[provider(name = "FireLoad", patterns = ["/stream/fl.php"])]
pub struct FireLoad;

impl FireLoad {
    pub fn file_url(url: &str) -> Option<&str> {
        if !url.contains("v=") {
            return None;
        }
        Some(substring_after(url, "v=")).filter(|f| !f.is_empty())
    }
}

#[async_trait]
impl Extractor for FireLoad {
    async fn videos(&self, ctx: &Context, url: &str) -> Result<Vec<StreamCandidate>> {
        let file = Self::file_url(url).ok_or_else(|| {
            Error::extract(Self::NAME, ExtractErrorKind::MissingField("v".to_string()))
        })?;

        if !ctx.probe(file).await {
            return Err(Error::extract(
                Self::NAME,
                ExtractErrorKind::ProbeFailed(file.to_string()),
            ));
        }
        Ok(vec![StreamCandidate::new(file, Self::NAME, Self::NAME)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::StubClient;
    use std::sync::Arc;

    #[test]
    fn test_file_url() {
        assert_eq!(
            FireLoad::file_url("https://www.animefenix.tv/stream/fl.php?v=https://cdn.example/a.mp4"),
            Some("https://cdn.example/a.mp4")
        );
        assert_eq!(FireLoad::file_url("https://www.animefenix.tv/stream/fl.php"), None);
        assert_eq!(FireLoad::file_url("https://www.animefenix.tv/stream/fl.php?v="), None);
    }

    #[tokio::test]
    async fn test_probe() {
        let client = StubClient::new().route("https://cdn.example/a.mp4", 200, "");
        let ctx = Context::new(Arc::new(client), "https://www.animefenix.tv");

        let found = FireLoad
            .videos(&ctx, "https://www.animefenix.tv/stream/fl.php?v=https://cdn.example/a.mp4")
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].label, "FireLoad");

        assert!(
            FireLoad
                .videos(&ctx, "https://www.animefenix.tv/stream/fl.php?v=https://cdn.example/b.mp4")
                .await
                .is_err()
        );
    }
}
