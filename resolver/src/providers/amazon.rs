//! Amazon 网盘包装页

/*
 * Copyright (c) 2025 fltLi
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use async_trait::async_trait;
use resolver_derive::Provider;
use scraper::{Html, Selector};

use crate::error::*;
use crate::http::Context;
use crate::models::*;
use crate::traits::{Extractor, Provider};
use crate::utils::*;

/// 站内包装页, 脚本中的 `sources` 数组给出直链
///
/// 直链需探测为 200 才会返回. 嵌入链接带 `&ext=es` 时标记为 `AmazonES`.
#[derive(Provider)]
#[provider(name = "Amazon", patterns = ["amazon", "amz"], exclude = ["disable"])]
pub struct Amazon;

impl Amazon {
    /// 包装页地址: `..` 之后的路径拼接到站点根地址
    pub fn wrapper_url(ctx: &Context, url: &str) -> String {
        ctx.absolute(substring_after(url, ".."))
    }

    /// 从包装页脚本中取第一个 `file`
    pub fn parse_file(markup: &str) -> Option<String> {
        let document = Html::parse_document(markup);
        let script_sel = Selector::parse("script").ok()?;
        let data = document
            .select(&script_sel)
            .map(|el| el.text().collect::<String>())
            .find(|data| data.contains("sources: ["))?;

        if !data.contains("[{\"file\":\"") {
            return None;
        }
        let file = substring_before(substring_after(&data, "[{\"file\":\""), "\",").replace('\\', "");
        (!file.is_empty()).then_some(file)
    }

    pub fn label(url: &str) -> &'static str {
        if url.contains("&ext=es") { "AmazonES" } else { "Amazon" }
    }
}

#[async_trait]
impl Extractor for Amazon {
    async fn videos(&self, ctx: &Context, url: &str) -> Result<Vec<StreamCandidate>> {
        let wrapper = Self::wrapper_url(ctx, url);
        let markup = ctx.fetch_text(&wrapper).await?;
        let file = Self::parse_file(&markup).ok_or_else(|| {
            Error::extract(Self::NAME, ExtractErrorKind::MissingField("sources".to_string()))
        })?;

        if !ctx.probe(&file).await {
            return Err(Error::extract(Self::NAME, ExtractErrorKind::ProbeFailed(file)));
        }

        let label = Self::label(url);
        Ok(vec![StreamCandidate::new(file, label, label)])
    }
}
