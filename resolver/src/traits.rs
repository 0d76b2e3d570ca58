//! 提取器特型

/*
 * Copyright (c) 2025 fltLi
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::*;
use crate::http::Context;
use crate::models::*;
use crate::registry::Pattern;

/// 视频源提取器: 给定嵌入链接, 返回零或多个候选流
#[async_trait]
pub trait Extractor: Send + Sync {
    async fn videos(&self, ctx: &Context, url: &str) -> Result<Vec<StreamCandidate>>;
}

/// 注册用视频源, 由 `#[derive(Provider)]` 生成
pub trait Provider: Extractor + 'static {
    /// 视频源名称
    const NAME: &'static str;

    /// 声明的匹配模式
    fn pattern() -> Pattern;

    /// 共享的提取器实例
    fn create() -> Arc<dyn Extractor>;
}
