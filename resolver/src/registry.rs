//! 视频源注册表

/*
 * Copyright (c) 2025 fltLi
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;
use std::sync::Arc;

use crate::error::*;
use crate::http::Context;
use crate::models::*;
use crate::traits::{Extractor, Provider};
use crate::utils::match_key;

/// 嵌入链接匹配模式
///
/// 命中条件: 至少包含 `any` 中一个子串, 且不包含 `exclude` 中任何子串. 比较不区分大小写.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pattern {
    any: &'static [&'static str],
    exclude: &'static [&'static str],
}

impl Pattern {
    pub const fn new(any: &'static [&'static str], exclude: &'static [&'static str]) -> Self {
        Self { any, exclude }
    }

    /// `key` 需已经过 [`match_key`] 处理
    pub fn is_excluded(&self, key: &str) -> bool {
        self.exclude
            .iter()
            .any(|p| key.contains(p.to_lowercase().as_str()))
    }

    pub fn matches(&self, key: &str) -> bool {
        !self.is_excluded(key)
            && self
                .any
                .iter()
                .any(|p| key.contains(p.to_lowercase().as_str()))
    }
}

/// 注册项
#[derive(Clone)]
pub struct ProviderEntry {
    pub name: &'static str,
    pub pattern: Pattern,
    pub extractor: Arc<dyn Extractor>,
}

impl fmt::Debug for ProviderEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderEntry")
            .field("name", &self.name)
            .field("pattern", &self.pattern)
            .finish()
    }
}

/// 有序注册表: 按声明顺序首个命中者生效, 兜底项总在最后尝试
#[derive(Debug, Clone, Default)]
pub struct Registry {
    providers: Vec<ProviderEntry>,
    fallback: Option<ProviderEntry>,
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// 根据嵌入链接查找视频源
    pub fn find(&self, url: &str) -> Option<&ProviderEntry> {
        let key = match_key(url);
        self.providers
            .iter()
            .find(|entry| entry.pattern.matches(&key))
            .or_else(|| {
                self.fallback
                    .as_ref()
                    .filter(|entry| !entry.pattern.is_excluded(&key))
            })
    }

    /// 解析单个嵌入链接, 未命中任何视频源时返回空列表
    pub async fn resolve(&self, ctx: &Context, url: &str) -> Result<Vec<StreamCandidate>> {
        let Some(entry) = self.find(url) else {
            log::debug!("no provider matches {url}");
            return Ok(Vec::new());
        };

        log::debug!("dispatching {url} to {}", entry.name);
        entry.extractor.videos(ctx, url).await
    }

    /// 已注册的名称, 兜底项在最后
    pub fn names(&self) -> Vec<&'static str> {
        self.providers
            .iter()
            .chain(self.fallback.iter())
            .map(|entry| entry.name)
            .collect()
    }
}

/// 注册表构建器
#[derive(Default)]
pub struct RegistryBuilder {
    providers: Vec<ProviderEntry>,
    fallback: Option<ProviderEntry>,
}

impl RegistryBuilder {
    /// 以声明的模式注册
    pub fn provider<T: Provider>(self) -> Self {
        self.provider_with::<T>(T::pattern())
    }

    /// 以站点自定义的模式注册
    pub fn provider_with<T: Provider>(self, pattern: Pattern) -> Self {
        self.custom(T::NAME, pattern, T::create())
    }

    /// 注册宿主提供的提取器, 同名项原位替换
    pub fn custom(mut self, name: &'static str, pattern: Pattern, extractor: Arc<dyn Extractor>) -> Self {
        let entry = ProviderEntry {
            name,
            pattern,
            extractor,
        };
        match self.providers.iter_mut().find(|e| e.name == name) {
            Some(existing) => *existing = entry,
            None => self.providers.push(entry),
        }
        self
    }

    /// 设置兜底视频源, 只在没有其他视频源命中时使用
    pub fn fallback<T: Provider>(mut self) -> Self {
        self.fallback = Some(ProviderEntry {
            name: T::NAME,
            pattern: T::pattern(),
            extractor: T::create(),
        });
        self
    }

    pub fn build(self) -> Registry {
        Registry {
            providers: self.providers,
            fallback: self.fallback,
        }
    }
}
