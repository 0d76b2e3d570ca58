//! 站点插件: 列表, 详情, 剧集与播放流

/*
 * Copyright (c) 2025 fltLi
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

pub mod animefenix;
pub mod blocking;
pub mod config;
pub mod mhdflix;
pub mod models;
mod parse;

use async_trait::async_trait;

pub use animefenix::{Animefenix, AnimefenixFilters};
pub use blocking::BlockingSource;
pub use config::SourceConfig;
pub use mhdflix::{MhdFlix, MhdFlixFilters};
pub use models::*;
pub use resolver::models::{Language, Preferences, Quality, StreamCandidate};

use error::*;

pub mod error {
    //! 错误类型

    pub type Result<T> = std::result::Result<T, Error>;

    /// 只有主页面无法获取时才会向宿主报错, 其余失败都降级为部分结果
    #[derive(Debug, thiserror::Error)]
    pub enum Error {
        #[error("failed to fetch {url}: {source}")]
        Fetch {
            url: String,
            #[source]
            source: resolver::error::Error,
        },
        #[error("client setup failed: {0}")]
        Client(String),
        #[error("runtime error: {0}")]
        Runtime(String),
    }
}

/// 宿主调用的站点接口
#[async_trait]
pub trait AnimeSource: Send + Sync {
    /// 站点专属的搜索过滤器
    type Filters: Send + Sync;

    fn name(&self) -> &'static str;

    fn base_url(&self) -> &str;

    fn supports_latest(&self) -> bool {
        true
    }

    /// `list_episodes` 的返回顺序
    fn episode_order(&self) -> EpisodeOrder;

    async fn list_popular(&self, page: u32) -> Result<AnimesPage>;

    async fn list_latest(&self, page: u32) -> Result<AnimesPage>;

    /// 查询为空时按过滤器搜索, 两者都为空时等同热门列表
    async fn search(&self, page: u32, query: &str, filters: &Self::Filters) -> Result<AnimesPage>;

    async fn get_details(&self, entry_url: &str) -> Result<MediaDetails>;

    async fn list_episodes(&self, entry_url: &str) -> Result<Vec<EpisodeEntry>>;

    /// 发现, 解析并排序播放流
    async fn list_streams(&self, episode_url: &str) -> Result<Vec<StreamCandidate>>;
}
