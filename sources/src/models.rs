//! 站点数据模型

/*
 * Copyright (c) 2025 fltLi
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use serde::{Deserialize, Serialize};

/// 列表中的条目
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ListingEntry {
    /// 相对站点根地址的路径
    pub url: String,
    pub title: String,
    pub thumbnail_url: Option<String>,
    pub description: Option<String>,
}

impl ListingEntry {
    pub fn absolute_url(&self, base: &str) -> String {
        format!("{}{}", base.trim_end_matches('/'), self.url)
    }
}

/// 一页列表结果
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AnimesPage {
    pub entries: Vec<ListingEntry>,
    pub has_next_page: bool,
}

/// 剧集
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EpisodeEntry {
    /// 相对站点根地址的路径
    pub url: String,
    pub name: String,
    pub episode_number: f32,
}

impl EpisodeEntry {
    /// 集数为负或非有限值时记为 0
    pub fn new(url: impl Into<String>, name: impl Into<String>, episode_number: f32) -> Self {
        let episode_number = if episode_number.is_finite() && episode_number > 0.0 {
            episode_number
        } else {
            0.0
        };
        Self {
            url: url.into(),
            name: name.into(),
            episode_number,
        }
    }
}

/// 剧集列表顺序
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EpisodeOrder {
    Ascending,
    Descending,
}

impl EpisodeOrder {
    /// 按集数稳定排序
    pub fn apply(self, episodes: &mut [EpisodeEntry]) {
        match self {
            EpisodeOrder::Ascending => {
                episodes.sort_by(|a, b| a.episode_number.total_cmp(&b.episode_number))
            }
            EpisodeOrder::Descending => {
                episodes.sort_by(|a, b| b.episode_number.total_cmp(&a.episode_number))
            }
        }
    }
}

/// 连载状态
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    Ongoing,
    Completed,
    #[default]
    Unknown,
}

impl Status {
    pub fn classify(text: &str) -> Self {
        if text.contains("Emisión") {
            Status::Ongoing
        } else if text.contains("Finalizado") {
            Status::Completed
        } else {
            Status::Unknown
        }
    }
}

/// 详情页信息
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MediaDetails {
    pub title: String,
    pub description: Option<String>,
    pub thumbnail_url: Option<String>,
    pub genres: Vec<String>,
    pub status: Status,
    pub author: Option<String>,
    pub artist: Option<String>,
}
