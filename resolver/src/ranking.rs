//! 候选流排序

/*
 * Copyright (c) 2025 fltLi
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use once_cell::sync::Lazy;
use regex::Regex;
use std::cmp::Reverse;

use crate::models::*;

// 标签中的分辨率, 如 720p
static HEIGHT_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)p").unwrap());

/// 从标签中取分辨率高度, 没有或无法解析时为 0
pub fn extract_height(label: &str) -> u32 {
    HEIGHT_REGEX
        .captures(label)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0)
}

/// 站点参与排序的维度
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RankFacets {
    /// 是否按语言偏好排序
    pub language: bool,
}

/// 按偏好排序: 语言, 服务器 (忽略大小写的子串匹配), 分辨率是否命中, 最后按高度; 均为降序, 相同键保持输入顺序
pub fn rank(
    mut candidates: Vec<StreamCandidate>,
    prefs: &Preferences,
    facets: RankFacets,
) -> Vec<StreamCandidate> {
    let preferred_height = prefs.quality.height();
    let preferred_language = prefs.language.as_ref().filter(|_| facets.language);
    let preferred_server = prefs.server.to_lowercase();

    candidates.sort_by_cached_key(|c| {
        let language = preferred_language.is_some_and(|l| c.language.as_ref() == Some(l));
        let server = c.server.to_lowercase().contains(&preferred_server);
        let quality = c.quality == Some(preferred_height);
        Reverse((language, server, quality, c.quality.unwrap_or(0)))
    });

    candidates
}
