//! 辅助工具

/*
 * Copyright (c) 2025 fltLi
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

/// 取第一个分隔符之后的部分, 找不到分隔符时返回原串
pub fn substring_after<'a>(s: &'a str, delimiter: &str) -> &'a str {
    match s.find(delimiter) {
        Some(idx) => &s[idx + delimiter.len()..],
        None => s,
    }
}

/// 取第一个分隔符之前的部分, 找不到分隔符时返回原串
pub fn substring_before<'a>(s: &'a str, delimiter: &str) -> &'a str {
    match s.find(delimiter) {
        Some(idx) => &s[..idx],
        None => s,
    }
}

/// 百分号解码, 非法 UTF-8 序列时保留原串
pub fn decode_url(s: &str) -> String {
    urlencoding::decode(s)
        .map(|d| d.into_owned())
        .unwrap_or_else(|_| s.to_string())
}

/// 规整嵌入链接: 去除 HTML 转义残留 `amp;` 并解码
pub fn normalize_embed_url(s: &str) -> String {
    decode_url(s.trim().replace("amp;", "").as_str())
}

/// 用于模式匹配的形式: 解码后转小写
pub fn match_key(url: &str) -> String {
    decode_url(url).to_lowercase()
}
