//! 候选播放流

/*
 * Copyright (c) 2025 fltLi
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::ranking::extract_height;

/// 音轨语言标记
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Language {
    /// 拉美西语配音
    Lat,
    /// 字幕
    Sub,
    /// 西班牙西语配音
    Cast,
    /// 原声加西语字幕
    Vose,
    Other(String),
}

impl Language {
    /// 将站点接口的 `tipo` 字段映射为语言
    pub fn from_tipo(tipo: &str) -> Self {
        match tipo {
            "Sub lat" => Language::Sub,
            "Castellano" => Language::Cast,
            "Latino" => Language::Lat,
            other => Language::Other(other.to_string()),
        }
    }

    pub fn tag(&self) -> &str {
        match self {
            Language::Lat => "LAT",
            Language::Sub => "SUB",
            Language::Cast => "CAST",
            Language::Vose => "VOSE",
            Language::Other(s) => s.as_str(),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.tag())
    }
}

impl FromStr for Language {
    type Err = String;

    /// 接受 `[LAT]` 或 `lat` 两种写法
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let txt = s.trim().trim_start_matches('[').trim_end_matches(']').trim();
        match txt.to_uppercase().as_str() {
            "" => Err("empty language".to_string()),
            "LAT" => Ok(Language::Lat),
            "SUB" => Ok(Language::Sub),
            "CAST" => Ok(Language::Cast),
            "VOSE" => Ok(Language::Vose),
            _ => Ok(Language::Other(txt.to_string())),
        }
    }
}

/// 可播放的候选流
///
/// `label` 仅用于展示, 排序依据结构化字段 `server` / `quality` / `language`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StreamCandidate {
    pub url: String,
    pub label: String,
    pub server: String,
    /// 分辨率高度, 如 1080
    pub quality: Option<u32>,
    pub language: Option<Language>,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

impl StreamCandidate {
    /// 从展示标签构造, 分辨率取标签中的 `<digits>p`
    pub fn new(url: impl Into<String>, label: impl Into<String>, server: impl Into<String>) -> Self {
        let label = label.into();
        let quality = match extract_height(&label) {
            0 => None,
            h => Some(h),
        };
        Self {
            url: url.into(),
            label,
            server: server.into(),
            quality,
            language: None,
            headers: BTreeMap::new(),
        }
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// 标注语言, 标签前缀 `[TAG] - `
    pub fn with_language(mut self, language: Language) -> Self {
        self.label = format!("{language} - {}", self.label);
        self.language = Some(language);
        self
    }

    /// 是否为带主机名的 http(s) 绝对链接
    pub fn has_playable_url(&self) -> bool {
        match url::Url::parse(&self.url) {
            Ok(u) => matches!(u.scheme(), "http" | "https") && u.host_str().is_some(),
            Err(_) => false,
        }
    }
}
