//! 用户偏好

/*
 * Copyright (c) 2025 fltLi
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;

use super::Language;

pub const PREF_QUALITY_KEY: &str = "preferred_quality";
pub const PREF_SERVER_KEY: &str = "preferred_server";
pub const PREF_LANGUAGE_KEY: &str = "preferred_language";

/// 宿主提供的键值偏好存储
pub trait PreferenceStore {
    fn get_string(&self, key: &str) -> Option<String>;
}

impl PreferenceStore for HashMap<String, String> {
    fn get_string(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

impl PreferenceStore for BTreeMap<String, String> {
    fn get_string(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

/// 偏好分辨率
#[derive(Default, Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Quality {
    #[default]
    #[serde(rename = "1080")]
    P1080,
    #[serde(rename = "720")]
    P720,
    #[serde(rename = "480")]
    P480,
    #[serde(rename = "360")]
    P360,
}

impl Quality {
    pub const ALL: [Quality; 4] = [Quality::P1080, Quality::P720, Quality::P480, Quality::P360];

    pub fn height(self) -> u32 {
        match self {
            Quality::P1080 => 1080,
            Quality::P720 => 720,
            Quality::P480 => 480,
            Quality::P360 => 360,
        }
    }
}

impl FromStr for Quality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let txt = s.trim().trim_end_matches(['p', 'P']);
        Quality::ALL
            .into_iter()
            .find(|q| q.height().to_string() == txt)
            .ok_or_else(|| format!("unknown quality: {s}"))
    }
}

/// 某个站点的偏好默认值与可选服务器
#[derive(Debug, Clone)]
pub struct PreferenceDefaults {
    pub quality: Quality,
    pub server: &'static str,
    pub servers: &'static [&'static str],
    /// 为 `None` 时该站点不区分语言
    pub language: Option<Language>,
}

/// 排序时使用的偏好, 在宿主边界一次性加载后显式传入
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Preferences {
    pub quality: Quality,
    pub server: String,
    pub language: Option<Language>,
}

impl Preferences {
    pub fn from_defaults(defaults: &PreferenceDefaults) -> Self {
        Self {
            quality: defaults.quality,
            server: defaults.server.to_string(),
            language: defaults.language.clone(),
        }
    }

    /// 从存储读取, 缺失或无法识别的值回退到默认值
    pub fn load(store: &impl PreferenceStore, defaults: &PreferenceDefaults) -> Self {
        let mut prefs = Self::from_defaults(defaults);

        if let Some(q) = store.get_string(PREF_QUALITY_KEY)
            && let Ok(q) = q.parse()
        {
            prefs.quality = q;
        }

        if let Some(server) = store.get_string(PREF_SERVER_KEY)
            && let Some(known) = defaults
                .servers
                .iter()
                .find(|s| s.eq_ignore_ascii_case(server.trim()))
        {
            prefs.server = known.to_string();
        }

        // 站点没有语言维度时忽略存储中的值
        if defaults.language.is_some()
            && let Some(lang) = store.get_string(PREF_LANGUAGE_KEY)
            && let Ok(lang) = lang.parse()
        {
            prefs.language = Some(lang);
        }

        prefs
    }
}
