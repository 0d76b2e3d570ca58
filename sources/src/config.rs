//! 客户端配置

/*
 * Copyright (c) 2025 fltLi
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use serde::{Deserialize, Serialize};
use std::time::Duration;

use resolver::DEFAULT_CONCURRENCY;

use crate::error::*;

pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// 宿主传入的站点配置, 缺省字段取默认值
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SourceConfig {
    /// 覆盖站点根地址, 用于镜像
    pub base_url: Option<String>,
    pub user_agent: String,
    pub timeout_secs: u64,
    pub max_redirects: usize,
    /// 单次调用的最大并发请求数
    pub max_concurrency: usize,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: 30,
            max_redirects: 10,
            max_concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

impl SourceConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Client(format!("invalid config: {e}")))
    }

    pub fn base_url_or(&self, default: &str) -> String {
        self.base_url
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(default)
            .trim_end_matches('/')
            .to_string()
    }

    pub fn build_client(&self) -> Result<reqwest::Client> {
        reqwest::Client::builder()
            .user_agent(self.user_agent.as_str())
            .timeout(Duration::from_secs(self.timeout_secs))
            .redirect(reqwest::redirect::Policy::limited(self.max_redirects))
            .build()
            .map_err(|e| Error::Client(e.to_string()))
    }
}
