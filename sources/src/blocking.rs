//! 同步调用封装

/*
 * Copyright (c) 2025 fltLi
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use tokio::runtime::{Builder, Runtime};

use resolver::models::StreamCandidate;

use crate::AnimeSource;
use crate::error::*;
use crate::models::*;

/// 为同步宿主提供阻塞接口, 每次调用在内部单线程运行时上完成
///
/// 单次调用内的并发请求仍由解析管线负责. 不可在异步上下文中调用.
pub struct BlockingSource<S> {
    inner: S,
    runtime: Runtime,
}

impl<S: AnimeSource> BlockingSource<S> {
    pub fn new(inner: S) -> Result<Self> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| Error::Runtime(e.to_string()))?;
        Ok(Self { inner, runtime })
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn list_popular(&self, page: u32) -> Result<AnimesPage> {
        self.runtime.block_on(self.inner.list_popular(page))
    }

    pub fn list_latest(&self, page: u32) -> Result<AnimesPage> {
        self.runtime.block_on(self.inner.list_latest(page))
    }

    pub fn search(&self, page: u32, query: &str, filters: &S::Filters) -> Result<AnimesPage> {
        self.runtime
            .block_on(self.inner.search(page, query, filters))
    }

    pub fn get_details(&self, entry_url: &str) -> Result<MediaDetails> {
        self.runtime.block_on(self.inner.get_details(entry_url))
    }

    pub fn list_episodes(&self, entry_url: &str) -> Result<Vec<EpisodeEntry>> {
        self.runtime.block_on(self.inner.list_episodes(entry_url))
    }

    pub fn list_streams(&self, episode_url: &str) -> Result<Vec<StreamCandidate>> {
        self.runtime.block_on(self.inner.list_streams(episode_url))
    }
}
