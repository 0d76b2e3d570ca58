//! 视频链接解析管线

/*
 * Copyright (c) 2025 fltLi
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

pub mod discovery;
pub mod http;
pub mod models;
pub mod providers;
pub mod ranking;
pub mod registry;
mod resolve;
mod traits;
pub mod utils;

pub use discovery::{EmbedDiscovery, IframeFeed, ScriptTabs};
pub use http::{Context, HttpClient, HttpResponse};
pub use ranking::{RankFacets, extract_height, rank};
pub use registry::{Pattern, ProviderEntry, Registry, RegistryBuilder};
pub use resolve::{DEFAULT_CONCURRENCY, resolve_all};
pub use traits::{Extractor, Provider};

pub mod error {
    //! 错误类型

    pub type Result<T> = std::result::Result<T, Error>;

    /// 通用错误
    #[derive(Debug, thiserror::Error)]
    pub enum Error {
        #[error("http error: {0}")]
        Http(String),
        #[error("unexpected status {status} for {url}")]
        Status { status: u16, url: String },
        #[error("extract error: {0}")]
        Extract(ExtractError),
    }

    impl Error {
        /// 构造某视频源的提取错误
        pub fn extract(provider: &'static str, kind: ExtractErrorKind) -> Self {
            Error::Extract(ExtractError::new(kind).with_provider(provider))
        }
    }

    impl From<ExtractError> for Error {
        fn from(e: ExtractError) -> Self {
            Error::Extract(e)
        }
    }

    /// 提取错误
    #[derive(Debug, thiserror::Error)]
    #[error("{} failed: {kind}", .provider.unwrap_or("extractor"))]
    pub struct ExtractError {
        #[source]
        pub kind: ExtractErrorKind,
        pub provider: Option<&'static str>,
    }

    impl ExtractError {
        pub fn new(kind: ExtractErrorKind) -> Self {
            Self {
                kind,
                provider: None,
            }
        }

        pub fn with_provider(mut self, provider: &'static str) -> Self {
            self.provider = Some(provider);
            self
        }
    }

    /// 提取错误类型
    #[derive(Debug, thiserror::Error)]
    pub enum ExtractErrorKind {
        #[error("missing field: {0}")]
        MissingField(String),
        #[error("invalid url: {0}")]
        InvalidUrl(String),
        #[error("json error: {0}")]
        Json(String),
        #[error("empty content")]
        EmptyContent,
        #[error("liveness probe failed: {0}")]
        ProbeFailed(String),
        #[error("extractor panicked: {0}")]
        Panicked(String),
    }
}
