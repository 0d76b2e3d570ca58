//! HTTP 抽象

/*
 * Copyright (c) 2025 fltLi
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::sync::Arc;

use crate::error::*;

/// 一次 GET 请求的结果
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
    /// 跟随重定向后的最终地址
    pub url: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// 宿主提供的 HTTP 客户端, 需自行处理重定向与超时
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn get(&self, url: &str, headers: &HeaderMap) -> Result<HttpResponse>;

    /// 只取状态码, 不读取响应体
    async fn status(&self, url: &str, headers: &HeaderMap) -> Result<u16>;
}

#[async_trait]
impl HttpClient for reqwest::Client {
    async fn get(&self, url: &str, headers: &HeaderMap) -> Result<HttpResponse> {
        let response = reqwest::Client::get(self, url)
            .headers(headers.clone())
            .send()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;

        let status = response.status().as_u16();
        let url = response.url().to_string();
        let body = response
            .text()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;

        Ok(HttpResponse { status, body, url })
    }

    async fn status(&self, url: &str, headers: &HeaderMap) -> Result<u16> {
        // 响应体未读取, 随 response 一同丢弃
        let response = reqwest::Client::get(self, url)
            .headers(headers.clone())
            .send()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;
        Ok(response.status().as_u16())
    }
}

/// 解析过程共享的只读上下文
#[derive(Clone)]
pub struct Context {
    pub client: Arc<dyn HttpClient>,
    pub headers: HeaderMap,
    /// 站点根地址, 不带末尾 `/`
    pub base_url: String,
}

impl Context {
    pub fn new(client: Arc<dyn HttpClient>, base_url: impl Into<String>) -> Self {
        Self {
            client,
            headers: HeaderMap::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// 追加共享请求头, 非法的名称或值会被忽略
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        if let Ok(name) = HeaderName::from_bytes(name.as_bytes())
            && let Ok(value) = HeaderValue::from_str(value)
        {
            self.headers.insert(name, value);
        }
        self
    }

    /// 相对路径拼接到站点根地址
    pub fn absolute(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    pub async fn get(&self, url: &str) -> Result<HttpResponse> {
        self.client.get(url, &self.headers).await
    }

    /// 在共享请求头之上追加额外请求头
    pub async fn get_with(&self, url: &str, extra: &HeaderMap) -> Result<HttpResponse> {
        let mut headers = self.headers.clone();
        for (k, v) in extra {
            headers.insert(k.clone(), v.clone());
        }
        self.client.get(url, &headers).await
    }

    /// 获取页面内容, 非 2xx 视为错误
    pub async fn fetch_text(&self, url: &str) -> Result<String> {
        let response = self.get(url).await?;
        if !response.is_success() {
            return Err(Error::Status {
                status: response.status,
                url: url.to_string(),
            });
        }
        Ok(response.body)
    }

    /// 存活探测: 仅 200 视为可用, 不下载响应体
    pub async fn probe(&self, url: &str) -> bool {
        match self.client.status(url, &self.headers).await {
            Ok(status) => status == 200,
            Err(e) => {
                log::debug!("probe failed for {url}: {e}");
                false
            }
        }
    }
}

#[cfg(any(test, feature = "test-util"))]
pub use stub::StubClient;

#[cfg(any(test, feature = "test-util"))]
mod stub {
    //! 内存中的桩客户端

    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// 按 URL 返回预置响应, 未登记的 URL 返回连接错误
    #[derive(Default)]
    pub struct StubClient {
        routes: HashMap<String, (u16, String)>,
        calls: Mutex<Vec<String>>,
        reads: Mutex<Vec<String>>,
    }

    impl StubClient {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn route(mut self, url: &str, status: u16, body: &str) -> Self {
            self.routes
                .insert(url.to_string(), (status, body.to_string()));
            self
        }

        /// 已请求过的 URL, 按请求顺序
        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        /// 读取过响应体的 URL, 按请求顺序
        pub fn reads(&self) -> Vec<String> {
            self.reads.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl HttpClient for StubClient {
        async fn get(&self, url: &str, _headers: &HeaderMap) -> Result<HttpResponse> {
            self.calls.lock().unwrap().push(url.to_string());
            match self.routes.get(url) {
                Some((status, body)) => {
                    self.reads.lock().unwrap().push(url.to_string());
                    Ok(HttpResponse {
                        status: *status,
                        body: body.clone(),
                        url: url.to_string(),
                    })
                }
                None => Err(Error::Http(format!("connection refused: {url}"))),
            }
        }

        async fn status(&self, url: &str, _headers: &HeaderMap) -> Result<u16> {
            self.calls.lock().unwrap().push(url.to_string());
            match self.routes.get(url) {
                Some((status, _)) => Ok(*status),
                None => Err(Error::Http(format!("connection refused: {url}"))),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fetch_text_rejects_non_success() {
        let client = StubClient::new()
            .route("https://a.example/ok", 200, "fine")
            .route("https://a.example/gone", 404, "nope");
        let ctx = Context::new(Arc::new(client), "https://a.example/");

        assert_eq!(ctx.fetch_text("https://a.example/ok").await.unwrap(), "fine");
        assert!(matches!(
            ctx.fetch_text("https://a.example/gone").await,
            Err(Error::Status { status: 404, .. })
        ));
        assert!(matches!(
            ctx.fetch_text("https://a.example/missing").await,
            Err(Error::Http(_))
        ));
    }

    #[tokio::test]
    async fn test_probe() {
        let client = StubClient::new()
            .route("https://cdn.example/a.mp4", 200, "")
            .route("https://cdn.example/b.mp4", 403, "");
        let ctx = Context::new(Arc::new(client), "https://a.example");

        assert!(ctx.probe("https://cdn.example/a.mp4").await);
        assert!(!ctx.probe("https://cdn.example/b.mp4").await);
        assert!(!ctx.probe("https://cdn.example/c.mp4").await);
    }

    #[tokio::test]
    async fn test_probe_skips_body() {
        let client = Arc::new(StubClient::new().route(
            "https://cdn.example/movie.mp4",
            200,
            &"x".repeat(1 << 20),
        ));
        let ctx = Context::new(client.clone(), "https://a.example");

        assert!(ctx.probe("https://cdn.example/movie.mp4").await);
        assert_eq!(client.calls(), vec!["https://cdn.example/movie.mp4"]);
        assert!(client.reads().is_empty());
    }

    #[test]
    fn test_absolute() {
        let ctx = Context::new(Arc::new(StubClient::new()), "https://a.example/");
        assert_eq!(ctx.absolute("/x?y=1"), "https://a.example/x?y=1");
        assert_eq!(ctx.absolute("x"), "https://a.example/x");
        assert_eq!(ctx.absolute("https://b.example/z"), "https://b.example/z");
    }
}
