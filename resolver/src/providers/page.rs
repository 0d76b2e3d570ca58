//! 播放器页面媒体扫描

/*
 * Copyright (c) 2025 fltLi
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::header::HeaderMap;

use crate::error::*;
use crate::http::Context;
use crate::models::*;

// file: "..." / src: "..." 形式的媒体赋值, 可带 label
static SOURCE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?:file|src)\s*[:=]\s*["']([^"']+?\.(?:m3u8|mp4)[^"']*)["'](?:\s*,\s*label\s*:\s*["']([^"']*)["'])?"#,
    )
    .unwrap()
});

// 裸露的媒体链接
static BARE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"https?://[^\s"'<>\\]+?\.(?:m3u8|mp4)(?:\?[^\s"'<>\\]*)?"#).unwrap()
});

/// 页面中找到的媒体链接
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaLink {
    pub url: String,
    pub label: Option<String>,
}

/// 扫描页面中的媒体链接, 按出现顺序去重
///
/// 相对链接以 `page_url` 为基准补全, 无法补全的保留原样交给过滤.
pub fn scan_media(body: &str, page_url: &str) -> Vec<MediaLink> {
    let body = body.replace("\\/", "/");
    let base = url::Url::parse(page_url).ok();
    let mut links: Vec<MediaLink> = Vec::new();

    let mut push = |raw: &str, label: Option<String>| {
        let url = match &base {
            Some(base) if !raw.starts_with("http") => {
                base.join(raw).map(|u| u.to_string()).unwrap_or_else(|_| raw.to_string())
            }
            _ => raw.to_string(),
        };
        match links.iter_mut().find(|l| l.url == url) {
            Some(existing) if existing.label.is_none() => existing.label = label,
            Some(_) => {}
            None => links.push(MediaLink { url, label }),
        }
    };

    for caps in SOURCE_REGEX.captures_iter(&body) {
        let label = caps
            .get(2)
            .map(|m| m.as_str().trim().to_string())
            .filter(|l| !l.is_empty());
        push(&caps[1], label);
    }
    for m in BARE_REGEX.find_iter(&body) {
        push(m.as_str(), None);
    }

    links
}

/// 展示标签: 有 label 时为 `"<Server>:<label>"`, 否则为服务器名
pub fn media_label(server: &str, label: Option<&str>) -> String {
    match label {
        Some(label) => format!("{server}:{label}"),
        None => server.to_string(),
    }
}

/// 获取播放器页面并扫描媒体链接
///
/// `extra` 会附加到页面请求, 同时记入候选流的播放请求头.
pub async fn scan_page(
    ctx: &Context,
    url: &str,
    server: &'static str,
    extra: &HeaderMap,
) -> Result<Vec<StreamCandidate>> {
    let response = ctx.get_with(url, extra).await?;
    if !response.is_success() {
        return Err(Error::Status {
            status: response.status,
            url: url.to_string(),
        });
    }

    let links = scan_media(&response.body, &response.url);
    if links.is_empty() {
        return Err(Error::extract(server, ExtractErrorKind::EmptyContent));
    }
    log::debug!("{server}: {} media links in {url}", links.len());

    Ok(links
        .into_iter()
        .map(|link| {
            let label = media_label(server, link.label.as_deref());
            extra
                .iter()
                .filter_map(|(k, v)| Some((k.as_str().to_string(), v.to_str().ok()?.to_string())))
                .fold(StreamCandidate::new(link.url, label, server), |c, (k, v)| {
                    c.with_header(k, v)
                })
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::StubClient;
    use reqwest::header::HeaderValue;
    use std::sync::Arc;

    const PLAYER: &str = r#"
        <html><body><script>
        jwplayer("vplayer").setup({
            sources: [{file:"https://cdn.host.example/hls/abc/master.m3u8?t=1",label:"720p"}],
            image: "https://cdn.host.example/poster.jpg",
        });
        var backup = "https:\/\/cdn.host.example\/files\/abc.mp4";
        var again = 'https://cdn.host.example/hls/abc/master.m3u8?t=1';
        player.src({src: '/relative/low.mp4'});
        </script></body></html>"#;

    #[test]
    fn test_scan_media() {
        let links = scan_media(PLAYER, "https://host.example/e/abc");
        assert_eq!(
            links,
            vec![
                MediaLink {
                    url: "https://cdn.host.example/hls/abc/master.m3u8?t=1".to_string(),
                    label: Some("720p".to_string()),
                },
                MediaLink {
                    url: "https://host.example/relative/low.mp4".to_string(),
                    label: None,
                },
                MediaLink {
                    url: "https://cdn.host.example/files/abc.mp4".to_string(),
                    label: None,
                },
            ]
        );
        assert!(scan_media("<html>nothing here</html>", "https://host.example").is_empty());
    }

    #[test]
    fn test_media_label() {
        assert_eq!(media_label("Voe", Some("1080p")), "Voe:1080p");
        assert_eq!(media_label("Voe", None), "Voe");
    }

    #[tokio::test]
    async fn test_scan_page() {
        let client = StubClient::new()
            .route("https://host.example/e/abc", 200, PLAYER)
            .route("https://host.example/e/empty", 200, "<html></html>")
            .route("https://host.example/e/gone", 404, "");
        let ctx = Context::new(Arc::new(client), "https://site.example");

        let mut extra = HeaderMap::new();
        extra.insert("referer", HeaderValue::from_static("https://host.example/"));

        let found = scan_page(&ctx, "https://host.example/e/abc", "Host", &extra)
            .await
            .unwrap();
        assert_eq!(found.len(), 3);
        assert_eq!(found[0].label, "Host:720p");
        assert_eq!(found[0].quality, Some(720));
        assert_eq!(found[1].label, "Host");
        assert_eq!(
            found[0].headers.get("referer").map(String::as_str),
            Some("https://host.example/")
        );

        assert!(matches!(
            scan_page(&ctx, "https://host.example/e/empty", "Host", &HeaderMap::new()).await,
            Err(Error::Extract(_))
        ));
        assert!(matches!(
            scan_page(&ctx, "https://host.example/e/gone", "Host", &HeaderMap::new()).await,
            Err(Error::Status { status: 404, .. })
        ));
    }
}
