//! 选择器辅助

/*
 * Copyright (c) 2025 fltLi
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Selector};
use url::Url;

use resolver::http::{Context, HttpResponse};

use crate::error::*;

// srcset 中的链接
static SRCSET_URL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:https?|ftp)://[\w_-]+(?:\.[\w_-]+)+[\w.,@?^=%&:/~+#-]*[\w@?^=%&/~+#-]").unwrap()
});

fn selector(css: &str) -> Option<Selector> {
    match Selector::parse(css) {
        Ok(sel) => Some(sel),
        Err(e) => {
            log::warn!("invalid selector {css}: {e}");
            None
        }
    }
}

pub fn select_all<'a>(scope: ElementRef<'a>, css: &str) -> Vec<ElementRef<'a>> {
    selector(css)
        .map(|sel| scope.select(&sel).collect())
        .unwrap_or_default()
}

pub fn select_first<'a>(scope: ElementRef<'a>, css: &str) -> Option<ElementRef<'a>> {
    let sel = selector(css)?;
    scope.select(&sel).next()
}

pub fn exists(scope: ElementRef<'_>, css: &str) -> bool {
    select_first(scope, css).is_some()
}

/// 元素文本, 空白折叠
pub fn text(el: ElementRef<'_>) -> String {
    el.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// 所有匹配元素的文本, 以空格连接
pub fn select_text(scope: ElementRef<'_>, css: &str) -> String {
    select_all(scope, css)
        .into_iter()
        .map(text)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// 首个带有该属性的匹配元素的属性值
pub fn select_attr(scope: ElementRef<'_>, css: &str, attr: &str) -> Option<String> {
    select_all(scope, css)
        .into_iter()
        .find_map(|el| el.value().attr(attr))
        .map(|v| v.trim().to_string())
}

/// 相对地址补全为绝对地址
pub fn absolute(base: &str, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    let base = Url::parse(base).ok()?;
    base.join(href).ok().map(String::from)
}

/// 去掉协议与主机, 只保留路径, 查询与片段
pub fn without_domain(base: &str, href: &str) -> String {
    let Some(full) = absolute(base, href).and_then(|u| Url::parse(&u).ok()) else {
        return href.trim().to_string();
    };
    let mut path = full.path().to_string();
    if let Some(query) = full.query() {
        path.push('?');
        path.push_str(query);
    }
    if let Some(fragment) = full.fragment() {
        path.push('#');
        path.push_str(fragment);
    }
    path
}

/// 图片地址: 有 `srcset` 时取其中最大的链接, 否则取 `src`
pub fn image_url(base: &str, img: ElementRef<'_>) -> Option<String> {
    let src = || img.value().attr("src").and_then(|src| absolute(base, src));
    match img.value().attr("srcset") {
        Some(srcset) => SRCSET_URL_REGEX
            .find_iter(srcset)
            .map(|m| m.as_str().trim_matches('"').to_string())
            .max()
            .or_else(src),
        None => src(),
    }
}

/// 获取主页面, 失败时携带地址
pub async fn fetch_page(ctx: &Context, url: &str) -> Result<HttpResponse> {
    let wrap = |source: resolver::error::Error| Error::Fetch {
        url: url.to_string(),
        source,
    };
    let response = ctx.get(url).await.map_err(wrap)?;
    if !response.is_success() {
        return Err(wrap(resolver::error::Error::Status {
            status: response.status,
            url: url.to_string(),
        }));
    }
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    #[test]
    fn test_select_helpers() {
        let document = Html::parse_document(
            r#"<div class="a"><p> uno
            dos </p><p>tres</p><a href="/x">x</a><a href="/y">y</a></div>"#,
        );
        let root = document.root_element();
        assert_eq!(select_text(root, "div.a p"), "uno dos tres");
        assert_eq!(select_attr(root, "a", "href"), Some("/x".to_string()));
        assert_eq!(select_attr(root, "p", "href"), None);
        assert!(exists(root, "div.a"));
        assert!(!exists(root, "div.b"));
        // 非法选择器只会得到空结果
        assert!(select_all(root, "div[").is_empty());
    }

    #[test]
    fn test_urls() {
        assert_eq!(
            without_domain("https://www.animefenix.tv", "https://www.animefenix.tv/ver/x-1?a=b"),
            "/ver/x-1?a=b"
        );
        assert_eq!(without_domain("https://ww2.mhdflix.com", "series/x/"), "/series/x/");
        assert_eq!(
            absolute("https://ww2.mhdflix.com", "/img.jpg"),
            Some("https://ww2.mhdflix.com/img.jpg".to_string())
        );
        assert_eq!(absolute("https://ww2.mhdflix.com", " "), None);
    }

    #[test]
    fn test_image_url() {
        let document = Html::parse_document(
            r#"<img id="a" src="/small.jpg" srcset="https://img.example/w185/p.jpg 185w, https://img.example/w342/p.jpg 342w">
               <img id="b" src="/small.jpg">"#,
        );
        let root = document.root_element();
        let a = select_first(root, "#a").unwrap();
        let b = select_first(root, "#b").unwrap();
        assert_eq!(
            image_url("https://ww2.mhdflix.com", a),
            Some("https://img.example/w342/p.jpg".to_string())
        );
        assert_eq!(
            image_url("https://ww2.mhdflix.com", b),
            Some("https://ww2.mhdflix.com/small.jpg".to_string())
        );
    }
}
