//! 嵌入播放器引用

use super::Language;

/// 详情页中发现的嵌入链接, 解析后即丢弃
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedReference {
    /// 已解码的嵌入链接
    pub raw_url: String,
    pub language: Option<Language>,
    /// 小写主机名, 仅用于日志
    pub host_hint: String,
}

impl EmbedReference {
    pub fn new(url: impl Into<String>) -> Self {
        let raw_url = url.into();
        let host_hint = url::Url::parse(&raw_url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_lowercase))
            .unwrap_or_default();
        Self {
            raw_url,
            language: None,
            host_hint,
        }
    }

    pub fn with_language(mut self, language: Language) -> Self {
        self.language = Some(language);
        self
    }
}
