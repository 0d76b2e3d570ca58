//! 搜索过滤器

use serde::{Deserialize, Serialize};

/// 站点只支持按分类浏览, 分类页为 `/category/<slug>`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct MhdFlixFilters {
    pub genre: Option<String>,
}

impl MhdFlixFilters {
    pub fn genre(slug: impl Into<String>) -> Self {
        Self {
            genre: Some(slug.into()),
        }
    }

    /// 分类页路径, 未选择时为空串
    pub fn path(&self) -> String {
        match self.genre.as_deref().map(str::trim) {
            Some(slug) if !slug.is_empty() => {
                format!("/category/{}", urlencoding::encode(slug.trim_matches('/')))
            }
            _ => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path() {
        assert_eq!(MhdFlixFilters::genre("accion").path(), "/category/accion");
        assert_eq!(MhdFlixFilters::genre(" ").path(), "");
        assert_eq!(MhdFlixFilters::default().path(), "");
    }
}
