//! 搜索过滤器

use serde::{Deserialize, Serialize};

/// 多选过滤器, 按 `genero[]` / `year[]` / `type[]` / `estado[]` / `order` 渲染为查询串
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AnimefenixFilters {
    pub genres: Vec<String>,
    pub years: Vec<u32>,
    pub types: Vec<String>,
    pub states: Vec<String>,
    pub order: Option<String>,
}

impl AnimefenixFilters {
    fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        pairs.extend(self.genres.iter().map(|g| ("genero[]", g.clone())));
        pairs.extend(self.years.iter().map(|y| ("year[]", y.to_string())));
        pairs.extend(self.types.iter().map(|t| ("type[]", t.clone())));
        pairs.extend(self.states.iter().map(|s| ("estado[]", s.clone())));
        if let Some(order) = self.order.as_deref().filter(|o| *o != "default") {
            pairs.push(("order", order.to_string()));
        }
        pairs.retain(|(_, v)| !v.trim().is_empty());
        pairs
    }

    pub fn is_empty(&self) -> bool {
        self.pairs().is_empty()
    }

    /// 以 `?` 开头的查询串, 没有条件时为空串
    pub fn to_query(&self) -> String {
        let pairs = self.pairs();
        if pairs.is_empty() {
            return String::new();
        }
        let joined = pairs
            .iter()
            .map(|(k, v)| format!("{k}={}", urlencoding::encode(v.trim())))
            .collect::<Vec<_>>()
            .join("&");
        format!("?{joined}")
    }
}
