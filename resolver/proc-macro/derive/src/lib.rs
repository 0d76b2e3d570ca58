/*
 * Copyright (c) 2025 fltLi
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

extern crate proc_macro;

use proc_macro::TokenStream;
use quote::ToTokens;
use quote::quote;
use regex::Regex;
use syn::{Attribute, DeriveInput, parse_macro_input};

/// 视频源属性
///
/// # 使用示例
///
/// 在提取器类型上添加 `#[derive(Provider)]` 并使用 `#[provider(...)]` 属性指定元数据:
///
/// ```rust,ignore
/// #[derive(Provider)]
/// #[provider(name = "Amazon", patterns = ["amazon", "amz"], exclude = ["disable"])]
/// pub struct Amazon;
/// ```
///
/// 支持的属性:
/// - `name = "..."`: 视频源名称, 同时作为候选流的服务器名 (必须)
/// - `patterns = ["p1", "p2"]`: 嵌入链接中出现任一子串即命中 (可选, 为空时只能作为兜底)
/// - `exclude = ["e1"]`: 嵌入链接中出现任一子串即不命中 (可选)
///
/// 该宏会为类型生成 `crate::traits::Provider` 的实现, 由 `RegistryBuilder` 按声明顺序注册.
#[derive(Debug)]
struct ProviderAttributes {
    name: String,
    patterns: Vec<String>,
    exclude: Vec<String>,
}

impl ProviderAttributes {
    fn from_attrs(input: &DeriveInput) -> Result<Self, syn::Error> {
        // 属性转为 token 字符串后用正则解析,
        // 形如 (name = "xxx", patterns = ["a","b"], exclude = ["c"]).
        let mut name = None;
        let mut patterns = Vec::new();
        let mut exclude = Vec::new();

        let name_re = Regex::new(r#"name\s*=\s*\"([^\"]+)\""#).unwrap();
        let patterns_re = Regex::new(r"patterns\s*=\s*\[(?P<inner>[^\]]*)\]").unwrap();
        let exclude_re = Regex::new(r"exclude\s*=\s*\[(?P<inner>[^\]]*)\]").unwrap();

        for attr in input.attrs.iter().filter(|a| a.path().is_ident("provider")) {
            let s = attr_string(attr);
            if name.is_none()
                && let Some(cap) = name_re.captures(&s)
            {
                name = Some(cap.get(1).unwrap().as_str().to_string());
            }
            if let Some(cap) = patterns_re.captures(&s) {
                patterns.extend(split_list(cap.name("inner").unwrap().as_str()));
            }
            if let Some(cap) = exclude_re.captures(&s) {
                exclude.extend(split_list(cap.name("inner").unwrap().as_str()));
            }
        }

        Ok(ProviderAttributes {
            name: name.ok_or_else(|| {
                syn::Error::new_spanned(&input.ident, "Missing required attribute 'name'")
            })?,
            patterns,
            exclude,
        })
    }
}

fn attr_string(attr: &Attribute) -> String {
    let mut ts = proc_macro2::TokenStream::new();
    attr.to_tokens(&mut ts);
    ts.to_string()
}

/// 拆分 `"a" , "b"` 形式的列表, 统一转小写
fn split_list(inner: &str) -> Vec<String> {
    inner
        .split(',')
        .map(|part| part.trim().trim_matches('"').trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

#[proc_macro_derive(Provider, attributes(provider))]
pub fn derive_provider(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let ident = &input.ident;

    let attrs = match ProviderAttributes::from_attrs(&input) {
        Ok(attrs) => attrs,
        Err(e) => return e.to_compile_error().into(),
    };

    let provider_name = attrs.name;
    let patterns = attrs.patterns;
    let exclude = attrs.exclude;

    let expanded = quote! {
        impl crate::traits::Provider for #ident {
            const NAME: &'static str = #provider_name;

            fn pattern() -> crate::registry::Pattern {
                crate::registry::Pattern::new(&[#(#patterns),*], &[#(#exclude),*])
            }

            fn create() -> std::sync::Arc<dyn crate::traits::Extractor> {
                std::sync::Arc::new(Self {})
            }
        }
    };

    expanded.into()
}
