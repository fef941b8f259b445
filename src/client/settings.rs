use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_API_BASE: &str = "http://localhost:3000";
pub const DEFAULT_RANDOM_COUNT: usize = 5;

// 划词取第一个由字母、撇号、连字符组成的片段 (含拉丁补充字母)
static WORD_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Za-zÀ-ÖØ-öø-ÿ'-]+").expect("word pattern is valid"));

/// 调用方本地保存的偏好设置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientSettings {
    #[serde(default = "default_api_base")]
    pub api_base_url: String,
    #[serde(default)]
    pub random_count: Option<String>,
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self { api_base_url: default_api_base(), random_count: None }
    }
}

impl ClientSettings {
    /// 文件不存在时使用默认值
    pub async fn load(path: &Path) -> std::io::Result<Self> {
        match tokio::fs::read_to_string(path).await {
            Ok(text) => serde_json::from_str(&text).map_err(std::io::Error::other),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e),
        }
    }

    pub async fn save(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let text = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        tokio::fs::write(path, text).await
    }

    pub fn base_url(&self) -> &str {
        let trimmed = self.api_base_url.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            DEFAULT_API_BASE
        } else {
            trimmed
        }
    }

    /// 非法或非正数时退回 5
    pub fn random_count(&self) -> usize {
        self.random_count
            .as_deref()
            .and_then(|raw| raw.trim().parse::<i64>().ok())
            .filter(|n| *n > 0)
            .map(|n| n as usize)
            .unwrap_or(DEFAULT_RANDOM_COUNT)
    }
}

/// 右键菜单选中文本 → 单词：取第一个单词片段，否则取第一个空白分隔的词，转小写
pub fn normalize_selection(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    let word = WORD_PATTERN
        .find(trimmed)
        .map(|m| m.as_str())
        .or_else(|| trimmed.split_whitespace().next())?;
    Some(word.to_lowercase())
}
