use serde_json::Value;
use std::collections::HashSet;

use crate::models::{EntityKind, Entry, EntryList, PairedEntry};

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("unable to read the file: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("no new {0} to import")]
    NothingToImport(&'static str),
}

/// 导出当前视图 (筛选 + 排序后的结果，不分页) 为格式化 JSON 数组
pub fn export_entries(kind: EntityKind, entries: &[&Entry]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&EntryList { kind, entries })
}

/// 从上传文档中取出候选条目：支持裸数组，或带 `items`/`words` 字段的对象；
/// 元素可以是字符串，也可以是带文本/注释字段的对象
pub fn extract_candidates(kind: EntityKind, payload: &Value) -> Vec<PairedEntry> {
    let list = match payload {
        Value::Array(list) => list.as_slice(),
        Value::Object(_) => ["items", "words"]
            .iter()
            .find_map(|key| payload.get(*key).and_then(Value::as_array))
            .map(Vec::as_slice)
            .unwrap_or_default(),
        _ => &[],
    };

    list.iter()
        .filter_map(|item| {
            let (text, annotation) = match item {
                Value::String(text) => (text.as_str(), ""),
                Value::Object(_) => (
                    ["content", "name"].iter().find_map(|k| item.get(*k).and_then(Value::as_str))?,
                    item.get("annotation").and_then(Value::as_str).unwrap_or_default(),
                ),
                _ => return None,
            };
            let text = kind.normalize_text(text);
            if text.is_empty() {
                return None;
            }
            let annotation = if kind.has_annotation() { annotation.trim() } else { "" };
            Some(PairedEntry::new(text, annotation))
        })
        .collect()
}

/// 解析导入文档：批内按文本去重 (保留第一次出现)，再去掉集合里已有的文本
pub fn plan_import(kind: EntityKind, document: &str, existing: &[Entry]) -> Result<Vec<PairedEntry>, ImportError> {
    let payload: Value = serde_json::from_str(document)?;

    let mut seen: HashSet<String> = existing.iter().map(|e| kind.duplicate_key(&e.text)).collect();
    let unique: Vec<PairedEntry> = extract_candidates(kind, &payload)
        .into_iter()
        .filter(|candidate| seen.insert(kind.duplicate_key(&candidate.content)))
        .collect();

    if unique.is_empty() {
        return Err(ImportError::NothingToImport(kind.resource()));
    }
    Ok(unique)
}

/// 单词页的粘贴导入：逗号或换行分隔
pub fn parse_word_list(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    text.split(|c| c == ',' || c == '\n' || c == '\r')
        .map(|item| item.trim().to_lowercase())
        .filter(|item| !item.is_empty() && seen.insert(item.clone()))
        .collect()
}
