use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

use super::entry::{EntityKind, NewEntry};

/// 带注释的导入/批量条目，`content` 也接受 `name`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairedEntry {
    #[serde(alias = "name")]
    pub content: String,
    #[serde(default)]
    pub annotation: String,
}

impl PairedEntry {
    pub fn new(content: impl Into<String>, annotation: impl Into<String>) -> Self {
        Self { content: content.into(), annotation: annotation.into() }
    }
}

/// POST 请求体的三种形态：
/// `{content|name}`、`{contents|names: [...]}`、`{items: [{content, annotation}]}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateRequest {
    Single { content: String, annotation: String },
    List(Vec<String>),
    Paired(Vec<PairedEntry>),
}

fn string_field<'a>(body: &'a Value, keys: &[&str]) -> Option<&'a str> {
    keys.iter().find_map(|key| body.get(*key).and_then(Value::as_str))
}

fn array_field<'a>(body: &'a Value, keys: &[&str]) -> Option<&'a Vec<Value>> {
    keys.iter().find_map(|key| body.get(*key).and_then(Value::as_array))
}

impl CreateRequest {
    /// 识别不出任何形态时返回空列表，交给校验阶段报错
    pub fn from_json(body: &Value) -> Self {
        if let Some(items) = array_field(body, &["items"]) {
            let entries = items
                .iter()
                .filter_map(|item| match item {
                    Value::String(text) => Some(PairedEntry::new(text.as_str(), "")),
                    Value::Object(_) => Some(PairedEntry::new(
                        string_field(item, &["content", "name"]).unwrap_or_default(),
                        string_field(item, &["annotation"]).unwrap_or_default(),
                    )),
                    _ => None,
                })
                .collect();
            return CreateRequest::Paired(entries);
        }

        if let Some(list) = array_field(body, &["contents", "names"]) {
            let texts = list.iter().filter_map(Value::as_str).map(str::to_string).collect();
            return CreateRequest::List(texts);
        }

        match string_field(body, &["content", "name"]) {
            Some(content) => CreateRequest::Single {
                content: content.to_string(),
                annotation: string_field(body, &["annotation"]).unwrap_or_default().to_string(),
            },
            None => CreateRequest::List(Vec::new()),
        }
    }

    /// 按类别生成请求体 (单词用 `name`/`names`)
    pub fn to_json(&self, kind: EntityKind) -> Value {
        let mut body = Map::new();
        match self {
            CreateRequest::Single { content, annotation } => {
                body.insert(kind.text_field().into(), Value::from(content.as_str()));
                if kind.has_annotation() {
                    body.insert("annotation".into(), Value::from(annotation.as_str()));
                }
            }
            CreateRequest::List(texts) => {
                let key = match kind {
                    EntityKind::Word => "names",
                    _ => "contents",
                };
                body.insert(key.into(), Value::from(texts.clone()));
            }
            CreateRequest::Paired(items) => {
                body.insert("items".into(), serde_json::to_value(items).unwrap_or_default());
            }
        }
        Value::Object(body)
    }

    /// 规范化：去空白、丢弃空文本、批内去重 (同文本保留最后一次的注释)
    pub fn normalize(self, kind: EntityKind) -> Vec<NewEntry> {
        let pairs: Vec<(String, String)> = match self {
            CreateRequest::Single { content, annotation } => vec![(content, annotation)],
            CreateRequest::List(texts) => texts.into_iter().map(|t| (t, String::new())).collect(),
            CreateRequest::Paired(items) => {
                items.into_iter().map(|i| (i.content, i.annotation)).collect()
            }
        };

        let mut out: Vec<NewEntry> = Vec::with_capacity(pairs.len());
        let mut seen: HashMap<String, usize> = HashMap::new();
        for (raw_text, raw_annotation) in pairs {
            let text = kind.normalize_text(&raw_text);
            if text.is_empty() {
                continue;
            }
            let annotation = if kind.has_annotation() {
                raw_annotation.trim().to_string()
            } else {
                String::new()
            };
            match seen.get(&text) {
                Some(&idx) => out[idx].annotation = annotation,
                None => {
                    seen.insert(text.clone(), out.len());
                    out.push(NewEntry { text, annotation });
                }
            }
        }
        out
    }
}

/// PATCH 请求体：整条覆盖文本和注释
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateRequest {
    pub id: i32,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotation: Option<String>,
}

pub(crate) fn as_id(value: &Value) -> Option<i32> {
    value.as_i64().and_then(|n| i32::try_from(n).ok())
}

impl UpdateRequest {
    /// id 不是整数或没有文本字段时返回 None
    pub fn from_json(body: &Value) -> Option<Self> {
        let id = body.get("id").and_then(as_id)?;
        let content = string_field(body, &["content", "name"])?.to_string();
        let annotation = string_field(body, &["annotation"]).map(str::to_string);
        Some(UpdateRequest { id, content, annotation })
    }
}

/// DELETE 请求体：`{all: true}` 或 `{ids: [...]}`，二选一
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteRequest {
    All,
    Ids(Vec<i32>),
}

impl DeleteRequest {
    pub fn from_json(body: &Value) -> Result<Self, &'static str> {
        let all = body.get("all").and_then(Value::as_bool).unwrap_or(false);
        let ids = body.get("ids").and_then(Value::as_array).filter(|ids| !ids.is_empty());

        match (all, ids) {
            (true, None) => Ok(DeleteRequest::All),
            (false, Some(ids)) => {
                let valid: Vec<i32> = ids.iter().filter_map(as_id).collect();
                if valid.is_empty() {
                    Err("No valid ids provided")
                } else {
                    Ok(DeleteRequest::Ids(valid))
                }
            }
            (true, Some(_)) => Err("Provide either ids or all, not both"),
            (false, None) => Err("Missing ids or all flag"),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            DeleteRequest::All => serde_json::json!({ "all": true }),
            DeleteRequest::Ids(ids) => serde_json::json!({ "ids": ids }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn create_accepts_all_three_shapes() {
        assert_eq!(
            CreateRequest::from_json(&json!({ "name": "Apple" })),
            CreateRequest::Single { content: "Apple".into(), annotation: String::new() }
        );
        assert_eq!(
            CreateRequest::from_json(&json!({ "contents": ["a", 3, "b"] })),
            CreateRequest::List(vec!["a".into(), "b".into()])
        );
        assert_eq!(
            CreateRequest::from_json(&json!({ "items": [{ "content": "x", "annotation": "y" }, "z"] })),
            CreateRequest::Paired(vec![PairedEntry::new("x", "y"), PairedEntry::new("z", "")])
        );
        assert_eq!(CreateRequest::from_json(&json!({ "foo": 1 })), CreateRequest::List(vec![]));
    }

    #[test]
    fn normalize_dedupes_words_case_insensitively() {
        let entries = CreateRequest::List(vec!["Apple".into(), "apple".into(), " BANANA ".into(), "  ".into()])
            .normalize(EntityKind::Word);
        let texts: Vec<&str> = entries.iter().map(|e| e.text.as_str()).collect();
        assert_eq!(texts, vec!["apple", "banana"]);
    }

    #[test]
    fn normalize_keeps_last_annotation_for_paired_duplicates() {
        let entries = CreateRequest::Paired(vec![
            PairedEntry::new("break a leg", "first"),
            PairedEntry::new("hold on", ""),
            PairedEntry::new(" break a leg ", " second "),
        ])
        .normalize(EntityKind::Phrase);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].text, "break a leg");
        assert_eq!(entries[0].annotation, "second");
    }

    #[test]
    fn normalize_drops_word_annotations() {
        let entries = CreateRequest::Single { content: "Cat".into(), annotation: "pet".into() }
            .normalize(EntityKind::Word);
        assert_eq!(entries, vec![NewEntry { text: "cat".into(), annotation: String::new() }]);
    }

    #[test]
    fn update_requires_integer_id_and_text() {
        assert!(UpdateRequest::from_json(&json!({ "content": "x" })).is_none());
        assert!(UpdateRequest::from_json(&json!({ "id": "7", "content": "x" })).is_none());
        assert!(UpdateRequest::from_json(&json!({ "id": 7 })).is_none());
        let parsed = UpdateRequest::from_json(&json!({ "id": 7, "content": "  ", "annotation": "x" })).unwrap();
        assert_eq!(parsed.id, 7);
        assert_eq!(parsed.annotation.as_deref(), Some("x"));
    }

    #[test]
    fn delete_requires_exactly_one_selector() {
        assert_eq!(DeleteRequest::from_json(&json!({ "all": true })), Ok(DeleteRequest::All));
        assert_eq!(
            DeleteRequest::from_json(&json!({ "ids": [1, "x", 3] })),
            Ok(DeleteRequest::Ids(vec![1, 3]))
        );
        assert_eq!(DeleteRequest::from_json(&json!({ "ids": ["x"] })), Err("No valid ids provided"));
        assert_eq!(DeleteRequest::from_json(&json!({ "ids": [] })), Err("Missing ids or all flag"));
        assert_eq!(DeleteRequest::from_json(&json!({})), Err("Missing ids or all flag"));
        assert!(DeleteRequest::from_json(&json!({ "all": true, "ids": [1] })).is_err());
    }

    #[test]
    fn word_bodies_use_name_keys() {
        let body = CreateRequest::List(vec!["a".into()]).to_json(EntityKind::Word);
        assert_eq!(body, json!({ "names": ["a"] }));
        let body = CreateRequest::Single { content: "a".into(), annotation: "b".into() }
            .to_json(EntityKind::Phrase);
        assert_eq!(body, json!({ "content": "a", "annotation": "b" }));
    }
}
