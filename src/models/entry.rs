use chrono::{DateTime, Utc};
use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Deserialize, Serialize, Serializer};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;

/// 三类条目：单词、短语、句子
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Word,
    Phrase,
    Sentence,
}

impl EntityKind {
    pub const ALL: [EntityKind; 3] = [EntityKind::Word, EntityKind::Phrase, EntityKind::Sentence];

    /// 路由名，同时也是表名
    pub fn resource(self) -> &'static str {
        match self {
            EntityKind::Word => "words",
            EntityKind::Phrase => "phrases",
            EntityKind::Sentence => "sentences",
        }
    }

    /// JSON 中主文本字段的名字
    pub fn text_field(self) -> &'static str {
        match self {
            EntityKind::Word => "name",
            _ => "content",
        }
    }

    /// 列表响应的外层字段：单词是 `words`，其它是 `items`
    pub fn collection_field(self) -> &'static str {
        match self {
            EntityKind::Word => "words",
            _ => "items",
        }
    }

    pub fn has_annotation(self) -> bool {
        !matches!(self, EntityKind::Word)
    }

    pub fn singular_label(self) -> &'static str {
        match self {
            EntityKind::Word => "Word",
            EntityKind::Phrase => "Phrase",
            EntityKind::Sentence => "Sentence",
        }
    }

    pub fn export_file_name(self) -> &'static str {
        match self {
            EntityKind::Word => "words-book.json",
            EntityKind::Phrase => "phrases.json",
            EntityKind::Sentence => "sentences.json",
        }
    }

    /// 去掉首尾空白；单词统一转小写
    pub fn normalize_text(self, raw: &str) -> String {
        let trimmed = raw.trim();
        match self {
            EntityKind::Word => trimmed.to_lowercase(),
            _ => trimmed.to_string(),
        }
    }

    /// 判重用的键。单词忽略大小写，短语/句子按原文精确匹配
    pub fn duplicate_key(self, text: &str) -> String {
        match self {
            EntityKind::Word => text.to_lowercase(),
            _ => text.to_string(),
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.resource())
    }
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "word" | "words" => Ok(EntityKind::Word),
            "phrase" | "phrases" => Ok(EntityKind::Phrase),
            "sentence" | "sentences" => Ok(EntityKind::Sentence),
            other => Err(format!("unknown collection `{other}`")),
        }
    }
}

/// 一条记录。单词没有注释列，查询时补空串
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, FromRow)]
pub struct Entry {
    pub id: i32,
    #[serde(rename = "content", alias = "name")]
    pub text: String,
    #[serde(default)]
    pub annotation: String,
    #[serde(rename = "createdAt", alias = "created_at")]
    pub created_at: DateTime<Utc>,
}

impl Entry {
    pub fn view(&self, kind: EntityKind) -> EntryView<'_> {
        EntryView { kind, entry: self }
    }

    /// 搜索：主文本或注释包含关键字 (不区分大小写)
    pub fn matches(&self, needle: &str) -> bool {
        if needle.is_empty() {
            return true;
        }
        self.text.to_lowercase().contains(needle) || self.annotation.to_lowercase().contains(needle)
    }
}

/// 待写入的条目 (已规范化)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEntry {
    pub text: String,
    pub annotation: String,
}

/// 按类别输出对应的 JSON 结构
pub struct EntryView<'a> {
    kind: EntityKind,
    entry: &'a Entry,
}

impl Serialize for EntryView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = if self.kind.has_annotation() { 4 } else { 3 };
        let mut state = serializer.serialize_struct("Entry", len)?;
        state.serialize_field("id", &self.entry.id)?;
        state.serialize_field(self.kind.text_field(), &self.entry.text)?;
        if self.kind.has_annotation() {
            state.serialize_field("annotation", &self.entry.annotation)?;
        }
        state.serialize_field("createdAt", &self.entry.created_at)?;
        state.end()
    }
}

/// 导出和列表共用的数组形式
pub struct EntryList<'a> {
    pub kind: EntityKind,
    pub entries: &'a [&'a Entry],
}

impl Serialize for EntryList<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.entries.iter().map(|e| e.view(self.kind)))
    }
}

/// 每次读写后都返回的完整列表：`{"words": [...]}` 或 `{"items": [...]}`
#[derive(Debug, Clone, PartialEq)]
pub struct Collection {
    pub kind: EntityKind,
    pub entries: Vec<Entry>,
}

impl Serialize for Collection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let refs: Vec<&Entry> = self.entries.iter().collect();
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(
            self.kind.collection_field(),
            &EntryList { kind: self.kind, entries: &refs },
        )?;
        map.end()
    }
}

/// 客户端解析列表响应用，两种外层字段都接受
#[derive(Debug, Deserialize)]
pub struct CollectionPayload {
    #[serde(alias = "words")]
    pub items: Vec<Entry>,
}
