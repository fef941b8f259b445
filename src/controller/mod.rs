//! 列表页状态：持有完整条目列表，所有写操作经 Collection API 往返后整体替换，
//! 搜索/排序/分页/勾选都由这份列表派生。

use std::collections::BTreeSet;
use std::str::FromStr;

use crate::client::{ClientError, CollectionApi};
use crate::models::{CreateRequest, DeleteRequest, EntityKind, Entry, PairedEntry, UpdateRequest};
use crate::services::sampler::DEFAULT_CARD_LIMIT;
use crate::services::transfer::{self, ImportError};

pub mod flashcards;

pub use flashcards::Flashcards;

pub const PAGE_SIZE_OPTIONS: [usize; 5] = [10, 20, 30, 50, 100];
pub const DEFAULT_PAGE_SIZE: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// 最新在前
    #[default]
    Desc,
    Asc,
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "desc" | "newest" => Ok(SortOrder::Desc),
            "asc" | "oldest" => Ok(SortOrder::Asc),
            other => Err(format!("unknown sort order `{other}`")),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ControllerError {
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Import(#[from] ImportError),
    #[error("unable to export: {0}")]
    Export(#[source] serde_json::Error),
    #[error(transparent)]
    Client(#[from] ClientError),
}

/// 保存编辑的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    Saved,
    /// 文本和注释都没变，不发请求，直接退出编辑
    Unchanged,
}

pub struct CollectionController<A> {
    api: A,
    kind: EntityKind,
    items: Vec<Entry>,
    query: String,
    sort_order: SortOrder,
    page_size: usize,
    current_page: usize,
    selected: BTreeSet<i32>,
    editing: Option<i32>,
    pending: bool,
    error: Option<String>,
    flashcards: Flashcards,
}

impl<A: CollectionApi> CollectionController<A> {
    /// 用首屏快照初始化
    pub fn new(api: A, kind: EntityKind, initial: Vec<Entry>) -> Self {
        let flashcards = Flashcards::new(DEFAULT_CARD_LIMIT, &initial);
        Self {
            api,
            kind,
            items: initial,
            query: String::new(),
            sort_order: SortOrder::default(),
            page_size: DEFAULT_PAGE_SIZE,
            current_page: 1,
            selected: BTreeSet::new(),
            editing: None,
            pending: false,
            error: None,
            flashcards,
        }
    }

    /// 先拉一次完整列表再初始化
    pub async fn load(api: A, kind: EntityKind) -> Result<Self, ControllerError> {
        let initial = api.list().await?;
        Ok(Self::new(api, kind, initial))
    }

    pub fn items(&self) -> &[Entry] {
        &self.items
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    pub fn editing(&self) -> Option<i32> {
        self.editing
    }

    // ---------- 派生视图 ----------

    /// 筛选 + 排序 (排序稳定，同一时间戳保持服务端顺序)
    pub fn visible(&self) -> Vec<&Entry> {
        let needle = self.query.trim().to_lowercase();
        let mut view: Vec<&Entry> = self.items.iter().filter(|e| e.matches(&needle)).collect();
        match self.sort_order {
            SortOrder::Desc => view.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            SortOrder::Asc => view.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
        }
        view
    }

    pub fn total_pages(&self) -> usize {
        self.visible().len().div_ceil(self.page_size).max(1)
    }

    /// 当前页码，越界时落到最后一页
    pub fn current_page(&self) -> usize {
        self.current_page.clamp(1, self.total_pages())
    }

    pub fn page(&self) -> Vec<&Entry> {
        let start = (self.current_page() - 1) * self.page_size;
        self.visible().into_iter().skip(start).take(self.page_size).collect()
    }

    // ---------- 筛选 / 排序 / 分页 ----------

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
        self.current_page = 1;
    }

    pub fn set_sort_order(&mut self, order: SortOrder) {
        self.sort_order = order;
        self.current_page = 1;
    }

    pub fn set_page_size(&mut self, size: usize) -> Result<(), ControllerError> {
        if !PAGE_SIZE_OPTIONS.contains(&size) {
            return Err(ControllerError::Validation(format!(
                "page size must be one of {PAGE_SIZE_OPTIONS:?}"
            )));
        }
        self.page_size = size;
        self.current_page = 1;
        Ok(())
    }

    pub fn go_to_page(&mut self, page: usize) {
        self.current_page = page.clamp(1, self.total_pages());
    }

    pub fn next_page(&mut self) {
        self.go_to_page(self.current_page() + 1);
    }

    pub fn previous_page(&mut self) {
        self.go_to_page(self.current_page().saturating_sub(1));
    }

    // ---------- 勾选 ----------

    pub fn selected_ids(&self) -> &BTreeSet<i32> {
        &self.selected
    }

    /// 勾选 (已勾选的保持不变)
    pub fn select(&mut self, id: i32) {
        self.selected.insert(id);
    }

    pub fn toggle_select(&mut self, id: i32) {
        if !self.selected.remove(&id) {
            self.selected.insert(id);
        }
    }

    /// 全选只选当前筛选结果，不是整个集合
    pub fn select_all(&mut self, checked: bool) {
        self.selected = if checked {
            self.visible().iter().map(|e| e.id).collect()
        } else {
            BTreeSet::new()
        };
    }

    pub fn all_selected(&self) -> bool {
        let view = self.visible();
        !view.is_empty() && view.iter().all(|e| self.selected.contains(&e.id))
    }

    // ---------- 闪卡 ----------

    pub fn flashcards(&self) -> &[Entry] {
        self.flashcards.cards()
    }

    pub fn set_flashcard_count(&mut self, count: usize) {
        self.flashcards.set_max_cards(count, &self.items);
    }

    // ---------- 写操作 ----------

    /// 集合变了：清空勾选、回到第一页、闪卡重抽
    fn replace_items(&mut self, items: Vec<Entry>) {
        self.items = items;
        self.selected.clear();
        self.current_page = 1;
        self.flashcards.shuffle(&self.items);
    }

    fn fail<T>(&mut self, e: ControllerError) -> Result<T, ControllerError> {
        self.error = Some(e.to_string());
        Err(e)
    }

    fn begin_request(&mut self) {
        self.error = None;
        self.pending = true;
    }

    /// 用返回的完整列表替换本地状态
    fn finish_request(&mut self, result: Result<Vec<Entry>, ClientError>) -> Result<(), ControllerError> {
        self.pending = false;
        match result {
            Ok(items) => {
                self.replace_items(items);
                Ok(())
            }
            Err(e) => self.fail(e.into()),
        }
    }

    pub async fn add(&mut self, text: &str, annotation: &str) -> Result<(), ControllerError> {
        let request = CreateRequest::Single { content: text.to_string(), annotation: annotation.to_string() };
        self.begin_request();
        let result = self.api.create(&request).await;
        self.finish_request(result)
    }

    pub async fn add_batch(&mut self, texts: Vec<String>) -> Result<(), ControllerError> {
        let request = CreateRequest::List(texts);
        self.begin_request();
        let result = self.api.create(&request).await;
        self.finish_request(result)
    }

    pub fn begin_edit(&mut self, id: i32) {
        self.editing = Some(id);
    }

    /// 保存就地编辑。文本为空时报错并保持编辑状态
    pub async fn save_edit(&mut self, id: i32, text: &str, annotation: &str) -> Result<EditOutcome, ControllerError> {
        let normalized = self.kind.normalize_text(text);
        if normalized.is_empty() {
            let message = format!("{} text is required.", self.kind.singular_label());
            return self.fail(ControllerError::Validation(message));
        }
        let annotation = if self.kind.has_annotation() { annotation.trim() } else { "" };

        let unchanged = self
            .items
            .iter()
            .find(|e| e.id == id)
            .is_some_and(|e| e.text == normalized && e.annotation == annotation);
        if unchanged {
            self.editing = None;
            return Ok(EditOutcome::Unchanged);
        }

        let request = UpdateRequest { id, content: normalized, annotation: Some(annotation.to_string()) };
        self.begin_request();
        let result = self.api.update(&request).await;
        self.finish_request(result)?;
        self.editing = None;
        Ok(EditOutcome::Saved)
    }

    pub async fn delete_selected(&mut self) -> Result<(), ControllerError> {
        if self.selected.is_empty() {
            return Ok(());
        }
        let request = DeleteRequest::Ids(self.selected.iter().copied().collect());
        self.begin_request();
        let result = self.api.delete(&request).await;
        self.finish_request(result)
    }

    pub async fn delete_all(&mut self) -> Result<(), ControllerError> {
        if self.items.is_empty() {
            return Ok(());
        }
        self.begin_request();
        let result = self.api.delete(&DeleteRequest::All).await;
        self.finish_request(result)
    }

    /// 导入 JSON 文档，返回提交的新条目数
    pub async fn import(&mut self, document: &str) -> Result<usize, ControllerError> {
        self.error = None;
        let planned: Vec<PairedEntry> = match transfer::plan_import(self.kind, document, &self.items) {
            Ok(planned) => planned,
            Err(e) => return self.fail(e.into()),
        };
        let count = planned.len();
        let request = CreateRequest::Paired(planned);
        self.begin_request();
        let result = self.api.create(&request).await;
        self.finish_request(result)?;
        Ok(count)
    }

    /// 单词页的文本导入 (逗号/换行分隔)
    pub async fn import_word_list(&mut self, text: &str) -> Result<usize, ControllerError> {
        let names = transfer::parse_word_list(text);
        if names.is_empty() {
            return self.fail(ControllerError::Validation(
                "Enter at least one word before importing.".to_string(),
            ));
        }
        let count = names.len();
        self.add_batch(names).await?;
        Ok(count)
    }

    /// 导出当前筛选 + 排序后的视图
    pub fn export(&self) -> Result<String, ControllerError> {
        let view = self.visible();
        transfer::export_entries(self.kind, &view).map_err(ControllerError::Export)
    }
}
