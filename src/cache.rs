use std::collections::HashMap;

use crate::content::ContentPayload;
use crate::route::normalize_path;

/// 片段缓存
///
/// 以规范化后的路由路径为键；没有过期与淘汰，只能显式清除。
#[derive(Debug, Default)]
pub struct FragmentCache {
    entries: HashMap<String, ContentPayload>,
}

impl FragmentCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &str) -> Option<ContentPayload> {
        self.entries.get(&normalize_path(path)).cloned()
    }

    pub fn set(&mut self, path: &str, payload: ContentPayload) {
        self.entries.insert(normalize_path(path), payload);
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(&normalize_path(path))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// 返回是否确实删除了条目
    pub fn clear_path(&mut self, path: &str) -> bool {
        self.entries.remove(&normalize_path(path)).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
