//! 分页器模型
//!
//! 页码序列计算、上一页/下一页状态与点击决策。DOM 绑定在前端 crate。

use kozlony_shared::ListingPage;

/// 当前页两侧最多显示的页数
const DELTA: usize = 2;

/// 页码点击后派发的自定义事件名
pub const PAGINATOR_CHANGE_EVENT: &str = "paginatorChange";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageItem {
    Page(usize),
    Ellipsis,
}

/// 计算分页器显示的页码
///
/// 首页与末页总是显示；间隔超过一页时折叠为一个省略号，恰好一页时直接显示该页。
pub fn calculate_page_numbers(current: usize, total: usize) -> Vec<PageItem> {
    let total = total.max(1);
    let current = current.clamp(1, total);

    let mut items = vec![PageItem::Page(1)];

    let start = current.saturating_sub(DELTA).max(2);
    let end = (current + DELTA).min(total - 1);

    match start - 2 {
        0 => {}
        1 => items.push(PageItem::Page(2)),
        _ => items.push(PageItem::Ellipsis),
    }

    items.extend((start..=end).map(PageItem::Page));

    if total > 1 {
        let last_shown = end.max(1);
        match (total - 1).saturating_sub(last_shown) {
            0 => {}
            1 => items.push(PageItem::Page(total - 1)),
            _ => items.push(PageItem::Ellipsis),
        }
        items.push(PageItem::Page(total));
    }

    items
}

/// 页码对应的路由路径：第 1 页是 `/`
pub fn page_href(page: usize) -> String {
    if page <= 1 {
        "/".to_string()
    } else {
        format!("/page/{}", page)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaginatorClick {
    /// 点击了当前页：吞掉点击，什么也不做
    Swallow,
    /// 派发 `paginatorChange` 并让路由器拦截链接
    Change { page_number: usize, href: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginatorState {
    pub current_page: usize,
    pub total_pages: usize,
}

impl PaginatorState {
    pub fn new(current_page: usize, total_pages: usize) -> Self {
        let total_pages = total_pages.max(1);
        Self {
            current_page: current_page.clamp(1, total_pages),
            total_pages,
        }
    }

    pub fn from_listing(page: &ListingPage) -> Self {
        Self::new(page.current_page, page.total_pages)
    }

    pub fn items(&self) -> Vec<PageItem> {
        calculate_page_numbers(self.current_page, self.total_pages)
    }

    pub fn has_prev(&self) -> bool {
        self.current_page > 1
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }

    pub fn prev_target(&self) -> Option<String> {
        self.has_prev().then(|| page_href(self.current_page - 1))
    }

    pub fn next_target(&self) -> Option<String> {
        self.has_next().then(|| page_href(self.current_page + 1))
    }

    pub fn click(&self, page: usize) -> PaginatorClick {
        if page == self.current_page {
            return PaginatorClick::Swallow;
        }
        PaginatorClick::Change {
            page_number: page,
            href: page_href(page),
        }
    }
}
