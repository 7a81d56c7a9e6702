//! 导航菜单高亮

use crate::route::{html_path_to_route_path, normalize_path};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuItemState {
    Active,
    Default,
}

impl MenuItemState {
    /// `data-state` 属性值，同时也是 class 名
    pub fn as_str(&self) -> &'static str {
        match self {
            MenuItemState::Active => "active",
            MenuItemState::Default => "default",
        }
    }
}

/// 菜单项链接是否指向当前页面
pub fn menu_item_state(href: &str, current_path: &str) -> MenuItemState {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') || href.contains("://") || href.starts_with("//") {
        return MenuItemState::Default;
    }

    if normalize_path(&html_path_to_route_path(href)) == normalize_path(current_path) {
        MenuItemState::Active
    } else {
        MenuItemState::Default
    }
}
