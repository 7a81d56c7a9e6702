//! 交互组件的状态模型
//!
//! 这里只保存状态与状态转换；DOM 读写在前端 crate 中完成，
//! 每次转换后前端根据模型状态刷新对应元素。

pub mod calendar;
pub mod dropdown;
pub mod menu;
pub mod nav;

pub use calendar::DatePicker;
pub use dropdown::{Dropdown, DropdownItem, DropdownKey};
pub use menu::{MenuPhase, MobileMenu};
pub use nav::{menu_item_state, MenuItemState};

/// 组件生命周期归属
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetScope {
    /// 属于外壳，整个会话只创建一次
    Shell,
    /// 属于页面内容，每次导航后销毁并重建
    Page,
}

/// 已挂载的组件实例
pub trait Widget {
    /// 释放监听器与临时 DOM；重复调用无副作用
    fn destroy(&mut self);
}

/// 组件工厂
pub trait WidgetFactory {
    fn name(&self) -> &str;
    fn scope(&self) -> WidgetScope;
    /// 页面上没有对应元素时返回 `None`
    fn create(&self) -> Option<Box<dyn Widget>>;
}
