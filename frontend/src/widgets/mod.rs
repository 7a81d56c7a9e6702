//! 交互组件的 DOM 绑定
//!
//! 状态转换由核心库的模型完成，这里只负责事件监听与 DOM 同步。

mod calendar;
mod dropdown;
mod menu;
mod nav;
mod paginator;

pub use calendar::DatePickerFactory;
pub use dropdown::DropdownFactory;
pub use menu::MobileMenuFactory;
pub use nav::NavHighlightFactory;
pub use paginator::PaginatorFactory;
