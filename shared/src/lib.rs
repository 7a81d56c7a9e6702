//! Magyar Közlöny 共享领域模型
//!
//! 核心库与前端共用的数据：
//! - `date`: 匈牙利语日期格式化
//! - `catalog`: 公报目录（启动时一次性生成，按时间倒序）

pub mod catalog;
pub mod date;

pub use catalog::{CatalogConfig, Gazette, GazetteCatalog, ListingPage};

// =========================================================
// 常量定义 (Constants)
// =========================================================

/// 站点名称，同时也是所有页面标题的后缀
pub const SITE_NAME: &str = "Magyar Közlöny";

/// 分页路由的参数名（对应 `/page/:page`）
pub const PAGE_PARAM: &str = "page";
