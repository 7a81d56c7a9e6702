//! Magyar Közlöny 单页应用核心
//!
//! 与平台无关的部分：路由表与路由器状态机、页面内容提供者、片段提取与缓存、
//! 列表页加载与渲染、分页器与交互组件的状态模型、组件生命周期协调。
//!
//! 浏览器相关的能力通过两个接缝注入：
//! - [`request::HttpClient`]：获取静态文档
//! - [`router::Browser`]：历史记录、标题与挂载点写入
//!
//! 因此整个核心可以在原生环境下测试。

pub mod cache;
pub mod config;
pub mod content;
pub mod error;
pub mod extract;
pub mod html;
pub mod lifecycle;
pub mod listing;
pub mod pages;
pub mod paginator;
pub mod render;
pub mod request;
pub mod route;
pub mod router;
pub mod widgets;

pub use config::SiteConfig;
pub use content::{ContentPayload, DocumentLoader, PageContentProvider};
pub use error::{SiteError, SiteErrorStatus, SiteResult};
pub use lifecycle::LifecycleCoordinator;
pub use listing::ListingLoader;
pub use request::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
pub use route::{Params, RouteConfig, RouteLoader, RouteTable};
pub use router::{
    AfterNavigate, BeforeNavigate, Browser, LinkDecision, LinkTarget, NavigationDecision,
    NavigationEvent, NavigationOutcome, NavigationPhase, NavigationState, Router,
};
