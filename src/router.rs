//! 客户端路由
//!
//! 路由器持有路由表、导航状态与前后回调，通过 [`Browser`] 写入 DOM 与历史记录。
//! 导航状态机：
//!
//! - `Idle/Ready → Navigating`：`navigate` / `load_route` / 历史弹出，路径解析到已知路由
//! - `Navigating → Ready`：加载完成、片段写入、`current_path` 更新、后置回调执行
//! - `Navigating → Idle`：前置回调拒绝；历史记录不变
//! - 未知路径或加载失败：记录日志并回退到根路径一次，不写历史记录
//!
//! 并发导航采用"后到者优先"：每次导航领取一个递增代号，
//! 每个挂起点之后若代号已过期，则停止并返回 [`NavigationOutcome::Superseded`]，
//! 不触碰 DOM、历史记录与状态。

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::config::SiteConfig;
use crate::content::ContentPayload;
use crate::error::{SiteError, SiteResult};
use crate::route::{
    html_path_to_route_path, normalize_path, page_identifier, Route, RouteConfig, RouteMatch,
    RouteTable,
};

// =========================================================
// 平台抽象层 (Browser Interface Abstraction)
// =========================================================

/// 路由器对浏览器环境的全部依赖
pub trait Browser {
    /// 当前地址的 pathname
    fn current_path(&self) -> String;
    fn push_history(&self, path: &str);
    fn set_title(&self, title: &str);
    fn set_body_attribute(&self, name: &str, value: &str);
    /// 写入挂载点的 innerHTML；挂载点不存在时返回 `false`
    fn set_region_html(&self, id: &str, html: &str) -> bool;
    fn scroll_to_top(&self);
}

// =========================================================
// 状态与结果
// =========================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NavigationPhase {
    #[default]
    Idle,
    Navigating,
    Ready,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavigationState {
    pub current_path: Option<String>,
    pub phase: NavigationPhase,
}

/// 传给回调的导航信息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationEvent {
    pub to: String,
    pub from: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationDecision {
    Proceed,
    Refuse,
}

#[derive(Debug)]
pub enum NavigationOutcome {
    Completed { path: String },
    /// 原路径失败后回退到了根路径
    Redirected { from: String, path: String },
    Refused,
    Superseded,
    Failed(SiteError),
}

impl NavigationOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(
            self,
            NavigationOutcome::Completed { .. } | NavigationOutcome::Redirected { .. }
        )
    }
}

#[async_trait::async_trait(?Send)]
pub trait BeforeNavigate {
    async fn before_navigate(&self, event: &NavigationEvent) -> NavigationDecision;
}

#[async_trait::async_trait(?Send)]
pub trait AfterNavigate {
    async fn after_navigate(&self, event: &NavigationEvent) -> SiteResult<()>;
}

// =========================================================
// 链接拦截
// =========================================================

/// 被点击链接的相关属性
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkTarget {
    pub href: Option<String>,
    pub target: Option<String>,
    pub download: bool,
    /// 按下了 ctrl/meta/shift/alt，或不是主键点击
    pub modified: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkDecision {
    /// 阻止默认行为并导航到该路由路径
    Intercept(String),
    PassThrough,
}

const PASS_THROUGH_PREFIXES: &[&str] = &["#", "http://", "https://", "//", "mailto:", "tel:"];

// =========================================================
// 路由器
// =========================================================

pub struct Router<B: Browser> {
    browser: B,
    config: SiteConfig,
    routes: RefCell<RouteTable>,
    before: RefCell<Vec<Rc<dyn BeforeNavigate>>>,
    after: RefCell<Vec<Rc<dyn AfterNavigate>>>,
    state: RefCell<NavigationState>,
    generation: Cell<u64>,
}

impl<B: Browser> Router<B> {
    pub fn new(browser: B, config: SiteConfig) -> Self {
        Self {
            browser,
            config,
            routes: RefCell::new(RouteTable::new()),
            before: RefCell::new(Vec::new()),
            after: RefCell::new(Vec::new()),
            state: RefCell::new(NavigationState::default()),
            generation: Cell::new(0),
        }
    }

    pub fn browser(&self) -> &B {
        &self.browser
    }

    // --- Registration ---

    pub fn add_route(&self, pattern: &str, config: RouteConfig) -> SiteResult<()> {
        self.routes.borrow_mut().add_route(pattern, config)
    }

    pub fn add_routes<I>(&self, routes: I) -> SiteResult<()>
    where
        I: IntoIterator<Item = (String, RouteConfig)>,
    {
        self.routes.borrow_mut().add_routes(routes)
    }

    pub fn before_navigate(&self, hook: Rc<dyn BeforeNavigate>) {
        self.before.borrow_mut().push(hook);
    }

    pub fn after_navigate(&self, hook: Rc<dyn AfterNavigate>) {
        self.after.borrow_mut().push(hook);
    }

    // --- Accessors ---

    pub fn match_route(&self, path: &str) -> Option<RouteMatch> {
        self.routes.borrow().match_route(path)
    }

    pub fn route_count(&self) -> usize {
        self.routes.borrow().len()
    }

    pub fn current_route(&self) -> Option<String> {
        self.state.borrow().current_path.clone()
    }

    pub fn state(&self) -> NavigationState {
        self.state.borrow().clone()
    }

    pub fn phase(&self) -> NavigationPhase {
        self.state.borrow().phase
    }

    // --- Link interception ---

    pub fn resolve_link(&self, link: &LinkTarget) -> LinkDecision {
        let Some(href) = link.href.as_deref().map(str::trim).filter(|h| !h.is_empty()) else {
            return LinkDecision::PassThrough;
        };

        let new_context = link
            .target
            .as_deref()
            .is_some_and(|t| !t.is_empty() && t != "_self");

        if link.modified
            || link.download
            || new_context
            || PASS_THROUGH_PREFIXES.iter().any(|p| href.starts_with(p))
        {
            return LinkDecision::PassThrough;
        }

        let path = normalize_path(&html_path_to_route_path(href));
        match self.match_route(&path) {
            Some(_) => LinkDecision::Intercept(path),
            None => LinkDecision::PassThrough,
        }
    }

    // --- Navigation ---

    /// 载入当前地址对应的路由
    pub async fn start(&self) -> NavigationOutcome {
        let path = self.browser.current_path();
        tracing::info!(path = %path, routes = self.route_count(), "router starting");
        self.load_route(&path).await
    }

    /// 浏览器前进/后退
    pub async fn handle_pop_state(&self) -> NavigationOutcome {
        let path = self.browser.current_path();
        tracing::debug!(path = %path, "history pop");
        self.load_route(&path).await
    }

    pub async fn navigate(&self, path: &str) -> NavigationOutcome {
        self.navigate_with(path, true).await
    }

    pub async fn navigate_with(&self, path: &str, push_state: bool) -> NavigationOutcome {
        let path = normalize_path(path);

        let ticket = self.begin();
        let Some(matched) = self.match_route(&path) else {
            tracing::error!(path = %path, "route not found");
            let err = SiteError::not_found(format!("Route not found: {}", path))
                .in_op_with("router.navigate", path.as_str());
            return self.fall_back_to_root(&path, err).await;
        };

        let event = NavigationEvent {
            to: path.clone(),
            from: self.current_route(),
        };

        // 先克隆回调列表，回调里可以再注册回调
        let hooks = self.before.borrow().clone();
        for hook in hooks {
            let decision = hook.before_navigate(&event).await;
            if !self.is_current(ticket) {
                return NavigationOutcome::Superseded;
            }
            if decision == NavigationDecision::Refuse {
                let err = SiteError::callback_refusal("Navigation refused by callback")
                    .in_op_with("router.navigate", path.as_str());
                tracing::debug!(path = %path, error = %err, "navigation refused");
                self.state.borrow_mut().phase = NavigationPhase::Idle;
                return NavigationOutcome::Refused;
            }
        }

        if push_state {
            self.browser.push_history(&path);
        }

        self.load_matched(ticket, &path, matched).await
    }

    /// 不执行前置回调、不写历史记录（用于初始路由与历史弹出）
    pub async fn load_route(&self, path: &str) -> NavigationOutcome {
        let path = normalize_path(path);
        let ticket = self.begin();

        match self.match_route(&path) {
            Some(matched) => self.load_matched(ticket, &path, matched).await,
            None => {
                tracing::error!(path = %path, "route not found");
                let err = SiteError::not_found(format!("Route not found: {}", path))
                    .in_op_with("router.load", path.as_str());
                self.fall_back_to_root(&path, err).await
            }
        }
    }

    /// 清空路由、回调与状态，并使进行中的导航失效；可重复调用
    pub fn destroy(&self) {
        self.routes.borrow_mut().clear();
        self.before.borrow_mut().clear();
        self.after.borrow_mut().clear();
        *self.state.borrow_mut() = NavigationState::default();
        self.generation.set(self.generation.get() + 1);
        tracing::debug!("router destroyed");
    }

    // --- Internals ---

    fn begin(&self) -> u64 {
        let ticket = self.generation.get() + 1;
        self.generation.set(ticket);
        self.state.borrow_mut().phase = NavigationPhase::Navigating;
        ticket
    }

    fn is_current(&self, ticket: u64) -> bool {
        self.generation.get() == ticket
    }

    async fn load_matched(&self, ticket: u64, path: &str, matched: RouteMatch) -> NavigationOutcome {
        let RouteMatch { route, params } = matched;
        let result = route.loader.load(&params).await;

        if !self.is_current(ticket) {
            tracing::debug!(path = %path, "navigation superseded");
            return NavigationOutcome::Superseded;
        }

        match result {
            Ok(payload) => self.commit(ticket, path, &route, payload).await,
            Err(err) => {
                let err = err.in_op_with("router.load", path);
                tracing::error!(path = %path, error = %err, "error loading route");
                self.fall_back_to_root(path, err).await
            }
        }
    }

    /// 回退到根路径一次；根路径自身失败时直接返回失败
    async fn fall_back_to_root(&self, failed_path: &str, err: SiteError) -> NavigationOutcome {
        if failed_path == "/" {
            self.state.borrow_mut().phase = NavigationPhase::Idle;
            return NavigationOutcome::Failed(err);
        }

        match Box::pin(self.navigate_with("/", false)).await {
            NavigationOutcome::Completed { path } => NavigationOutcome::Redirected {
                from: failed_path.to_string(),
                path,
            },
            NavigationOutcome::Redirected { path, .. } => NavigationOutcome::Redirected {
                from: failed_path.to_string(),
                path,
            },
            NavigationOutcome::Failed(root_err) => {
                self.state.borrow_mut().phase = NavigationPhase::Idle;
                NavigationOutcome::Failed(root_err)
            }
            other => other,
        }
    }

    async fn commit(
        &self,
        ticket: u64,
        path: &str,
        route: &Route,
        payload: ContentPayload,
    ) -> NavigationOutcome {
        if route.title.is_empty() {
            self.browser.set_title(&self.config.site_title);
        } else {
            self.browser.set_title(&route.title);
        }
        self.browser
            .set_body_attribute(&self.config.page_attribute, &page_identifier(path));

        if let Some(header) = &payload.header_content {
            if !self.browser.set_region_html(&self.config.header_region_id, header) {
                tracing::warn!(id = %self.config.header_region_id, "header content area not found");
            }
        }
        if let Some(body) = &payload.body_content {
            if !self.browser.set_region_html(&self.config.content_region_id, body) {
                tracing::error!(id = %self.config.content_region_id, "main content area not found");
            }
        }

        let previous = self
            .state
            .borrow_mut()
            .current_path
            .replace(path.to_string());
        tracing::info!(path = %path, route = %route.name, "navigation completed");

        let event = NavigationEvent {
            to: path.to_string(),
            from: previous,
        };
        let hooks = self.after.borrow().clone();
        for hook in hooks {
            if let Err(err) = hook.after_navigate(&event).await {
                tracing::error!(path = %path, error = %err, "after-navigation callback failed");
            }
        }
        // 回调期间可能已开始新的导航
        if self.is_current(ticket) {
            self.state.borrow_mut().phase = NavigationPhase::Ready;
        }

        self.browser.scroll_to_top();

        NavigationOutcome::Completed {
            path: path.to_string(),
        }
    }
}

#[cfg(test)]
mod tests;
