//! Magyar Közlöny 浏览器前端
//!
//! 把核心库的路由器、内容提供者和组件模型接到真实 DOM 上：
//! - 全局链接拦截与 popstate
//! - 组件工厂注册与生命周期
//! - 页面内嵌配置的读取

mod web;
mod widgets;

use std::cell::RefCell;
use std::rc::Rc;

use kozlony::config::CONFIG_ELEMENT_ID;
use kozlony::pages::register_site_routes;
use kozlony::{
    LifecycleCoordinator, LinkDecision, LinkTarget, ListingLoader, NavigationOutcome,
    PageContentProvider, Router, SiteConfig, SiteError,
};
use kozlony_shared::GazetteCatalog;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Document, Event, MouseEvent};

use crate::web::{dom, DomBrowser, Listeners, WebHttpClient};
use crate::widgets::{
    DatePickerFactory, DropdownFactory, MobileMenuFactory, NavHighlightFactory, PaginatorFactory,
};

type SiteRouter = Router<DomBrowser>;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("无法获取 window 或 document 对象")]
    NoBrowser,
    #[error("路由注册失败: {0}")]
    Routes(#[from] SiteError),
}

thread_local! {
    static APP: RefCell<Option<App>> = const { RefCell::new(None) };
}

/// 读取页面内嵌的配置；缺失或无法解析时使用默认值
fn read_config(document: &Document) -> SiteConfig {
    let Some(json) = document
        .get_element_by_id(CONFIG_ELEMENT_ID)
        .and_then(|el| el.text_content())
    else {
        return SiteConfig::default();
    };

    SiteConfig::from_json(&json).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "invalid site config, using defaults");
        SiteConfig::default()
    })
}

pub(crate) fn log_outcome(path: &str, outcome: &NavigationOutcome) {
    match outcome {
        NavigationOutcome::Completed { .. } => tracing::debug!(path, "navigation completed"),
        NavigationOutcome::Redirected { from, path } => {
            tracing::warn!(%from, to = %path, "navigation redirected to root")
        }
        NavigationOutcome::Refused => tracing::info!(path, "navigation refused"),
        NavigationOutcome::Superseded => tracing::debug!(path, "navigation superseded"),
        NavigationOutcome::Failed(e) => tracing::error!(path, error = %e, "navigation failed"),
    }
}

fn navigate(router: &Rc<SiteRouter>, path: String) {
    let router = router.clone();
    spawn_local(async move {
        let outcome = router.navigate(&path).await;
        log_outcome(&path, &outcome);
    });
}

/// 全局点击拦截：站内链接交给路由器
fn on_document_click(router: &Rc<SiteRouter>, event: &Event) {
    if event.default_prevented() {
        return;
    }
    let Some(mouse) = event.dyn_ref::<MouseEvent>() else {
        return;
    };
    let Some(anchor) = dom::closest(event.target(), "a[href]") else {
        return;
    };

    let link = LinkTarget {
        href: anchor.get_attribute("href"),
        target: anchor.get_attribute("target"),
        download: anchor.has_attribute("download"),
        modified: mouse.ctrl_key()
            || mouse.meta_key()
            || mouse.shift_key()
            || mouse.alt_key()
            || mouse.button() != 0,
    };

    if let LinkDecision::Intercept(path) = router.resolve_link(&link) {
        event.prevent_default();
        navigate(router, path);
    }
}

pub struct App {
    router: Rc<SiteRouter>,
    provider: Rc<PageContentProvider<WebHttpClient>>,
    lifecycle: Rc<LifecycleCoordinator>,
    listeners: Listeners,
}

impl App {
    pub fn new() -> Result<Self, AppError> {
        let browser = DomBrowser::new().ok_or(AppError::NoBrowser)?;
        let config = read_config(browser.document());

        let catalog = Rc::new(GazetteCatalog::generate(&config.listing));
        let provider = Rc::new(PageContentProvider::new(WebHttpClient::new(), config.clone()));
        let listing = Rc::new(ListingLoader::new(catalog).with_shell(provider.clone()));

        let router = Rc::new(Router::new(browser, config));
        register_site_routes(&router, &provider, listing)?;

        let lifecycle = Rc::new(LifecycleCoordinator::new());
        lifecycle.register(Rc::new(MobileMenuFactory));
        lifecycle.register(Rc::new(NavHighlightFactory));
        lifecycle.register(Rc::new(DropdownFactory));
        lifecycle.register(Rc::new(DatePickerFactory));
        lifecycle.register(Rc::new(PaginatorFactory::new(&router)));
        router.after_navigate(lifecycle.clone());

        Ok(Self {
            router,
            provider,
            lifecycle,
            listeners: Listeners::new(),
        })
    }

    fn bind_global_listeners(&mut self) {
        let window = self.router.browser().window().clone();
        let document = self.router.browser().document().clone();

        let router = self.router.clone();
        self.listeners.add(&document, "click", move |e| {
            on_document_click(&router, &e);
        });

        // 前进 / 后退：不运行前置回调，也不写历史记录
        let router = self.router.clone();
        self.listeners.add(&window, "popstate", move |_| {
            let router = router.clone();
            spawn_local(async move {
                let outcome = router.handle_pop_state().await;
                let path = router.current_route().unwrap_or_default();
                log_outcome(&path, &outcome);
            });
        });
    }

    /// 挂载组件、绑定全局监听器并加载当前地址对应的路由
    pub fn start(&mut self) {
        self.lifecycle.mount();
        self.bind_global_listeners();

        let router = self.router.clone();
        spawn_local(async move {
            let outcome = router.start().await;
            let path = router.current_route().unwrap_or_default();
            log_outcome(&path, &outcome);
        });
        tracing::info!(routes = self.router.route_count(), "application started");
    }

    /// 移除监听器、销毁组件并使进行中的导航失效
    pub fn teardown(mut self) {
        self.listeners.clear();
        self.router.destroy();
        self.lifecycle.teardown();
        self.provider.clear_cache();
        tracing::info!("application torn down");
    }
}

/// 启动应用；重复调用时先拆除旧实例
pub fn start() {
    let mut app = match App::new() {
        Ok(app) => app,
        Err(e) => {
            tracing::error!(error = %e, "failed to initialize application");
            return;
        }
    };
    app.start();

    let previous = APP.with(|slot| slot.borrow_mut().replace(app));
    if let Some(previous) = previous {
        previous.teardown();
    }
}

/// 拆除当前应用实例
#[wasm_bindgen]
pub fn teardown() {
    if let Some(app) = APP.with(|slot| slot.borrow_mut().take()) {
        app.teardown();
    }
}
