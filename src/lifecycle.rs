//! 组件生命周期协调
//!
//! 外壳组件在 `mount` 时创建一次；页面组件在每次导航完成后销毁并重建。

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::SiteResult;
use crate::router::{AfterNavigate, NavigationEvent};
use crate::widgets::{Widget, WidgetFactory, WidgetScope};

struct LiveWidget {
    name: String,
    scope: WidgetScope,
    widget: Box<dyn Widget>,
}

#[derive(Default)]
pub struct LifecycleCoordinator {
    factories: RefCell<Vec<Rc<dyn WidgetFactory>>>,
    live: RefCell<Vec<LiveWidget>>,
}

impl LifecycleCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, factory: Rc<dyn WidgetFactory>) {
        self.factories.borrow_mut().push(factory);
    }

    /// 创建全部组件；已挂载的先销毁
    pub fn mount(&self) {
        self.teardown();
        let factories = self.factories.borrow().clone();
        let created = Self::create_all(factories.iter());
        tracing::info!(count = created.len(), "widgets mounted");
        self.live.borrow_mut().extend(created);
    }

    /// 销毁并重建页面组件，外壳组件保持不变
    pub fn rebind(&self) {
        let stale: Vec<LiveWidget> = {
            let mut live = self.live.borrow_mut();
            let (page, shell): (Vec<_>, Vec<_>) = live
                .drain(..)
                .partition(|w| w.scope == WidgetScope::Page);
            *live = shell;
            page
        };
        Self::destroy_all(stale);

        let factories = self.factories.borrow().clone();
        let created = Self::create_all(
            factories
                .iter()
                .filter(|f| f.scope() == WidgetScope::Page),
        );
        tracing::debug!(count = created.len(), "page widgets rebound");
        self.live.borrow_mut().extend(created);
    }

    /// 销毁全部组件；可重复调用
    pub fn teardown(&self) {
        let all: Vec<LiveWidget> = self.live.borrow_mut().drain(..).collect();
        Self::destroy_all(all);
    }

    pub fn live_count(&self) -> usize {
        self.live.borrow().len()
    }

    pub fn live_names(&self) -> Vec<String> {
        self.live.borrow().iter().map(|w| w.name.clone()).collect()
    }

    fn create_all<'a>(factories: impl Iterator<Item = &'a Rc<dyn WidgetFactory>>) -> Vec<LiveWidget> {
        factories
            .filter_map(|factory| match factory.create() {
                Some(widget) => Some(LiveWidget {
                    name: factory.name().to_string(),
                    scope: factory.scope(),
                    widget,
                }),
                None => {
                    tracing::debug!(widget = factory.name(), "no elements for widget");
                    None
                }
            })
            .collect()
    }

    fn destroy_all(widgets: Vec<LiveWidget>) {
        for mut live in widgets {
            live.widget.destroy();
        }
    }
}

#[async_trait::async_trait(?Send)]
impl AfterNavigate for LifecycleCoordinator {
    async fn after_navigate(&self, event: &NavigationEvent) -> SiteResult<()> {
        tracing::debug!(path = %event.to, "rebinding widgets after navigation");
        self.rebind();
        Ok(())
    }
}
