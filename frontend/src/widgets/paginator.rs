//! 分页器的 DOM 绑定
//!
//! 页码链接本身交给路由器的全局点击拦截处理，这里只负责：
//! - 点击当前页时吞掉点击
//! - 派发冒泡的 `paginatorChange` 事件
//! - 上一页 / 下一页按钮通过路由器导航

use std::rc::{Rc, Weak};

use kozlony::paginator::{PaginatorClick, PaginatorState, PAGINATOR_CHANGE_EVENT};
use kozlony::widgets::{Widget, WidgetFactory, WidgetScope};
use kozlony::Router;
use wasm_bindgen::JsValue;
use web_sys::{CustomEvent, CustomEventInit, Element};

use crate::web::{dom, DomBrowser, Listeners};

fn page_of(element: &Element) -> Option<usize> {
    element
        .get_attribute("data-page")
        .or_else(|| element.text_content())
        .and_then(|p| p.trim().parse().ok())
}

/// 从已渲染的页码链接恢复分页状态
fn read_state(links: &[Element]) -> Option<PaginatorState> {
    let current = links
        .iter()
        .find(|link| link.class_list().contains("active"))
        .and_then(page_of)?;
    let total = links.iter().filter_map(page_of).max()?;
    Some(PaginatorState::new(current, total))
}

fn dispatch_change(paginator: &Element, link: &Element, page_number: usize) {
    let detail = js_sys::Object::new();
    let _ = js_sys::Reflect::set(
        &detail,
        &JsValue::from_str("pageNumber"),
        &JsValue::from_str(&page_number.to_string()),
    );
    let _ = js_sys::Reflect::set(&detail, &JsValue::from_str("pageElement"), link);

    let init = CustomEventInit::new();
    init.set_bubbles(true);
    init.set_detail(&detail);
    match CustomEvent::new_with_event_init_dict(PAGINATOR_CHANGE_EVENT, &init) {
        Ok(event) => {
            let _ = paginator.dispatch_event(&event);
        }
        Err(e) => tracing::warn!(error = ?e, "failed to create paginatorChange event"),
    }
}

fn sync_button(button: &Element, enabled: bool) {
    dom::toggle_class(button, "enabled", enabled);
    dom::toggle_class(button, "disabled", !enabled);
    let _ = if enabled {
        button.remove_attribute("disabled")
    } else {
        button.set_attribute("disabled", "")
    };
}

fn navigate(router: &Weak<Router<DomBrowser>>, target: Option<String>) {
    let (Some(router), Some(target)) = (router.upgrade(), target) else {
        return;
    };
    wasm_bindgen_futures::spawn_local(async move {
        let outcome = router.navigate(&target).await;
        crate::log_outcome(&target, &outcome);
    });
}

struct PaginatorWidget {
    listeners: Listeners,
}

impl Widget for PaginatorWidget {
    fn destroy(&mut self) {
        self.listeners.clear();
    }
}

pub struct PaginatorFactory {
    router: Weak<Router<DomBrowser>>,
}

impl PaginatorFactory {
    pub fn new(router: &Rc<Router<DomBrowser>>) -> Self {
        Self {
            router: Rc::downgrade(router),
        }
    }

    fn bind(&self, paginator: Element, listeners: &mut Listeners) {
        let links = dom::query_all_in(&paginator, ".paginator-page:not(.ellipsis)");
        let Some(state) = read_state(&links) else {
            return;
        };

        for link in links {
            let Some(page) = page_of(&link) else {
                continue;
            };
            let container = paginator.clone();
            let target = link.clone();
            listeners.add(&link, "click", move |e| match state.click(page) {
                PaginatorClick::Swallow => e.prevent_default(),
                PaginatorClick::Change { page_number, .. } => {
                    dispatch_change(&container, &target, page_number);
                }
            });
        }

        if let Some(prev) = dom::query_in(&paginator, ".paginator-button.prev") {
            sync_button(&prev, state.has_prev());
            let router = self.router.clone();
            listeners.add(&prev, "click", move |_| navigate(&router, state.prev_target()));
        }
        if let Some(next) = dom::query_in(&paginator, ".paginator-button.next") {
            sync_button(&next, state.has_next());
            let router = self.router.clone();
            listeners.add(&next, "click", move |_| navigate(&router, state.next_target()));
        }
    }
}

impl WidgetFactory for PaginatorFactory {
    fn name(&self) -> &str {
        "paginator"
    }

    fn scope(&self) -> WidgetScope {
        WidgetScope::Page
    }

    fn create(&self) -> Option<Box<dyn Widget>> {
        let document = dom::document()?;
        let paginators = dom::query_all(&document, ".paginator");
        if paginators.is_empty() {
            return None;
        }

        let mut listeners = Listeners::new();
        for paginator in paginators {
            self.bind(paginator, &mut listeners);
        }
        tracing::debug!(listeners = listeners.len(), "paginator bound");
        Some(Box::new(PaginatorWidget { listeners }))
    }
}
