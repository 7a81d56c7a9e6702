//! 移动端菜单

use std::cell::RefCell;
use std::rc::Rc;

use kozlony::widgets::menu::CLOSE_TRANSITION_MS;
use kozlony::widgets::{MobileMenu, Widget, WidgetFactory, WidgetScope};
use wasm_bindgen::JsCast;
use web_sys::{Element, KeyboardEvent};

use crate::web::{dom, Listeners, Timeout};

struct MenuDom {
    menu: Element,
    body: Option<Element>,
    state: RefCell<MobileMenu>,
    pending_close: RefCell<Option<Timeout>>,
}

impl MenuDom {
    fn open(&self) {
        if !self.state.borrow_mut().open() {
            return;
        }
        // 重新打开时取消尚未完成的关闭动画
        self.pending_close.borrow_mut().take();
        dom::set_style(&self.menu, "display", "flex");
        if let Some(body) = &self.body {
            dom::set_style(body, "overflow", "hidden");
        }
        dom::toggle_class(&self.menu, "is-open", true);
        tracing::debug!("mobile menu opened");
    }

    fn close(this: &Rc<Self>) {
        if this.state.borrow_mut().close() {
            Self::start_close_transition(this);
        }
    }

    fn start_close_transition(this: &Rc<Self>) {
        dom::toggle_class(&this.menu, "is-open", false);

        let weak = Rc::downgrade(this);
        let timeout = Timeout::new(CLOSE_TRANSITION_MS, move || {
            if let Some(this) = weak.upgrade() {
                this.finish_close();
            }
        });
        if timeout.is_none() {
            this.finish_close();
        }
        *this.pending_close.borrow_mut() = timeout;
        tracing::debug!("mobile menu closed");
    }

    fn finish_close(&self) {
        if !self.state.borrow_mut().finish_close() {
            return;
        }
        dom::set_style(&self.menu, "display", "none");
        if let Some(body) = &self.body {
            dom::set_style(body, "overflow", "");
        }
    }
}

struct MobileMenuWidget {
    dom: Rc<MenuDom>,
    listeners: Listeners,
}

impl Widget for MobileMenuWidget {
    fn destroy(&mut self) {
        self.listeners.clear();
        self.dom.pending_close.borrow_mut().take();
    }
}

pub struct MobileMenuFactory;

impl WidgetFactory for MobileMenuFactory {
    fn name(&self) -> &str {
        "mobile-menu"
    }

    fn scope(&self) -> WidgetScope {
        WidgetScope::Shell
    }

    fn create(&self) -> Option<Box<dyn Widget>> {
        let document = dom::document()?;
        let (Some(menu), Some(icon)) = (
            document.query_selector(".mobile-menu").ok().flatten(),
            document.query_selector(".menu-icon").ok().flatten(),
        ) else {
            tracing::warn!("mobile menu elements not found");
            return None;
        };
        let close_button = document.query_selector(".close-button").ok().flatten();

        let dom = Rc::new(MenuDom {
            menu: menu.clone(),
            body: document.body().map(Into::into),
            state: RefCell::new(MobileMenu::new()),
            pending_close: RefCell::new(None),
        });
        let mut listeners = Listeners::new();

        let d = dom.clone();
        listeners.add(&icon, "click", move |e| {
            e.prevent_default();
            d.open();
        });

        if let Some(button) = close_button {
            let d = dom.clone();
            listeners.add(&button, "click", move |e| {
                e.prevent_default();
                MenuDom::close(&d);
            });
        }

        // 点击遮罩本身关闭
        let d = dom.clone();
        listeners.add(&menu, "click", move |e| {
            let on_backdrop = e
                .target()
                .and_then(|t| t.dyn_into::<Element>().ok())
                .is_some_and(|t| t == d.menu);
            if on_backdrop {
                MenuDom::close(&d);
            }
        });

        let d = dom.clone();
        listeners.add(&document, "keydown", move |e| {
            let Some(key) = e.dyn_ref::<KeyboardEvent>().map(KeyboardEvent::key) else {
                return;
            };
            let closing = d.state.borrow_mut().handle_key(&key);
            if closing {
                MenuDom::start_close_transition(&d);
            }
        });

        tracing::info!("mobile menu initialized");
        Some(Box::new(MobileMenuWidget { dom, listeners }))
    }
}
