//! 下拉选择框的 DOM 绑定
//!
//! `[data-dropdown="menu-id"]` 触发按钮对应 `#menu-id` 菜单，
//! 选项为菜单内的 `.dropdown-item[data-value]`；同一时刻最多打开一个。

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use kozlony::widgets::{Dropdown, DropdownItem, DropdownKey, Widget, WidgetFactory, WidgetScope};
use wasm_bindgen::JsCast;
use web_sys::{Element, Event, HtmlInputElement, KeyboardEvent};

use crate::web::{dom, Listeners};

struct DropdownDom {
    trigger: Element,
    menu: Element,
    hidden_input: Option<HtmlInputElement>,
    selected_text: Option<Element>,
    items: Vec<Element>,
    state: RefCell<Dropdown>,
}

impl DropdownDom {
    fn build(trigger: Element, menu: Element) -> Self {
        let wrapper = trigger.closest(".dropdown-wrapper").ok().flatten();
        let hidden_input = wrapper
            .as_ref()
            .and_then(|w| dom::query_in(w, r#"input[type="hidden"]"#))
            .and_then(|input| input.dyn_into::<HtmlInputElement>().ok());
        let selected_text = dom::query_in(&trigger, ".dropdown-selected-text");
        let items = dom::query_all_in(&menu, ".dropdown-item");

        let models: Vec<DropdownItem> = items
            .iter()
            .map(|item| DropdownItem {
                value: item.get_attribute("data-value").unwrap_or_default(),
                label: item.text_content().unwrap_or_default().trim().to_string(),
            })
            .collect();
        let initial = hidden_input.as_ref().map(HtmlInputElement::value);
        let state = Dropdown::new(models, initial.as_deref());

        dom::set_style(&menu, "display", "none");
        let _ = menu.set_attribute("role", "listbox");
        let _ = menu.set_attribute("tabindex", "-1");
        for (index, item) in items.iter().enumerate() {
            let _ = item.set_attribute("role", "option");
            let _ = item.set_attribute("tabindex", "-1");
            let _ = item.set_attribute("data-index", &index.to_string());
        }

        let dropdown = Self {
            trigger,
            menu,
            hidden_input,
            selected_text,
            items,
            state: RefCell::new(state),
        };
        dropdown.render();
        dropdown
    }

    /// 把模型状态写回 DOM
    fn render(&self) {
        let state = self.state.borrow();
        let open = state.is_open();

        dom::set_style(&self.menu, "display", if open { "block" } else { "none" });
        let _ = self
            .trigger
            .set_attribute("aria-expanded", if open { "true" } else { "false" });
        dom::toggle_class(&self.trigger, "dropdown-open", open);

        for (index, item) in self.items.iter().enumerate() {
            let focused = state.focused_index() == Some(index);
            dom::toggle_class(item, "is-focused", focused);
            let _ = item.set_attribute("aria-selected", if focused { "true" } else { "false" });
            dom::toggle_class(item, "is-active", state.selected_index() == index);
        }

        if let Some(index) = state.focused_index() {
            if let Some(item) = self.items.get(index) {
                dom::focus(item);
            }
        }
    }

    fn commit_selection(&self) {
        let (value, label) = {
            let state = self.state.borrow();
            (
                state.value().unwrap_or_default().to_string(),
                state.selected_label().unwrap_or_default().to_string(),
            )
        };

        if let Some(text) = &self.selected_text {
            text.set_text_content(Some(&label));
        }
        if let Some(input) = &self.hidden_input {
            input.set_value(&value);
            dom::dispatch_change(input);
        }
        tracing::debug!(%value, %label, "dropdown item selected");
    }
}

/// 页面上的全部下拉框
struct DropdownGroup {
    dropdowns: Vec<DropdownDom>,
    active: Cell<Option<usize>>,
}

impl DropdownGroup {
    fn open(&self, index: usize) {
        if let Some(active) = self.active.get().filter(|&a| a != index) {
            self.close(active);
        }
        let Some(dropdown) = self.dropdowns.get(index) else {
            return;
        };
        dropdown.state.borrow_mut().open();
        self.active.set(Some(index));
        dropdown.render();
    }

    fn close(&self, index: usize) {
        let Some(dropdown) = self.dropdowns.get(index) else {
            return;
        };
        if !dropdown.state.borrow_mut().close() {
            return;
        }
        if self.active.get() == Some(index) {
            self.active.set(None);
        }
        dropdown.render();
        dom::focus(&dropdown.trigger);
    }

    fn close_active(&self) {
        if let Some(active) = self.active.get() {
            self.close(active);
        }
    }

    fn toggle(&self, index: usize) {
        let open = self
            .dropdowns
            .get(index)
            .is_some_and(|d| d.state.borrow().is_open());
        if open {
            self.close(index);
        } else {
            self.open(index);
        }
    }

    fn focus_item(&self, index: usize, item: usize) {
        if let Some(dropdown) = self.dropdowns.get(index) {
            if dropdown.state.borrow_mut().focus(item) {
                dropdown.render();
            }
        }
    }

    fn select(&self, index: usize, item: usize) {
        let Some(dropdown) = self.dropdowns.get(index) else {
            return;
        };
        if dropdown.state.borrow_mut().select(item).is_none() {
            return;
        }
        dropdown.commit_selection();
        self.after_key(index, true);
    }

    /// 键盘或选择之后同步打开状态与焦点
    fn after_key(&self, index: usize, was_open: bool) {
        let Some(dropdown) = self.dropdowns.get(index) else {
            return;
        };
        let open = dropdown.state.borrow().is_open();
        if open {
            if let Some(active) = self.active.get().filter(|&a| a != index) {
                self.close(active);
            }
            self.active.set(Some(index));
        } else if self.active.get() == Some(index) {
            self.active.set(None);
        }
        dropdown.render();
        if was_open && !open {
            dom::focus(&dropdown.trigger);
        }
    }

    fn handle_trigger_key(&self, index: usize, event: &Event) {
        let Some(key) = key_of(event) else {
            return;
        };
        let Some(dropdown) = self.dropdowns.get(index) else {
            return;
        };
        let was_open = dropdown.state.borrow().is_open();
        if dropdown.state.borrow_mut().handle_trigger_key(key) {
            event.prevent_default();
        }
        self.after_key(index, was_open);
    }

    fn handle_item_key(&self, index: usize, event: &Event) {
        let Some(key) = key_of(event) else {
            return;
        };
        let Some(dropdown) = self.dropdowns.get(index) else {
            return;
        };
        let was_open = dropdown.state.borrow().is_open();
        let prevent = dropdown.state.borrow_mut().handle_item_key(key);
        if prevent {
            event.prevent_default();
            if matches!(key, DropdownKey::Enter | DropdownKey::Space) {
                dropdown.commit_selection();
            }
        }
        self.after_key(index, was_open);
    }
}

fn key_of(event: &Event) -> Option<DropdownKey> {
    event
        .dyn_ref::<KeyboardEvent>()
        .map(|e| DropdownKey::from_key(&e.key()))
}

struct DropdownWidget {
    group: Rc<DropdownGroup>,
    listeners: Listeners,
}

impl Widget for DropdownWidget {
    fn destroy(&mut self) {
        self.group.close_active();
        self.listeners.clear();
    }
}

pub struct DropdownFactory;

impl WidgetFactory for DropdownFactory {
    fn name(&self) -> &str {
        "dropdown"
    }

    fn scope(&self) -> WidgetScope {
        WidgetScope::Page
    }

    fn create(&self) -> Option<Box<dyn Widget>> {
        let document = dom::document()?;
        let triggers = dom::query_all(&document, "[data-dropdown]");
        if triggers.is_empty() {
            return None;
        }

        let dropdowns: Vec<DropdownDom> = triggers
            .into_iter()
            .filter_map(|trigger| {
                let menu_id = trigger.get_attribute("data-dropdown").unwrap_or_default();
                match document.get_element_by_id(&menu_id) {
                    Some(menu) => Some(DropdownDom::build(trigger, menu)),
                    None => {
                        tracing::error!(menu = %menu_id, "dropdown menu not found");
                        None
                    }
                }
            })
            .collect();
        if dropdowns.is_empty() {
            return None;
        }

        let group = Rc::new(DropdownGroup {
            dropdowns,
            active: Cell::new(None),
        });
        let mut listeners = Listeners::new();

        for (index, dropdown) in group.dropdowns.iter().enumerate() {
            let g = group.clone();
            listeners.add(&dropdown.trigger, "click", move |e| {
                e.prevent_default();
                e.stop_propagation();
                g.toggle(index);
            });

            let g = group.clone();
            listeners.add(&dropdown.trigger, "keydown", move |e| {
                g.handle_trigger_key(index, &e);
            });

            for (item_index, item) in dropdown.items.iter().enumerate() {
                let g = group.clone();
                listeners.add(item, "click", move |e| {
                    e.prevent_default();
                    e.stop_propagation();
                    g.select(index, item_index);
                });

                let g = group.clone();
                listeners.add(item, "mouseenter", move |_| {
                    g.focus_item(index, item_index);
                });

                let g = group.clone();
                listeners.add(item, "keydown", move |e| {
                    g.handle_item_key(index, &e);
                });
            }
        }

        // 点击外部关闭
        let g = group.clone();
        listeners.add(&document, "click", move |e| {
            if dom::closest(e.target(), ".dropdown-wrapper").is_none() {
                g.close_active();
            }
        });

        let g = group.clone();
        listeners.add(&document, "keydown", move |e| {
            if key_of(&e) == Some(DropdownKey::Escape) {
                g.close_active();
            }
        });

        tracing::info!(count = group.dropdowns.len(), "dropdowns initialized");
        Some(Box::new(DropdownWidget { group, listeners }))
    }
}
