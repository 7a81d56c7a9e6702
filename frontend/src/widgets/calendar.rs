//! 日期选择器的 DOM 绑定
//!
//! 每个 `[data-datepicker]` 输入框旁边追加一个 `.datepicker-calendar` 容器，
//! 每次状态变化后整体重绘；点击事件委托到容器上处理。

use std::cell::RefCell;
use std::rc::Rc;

use chrono::NaiveDate;
use kozlony::widgets::{DatePicker, Widget, WidgetFactory, WidgetScope};
use wasm_bindgen::JsCast;
use web_sys::{Element, HtmlInputElement};

use crate::web::{dom, Listeners};

/// 浏览器本地时区的今天
fn today() -> NaiveDate {
    let now = js_sys::Date::new_0();
    NaiveDate::from_ymd_opt(now.get_full_year() as i32, now.get_month() + 1, now.get_date())
        .unwrap_or_default()
}

fn render_calendar(picker: &DatePicker, today: NaiveDate) -> String {
    let mut out = format!(
        concat!(
            r#"<div class="datepicker-header">"#,
            r#"<button type="button" class="datepicker-prev">‹</button>"#,
            r#"<div class="datepicker-title">{}</div>"#,
            r#"<button type="button" class="datepicker-next">›</button>"#,
            r#"</div><div class="datepicker-weekdays">"#,
        ),
        picker.title()
    );
    for label in picker.weekday_labels() {
        out.push_str(&format!(r#"<div class="datepicker-weekday">{label}</div>"#));
    }
    out.push_str(r#"</div><div class="datepicker-grid">"#);
    for cell in picker.grid() {
        match cell {
            None => out.push_str("<div></div>"),
            Some(day) => {
                let today_class = if picker.is_today(day, today) { " is-today" } else { "" };
                out.push_str(&format!(
                    r#"<div class="datepicker-day{today_class}" data-day="{day}">{day}</div>"#
                ));
            }
        }
    }
    out.push_str("</div>");
    out
}

struct PickerDom {
    input: HtmlInputElement,
    calendar: Element,
    state: RefCell<DatePicker>,
    today: NaiveDate,
}

impl PickerDom {
    fn render(&self) {
        let state = self.state.borrow();
        self.calendar.set_inner_html(&render_calendar(&state, self.today));
        dom::set_style(
            &self.calendar,
            "display",
            if state.is_open() { "block" } else { "none" },
        );
    }

    fn open(&self) {
        self.state.borrow_mut().open();
        self.render();
    }

    fn close(&self) {
        if self.state.borrow_mut().close() {
            self.render();
        }
    }

    fn select(&self, day: u32) {
        let Some(value) = self.state.borrow_mut().select(day) else {
            return;
        };
        self.input.set_value(&value);
        dom::dispatch_change(&self.input);
        self.render();
        tracing::debug!(date = %value, "date selected");
    }

    /// 日历内部的点击：翻月或选日
    fn handle_calendar_click(&self, target: Option<Element>) {
        let Some(target) = target else {
            return;
        };
        if target.closest(".datepicker-prev").ok().flatten().is_some() {
            self.state.borrow_mut().previous_month();
            self.render();
        } else if target.closest(".datepicker-next").ok().flatten().is_some() {
            self.state.borrow_mut().next_month();
            self.render();
        } else if let Some(day) = target
            .closest(".datepicker-day")
            .ok()
            .flatten()
            .and_then(|el| el.get_attribute("data-day"))
            .and_then(|d| d.parse::<u32>().ok())
        {
            self.select(day);
        }
    }
}

struct DatePickerWidget {
    pickers: Vec<Rc<PickerDom>>,
    listeners: Listeners,
}

impl Widget for DatePickerWidget {
    fn destroy(&mut self) {
        self.listeners.clear();
        for picker in self.pickers.drain(..) {
            picker.calendar.remove();
        }
    }
}

pub struct DatePickerFactory;

impl WidgetFactory for DatePickerFactory {
    fn name(&self) -> &str {
        "date-picker"
    }

    fn scope(&self) -> WidgetScope {
        WidgetScope::Page
    }

    fn create(&self) -> Option<Box<dyn Widget>> {
        let document = dom::document()?;
        let inputs: Vec<HtmlInputElement> = dom::query_all(&document, "[data-datepicker]")
            .into_iter()
            .filter_map(|el| el.dyn_into::<HtmlInputElement>().ok())
            .collect();
        if inputs.is_empty() {
            return None;
        }

        let today = today();
        let mut pickers = Vec::with_capacity(inputs.len());
        for input in inputs {
            let Some(parent) = input.parent_element() else {
                continue;
            };
            let Ok(calendar) = document.create_element("div") else {
                continue;
            };
            calendar.set_class_name("datepicker-calendar");
            dom::set_style(&parent, "position", "relative");
            if parent.append_child(&calendar).is_err() {
                continue;
            }

            let picker = Rc::new(PickerDom {
                input,
                calendar,
                state: RefCell::new(DatePicker::new(today)),
                today,
            });
            picker.render();
            pickers.push(picker);
        }

        let pickers = Rc::new(pickers);
        let mut listeners = Listeners::new();

        for picker in pickers.iter() {
            let all = pickers.clone();
            let this = picker.clone();
            listeners.add(&picker.input, "click", move |e| {
                e.stop_propagation();
                for other in all.iter() {
                    other.close();
                }
                this.open();
            });

            let this = picker.clone();
            listeners.add(&picker.calendar, "click", move |e| {
                e.stop_propagation();
                this.handle_calendar_click(dom::target_element(&e));
            });
        }

        // 点击外部关闭
        let all = pickers.clone();
        listeners.add(&document, "click", move |e| {
            if dom::closest(e.target(), ".datepicker-calendar").is_some() {
                return;
            }
            let target = dom::target_element(&e);
            for picker in all.iter() {
                let input: &Element = &picker.input;
                if target.as_ref() != Some(input) {
                    picker.close();
                }
            }
        });

        tracing::info!(count = pickers.len(), "date pickers initialized");
        Some(Box::new(DatePickerWidget {
            pickers: pickers.iter().cloned().collect(),
            listeners,
        }))
    }
}
