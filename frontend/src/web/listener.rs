//! 事件监听器封装
//!
//! 封装 `addEventListener`。当 `EventListener` 被 drop 时，自动移除监听器。

use wasm_bindgen::prelude::*;
use web_sys::{Event, EventTarget};

pub struct EventListener {
    target: EventTarget,
    event: &'static str,
    closure: Closure<dyn FnMut(Event)>,
}

impl EventListener {
    /// 注册监听器；注册失败时返回 `None`
    pub fn new<F>(target: &EventTarget, event: &'static str, callback: F) -> Option<Self>
    where
        F: FnMut(Event) + 'static,
    {
        let closure = Closure::<dyn FnMut(Event)>::new(callback);
        if let Err(e) =
            target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
        {
            tracing::warn!(event, error = ?e, "addEventListener failed");
            return None;
        }

        Some(Self {
            target: target.clone(),
            event,
            closure,
        })
    }
}

impl Drop for EventListener {
    fn drop(&mut self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.event, self.closure.as_ref().unchecked_ref());
    }
}

/// 收集监听器，忽略注册失败的
#[derive(Default)]
pub struct Listeners(Vec<EventListener>);

impl Listeners {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<F>(&mut self, target: &EventTarget, event: &'static str, callback: F)
    where
        F: FnMut(Event) + 'static,
    {
        if let Some(listener) = EventListener::new(target, event, callback) {
            self.0.push(listener);
        }
    }

    /// 移除全部监听器
    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}
