//! 原生 Web API 封装模块
//!
//! 此模块提供对浏览器原生 API 的轻量级封装，
//! 以及核心库两个接缝（HTTP 与浏览器）的实现。

mod browser;
pub mod dom;
mod http;
mod listener;
mod timer;

pub use browser::DomBrowser;
pub use http::WebHttpClient;
pub use listener::Listeners;
pub use timer::Timeout;
