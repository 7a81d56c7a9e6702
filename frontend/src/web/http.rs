//! HTTP 请求封装模块
//!
//! 使用 `web_sys::fetch` 实现核心库的 [`HttpClient`] 接缝。

use kozlony::{HttpClient, HttpRequest, HttpResponse, SiteError, SiteResult};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Headers, Request, RequestInit, Response};

/// HTTP 错误类型
#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    /// 请求构建失败
    #[error("请求构建失败: {0}")]
    RequestBuildFailed(String),
    /// 网络请求失败
    #[error("网络错误: {0}")]
    NetworkError(String),
    /// 响应解析失败
    #[error("响应解析失败: {0}")]
    ResponseParseFailed(String),
}

impl From<HttpError> for SiteError {
    fn from(err: HttpError) -> Self {
        SiteError::fetch_failure(err.to_string())
            .in_op("web_fetch")
            .with_source(err)
    }
}

/// 基于浏览器 fetch 的客户端
#[derive(Debug, Clone, Copy, Default)]
pub struct WebHttpClient;

impl WebHttpClient {
    pub fn new() -> Self {
        Self
    }

    fn build_request(req: &HttpRequest) -> Result<Request, HttpError> {
        let headers = Headers::new()
            .map_err(|e| HttpError::RequestBuildFailed(format!("创建 Headers 失败: {:?}", e)))?;

        for (key, value) in &req.headers {
            headers
                .set(key, value)
                .map_err(|e| HttpError::RequestBuildFailed(format!("设置 Header 失败: {:?}", e)))?;
        }

        let opts = RequestInit::new();
        opts.set_method(req.method.as_str());
        opts.set_headers(&headers.into());

        Request::new_with_str_and_init(&req.url, &opts)
            .map_err(|e| HttpError::RequestBuildFailed(format!("{:?}", e)))
    }

    async fn fetch(req: &HttpRequest) -> Result<HttpResponse, HttpError> {
        let request = Self::build_request(req)?;

        let window = web_sys::window()
            .ok_or_else(|| HttpError::NetworkError("无法获取 window 对象".to_string()))?;

        let resp_value = JsFuture::from(window.fetch_with_request(&request))
            .await
            .map_err(|e| HttpError::NetworkError(format!("{:?}", e)))?;

        let response: Response = resp_value.dyn_into().map_err(|e| {
            HttpError::ResponseParseFailed(format!("Response 类型转换失败: {:?}", e))
        })?;

        let body = Self::text(&response).await?;

        Ok(HttpResponse {
            status: response.status(),
            status_text: response.status_text(),
            body,
        })
    }

    async fn text(response: &Response) -> Result<String, HttpError> {
        let promise = response
            .text()
            .map_err(|e| HttpError::ResponseParseFailed(format!("{:?}", e)))?;

        let text = JsFuture::from(promise)
            .await
            .map_err(|e| HttpError::ResponseParseFailed(format!("{:?}", e)))?;

        text.as_string()
            .ok_or_else(|| HttpError::ResponseParseFailed("无法转换为字符串".to_string()))
    }
}

#[async_trait::async_trait(?Send)]
impl HttpClient for WebHttpClient {
    async fn send(&self, req: HttpRequest) -> SiteResult<HttpResponse> {
        tracing::trace!(method = req.method.as_str(), url = %req.url, "fetch");
        Ok(Self::fetch(&req).await?)
    }
}

