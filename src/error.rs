use std::fmt;

use serde::{Deserialize, Serialize};

// =========================================================
// 错误状态枚举
// =========================================================

/// 错误状态枚举
///
/// 所有错误都只影响单次导航，不存在致命错误。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SiteErrorStatus {
    /// 没有匹配的路由（重定向到首页）
    NotFound,
    /// 文档请求返回非 2xx 或无法读取
    FetchFailure,
    /// 挂载点不存在（仅记录日志）
    MissingMountPoint,
    /// 导航前回调拒绝继续
    CallbackRefusal,
    /// 配置无法解析
    InvalidConfig,
}

impl SiteErrorStatus {
    /// 机器可读的错误代码
    pub fn error_code(&self) -> &'static str {
        match self {
            SiteErrorStatus::NotFound => "ROUTE_NOT_FOUND",
            SiteErrorStatus::FetchFailure => "FETCH_FAILURE",
            SiteErrorStatus::MissingMountPoint => "MISSING_MOUNT_POINT",
            SiteErrorStatus::CallbackRefusal => "CALLBACK_REFUSAL",
            SiteErrorStatus::InvalidConfig => "INVALID_CONFIG",
        }
    }
}

// =========================================================
// 错误上下文追踪
// =========================================================

/// 结构化的错误追踪片段
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorSpan {
    /// 操作名称，如 "content.fetch", "router.load"
    pub operation: String,
    /// 额外的细节信息，如路径、文档名
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ErrorSpan {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            detail: None,
        }
    }

    pub fn with_detail(operation: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            detail: Some(detail.into()),
        }
    }
}

// =========================================================
// 核心错误类型
// =========================================================

/// 站点错误
///
/// - status: 错误类型
/// - message: 错误消息
/// - source: 原始错误（可选）
/// - spans: 操作追踪栈
#[derive(Debug)]
pub struct SiteError {
    pub status: SiteErrorStatus,
    pub message: String,
    source: Option<Box<dyn std::error::Error + 'static>>,
    spans: Vec<ErrorSpan>,
}

impl SiteError {
    pub fn new(status: SiteErrorStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            source: None,
            spans: Vec::new(),
        }
    }

    // --- Convenience constructors ---

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(SiteErrorStatus::NotFound, message)
    }

    pub fn fetch_failure(message: impl Into<String>) -> Self {
        Self::new(SiteErrorStatus::FetchFailure, message)
    }

    pub fn missing_mount_point(message: impl Into<String>) -> Self {
        Self::new(SiteErrorStatus::MissingMountPoint, message)
    }

    pub fn callback_refusal(message: impl Into<String>) -> Self {
        Self::new(SiteErrorStatus::CallbackRefusal, message)
    }

    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::new(SiteErrorStatus::InvalidConfig, message)
    }

    // --- Context builders ---

    /// 添加操作追踪（无额外细节）
    pub fn in_op(mut self, operation: impl Into<String>) -> Self {
        self.spans.push(ErrorSpan::new(operation));
        self
    }

    /// 添加操作追踪（带额外细节）
    pub fn in_op_with(mut self, operation: impl Into<String>, detail: impl Into<String>) -> Self {
        self.spans.push(ErrorSpan::with_detail(operation, detail));
        self
    }

    /// 设置原始错误源
    pub fn with_source<E: std::error::Error + 'static>(mut self, source: E) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    // --- Accessors ---

    pub fn error_code(&self) -> &'static str {
        self.status.error_code()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn spans(&self) -> &[ErrorSpan] {
        &self.spans
    }
}

impl fmt::Display for SiteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.error_code(), self.message)?;

        if !self.spans.is_empty() {
            write!(f, " | trace: ")?;
            for (i, span) in self.spans.iter().enumerate() {
                if i > 0 {
                    write!(f, " -> ")?;
                }
                write!(f, "{}", span.operation)?;
                if let Some(detail) = &span.detail {
                    write!(f, "({})", detail)?;
                }
            }
        }
        Ok(())
    }
}

impl std::error::Error for SiteError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_deref()
    }
}

pub type SiteResult<T> = std::result::Result<T, SiteError>;

// =========================================================
// 类型转换实现
// =========================================================

impl From<serde_json::Error> for SiteError {
    fn from(e: serde_json::Error) -> Self {
        SiteError::invalid_config(e.to_string()).with_source(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_display_without_spans() {
        let err = SiteError::not_found("no route for /x");
        assert_eq!(err.to_string(), "[ROUTE_NOT_FOUND] no route for /x");
    }

    #[test]
    fn test_display_with_spans() {
        let err = SiteError::fetch_failure("status 500")
            .in_op_with("content.fetch", "rss.html")
            .in_op("router.load");

        assert_eq!(
            err.to_string(),
            "[FETCH_FAILURE] status 500 | trace: content.fetch(rss.html) -> router.load"
        );
        assert_eq!(err.spans().len(), 2);
    }

    #[test]
    fn test_callback_refusal_display() {
        let err = SiteError::callback_refusal("Navigation refused by callback")
            .in_op_with("router.navigate", "/rss");

        assert_eq!(err.status.error_code(), "CALLBACK_REFUSAL");
        assert_eq!(
            err.to_string(),
            "[CALLBACK_REFUSAL] Navigation refused by callback | trace: router.navigate(/rss)"
        );
    }

    #[test]
    fn test_json_error_converts_to_invalid_config() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = SiteError::from(json_err);

        assert_eq!(err.status, SiteErrorStatus::InvalidConfig);
        assert!(err.source().is_some());
    }
}
