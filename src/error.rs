//! Error types for ai-helper.
//!
//! Only caller-side configuration mistakes are meant to reach the caller of
//! [`AiHelper::ask`](crate::AiHelper::ask). Everything that can go wrong at runtime
//! (provider hiccups, broken tools, malformed model output, unreachable pricing) is
//! recovered locally and degrades into lower-confidence results instead.
//!
//! # Error Types
//!
//! [`LlmError`] covers:
//! - Configuration errors (unknown tool names, malformed model identifiers, bad settings)
//! - Transport failures inside the HTTP collaborators (pricing fetch, provider adapter)
//! - Rate limiting and timeouts (retried by the HTTP collaborators)
//! - Pricing and usage-storage failures (logged, never surfaced by `ask`)
//!
//! ```rust
//! use ai_helper::{LlmError, LlmResult};
//!
//! fn pick_tool(name: &str) -> LlmResult<&str> {
//!     if name.is_empty() {
//!         return Err(LlmError::configuration_error("tool name must not be empty"));
//!     }
//!     Ok(name)
//! }
//!
//! assert!(pick_tool("").is_err());
//! ```

use crate::logging::{log_error, log_warn};
use thiserror::Error;

// ============================================================================
// Error categorization types
// ============================================================================

/// High-level categorization of errors for routing and handling decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Expected outcomes that are reported through the error channel.
    BusinessLogic,

    /// External service failures (LLM providers, pricing endpoint, storage).
    External,

    /// Internal system errors (bugs, invariant violations).
    Internal,

    /// Client errors the caller can fix (configuration, unknown tool names).
    Client,

    /// Temporary failures that may succeed when retried.
    Transient,
}

/// Severity level for logging and alerting decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// System is unusable or data integrity is at risk.
    Critical,
    /// Action failed but the system is stable.
    Error,
    /// Unexpected but recoverable.
    Warning,
    /// Expected failure.
    Info,
}

// ============================================================================
// Error enum
// ============================================================================

/// Convenient result type for ai-helper operations.
pub type LlmResult<T> = std::result::Result<T, LlmError>;

/// Errors that can occur while configuring or running the orchestration engine.
///
/// | Variant | Category | Retryable |
/// |---------|----------|-----------|
/// | `UnsupportedProvider` | Client | No |
/// | `ConfigurationError` | Client | No |
/// | `UnknownTool` | Client | No |
/// | `RequestFailed` | External | Yes |
/// | `RequestRejected` | Client | No |
/// | `ResponseParsingError` | External | No |
/// | `RateLimitExceeded` | Transient | Yes |
/// | `Timeout` | Transient | Yes |
/// | `AuthenticationFailed` | Client | No |
/// | `PricingUnavailable` | External | No |
/// | `StorageFailed` | External | No |
#[derive(Error, Debug)]
pub enum LlmError {
    /// The provider tag of a model identifier is not known, or no adapter
    /// constructor is registered for it.
    #[error("Provider not supported: {provider}")]
    UnsupportedProvider {
        /// The provider tag that was requested.
        provider: String,
    },

    /// Configuration is invalid or incomplete.
    #[error("Configuration error: {message}")]
    ConfigurationError {
        /// Description of the configuration problem.
        message: String,
    },

    /// The caller asked for a tool that was never registered.
    #[error("Unknown tool requested: {tool_name}")]
    UnknownTool {
        /// The tool name that could not be resolved.
        tool_name: String,
    },

    /// An HTTP request made by a collaborator failed.
    #[error("Request failed: {message}")]
    RequestFailed {
        /// Description of the failure.
        message: String,
        /// The underlying error, if available.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The remote service refused the request as malformed or not allowed.
    #[error("Request rejected with status {status}: {message}")]
    RequestRejected {
        /// HTTP status code.
        status: u16,
        /// Response body or reason.
        message: String,
    },

    /// A remote response could not be parsed.
    #[error("Response parsing failed: {message}")]
    ResponseParsingError {
        /// Details about the parsing failure.
        message: String,
    },

    /// The remote service is throttling requests.
    #[error("Rate limit exceeded, retry after {retry_after_seconds}s")]
    RateLimitExceeded {
        /// Recommended wait time before retrying.
        retry_after_seconds: u64,
    },

    /// A request did not complete in time.
    #[error("Request timed out after {timeout_seconds}s")]
    Timeout {
        /// The timeout that was exceeded.
        timeout_seconds: u64,
    },

    /// The remote service rejected the credentials.
    #[error("Authentication failed: {message}")]
    AuthenticationFailed {
        /// Details about the authentication failure.
        message: String,
    },

    /// The pricing table could not be fetched.
    #[error("Pricing unavailable: {message}")]
    PricingUnavailable {
        /// Details about the pricing failure.
        message: String,
    },

    /// A usage store could not persist or load records.
    #[error("Usage storage failed: {message}")]
    StorageFailed {
        /// Details about the storage failure.
        message: String,
    },
}

impl LlmError {
    /// Get the error category for routing and handling decisions.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::UnsupportedProvider { .. } => ErrorCategory::Client,
            Self::ConfigurationError { .. } => ErrorCategory::Client,
            Self::UnknownTool { .. } => ErrorCategory::Client,
            Self::RequestFailed { .. } => ErrorCategory::External,
            Self::RequestRejected { .. } => ErrorCategory::Client,
            Self::ResponseParsingError { .. } => ErrorCategory::External,
            Self::RateLimitExceeded { .. } => ErrorCategory::Transient,
            Self::Timeout { .. } => ErrorCategory::Transient,
            Self::AuthenticationFailed { .. } => ErrorCategory::Client,
            Self::PricingUnavailable { .. } => ErrorCategory::External,
            Self::StorageFailed { .. } => ErrorCategory::External,
        }
    }

    /// Get the error severity for logging and alerting.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::UnsupportedProvider { .. } => ErrorSeverity::Error,
            Self::ConfigurationError { .. } => ErrorSeverity::Error,
            Self::UnknownTool { .. } => ErrorSeverity::Error,
            Self::RequestFailed { .. } => ErrorSeverity::Error,
            Self::RequestRejected { .. } => ErrorSeverity::Error,
            Self::ResponseParsingError { .. } => ErrorSeverity::Warning,
            Self::RateLimitExceeded { .. } => ErrorSeverity::Warning,
            Self::Timeout { .. } => ErrorSeverity::Warning,
            Self::AuthenticationFailed { .. } => ErrorSeverity::Error,
            Self::PricingUnavailable { .. } => ErrorSeverity::Warning,
            Self::StorageFailed { .. } => ErrorSeverity::Warning,
        }
    }

    /// Whether a retry of the same operation may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RateLimitExceeded { .. } | Self::Timeout { .. } | Self::RequestFailed { .. }
        )
    }

    /// Whether this error is a caller-side configuration mistake.
    ///
    /// These are the only errors `ask` lets through, and they are raised before
    /// the first model call.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedProvider { .. }
                | Self::ConfigurationError { .. }
                | Self::UnknownTool { .. }
        )
    }

    /// Convert to a message that is safe to show to end users.
    pub fn user_message(&self) -> String {
        match self {
            Self::UnsupportedProvider { .. } => {
                "The requested AI provider is not supported".to_string()
            }
            Self::ConfigurationError { .. } => {
                "AI helper configuration issue. Please check your settings".to_string()
            }
            Self::UnknownTool { tool_name } => format!("The tool '{tool_name}' is not available"),
            Self::RequestFailed { .. } => {
                "Unable to communicate with AI service. Please try again".to_string()
            }
            Self::RequestRejected { .. } => "The AI service rejected the request".to_string(),
            Self::ResponseParsingError { .. } => {
                "Received an invalid response from AI service".to_string()
            }
            Self::RateLimitExceeded {
                retry_after_seconds,
            } => {
                format!("Service is busy. Please wait {retry_after_seconds} seconds and try again")
            }
            Self::Timeout { .. } => "Request timed out. Please try again".to_string(),
            Self::AuthenticationFailed { .. } => {
                "Authentication failed. Please check your credentials".to_string()
            }
            Self::PricingUnavailable { .. } => "Pricing information is unavailable".to_string(),
            Self::StorageFailed { .. } => "Usage data could not be saved".to_string(),
        }
    }

    // =========================================================================
    // Constructors with automatic logging
    // =========================================================================

    /// Create an unsupported provider error (logs at ERROR level).
    pub fn unsupported_provider(provider: impl Into<String>) -> Self {
        let provider = provider.into();
        log_error!(
            provider = %provider,
            error_type = "unsupported_provider",
            "Unsupported LLM provider requested"
        );
        Self::UnsupportedProvider { provider }
    }

    pub fn configuration_error(message: impl Into<String>) -> Self {
        let message = message.into();
        log_error!(
            error_type = "configuration_error",
            message = %message,
            "Configuration validation failed"
        );
        Self::ConfigurationError { message }
    }

    pub fn unknown_tool(tool_name: impl Into<String>) -> Self {
        let tool_name = tool_name.into();
        log_error!(
            error_type = "unknown_tool",
            tool_name = %tool_name,
            "Requested tool is not registered"
        );
        Self::UnknownTool { tool_name }
    }

    pub fn request_failed(
        message: impl Into<String>,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        let message = message.into();
        log_error!(
            error_type = "request_failed",
            message = %message,
            has_source = source.is_some(),
            "Outbound request failed"
        );
        Self::RequestFailed { message, source }
    }

    pub fn request_rejected(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        log_error!(
            error_type = "request_rejected",
            status = status,
            message = %message,
            "Remote service rejected the request"
        );
        Self::RequestRejected { status, message }
    }

    pub fn response_parsing_error(message: impl Into<String>) -> Self {
        let message = message.into();
        log_warn!(
            error_type = "response_parsing_error",
            message = %message,
            "Remote response format invalid"
        );
        Self::ResponseParsingError { message }
    }

    pub fn rate_limit_exceeded(retry_after_seconds: u64) -> Self {
        log_warn!(
            error_type = "rate_limit_exceeded",
            retry_after_seconds = retry_after_seconds,
            "Remote rate limit exceeded"
        );
        Self::RateLimitExceeded {
            retry_after_seconds,
        }
    }

    pub fn timeout(timeout_seconds: u64) -> Self {
        log_warn!(
            error_type = "timeout",
            timeout_seconds = timeout_seconds,
            "Request timed out"
        );
        Self::Timeout { timeout_seconds }
    }

    pub fn authentication_failed(message: impl Into<String>) -> Self {
        let message = message.into();
        log_error!(
            error_type = "authentication_failed",
            message = %message,
            "Remote authentication failed"
        );
        Self::AuthenticationFailed { message }
    }

    pub fn pricing_unavailable(message: impl Into<String>) -> Self {
        let message = message.into();
        log_warn!(
            error_type = "pricing_unavailable",
            message = %message,
            "Pricing table could not be fetched"
        );
        Self::PricingUnavailable { message }
    }

    pub fn storage_failed(message: impl Into<String>) -> Self {
        let message = message.into();
        log_warn!(
            error_type = "storage_failed",
            message = %message,
            "Usage store operation failed"
        );
        Self::StorageFailed { message }
    }
}
