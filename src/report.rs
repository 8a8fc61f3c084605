//! Failure severity and reporting
//!
//! Storage failures never escape to the caller's event loop. They are
//! caught where the core touches the store, logged at a level matching
//! their [`Severity`], and forwarded to a [`Notifier`] when the user should
//! see them.

use std::fmt;

/// How bad a caught failure is
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// Non-actionable
    Info,
    /// Degraded but continuing
    Warn,
    /// Operation failed, user-visible
    Error,
    /// Data-integrity risk (e.g. a failed atomic transaction)
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
            Self::Critical => "critical",
        }
    }

    /// Whether the user should get a transient notification
    pub fn is_user_visible(&self) -> bool {
        *self >= Self::Error
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Receiver of user-visible failure notifications
pub trait Notifier: Send + Sync {
    fn notify(&self, severity: Severity, message: &str);
}

/// Log a caught failure and forward it to `notifier` if user-visible
pub fn report(
    severity: Severity,
    context: &str,
    err: &(dyn std::error::Error + 'static),
    notifier: Option<&dyn Notifier>,
) {
    let message = format!("{context}: {err}");
    match severity {
        Severity::Info => tracing::info!(severity = %severity, "{}", message),
        Severity::Warn => tracing::warn!(severity = %severity, "{}", message),
        Severity::Error | Severity::Critical => {
            tracing::error!(severity = %severity, "{}", message)
        }
    }

    if severity.is_user_visible() {
        if let Some(notifier) = notifier {
            notifier.notify(severity, &message);
        }
    }
}
