use std::time::Duration;

use crate::{api::Error, ThreadError};

/// How long non-error notifications stay on screen
pub const AUTO_HIDE: Duration = Duration::from_millis(3000);

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Severity {
    Success,
    Info,
    Error,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Notification {
    pub message: String,
    pub severity: Severity,
    pub require_action: bool,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Notification {
        Notification {
            message: message.into(),
            severity: Severity::Success,
            require_action: false,
        }
    }

    pub fn info(message: impl Into<String>) -> Notification {
        Notification {
            message: message.into(),
            severity: Severity::Info,
            require_action: false,
        }
    }

    pub fn error(message: impl Into<String>) -> Notification {
        Notification {
            message: message.into(),
            severity: Severity::Error,
            require_action: true,
        }
    }

    /// `None` if the notification must be dismissed by the user
    pub fn auto_hide(&self) -> Option<Duration> {
        match self.require_action {
            true => None,
            false => Some(AUTO_HIDE),
        }
    }
}

/// User-triggered operations on a comment thread or a recipe
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Operation {
    Load,
    Add,
    Delete,
    Like,
    LikeRecipe,
}

impl Operation {
    fn failed(self) -> &'static str {
        match self {
            Operation::Load => "Failed to load comments",
            Operation::Add => "Failed to add comment",
            Operation::Delete => "Failed to delete comment",
            Operation::Like => "Failed to like comment.",
            Operation::LikeRecipe => "Failed to like recipe",
        }
    }

    fn network_failed(self) -> &'static str {
        match self {
            Operation::Delete => "An error occurred while deleting the comment",
            Operation::Like => "Server error while liking comment.",
            op => op.failed(),
        }
    }

    fn needs_login(self) -> &'static str {
        match self {
            Operation::Load => "You must be logged in!",
            Operation::Add => "You must be logged in to comment!",
            Operation::Delete => "You must be logged in to delete a comment!",
            Operation::Like => "You must be logged in to like a comment!",
            Operation::LikeRecipe => "Login required",
        }
    }

    /// What to tell the user after this operation succeeded, if anything
    pub fn succeeded(self) -> Option<Notification> {
        match self {
            Operation::Delete => Some(Notification::success("Comment deleted successfully")),
            _ => None,
        }
    }

    /// What to tell the user after this operation failed with `err`
    ///
    /// Returns `None` when the user cancelled the operation themselves, or
    /// repeated it while it was still running.
    pub fn failed_with(self, err: &ThreadError) -> Option<Notification> {
        let message = match err {
            ThreadError::Cancelled | ThreadError::Busy => return None,
            ThreadError::RefreshFailed(_) => String::from(Operation::Load.failed()),
            ThreadError::EmptyComment => return Some(Notification::info("Comment is empty")),
            ThreadError::Api(Error::AuthRequired) => String::from(self.needs_login()),
            ThreadError::Api(Error::Network(_)) => String::from(self.network_failed()),
            ThreadError::Api(e) => e
                .server_message()
                .map(String::from)
                .unwrap_or_else(|| String::from(self.failed())),
        };
        Some(Notification::error(message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancelled_delete_is_silent() {
        assert_eq!(Operation::Delete.failed_with(&ThreadError::Cancelled), None);
    }

    #[test]
    fn repeated_click_is_silent() {
        assert_eq!(Operation::Like.failed_with(&ThreadError::Busy), None);
        assert_eq!(Operation::LikeRecipe.failed_with(&ThreadError::Busy), None);
    }

    #[test]
    fn saved_change_only_reports_the_reload() {
        let err = ThreadError::RefreshFailed(Error::Network(String::from("timeout")));
        assert_eq!(
            Operation::Add.failed_with(&err),
            Some(Notification::error("Failed to load comments"))
        );
    }

    #[test]
    fn server_message_is_preferred() {
        let err = ThreadError::Api(Error::ServerRejected {
            status: 403,
            message: Some(String::from("Not authorized to delete this comment")),
        });
        assert_eq!(
            Operation::Delete.failed_with(&err),
            Some(Notification::error("Not authorized to delete this comment"))
        );

        let err = ThreadError::Api(Error::ServerRejected {
            status: 500,
            message: None,
        });
        assert_eq!(
            Operation::Add.failed_with(&err).map(|n| n.message),
            Some(String::from("Failed to add comment"))
        );
    }

    #[test]
    fn per_operation_messages() {
        let net = ThreadError::Api(Error::Network(String::from("connection reset")));
        assert_eq!(
            Operation::Like.failed_with(&net).map(|n| n.message),
            Some(String::from("Server error while liking comment."))
        );
        assert_eq!(
            Operation::Load.failed_with(&net).map(|n| n.message),
            Some(String::from("Failed to load comments"))
        );

        let auth = ThreadError::Api(Error::AuthRequired);
        assert_eq!(
            Operation::Add.failed_with(&auth).map(|n| n.message),
            Some(String::from("You must be logged in to comment!"))
        );
        assert_eq!(
            Operation::LikeRecipe.failed_with(&auth).map(|n| n.message),
            Some(String::from("Login required"))
        );
    }

    #[test]
    fn only_errors_stay_on_screen() {
        let err = Operation::Like
            .failed_with(&ThreadError::Api(Error::AuthRequired))
            .unwrap();
        assert_eq!(err.severity, Severity::Error);
        assert_eq!(err.auto_hide(), None);

        let ok = Operation::Delete.succeeded().unwrap();
        assert_eq!(ok.severity, Severity::Success);
        assert_eq!(ok.auto_hide(), Some(AUTO_HIDE));
        assert_eq!(Operation::Like.succeeded(), None);
    }
}
