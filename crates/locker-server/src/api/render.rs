//! Maps lock outcomes to slash-command replies and status codes.

use actix_web::HttpResponse;
use actix_web::http::StatusCode;
use locker_core::{AcquireOutcome, EnumerateResult, InspectOutcome, LockError, ReleaseOutcome};
use tracing::error;

use crate::model::CommandResponse;

pub const LOCK_ICON: &str = ":lock:";
pub const LIST_HEADER: &str = "Current locks: ";
pub const STORE_ERROR_TEXT: &str = ":bomb: Something is wrong with the lock service";

pub fn acquire(outcome: &AcquireOutcome) -> HttpResponse {
    match outcome {
        AcquireOutcome::Granted { lock_name, owner } => {
            CommandResponse::in_channel(format!("{} is now locked by {}", lock_name, owner))
                .with_icon(LOCK_ICON)
                .http_response(StatusCode::OK)
        }
        AcquireOutcome::AlreadyHeldBySelf { lock_name, age } => CommandResponse::in_channel(
            format!("No worries, you already have the lock on {} ({})", lock_name, age),
        )
        .http_response(StatusCode::GONE),
        AcquireOutcome::AlreadyHeldByOther { owner, age, .. } => CommandResponse::in_channel(
            format!(":x: Sorry, lock currently held by: {} ({})", owner, age),
        )
        .http_response(StatusCode::GONE),
    }
}

pub fn release(outcome: &ReleaseOutcome) -> HttpResponse {
    match outcome {
        ReleaseOutcome::Released { lock_name } => {
            CommandResponse::in_channel(format!("{} is now available", lock_name))
                .http_response(StatusCode::GONE)
        }
        ReleaseOutcome::NotHeld { .. } => {
            CommandResponse::in_channel("That was never locked. What's your problem?")
                .http_response(StatusCode::OK)
        }
        ReleaseOutcome::Forbidden { owner, .. } => CommandResponse::in_channel(format!(
            ":rage4: Come on, you can't unlock {}'s lock.",
            owner
        ))
        .http_response(StatusCode::BAD_REQUEST),
        ReleaseOutcome::ConcurrentReleaseInProgress { .. } => {
            CommandResponse::in_channel("Hmmm, someone else is trying to unlock this. How odd.")
                .http_response(StatusCode::OK)
        }
    }
}

pub fn inspect(outcome: &InspectOutcome) -> HttpResponse {
    match outcome {
        InspectOutcome::Held {
            lock_name,
            owner,
            age,
        } => CommandResponse::ephemeral(format!("{} is held by ({}) {}", lock_name, owner, age))
            .http_response(StatusCode::OK),
        InspectOutcome::NotHeld { .. } => {
            CommandResponse::in_channel("That lock is not currently held")
                .http_response(StatusCode::OK)
        }
    }
}

/// Header line followed by one line per held lock
pub fn list_text(result: &EnumerateResult) -> String {
    std::iter::once(LIST_HEADER.to_string())
        .chain(result.lines())
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn enumerate(result: &EnumerateResult) -> HttpResponse {
    CommandResponse::ephemeral(list_text(result)).http_response(StatusCode::OK)
}

pub fn lock_error(err: &LockError) -> HttpResponse {
    error!(error = %err, "Lock store request failed");
    CommandResponse::in_channel(STORE_ERROR_TEXT).http_response(StatusCode::BAD_GATEWAY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use locker_core::LockEntry;

    #[test]
    fn test_list_text_without_entries() {
        assert_eq!(list_text(&EnumerateResult::default()), "Current locks: ");
    }

    #[test]
    fn test_list_text_joins_lines() {
        let result = EnumerateResult {
            entries: vec![
                LockEntry {
                    lock_name: "a".to_string(),
                    owner: "alice".to_string(),
                    age: "5 minutes".to_string(),
                },
                LockEntry {
                    lock_name: "b".to_string(),
                    owner: "bob".to_string(),
                    age: "Unknown lifetime".to_string(),
                },
            ],
        };
        assert_eq!(
            list_text(&result),
            "Current locks: \na locked by alice (5 minutes)\nb locked by bob (Unknown lifetime)"
        );
    }

    #[test]
    fn test_status_codes() {
        let granted = AcquireOutcome::Granted {
            lock_name: "a".to_string(),
            owner: "alice".to_string(),
        };
        assert_eq!(acquire(&granted).status(), StatusCode::OK);

        let forbidden = ReleaseOutcome::Forbidden {
            lock_name: "a".to_string(),
            owner: "bob".to_string(),
        };
        assert_eq!(release(&forbidden).status(), StatusCode::BAD_REQUEST);

        let released = ReleaseOutcome::Released {
            lock_name: "a".to_string(),
        };
        assert_eq!(release(&released).status(), StatusCode::GONE);

        let err = LockError::Vanished("a".to_string());
        assert_eq!(lock_error(&err).status(), StatusCode::BAD_GATEWAY);
    }
}
