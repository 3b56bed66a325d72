//! Pending-fee reminder dispatch.
//!
//! Every target gets its own email and its own outcome. Sends run with a
//! bounded fan-out; a failed send is recorded and the rest carry on.

use futures_util::stream::{self, StreamExt};
use serde::Serialize;
use tracing::{info, warn};

use bursar_core::ReminderTarget;

use crate::mailer::{Mailer, ReminderEmail};

/// Delivery status of one reminder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    Sent,
    Failed,
}

/// What happened to one recipient.
#[derive(Debug, Clone, Serialize)]
pub struct ReminderOutcome {
    pub student_id: i64,
    pub student_name: String,
    pub email: String,
    pub status: DeliveryStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Result of a reminder run.
#[derive(Debug, Clone, Serialize)]
pub struct ReminderReport {
    pub total: usize,
    pub sent: usize,
    pub failed: usize,
    pub outcomes: Vec<ReminderOutcome>,
}

impl ReminderReport {
    pub fn all_sent(&self) -> bool {
        self.failed == 0
    }
}

/// Builds the reminder text for one student.
pub fn compose(target: &ReminderTarget, school_name: &str) -> ReminderEmail {
    ReminderEmail {
        to: target.email.clone(),
        subject: "Pending Fee Reminder".to_string(),
        body: format!(
            "Dear {name},\n\n\
             This is a reminder that you have pending fees of Rs. {amount} for class {class}. \
             Please make the payment at your earliest convenience.\n\n\
             Thank you.\n{school_name}",
            name = target.student_name,
            amount = target.pending(),
            class = target.class_description,
        ),
    }
}

/// Sends a reminder to every target, at most `concurrency` at a time.
///
/// Outcomes come back in target order.
pub async fn dispatch(
    mailer: &dyn Mailer,
    targets: Vec<ReminderTarget>,
    school_name: &str,
    concurrency: usize,
) -> ReminderReport {
    let total = targets.len();
    info!(total, concurrency, "Dispatching fee reminders");

    let outcomes: Vec<ReminderOutcome> = stream::iter(targets)
        .map(|target| async move {
            let email = compose(&target, school_name);
            let result = mailer.send(email).await;

            let (status, error) = match result {
                Ok(()) => (DeliveryStatus::Sent, None),
                Err(e) => {
                    warn!(student_id = target.student_id, error = %e, "Reminder failed");
                    (DeliveryStatus::Failed, Some(e.to_string()))
                }
            };

            ReminderOutcome {
                student_id: target.student_id,
                student_name: target.student_name,
                email: target.email,
                status,
                error,
            }
        })
        .buffered(concurrency.max(1))
        .collect()
        .await;

    let sent = outcomes
        .iter()
        .filter(|o| o.status == DeliveryStatus::Sent)
        .count();
    let failed = total - sent;

    info!(total, sent, failed, "Fee reminders finished");

    ReminderReport {
        total,
        sent,
        failed,
        outcomes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mailer::MailError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records every message and fails for one address.
    #[derive(Default)]
    struct FlakyMailer {
        fail_for: Option<String>,
        sent: Mutex<Vec<ReminderEmail>>,
    }

    #[async_trait]
    impl Mailer for FlakyMailer {
        async fn send(&self, email: ReminderEmail) -> Result<(), MailError> {
            if self.fail_for.as_deref() == Some(email.to.as_str()) {
                return Err(MailError::Transport("mailbox unavailable".to_string()));
            }
            self.sent.lock().unwrap().push(email);
            Ok(())
        }
    }

    fn target(id: i64, email: &str, pending_cents: i64) -> ReminderTarget {
        ReminderTarget {
            student_id: id,
            student_name: format!("Student {id}"),
            email: email.to_string(),
            class_description: "Class 5".to_string(),
            pending_cents,
        }
    }

    #[test]
    fn test_compose() {
        let email = compose(&target(1, "asha@example.com", 520_000), "Hill School");
        assert_eq!(email.to, "asha@example.com");
        assert_eq!(email.subject, "Pending Fee Reminder");
        assert!(email.body.starts_with("Dear Student 1,"));
        assert!(email.body.contains("Rs. 5200.00 for class Class 5"));
        assert!(email.body.ends_with("Hill School"));
    }

    #[tokio::test]
    async fn test_one_failure_does_not_stop_the_rest() {
        let mailer = FlakyMailer {
            fail_for: Some("b@example.com".to_string()),
            ..Default::default()
        };
        let targets = vec![
            target(1, "a@example.com", 100),
            target(2, "b@example.com", 200),
            target(3, "c@example.com", 300),
        ];

        let report = dispatch(&mailer, targets, "Hill School", 2).await;

        assert_eq!(report.total, 3);
        assert_eq!(report.sent, 2);
        assert_eq!(report.failed, 1);
        assert!(!report.all_sent());

        let statuses: Vec<DeliveryStatus> = report.outcomes.iter().map(|o| o.status).collect();
        assert_eq!(
            statuses,
            vec![DeliveryStatus::Sent, DeliveryStatus::Failed, DeliveryStatus::Sent]
        );
        assert!(report.outcomes[1]
            .error
            .as_deref()
            .unwrap()
            .contains("mailbox unavailable"));
        assert_eq!(mailer.sent.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_no_targets() {
        let mailer = FlakyMailer::default();
        let report = dispatch(&mailer, Vec::new(), "Hill School", 4).await;

        assert_eq!(report.total, 0);
        assert!(report.all_sent());
        assert!(report.outcomes.is_empty());
    }

    #[test]
    fn test_outcome_json() {
        let outcome = ReminderOutcome {
            student_id: 7,
            student_name: "Asha".to_string(),
            email: "asha@example.com".to_string(),
            status: DeliveryStatus::Sent,
            error: None,
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "sent");
        assert!(json.get("error").is_none());
    }
}
