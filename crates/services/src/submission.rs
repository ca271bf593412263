//! # Comment submission
//!
//! Validates, sanitizes and persists visitor comments. Every accepted
//! comment lands in `pending`; nothing this service writes is ever shown
//! publicly until an external moderator approves it.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};
use uuid::Uuid;

use domains::error::{AppError, FieldErrors, Result};
use domains::models::NewComment;
use domains::moderation::CommentStatus;
use domains::traits::CommentStore;

use crate::sanitize::{escape_html, truncate_chars};

/// Raw submission as it arrives from the form transport.
#[derive(Debug, Clone, Deserialize)]
pub struct CommentDraft {
    pub post_id: Uuid,
    #[serde(default)]
    pub parent_id: Option<Uuid>,
    #[serde(default)]
    pub author_name: String,
    #[serde(default)]
    pub author_email: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub user_agent: Option<String>,
    /// Honeypot. The form hides this field from humans; bots fill it.
    #[serde(default)]
    pub website: String,
}

/// What the caller gets back on success. Carries no visibility guarantee;
/// the comment still sits behind the moderation gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SubmissionAck {
    pub status: CommentStatus,
}

/// Upper bounds applied after trimming. Overflow is truncated, not
/// rejected, so a long-winded visitor never loses a comment over a limit.
#[derive(Debug, Clone, Copy)]
pub struct SubmissionLimits {
    pub author_name_max: usize,
    pub content_max: usize,
}

impl Default for SubmissionLimits {
    fn default() -> Self {
        Self {
            author_name_max: 100,
            content_max: 2000,
        }
    }
}

/// Where a submission attempt ended up, for observability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionOutcome {
    Accepted,
    Rejected,
    Honeypot,
    Throttled,
    StorageError,
}

/// Optional capability for counting submission outcomes. Injected
/// explicitly; the service works fine without one.
pub trait SubmissionRecorder: Send + Sync {
    fn record(&self, outcome: SubmissionOutcome);
}

/// Per-client cooldown between accepted submissions. UX throttling only:
/// it keeps the form from being hammered, it is not abuse prevention.
pub struct CooldownGate {
    window: Duration,
    last_accepted: DashMap<String, Instant>,
}

impl CooldownGate {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_accepted: DashMap::new(),
        }
    }

    /// Remaining whole seconds if the client is still cooling down.
    fn check(&self, key: &str) -> Option<u64> {
        let last = self.last_accepted.get(key)?;
        let elapsed = last.elapsed();
        if elapsed < self.window {
            Some((self.window - elapsed).as_secs().max(1))
        } else {
            None
        }
    }

    fn arm(&self, key: &str) {
        self.last_accepted.insert(key.to_string(), Instant::now());
    }
}

pub struct SubmissionService {
    store: Arc<dyn CommentStore>,
    cooldown: CooldownGate,
    limits: SubmissionLimits,
    recorder: Option<Arc<dyn SubmissionRecorder>>,
}

impl SubmissionService {
    pub fn new(
        store: Arc<dyn CommentStore>,
        cooldown_window: Duration,
        limits: SubmissionLimits,
    ) -> Self {
        Self {
            store,
            cooldown: CooldownGate::new(cooldown_window),
            limits,
            recorder: None,
        }
    }

    pub fn with_recorder(mut self, recorder: Arc<dyn SubmissionRecorder>) -> Self {
        self.recorder = Some(recorder);
        self
    }

    /// Accepts or rejects one comment submission for the given client
    /// context (typically the peer IP).
    ///
    /// Ordering matters: the cooldown is checked before any validation or
    /// storage work, and armed only after a successful write. A filled
    /// honeypot reports success without touching storage at all.
    pub async fn submit(&self, client_key: &str, draft: CommentDraft) -> Result<SubmissionAck> {
        if let Some(retry_after_secs) = self.cooldown.check(client_key) {
            self.record(SubmissionOutcome::Throttled);
            return Err(AppError::RateLimited { retry_after_secs });
        }

        if !draft.website.trim().is_empty() {
            debug!(post_id = %draft.post_id, "honeypot filled; dropping submission silently");
            self.record(SubmissionOutcome::Honeypot);
            return Ok(SubmissionAck {
                status: CommentStatus::Pending,
            });
        }

        let comment = match self.validate(draft) {
            Ok(comment) => comment,
            Err(err) => {
                self.record(SubmissionOutcome::Rejected);
                return Err(err);
            }
        };

        if let Err(cause) = self.store.insert(comment).await {
            error!(error = %cause, "comment insert failed");
            self.record(SubmissionOutcome::StorageError);
            return Err(AppError::Storage(
                "could not save the comment, please try again".into(),
            ));
        }

        self.cooldown.arm(client_key);
        self.record(SubmissionOutcome::Accepted);
        Ok(SubmissionAck {
            status: CommentStatus::Pending,
        })
    }

    /// Field checks mirror the public form: name and content are required
    /// after trimming, the email must look like `local@domain.tld` and is
    /// normalized to lowercase. `parent_id` is passed through unchecked;
    /// an orphaned reference gets promoted at read time, never rejected
    /// here.
    fn validate(&self, draft: CommentDraft) -> Result<NewComment> {
        let mut errors = FieldErrors::default();

        let name = draft.author_name.trim();
        if name.is_empty() {
            errors.push("author_name", "author name is required");
        }

        let email = draft.author_email.trim().to_lowercase();
        if email.is_empty() {
            errors.push("author_email", "author email is required");
        } else if !is_valid_email(&email) {
            errors.push("author_email", "author email is not a valid address");
        }

        let content = draft.content.trim();
        if content.is_empty() {
            errors.push("content", "content is required");
        }

        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }

        let name = truncate_chars(name, self.limits.author_name_max);
        let content = truncate_chars(content, self.limits.content_max);

        Ok(NewComment {
            post_id: draft.post_id,
            parent_id: draft.parent_id,
            author_name: escape_html(name),
            author_email: email,
            content: escape_html(content),
            status: CommentStatus::Pending,
            user_agent: draft.user_agent,
            created_at: Utc::now(),
        })
    }

    fn record(&self, outcome: SubmissionOutcome) {
        if let Some(recorder) = &self.recorder {
            recorder.record(outcome);
        }
    }
}

/// Equivalent of the form's `local@domain.tld` pattern: no whitespace,
/// exactly one `@`, and a dot somewhere in the domain.
fn is_valid_email(email: &str) -> bool {
    if email.contains(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domains::traits::MockCommentStore;
    use std::sync::Mutex;

    fn draft() -> CommentDraft {
        CommentDraft {
            post_id: Uuid::now_v7(),
            parent_id: None,
            author_name: "  Maria Silva  ".into(),
            author_email: "Maria@Example.COM".into(),
            content: "  Qual a taxa da maquininha? <b>urgente</b>  ".into(),
            user_agent: Some("test-agent".into()),
            website: String::new(),
        }
    }

    fn service(store: MockCommentStore) -> SubmissionService {
        SubmissionService::new(
            Arc::new(store),
            Duration::from_secs(30),
            SubmissionLimits::default(),
        )
    }

    #[tokio::test]
    async fn valid_submission_is_stored_pending_and_escaped() {
        let mut store = MockCommentStore::new();
        store
            .expect_insert()
            .times(1)
            .withf(|c| {
                c.status == CommentStatus::Pending
                    && c.author_name == "Maria Silva"
                    && c.author_email == "maria@example.com"
                    && !c.content.contains('<')
                    && c.content.contains("&lt;b&gt;")
            })
            .returning(|_| Ok(()));

        let ack = service(store).submit("10.0.0.1", draft()).await.unwrap();
        assert_eq!(ack.status, CommentStatus::Pending);
    }

    #[tokio::test]
    async fn honeypot_reports_success_without_writing() {
        // No expectation on insert: any call panics the mock.
        let store = MockCommentStore::new();
        let mut d = draft();
        d.website = "http://spam.example".into();

        let ack = service(store).submit("10.0.0.1", d).await.unwrap();
        assert_eq!(ack.status, CommentStatus::Pending);
    }

    #[tokio::test]
    async fn oversized_fields_are_truncated_to_the_bound() {
        let mut store = MockCommentStore::new();
        store
            .expect_insert()
            .times(1)
            .withf(|c| c.author_name.chars().count() == 100 && c.content.chars().count() == 2000)
            .returning(|_| Ok(()));

        let mut d = draft();
        d.author_name = "x".repeat(150);
        d.content = "y".repeat(2500);
        service(store).submit("10.0.0.1", d).await.unwrap();
    }

    #[tokio::test]
    async fn invalid_email_is_rejected_before_any_storage_call() {
        let store = MockCommentStore::new();
        let mut d = draft();
        d.author_email = "not-an-email".into();

        let err = service(store).submit("10.0.0.1", d).await.unwrap_err();
        match err {
            AppError::Validation(errors) => {
                assert!(errors.get("author_email").is_some());
                assert_eq!(errors.len(), 1);
            }
            other => panic!("expected validation error, got {other}"),
        }
    }

    #[tokio::test]
    async fn missing_fields_are_reported_together() {
        let store = MockCommentStore::new();
        let mut d = draft();
        d.author_name = "   ".into();
        d.author_email = String::new();
        d.content = String::new();

        let err = service(store).submit("10.0.0.1", d).await.unwrap_err();
        match err {
            AppError::Validation(errors) => {
                assert_eq!(
                    errors.fields().collect::<Vec<_>>(),
                    vec!["author_email", "author_name", "content"]
                );
            }
            other => panic!("expected validation error, got {other}"),
        }
    }

    #[tokio::test]
    async fn second_submission_within_cooldown_is_blocked() {
        let mut store = MockCommentStore::new();
        store.expect_insert().times(1).returning(|_| Ok(()));
        let svc = service(store);

        svc.submit("10.0.0.1", draft()).await.unwrap();
        let err = svc.submit("10.0.0.1", draft()).await.unwrap_err();
        assert!(matches!(err, AppError::RateLimited { .. }));
    }

    #[tokio::test]
    async fn cooldown_is_per_client_context() {
        let mut store = MockCommentStore::new();
        store.expect_insert().times(2).returning(|_| Ok(()));
        let svc = service(store);

        svc.submit("10.0.0.1", draft()).await.unwrap();
        svc.submit("10.0.0.2", draft()).await.unwrap();
    }

    #[tokio::test]
    async fn cooldown_expires() {
        let mut store = MockCommentStore::new();
        store.expect_insert().times(2).returning(|_| Ok(()));
        let svc = SubmissionService::new(
            Arc::new(store),
            Duration::from_millis(20),
            SubmissionLimits::default(),
        );

        svc.submit("10.0.0.1", draft()).await.unwrap();
        tokio::time::sleep(Duration::from_millis(40)).await;
        svc.submit("10.0.0.1", draft()).await.unwrap();
    }

    #[tokio::test]
    async fn failed_validation_does_not_arm_the_cooldown() {
        let mut store = MockCommentStore::new();
        store.expect_insert().times(1).returning(|_| Ok(()));
        let svc = service(store);

        let mut bad = draft();
        bad.author_email = "nope".into();
        svc.submit("10.0.0.1", bad).await.unwrap_err();
        // Immediately retrying with a fixed draft goes through.
        svc.submit("10.0.0.1", draft()).await.unwrap();
    }

    #[tokio::test]
    async fn storage_failure_surfaces_as_one_generic_error() {
        let mut store = MockCommentStore::new();
        store
            .expect_insert()
            .times(1)
            .returning(|_| Err(anyhow::anyhow!("connection reset by peer")));

        let err = service(store).submit("10.0.0.1", draft()).await.unwrap_err();
        match err {
            AppError::Storage(msg) => assert!(!msg.contains("connection reset")),
            other => panic!("expected storage error, got {other}"),
        }
    }

    struct Tally(Mutex<Vec<SubmissionOutcome>>);

    impl SubmissionRecorder for Tally {
        fn record(&self, outcome: SubmissionOutcome) {
            self.0.lock().unwrap().push(outcome);
        }
    }

    #[tokio::test]
    async fn outcomes_reach_the_injected_recorder() {
        let mut store = MockCommentStore::new();
        store.expect_insert().times(1).returning(|_| Ok(()));
        let tally = Arc::new(Tally(Mutex::new(Vec::new())));
        let svc = service_with_recorder(store, tally.clone());

        svc.submit("10.0.0.1", draft()).await.unwrap();
        let mut hp = draft();
        hp.website = "filled".into();
        svc.submit("10.0.0.9", hp).await.unwrap();

        assert_eq!(
            *tally.0.lock().unwrap(),
            vec![SubmissionOutcome::Accepted, SubmissionOutcome::Honeypot]
        );
    }

    fn service_with_recorder(
        store: MockCommentStore,
        recorder: Arc<Tally>,
    ) -> SubmissionService {
        service(store).with_recorder(recorder)
    }

    #[test]
    fn email_shape_checks() {
        assert!(is_valid_email("maria@example.com"));
        assert!(is_valid_email("a.b+c@sub.example.com.br"));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("maria@"));
        assert!(!is_valid_email("maria@exa mple.com"));
        assert!(!is_valid_email("ma ria@example.com"));
        assert!(!is_valid_email("a@@example.com"));
        assert!(!is_valid_email("a@example."));
    }
}
