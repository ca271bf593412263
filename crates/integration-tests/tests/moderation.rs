//! Full comment lifecycle: submitted pending, externally moderated, then
//! visible (or not) to the read side.

use std::time::Duration;

use domains::moderation::CommentStatus;
use services::thread::ThreadService;

use integration_tests::{draft, seeded_store, submission_service};

#[tokio::test]
async fn approval_makes_a_comment_visible_and_stamps_approved_at() {
    let (store, post_id) = seeded_store();
    let svc = submission_service(store.clone(), Duration::from_secs(30));
    svc.submit("203.0.113.7", draft(post_id)).await.unwrap();

    let threads = ThreadService::new(store.clone());
    assert!(threads.comments_for_post(post_id).await.is_empty());

    let id = store.all_comments()[0].id;
    store.moderate(id, CommentStatus::Approved).unwrap();

    let tree = threads.comments_for_post(post_id).await;
    assert_eq!(tree.len(), 1);
    assert_eq!(tree[0].status, CommentStatus::Approved);
    assert!(tree[0].approved_at.is_some());
}

#[tokio::test]
async fn rejection_and_spam_keep_a_comment_hidden_forever() {
    let (store, post_id) = seeded_store();
    let svc = submission_service(store.clone(), Duration::from_secs(0));
    svc.submit("203.0.113.7", draft(post_id)).await.unwrap();
    svc.submit("203.0.113.8", draft(post_id)).await.unwrap();

    let rows = store.all_comments();
    store.moderate(rows[0].id, CommentStatus::Rejected).unwrap();
    store.moderate(rows[1].id, CommentStatus::Spam).unwrap();

    let threads = ThreadService::new(store.clone());
    assert!(threads.comments_for_post(post_id).await.is_empty());
    assert_eq!(threads.comment_count(post_id).await, 0);

    // Terminal states admit no further transition, in any direction.
    assert!(store
        .moderate(rows[0].id, CommentStatus::Approved)
        .is_err());
    assert!(store.moderate(rows[1].id, CommentStatus::Pending).is_err());
}

#[tokio::test]
async fn moderating_an_unknown_comment_fails() {
    let (store, _post_id) = seeded_store();
    assert!(store
        .moderate(uuid::Uuid::now_v7(), CommentStatus::Approved)
        .is_err());
}
