//! # Comment threads
//!
//! Rebuilds the nested reply structure from the flat, approved-only rows
//! the store hands back. The tree is derived on every read; nothing nested
//! is ever persisted.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::warn;
use uuid::Uuid;

use domains::models::Comment;
use domains::moderation::CommentStatus;
use domains::traits::CommentStore;

/// Nests a flat, `created_at`-ascending comment list into reply trees.
///
/// Two passes: index every id, then partition each comment under its parent
/// or into the top level. A `parent_id` that does not resolve within the
/// input (parent unapproved, deleted, or absent) promotes the comment to
/// top level instead of dropping it. Both passes preserve input order, so
/// the top level and every `replies` list stay chronological.
pub fn build_tree(flat: Vec<Comment>) -> Vec<Comment> {
    let ids: HashSet<Uuid> = flat.iter().map(|c| c.id).collect();

    let mut children: HashMap<Uuid, Vec<Comment>> = HashMap::new();
    let mut roots: Vec<Comment> = Vec::new();
    for mut comment in flat {
        comment.replies.clear();
        match comment.parent_id {
            Some(parent) if ids.contains(&parent) => {
                children.entry(parent).or_default().push(comment);
            }
            _ => roots.push(comment),
        }
    }

    for root in &mut roots {
        attach_replies(root, &mut children);
    }

    // A parent chain that never reaches a root (a reference cycle in
    // corrupt data) would strand its members in the map; promote them
    // flat instead of losing them.
    if !children.is_empty() {
        let mut stranded: Vec<Comment> = children.into_values().flatten().collect();
        stranded.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        roots.extend(stranded);
    }

    roots
}

fn attach_replies(node: &mut Comment, children: &mut HashMap<Uuid, Vec<Comment>>) {
    if let Some(mut replies) = children.remove(&node.id) {
        for reply in &mut replies {
            attach_replies(reply, children);
        }
        node.replies = replies;
    }
}

/// Read side of the comment pipeline, consumed by the page templates.
pub struct ThreadService {
    store: Arc<dyn CommentStore>,
}

impl ThreadService {
    pub fn new(store: Arc<dyn CommentStore>) -> Self {
        Self { store }
    }

    /// Approved comments for one post, nested. A fetch failure degrades to
    /// an empty thread so the page itself still renders.
    pub async fn comments_for_post(&self, post_id: Uuid) -> Vec<Comment> {
        match self
            .store
            .list_by_status(post_id, CommentStatus::Approved)
            .await
        {
            Ok(rows) => build_tree(rows),
            Err(cause) => {
                warn!(%post_id, error = %cause, "comment fetch failed, rendering empty thread");
                Vec::new()
            }
        }
    }

    /// Count of approved comments for one post; 0 on fetch failure.
    pub async fn comment_count(&self, post_id: Uuid) -> u64 {
        match self
            .store
            .count_by_status(post_id, CommentStatus::Approved)
            .await
        {
            Ok(count) => count,
            Err(cause) => {
                warn!(%post_id, error = %cause, "comment count failed, reporting zero");
                0
            }
        }
    }
}
