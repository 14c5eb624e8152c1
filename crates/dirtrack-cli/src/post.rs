//! The document type the CLI works on.

use std::rc::Rc;

use dirtrack_store::Keyed;
use dirtrack_tracker::{field, Attach, Binder, ChangeHooks, Field, FieldName, HookError, Model, TrackedVec};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Post {
    pub key: String,
    pub title: String,
    pub status: String,
    pub locked: bool,
    pub tags: TrackedVec<i64>,
}

impl Post {
    pub const STATUS: Field<Post, String> = field!(Post, status);
    pub const LOCKED: Field<Post, bool> = field!(Post, locked);
    pub const TAGS: Field<Post, TrackedVec<i64>> = field!(Post, tags);

    pub fn new(key: String, title: String, tags: Vec<i64>) -> Self {
        Self {
            key,
            title,
            status: "draft".into(),
            locked: false,
            tags: tags.into(),
        }
    }
}

impl Model for Post {
    const FIELDS: &'static [FieldName] = &["key", "title", "status", "locked", "tags"];

    fn attach(&mut self, binder: &Binder) {
        self.tags.attach(&binder.bind("tags"));
    }

    fn class_hooks() -> Option<Rc<dyn ChangeHooks<Self>>> {
        Some(Rc::new(StatusGuard))
    }
}

impl Keyed for Post {
    fn key(&self) -> String {
        self.key.clone()
    }
}

/// Refuses status changes while a post is locked and logs accepted ones.
struct StatusGuard;

impl ChangeHooks<Post> for StatusGuard {
    fn onchange(&self, post: &Post, field: FieldName, _value: &Value) -> Result<bool, HookError> {
        Ok(field != "status" || !post.locked)
    }

    fn onchanged(&self, post: &Post, field: FieldName, old: &Value) -> Result<(), HookError> {
        info!(key = %post.key, field, %old, "post field changed");
        Ok(())
    }
}
