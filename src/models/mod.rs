//! Wire-level data types shared by the store and its collaborator

mod link;
mod query;

pub use link::{CreateLinkBody, LinkId, LinkPatch, LinkRecord};
pub use query::{ListQuery, SortOrder};
