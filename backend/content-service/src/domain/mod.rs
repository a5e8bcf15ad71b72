pub mod models;

pub use models::{
    Comment, ContentItem, ContentType, Post, Privacy, Profile, ReactableItem, Reaction,
    ReactionKind, SharedPost,
};
