//! ABB runtime library
//!
//! - `content`: the content provider (`file://` and `content://` resources
//!   served from a zip package) and the key-value parameter loader
//! - `game`: bodies, articulated entities, the pursuit enemy and the world
//!   that steps them

pub mod content;
pub mod game;
