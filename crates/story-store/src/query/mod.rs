//! Repository traits over the user collection.
//!
//! The authentication service depends only on these traits, never on the
//! concrete [`JsonStore`], so another backend can implement them instead.
//!
//! [`JsonStore`]: crate::JsonStore

pub mod user;

pub use user::UserRepository;
