//! Store-backed engine operations. Every operation takes the caller's
//! [`Identity`](crate::model::Identity) explicitly and returns a tagged
//! result; nothing here panics on bad input.

pub mod admin;
pub mod transition;
pub mod voting;
