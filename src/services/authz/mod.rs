//! Authorization predicates over a [`Principal`].
//!
//! Each permission is a plain check on the principal (and, for ownership, on
//! the subject being accessed). Handlers call [`is_granted`] directly.

mod voters;

pub use voters::{AccessError, Owned, Permission, is_granted};
