pub(crate) mod access;
pub(crate) mod block;
pub(crate) mod error;
pub(crate) mod post;
pub(crate) mod user;
