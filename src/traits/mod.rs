mod backend;

pub use backend::{Backend, Connect};
