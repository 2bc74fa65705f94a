//! Bookshelf application library
//!
//! Wires the books module onto the kernel, database, cache, and HTTP crates.

pub mod app;
pub mod modules;
pub mod utils;

pub use app::Application;
