//! Drivers that pump a work queue: an OS thread, and a tokio task behind the
//! `tokio-runtime` feature.

pub mod driver;
#[cfg(feature = "tokio-runtime")]
pub mod tokio_driver;

pub use driver::TickDriver;
