pub mod registry;
pub mod worker;

pub use registry::{BookKey, BookRegistry};
pub use worker::{BookHandle, BookWorker, WorkerSettings};
