pub mod channel;
pub mod messages;

pub use channel::{WorkerChannel, WorkerHarness};
pub use messages::{WorkerEvent, WorkerRequest};
