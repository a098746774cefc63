pub mod dispatch;
pub mod logger;
pub mod metadata;
pub mod render;

pub use dispatch::{InboundRequest, MockResponse, dispatch};
pub use logger::{LogAttempt, LogOutcome, RequestLogger};
pub use render::render;
