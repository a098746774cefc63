pub mod collection;
pub mod endpoint;
pub mod request_log;

pub use collection::Collection;
pub use endpoint::{Endpoint, EndpointInput, HttpMethod};
pub use request_log::{
    LogPage, LogQuery, MinimalRequestLog, NewRequestLog, RequestLog, RequestLogView,
    RequestStats,
};
