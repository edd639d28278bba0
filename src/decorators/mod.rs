mod cache;
mod logger;
mod retry;

pub use cache::{BoundedCache, CacheInfo};
pub use logger::log_call;
pub use retry::RetryPolicy;
