pub mod http;
pub mod job;
pub mod traits;

pub use http::*;
pub use job::*;
pub use traits::*;
