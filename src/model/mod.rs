pub mod graph;
pub mod job;
pub mod mapping;
pub mod request;

pub use graph::*;
pub use job::*;
pub use mapping::*;
pub use request::*;
