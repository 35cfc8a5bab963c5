pub mod extract;
pub mod overrides;
pub mod path;

pub use extract::*;
pub use overrides::*;
pub use path::*;
