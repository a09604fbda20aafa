pub mod flatten;
pub mod model;

pub use flatten::*;
pub use model::*;
