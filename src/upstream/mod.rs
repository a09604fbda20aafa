pub mod error;
pub mod invidious;
pub mod pager;
pub mod platform;
pub mod types;

pub use error::*;
pub use invidious::InvidiousClient;
pub use pager::*;
pub use platform::VideoPlatform;
pub use types::*;
