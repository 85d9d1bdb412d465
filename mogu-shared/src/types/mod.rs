pub mod participation;
pub mod post;
pub mod user;

pub use participation::*;
pub use post::*;
pub use user::*;
