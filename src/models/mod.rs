//! Records decoded from BIRD control socket replies.

mod peer;
mod reply;
mod route;
mod status;

pub use peer::*;
pub use reply::*;
pub use route::*;
pub use status::*;
