pub mod clock;
pub mod cli;

mod err;
pub use err::*;

pub mod net;
pub mod proto;
