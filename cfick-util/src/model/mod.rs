mod contest;
mod lang;
mod problem;
mod sample;
mod target;

pub use contest::*;
pub use lang::*;
pub use problem::*;
pub use sample::*;
pub use target::*;
