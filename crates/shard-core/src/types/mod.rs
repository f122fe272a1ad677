mod channel;
mod identity;

pub use channel::*;
pub use identity::*;
