pub mod health;
pub mod pad;
pub mod diagnostics;

pub use health::*;
pub use pad::*;
pub use diagnostics::*;
