pub mod calculator;
pub mod todo;
pub mod errors;

pub use calculator::*;
pub use todo::*;
pub use errors::*;
