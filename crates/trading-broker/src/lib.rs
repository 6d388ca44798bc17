//! Paper execution against the shared portfolio.

mod paper;

pub use paper::{Execution, PaperAccount};
