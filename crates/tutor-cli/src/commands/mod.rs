pub mod check;
pub mod classify;
pub mod index;
pub mod info;
pub mod prompt;
pub mod utils;
