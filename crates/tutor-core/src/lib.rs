pub mod capability;
pub mod classification;
pub mod config;
pub mod curriculum;
pub mod error;
pub mod model;
pub mod prompt;
pub mod quality;
pub mod response;
pub mod retrieval;
pub mod secret;
pub mod session;
pub mod splitter;
pub mod text;

// Re-export common error type
pub use error::TutorError;
