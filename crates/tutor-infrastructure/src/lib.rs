pub mod corpus;
pub mod credentials;
pub mod paths;
pub mod secret_service;
pub mod storage;
pub mod svg_export;

pub use crate::corpus::{CorpusDocument, load_subject_documents};
pub use crate::credentials::MaterializedCredentials;
pub use crate::paths::TutorPaths;
pub use crate::secret_service::SecretServiceImpl;
pub use crate::svg_export::save_svg;
