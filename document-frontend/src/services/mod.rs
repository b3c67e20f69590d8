pub mod backend;
pub mod metrics;
pub mod workspace;

pub use backend::{build_backend, Backend, BackendError, BackendOperation};
pub use workspace::{UploadFile, Workspace, WorkspaceError};
