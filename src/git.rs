//! Git operations and repository management.

pub mod commit;
pub mod push;
pub mod remote;
pub mod repository;

pub use commit::CommitInfo;
pub use push::push;
pub use remote::RepositoryUrl;
pub use repository::{GitRepository, LastRelease};
