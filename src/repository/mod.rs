//! Repository Layer
//!
//! Data access abstractions and implementations.

mod traits;
mod memory;
mod credential_file;


pub use traits::{BoardRepository, CredentialStore};
pub use memory::{InMemoryBoardRepository, MemoryCredentialStore};
pub use credential_file::FileCredentialStore;
