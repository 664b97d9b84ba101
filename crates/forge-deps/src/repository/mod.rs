//! Repository capability and the provided implementations

pub mod checksum;
mod descriptor;
mod layout;
mod local;
mod memory;
mod registry;
mod remote;
mod traits;

pub use descriptor::Descriptor;
pub use local::LocalRepository;
pub use memory::InMemoryRepository;
pub use registry::RepositoryRegistry;
pub use remote::RemoteRepository;
pub use traits::{Repository, RepositoryError, Sourced};
