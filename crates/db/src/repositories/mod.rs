//! Query functions grouped per table.

pub mod server_repo;

pub use server_repo::ServerRepo;
