pub mod client;
pub mod demo;

pub use client::{BackendClient, CherryPickResponse, RepositoryPair};
pub use demo::demo_repositories;
