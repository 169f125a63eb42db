//! Infrastructure Layer

pub mod memory;
pub mod postgres;

pub use memory::MemoryForumRepository;
pub use postgres::PgForumRepository;
