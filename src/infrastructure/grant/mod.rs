//! Grant store implementations

mod in_memory;
mod postgres;

pub use in_memory::InMemoryGrantRepository;
pub use postgres::PostgresGrantRepository;
