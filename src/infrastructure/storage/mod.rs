//! Entity storage backends

mod in_memory;
mod postgres;

pub use in_memory::InMemoryStorage;
pub use postgres::PostgresStorage;
