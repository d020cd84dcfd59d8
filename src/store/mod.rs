// Persistence layer: Postgres-backed store implementations

pub mod pg;
