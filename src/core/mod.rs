// Domain layer: models, errors, and the group resource logic

pub mod errors;
pub mod groups;
pub mod models;
