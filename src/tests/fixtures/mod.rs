pub mod builders;
pub mod world;
