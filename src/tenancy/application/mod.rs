pub mod factories;
pub mod registries;
pub mod resolvers;
