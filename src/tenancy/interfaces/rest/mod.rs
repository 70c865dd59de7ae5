pub mod controllers;
pub mod middleware;
pub mod resources;
