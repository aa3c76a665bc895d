pub mod demo;
pub mod ors;
pub mod route_generator;
