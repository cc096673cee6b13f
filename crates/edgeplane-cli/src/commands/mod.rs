pub mod distribution;
pub mod resource;
