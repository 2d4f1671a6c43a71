pub mod audit;
pub mod discover;
pub mod extract;
pub mod pipeline;
pub mod soap;
pub mod stats;
pub mod submit;
