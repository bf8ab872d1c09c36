pub mod cache;
pub mod engine;
pub mod grid;
pub mod integrator;
pub mod regulation;
pub mod report;
pub mod shadow;
pub mod solar;
