pub mod engine;

pub use engine::SchedulingEngine;
