pub mod cycle;
pub mod scheduler;
