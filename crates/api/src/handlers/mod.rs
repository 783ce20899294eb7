pub mod scheduler;
pub mod servers;
