pub mod diagnose;
pub mod system;
