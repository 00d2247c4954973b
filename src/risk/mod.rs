// Risk gating module
pub mod cooldown;

pub use cooldown::Cooldown;
