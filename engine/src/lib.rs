//! Core decision-making engine for an ALE reinforcement-learning agent:
//! RAM feature extraction, linear function approximation, Sarsa, and the
//! Dyna-2 dual-memory architecture, plus the settings/error/simulator
//! contracts the rest of the workspace builds on.

pub mod actuate;
pub mod constants;
pub mod dyna;
pub mod error;
pub mod features;
pub mod lfa;
pub mod sarsa;
pub mod settings;
pub mod simulator;
pub mod test_support;
