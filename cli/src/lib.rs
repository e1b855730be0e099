//! sniper-cli library, exposed so the binary's modules can be unit tested.

pub mod commands;
pub mod state;
