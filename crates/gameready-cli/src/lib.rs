//! Gameready CLI library.
//!
//! Loads scene snapshots and glTF models into a [`gameready_scene::Scene`]
//! and runs the validator commands over them.

pub mod commands;
pub mod gltf_import;
pub mod input;
