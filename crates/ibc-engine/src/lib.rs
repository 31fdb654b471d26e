#![doc = include_str!("../README.md")]

pub mod config;
pub mod encoder;
pub mod extract;
pub mod numeric;
pub mod pipeline;
pub mod polynomial;
pub mod region;
pub mod render;
pub mod result;
pub mod sanity;
pub mod systems;
pub mod template;
