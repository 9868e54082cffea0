//! Data models for playdeck

pub mod play;

pub use play::{
    console_of, to_local, GameAggregate, PlayMaps, PlaySession, RomHome, RomId, RomRecord,
};
