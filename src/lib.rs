// lib.rs      giflet crate.
//
// Copyright (c) 2026  giflet developers
//
#[macro_use]
extern crate log;

pub mod block;
mod decode;
mod error;
mod play;
mod source;

pub use crate::block::{Animation, DisposalMethod, Frame};
pub use crate::decode::{decode, is_gif};
pub use crate::error::DecodeError;
pub use crate::play::{Player, RasterSurface, Rasterizer, Surface};
pub use crate::source::{SourceCache, SourceResult};
