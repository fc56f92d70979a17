//! Internal helper functions and utilities.
//!
//! This module contains shared implementation details that are not part
//! of the public API.

mod helpers;
mod merge;
mod packets;
mod policy;

pub(crate) use helpers::*;
pub(crate) use merge::*;
pub(crate) use packets::*;
pub(crate) use policy::*;
