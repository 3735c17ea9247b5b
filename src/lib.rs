//! Nested task lists that can be reordered and re-nested by dragging.
//!
//! The engine keeps each section as an owned tree of [`model::TaskItem`]s.
//! Rendering and drag handling work on a pre-order flat view
//! ([`ops::flatten`]); a drop projects a legal depth and parent from the
//! pointer's horizontal travel ([`ops::projection`]) and the flat rows are
//! rebuilt into a tree ([`ops::build`]).

pub mod cli;
pub mod io;
pub mod model;
pub mod ops;
pub mod util;
