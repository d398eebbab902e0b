//! Routing module
//!
//! Per-method route trees with named path parameters. Path matching itself
//! is done by `matchit`; this module only keeps one tree per method and
//! reports which methods a path is known under.

mod table;

pub use table::{Lookup, RouteTable};
