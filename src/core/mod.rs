//! Core mapping: the parsed tree, coercion, path lookup and the invoice mapper.
//!
//! Everything here is a pure function of its input. No I/O, no shared
//! mutable state; callers may map documents concurrently without locking.

pub mod coerce;
mod error;
mod mapper;
pub mod namespace;
mod response;
pub mod tree;
mod types;

pub use coerce::{parse_number, round_amount, to_number, to_vat_rate};
pub use error::*;
pub use mapper::*;
pub use namespace::{local_name, strip_namespaces, strip_namespaces_with};
pub use response::*;
pub use tree::{Conventions, Node, first_of, resolve, resolve_or};
pub use types::*;
