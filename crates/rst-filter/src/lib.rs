//! Filter expression language for locally narrowing a cached result set.
//!
//! A filter is a conjunction of clauses separated by `&`, each of the form
//! `characteristic R threshold` with `R` one of `>`, `>=`, `=`, `<=`, `<`:
//!
//! ```text
//! support >= 5 & length <= 2
//! confidence>0.5
//! ```
//!
//! Whitespace is ignored everywhere. A blank filter matches every item.
//! There is no `|` operator and no grouping.
//!
//! # Example
//!
//! ```
//! use rst_filter::{Item, apply_filter};
//!
//! let items = vec![
//!     Item::new(0).with("support", 6.0).with("length", 1.0),
//!     Item::new(1).with("support", 4.0).with("length", 1.0),
//! ];
//!
//! let shown = apply_filter("support >= 5", &items).unwrap();
//! assert_eq!(shown.len(), 1);
//! assert_eq!(shown[0].id, 0);
//! ```
//!
//! # Architecture
//!
//! - `ast` - Relations, clauses and the parsed [`Filter`]
//! - `parse` - Text to [`Filter`] conversion
//! - `item` - [`Item`] projection and the [`Filterable`] seam
//! - `view` - [`apply_filter`] and the error-tolerant [`FilterView`]

mod ast;
mod error;
mod item;
mod parse;
mod view;

pub use ast::{Clause, Filter, Relation};
pub use error::{FilterSyntaxError, Result, SyntaxErrorKind};
pub use item::{CharacteristicValue, Filterable, Item};
pub use parse::parse;
pub use view::{FilterView, apply_filter};
