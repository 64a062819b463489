//! Diplomat core library.
//!
//! Diplomat rewrites the label expressions of MapLibre-style map styles so
//! that labels appear in the reader's preferred languages. Style authors
//! place marker bindings (see [`expression`]) in their `text-field`
//! expressions; [`localize::localize_layers`] replaces them with expressions
//! built for a ranked locale list from [`locale_resolution`].
//!
//! ```rust
//! use diplomat::eval::{Value, evaluate};
//! use diplomat::expression;
//! use diplomat::localize::localize_expression;
//! use serde_json::{Map, json};
//!
//! let mut label = expression::localized_name();
//! localize_expression(&mut label, &["fr".to_owned()], false);
//!
//! let mut properties = Map::new();
//! properties.insert("name".to_owned(), json!("Insula Nullius"));
//! properties.insert("name:fr".to_owned(), json!("Île Nulle"));
//! assert_eq!(evaluate(&label, &properties).unwrap(), Value::from("Île Nulle"));
//! ```

pub mod cli;
pub mod country_names;
pub mod eval;
pub mod expression;
pub mod gloss;
pub mod list_values;
pub mod locale_resolution;
pub mod localize;
pub mod localized_name;
pub mod runner;
pub mod style;
