//! mergetag fills placeholder templates for email campaigns and converts
//! them into Klaviyo merge tags.
//!
//! The template renderer works off variable maps derived from an editable
//! variables table, reconciling the table's base rows with the rows a user
//! has edited in place. Around that core, [`Context`] provides the campaign
//! builder's event handlers, which reach the host platform only through the
//! traits in [`host`]. For the command line interface, see the
//! `mergetag-cli` crate.

pub mod campaign;
mod context;
pub mod data;
mod editor;
mod error;
mod fs;
mod hash;
pub mod host;
mod imports;
pub mod klaviyo;
pub mod overlay;
pub mod preview;
mod settings;
mod store;
pub mod template;
mod value;

pub use context::Context;
pub use error::Error;
pub use hash::content_hash;
pub use klaviyo::convert_to_klaviyo;
pub use overlay::{
    build_variable_map, merge_rows, RowOverride, VariableField, VariableMap, VariableTable,
};
pub use preview::{test_render, TestRender};
pub use settings::{Settings, TestFields};
pub use store::Store;
pub use template::{extract_placeholders, fill_template, Placeholder};
pub use value::{Map, Row, SupportedFormat, Value};
