//! Data model shared by the extraction pipeline.
//!
//! [`Document`] and [`Page`] carry what the text source read from a PDF;
//! [`Record`] is the fixed-schema result written for each document.

mod document;
mod page;
mod record;

pub use document::{Document, DocumentInfo};
pub use page::{Page, TextLine, TextSpan};
pub use record::{FieldName, HeadingLevel, OutlineEntry, Record};

pub(crate) use document::file_name_of;
pub(crate) use page::is_spaceless_script_char;
