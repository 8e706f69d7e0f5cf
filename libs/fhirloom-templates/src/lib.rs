//! The Template Loader: decodes YAML Message/Resource/Datatype Templates,
//! layers a primary filesystem folder with an optional override folder, and
//! falls back to a small set of templates embedded in the binary.

pub mod ast;
pub mod embedded;
pub mod error;
pub mod loader;
pub mod merge;
pub mod override_ast;
pub mod source;

pub use ast::{ExpressionType, FieldExpression, FieldType, MessageTemplate, ResourceEntry, ResourceTemplate};
pub use error::{Error, Result};
pub use loader::TemplateLoader;
pub use override_ast::{MessageTemplateOverride, Nullable, ResourceEntryOverride, ResourceTemplateOverride};
pub use source::TemplateSource;
