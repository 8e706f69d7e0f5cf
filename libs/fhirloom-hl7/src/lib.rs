//! Canonical HL7 v2 message tree and the Message View: a pure navigator that
//! resolves spec paths (`SEGMENT.FIELD(REP).COMPONENT.SUBCOMPONENT`, `$field`
//! re-rooting, and `A | B` alternation) against a parsed message.
//!
//! The only module that depends on the external `hl7-parser` crate's own
//! types is [`adapter`]; everything else operates on the tree in [`node`].

pub mod adapter;
pub mod error;
pub mod node;
pub mod scope;
pub mod spec;
pub mod value;
pub mod view;

pub use adapter::adapt;
pub use error::{Error, Result};
pub use node::{HL7Tree, Node};
pub use scope::Scope;
pub use spec::{Root, Spec, SpecPath};
pub use value::Value;
pub use view::{resolve, resolve_nodes, resolve_traced};
