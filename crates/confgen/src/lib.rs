//! # confgen - per-scheme swift constants from configuration documents
//!
//! `confgen` reads `.config` json documents and writes one swift file per document. Application code
//! then refers to typed constants (`Api.host`, `Feature.enabled`) instead of parsing configuration at
//! runtime. Which values end up in the file depends on the active *scheme* (`dev`, `prod`, ...).
//!
//! ## Introduction for developers
//!
//! Read this to understand how `confgen` works internally.
//!
//! ### Documents
//!
//! ```json
//! {
//!     "template": { "imports": ["UIKit"] },
//!     "environment": {
//!         "type": "String",
//!         "defaultValue": "staging",
//!         "overrides": { "prod": "production" }
//!     },
//!     "Api": {
//!         "host": {
//!             "type": "URL",
//!             "defaultValue": "https://staging.example.com",
//!             "overrides": { "prod": "https://example.com" }
//!         }
//!     }
//! }
//! ```
//!
//! - an entry with a `type` is a property, see [definition::PropertyType] for the known types
//! - an entry without a `type` is a group and becomes a nested `enum`
//! - the root `template` entry tweaks the output, see [definition::TemplateOptions]
//!
//! ### Loading
//!
//! [sources::ConfigSources] finds and parses documents into [value::Value]s. This is the only part
//! of the library that touches the filesystem.
//!
//! ### Template selection
//!
//! A [template::TemplateRegistry] picks the first [template::Template] that can handle a document.
//! [configuration_file::ConfigurationFileTemplate] handles everything and must come last.
//!
//! ### Resolution
//!
//! [definition::ConfigurationSpec::new] splits a document into properties and groups.
//! [group::resolve] then walks the scopes and resolves each property ([property]):
//!
//! 1. start from `defaultValue`
//! 2. with an `associatedProperty`, pick the override keyed by that sibling's resolved value
//! 3. otherwise pick the override keyed by the active scheme
//!
//! `schemeName` is injected at the top level (except for extensions). Each `EncryptionKey` gets an
//! `<name>IV` sibling and `Encrypted` values are encrypted reproducibly ([encryption]).
//!
//! ### Rendering
//!
//! [render::GeneratedFile] writes the swift source: sorted imports, properties sorted by name,
//! groups in declaration order.
//!
//! ### Writing
//!
//! Callers compare the text with what is on disk ([change::ChangeStatus]) and only write when it
//! differs. Generation returns [event::Event]s instead of logging, the caller decides what to show.
//!
pub mod change;
pub mod configuration_file;
pub mod definition;
pub mod encryption;
pub mod error;
pub mod event;
pub mod group;
pub mod property;
pub mod render;
pub mod sources;
pub mod template;
pub mod value;
