pub mod content;
pub mod schema;
pub mod trail;

pub use content::{ContentTree, COMPONENT_TAG, ID_KEY};
pub use schema::{Attribute, ContentSchema, PaperTrailOptions, PluginOptions, SchemaInfo, SchemaKind};
pub use trail::{ChangeKind, ReviewStatus, ReviewUpdate, TrailRecord, TrailSubmission};
