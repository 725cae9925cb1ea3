//! dispatch/mod.rs
//! Schema-aware field dispatcher.
//!
//! Responsibilities:
//! - Split array-of-records bytes into one stream per field tag
//! - Emit the tag/size side channel describing every segment
//! - Merge field streams back into records using that side channel
//!
//! Non-responsibilities:
//! - Choosing or running codecs (see `engine`)
//! - Chunking or IO

pub mod types;
pub mod split;
pub mod merge;
pub mod transform;

pub use types::{
    DispatchError,
    DispatchOutput,
    FieldStream,
};
pub use split::dispatch_split;
pub use merge::dispatch_merge;
pub use transform::{
    FieldTransform,
    RecordDispatch,
    RECORD_DISPATCH_NAME,
};
