use crate::dispatch::merge::dispatch_merge;
use crate::dispatch::split::dispatch_split;
use crate::dispatch::types::{DispatchError, DispatchOutput};

/// Registered name of the record dispatcher.
pub const RECORD_DISPATCH_NAME: &str = "record-dispatch";

/// A reversible transform from raw chunk bytes to tagged field streams.
///
/// Implementations are stateless and shared across workers.
pub trait FieldTransform: Send + Sync {
    fn name(&self) -> &'static str;

    fn split(&self, input: &[u8]) -> Result<DispatchOutput, DispatchError>;

    fn merge(&self, input: &DispatchOutput) -> Result<Vec<u8>, DispatchError>;
}

/// Dispatcher for the fixed 64-byte trace record.
#[derive(Debug, Default, Clone, Copy)]
pub struct RecordDispatch;

impl FieldTransform for RecordDispatch {
    fn name(&self) -> &'static str {
        RECORD_DISPATCH_NAME
    }

    fn split(&self, input: &[u8]) -> Result<DispatchOutput, DispatchError> {
        dispatch_split(input)
    }

    fn merge(&self, input: &DispatchOutput) -> Result<Vec<u8>, DispatchError> {
        dispatch_merge(input)
    }
}
