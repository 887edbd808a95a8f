//! Request Context: per-request identity carried through the pipeline
use chrono::{DateTime, Utc};

use crate::data_model::SubCommand;

#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: String,
    pub operation: SubCommand,
    pub received_at: DateTime<Utc>,
}

impl RequestContext {
    pub fn new(operation: SubCommand) -> Self {
        Self {
            request_id: uuid::Uuid::new_v4().to_string(),
            operation,
            received_at: Utc::now(),
        }
    }

    /// Milliseconds since the request was received
    pub fn elapsed_ms(&self) -> i64 {
        (Utc::now() - self.received_at).num_milliseconds().max(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_ids_are_unique() {
        let a = RequestContext::new(SubCommand::SearchName);
        let b = RequestContext::new(SubCommand::SearchName);
        assert_ne!(a.request_id, b.request_id);
        assert!(a.elapsed_ms() >= 0);
    }
}
