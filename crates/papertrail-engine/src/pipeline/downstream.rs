use crate::ports::{MutationHandler, MutationRequest, MutationResponse};

/// A request that has not reached the host handler yet
///
/// `invoke` takes `self`, so once the request is wrapped it can be handed to
/// the host exactly once.
pub(crate) struct PendingMutation {
    request: MutationRequest,
}

impl PendingMutation {
    pub(crate) fn new(request: MutationRequest) -> Self {
        Self { request }
    }

    pub(crate) async fn invoke(self, handler: &dyn MutationHandler) -> MutationResponse {
        handler.handle(self.request).await
    }
}
