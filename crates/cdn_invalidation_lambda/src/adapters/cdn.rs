use crate::adapters::ProviderError;
use crate::runtime::contract::{InvalidationReceipt, InvalidationRequest};

pub trait CdnInvalidator {
    fn create_invalidation(
        &self,
        request: &InvalidationRequest,
    ) -> Result<InvalidationReceipt, ProviderError>;
}
