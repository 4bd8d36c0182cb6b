use super::RawHandle;

/// An externally created KTM transaction, threaded into transacted calls.
///
/// Non-owning: the surrounding scope created the handle and is the only party
/// that commits, rolls back or closes it. The value may be read from several
/// threads at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransactionContext {
    handle: RawHandle,
}

impl TransactionContext {
    pub fn new(handle: RawHandle) -> Self {
        Self { handle }
    }

    /// Value passed as the transaction argument of an OS call.
    pub fn as_native_parameter(&self) -> RawHandle {
        self.handle
    }

    /// `RawHandle::NULL` when no transaction is active.
    pub fn parameter_for(transaction: Option<&TransactionContext>) -> RawHandle {
        transaction.map_or(RawHandle::NULL, TransactionContext::as_native_parameter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_transaction_is_null() {
        assert_eq!(TransactionContext::parameter_for(None), RawHandle::NULL);
        let tx = TransactionContext::new(RawHandle(0x1c4));
        assert_eq!(TransactionContext::parameter_for(Some(&tx)), RawHandle(0x1c4));
    }

    #[test]
    fn shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<TransactionContext>();
    }
}
