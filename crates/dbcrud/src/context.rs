//! Ambient connection context.
//!
//! Code generated in context mode takes a `&DbContext` instead of an explicit
//! client and pulls the connection out with [`DbContext::db`].

use std::any::{Any, type_name};
use std::fmt;
use std::sync::Arc;

use crate::error::{CrudError, CrudResult};

/// A cheap-to-clone bag that may carry one database connection.
#[derive(Clone, Default)]
pub struct DbContext {
    db: Option<Arc<dyn Any + Send + Sync>>,
}

impl DbContext {
    /// An empty context with no connection attached.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach `db`, replacing any connection already carried.
    pub fn with_db<C>(self, db: C) -> Self
    where
        C: Any + Send + Sync,
    {
        self.with_shared_db(Arc::new(db))
    }

    /// Attach an already shared connection.
    pub fn with_shared_db<C>(mut self, db: Arc<C>) -> Self
    where
        C: Any + Send + Sync,
    {
        self.db = Some(db);
        self
    }

    pub fn has_db(&self) -> bool {
        self.db.is_some()
    }

    /// Borrow the carried connection as a `C`.
    ///
    /// Fails with [`CrudError::NoConnectionInContext`] when nothing is attached
    /// and [`CrudError::WrongConnectionType`] when the value is not a `C`.
    pub fn db<C: Any>(&self) -> CrudResult<&C> {
        let db = self.db.as_deref().ok_or(CrudError::NoConnectionInContext)?;
        db.downcast_ref::<C>()
            .ok_or(CrudError::WrongConnectionType {
                expected: type_name::<C>(),
            })
    }
}

impl fmt::Debug for DbContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbContext")
            .field("has_db", &self.has_db())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct FakeConn(u8);

    #[test]
    fn test_empty_context() {
        let cx = DbContext::new();
        let err = cx.db::<FakeConn>().unwrap_err();
        assert!(matches!(err, CrudError::NoConnectionInContext));
    }

    #[test]
    fn test_wrong_type() {
        let cx = DbContext::new().with_db(42u32);
        let err = cx.db::<FakeConn>().unwrap_err();
        assert!(matches!(err, CrudError::WrongConnectionType { .. }));
        assert!(err.to_string().contains("FakeConn"));
    }

    #[test]
    fn test_round_trip() {
        let cx = DbContext::new().with_db(FakeConn(3));
        let cloned = cx.clone();
        assert_eq!(cloned.db::<FakeConn>().unwrap().0, 3);
    }
}
