//! Exchange state of the current session.

use std::sync::Arc;

use cn_06_exchange::ExchangeStat;
use shared_types::ContentId;

use super::online;
use crate::error::Result;
use crate::lifecycle::LifecycleController;

#[derive(Clone)]
pub struct ExchangeApi {
    lifecycle: Arc<LifecycleController>,
}

impl ExchangeApi {
    pub(crate) fn new(lifecycle: Arc<LifecycleController>) -> Self {
        Self { lifecycle }
    }

    pub fn wantlist(&self) -> Result<Vec<ContentId>> {
        Ok(online(&self.lifecycle)?.exchange().wantlist())
    }

    pub fn stat(&self) -> Result<ExchangeStat> {
        Ok(online(&self.lifecycle)?.exchange().stat())
    }

    /// Drop the want for `cid`. Pending fetches of it fail `Cancelled`.
    pub fn unwant(&self, cid: &ContentId) -> Result<bool> {
        Ok(online(&self.lifecycle)?.exchange().unwant(cid))
    }
}
