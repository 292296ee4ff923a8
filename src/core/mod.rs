pub mod errors;
pub mod helpers;
pub mod store;

use crate::config::Config;
use crate::core::store::KvStore;

/// Everything a handler needs besides the request.
#[derive(Clone, Copy)]
pub struct Ctx<'a> {
    pub store: &'a dyn KvStore,
    pub config: &'a Config,
}

impl<'a> Ctx<'a> {
    pub fn new(store: &'a dyn KvStore, config: &'a Config) -> Self {
        Self { store, config }
    }
}
