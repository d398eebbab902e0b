//! Resource module
//!
//! A `Resource` is an explicit capability record: one optional slot per
//! capability contract. Which slots are filled is decided when the record is
//! built and never changes afterwards.

mod capability;

use std::fmt;
use std::sync::Arc;

pub use capability::{Create, FetchAll, FetchById, Payload};

/// The capabilities a resource provides
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
    pub fetch_all: bool,
    pub fetch_by_id: bool,
    pub create: bool,
}

impl Capabilities {
    pub const fn is_empty(self) -> bool {
        !self.fetch_all && !self.fetch_by_id && !self.create
    }
}

impl fmt::Display for Capabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = [
            (self.fetch_all, "fetch-all"),
            (self.fetch_by_id, "fetch-by-id"),
            (self.create, "create"),
        ]
        .into_iter()
        .filter_map(|(present, name)| present.then_some(name))
        .collect();

        if names.is_empty() {
            write!(f, "none")
        } else {
            write!(f, "{}", names.join(", "))
        }
    }
}

/// Consumer-supplied API entity, dispatched to by capability
#[derive(Default, Clone)]
pub struct Resource {
    fetch_all: Option<Arc<dyn FetchAll>>,
    fetch_by_id: Option<Arc<dyn FetchById>>,
    create: Option<Arc<dyn Create>>,
}

impl Resource {
    /// A resource with no capabilities; every request to it is answered
    /// with "method not implemented".
    pub fn new() -> Self {
        Self::default()
    }

    /// Fill all three slots from one value implementing every contract.
    pub fn full<T>(value: Arc<T>) -> Self
    where
        T: FetchAll + FetchById + Create + 'static,
    {
        Self::new()
            .with_fetch_all(value.clone())
            .with_fetch_by_id(value.clone())
            .with_create(value)
    }

    #[must_use]
    pub fn with_fetch_all(mut self, capability: Arc<dyn FetchAll>) -> Self {
        self.fetch_all = Some(capability);
        self
    }

    #[must_use]
    pub fn with_fetch_by_id(mut self, capability: Arc<dyn FetchById>) -> Self {
        self.fetch_by_id = Some(capability);
        self
    }

    #[must_use]
    pub fn with_create(mut self, capability: Arc<dyn Create>) -> Self {
        self.create = Some(capability);
        self
    }

    pub fn fetch_all(&self) -> Option<&dyn FetchAll> {
        self.fetch_all.as_deref()
    }

    pub fn fetch_by_id(&self) -> Option<&dyn FetchById> {
        self.fetch_by_id.as_deref()
    }

    pub fn create(&self) -> Option<&dyn Create> {
        self.create.as_deref()
    }

    pub fn capabilities(&self) -> Capabilities {
        Capabilities {
            fetch_all: self.fetch_all.is_some(),
            fetch_by_id: self.fetch_by_id.is_some(),
            create: self.create.is_some(),
        }
    }
}

impl fmt::Debug for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resource")
            .field("capabilities", &self.capabilities())
            .finish()
    }
}
