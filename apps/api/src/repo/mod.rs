//! Entity store seam.
//!
//! Handlers only see `Arc<dyn Repository<T>>`, so tests and future backends
//! can substitute their own store. The only implementation today keeps every
//! store in process memory for the lifetime of the service.

pub mod memory;
pub mod seed;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::lfa::Record;
use crate::models::candidate::Candidate;
use crate::models::chat::{ChatMessage, ChatRoom};
use crate::models::client::Client;
use crate::models::contract::Contract;
use crate::models::employee::Employee;
use crate::models::invoice::Invoice;
use crate::models::vendor::Vendor;

pub use memory::InMemoryRepository;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RepoError {
    #[error("{kind} '{id}' not found")]
    NotFound { kind: &'static str, id: String },

    #[error("{kind} '{id}' already exists")]
    Duplicate { kind: &'static str, id: String },

    /// The stored record no longer matches the copy the caller read.
    #[error("{kind} '{id}' was changed by another request; reload and retry")]
    Stale { kind: &'static str, id: String },
}

pub type RepoResult<T> = Result<T, RepoError>;

#[async_trait]
pub trait Repository<T: Record + Clone + PartialEq + Send + Sync + 'static>: Send + Sync {
    /// Snapshot of the whole store, in insertion order.
    async fn list(&self) -> RepoResult<Arc<Vec<T>>>;
    async fn get(&self, id: &str) -> RepoResult<Option<T>>;
    async fn insert(&self, record: T) -> RepoResult<T>;
    /// Replaces the record with the same id, whatever it currently holds.
    async fn update(&self, record: T) -> RepoResult<T>;
    /// Replaces `expected` with `replacement` only if the store still holds
    /// `expected` unchanged. Both must carry the same id.
    async fn swap(&self, expected: &T, replacement: T) -> RepoResult<T>;
    /// `swap` for several records under one write. Nothing is written unless
    /// every pair still matches.
    async fn swap_many(&self, changes: Vec<(T, T)>) -> RepoResult<Vec<T>>;
    async fn delete(&self, id: &str) -> RepoResult<T>;
}

/// Every entity store the service holds.
#[derive(Clone)]
pub struct Repositories {
    pub candidates: Arc<dyn Repository<Candidate>>,
    pub clients: Arc<dyn Repository<Client>>,
    pub vendors: Arc<dyn Repository<Vendor>>,
    pub employees: Arc<dyn Repository<Employee>>,
    pub chat_rooms: Arc<dyn Repository<ChatRoom>>,
    pub messages: Arc<dyn Repository<ChatMessage>>,
    pub contracts: Arc<dyn Repository<Contract>>,
    pub invoices: Arc<dyn Repository<Invoice>>,
}

impl Repositories {
    pub fn empty() -> Self {
        Self {
            candidates: Arc::new(InMemoryRepository::new("candidate")),
            clients: Arc::new(InMemoryRepository::new("client")),
            vendors: Arc::new(InMemoryRepository::new("vendor")),
            employees: Arc::new(InMemoryRepository::new("employee")),
            chat_rooms: Arc::new(InMemoryRepository::new("chat room")),
            messages: Arc::new(InMemoryRepository::new("message")),
            contracts: Arc::new(InMemoryRepository::new("contract")),
            invoices: Arc::new(InMemoryRepository::new("invoice")),
        }
    }

    /// Stores pre-filled with the demo fixtures.
    pub fn seeded() -> RepoResult<Self> {
        let fixtures = seed::fixtures();
        Ok(Self {
            candidates: Arc::new(InMemoryRepository::with_records(
                "candidate",
                fixtures.candidates,
            )?),
            clients: Arc::new(InMemoryRepository::with_records("client", fixtures.clients)?),
            vendors: Arc::new(InMemoryRepository::with_records("vendor", fixtures.vendors)?),
            employees: Arc::new(InMemoryRepository::with_records(
                "employee",
                fixtures.employees,
            )?),
            chat_rooms: Arc::new(InMemoryRepository::with_records(
                "chat room",
                fixtures.chat_rooms,
            )?),
            messages: Arc::new(InMemoryRepository::with_records("message", fixtures.messages)?),
            contracts: Arc::new(InMemoryRepository::with_records(
                "contract",
                fixtures.contracts,
            )?),
            invoices: Arc::new(InMemoryRepository::with_records("invoice", fixtures.invoices)?),
        })
    }
}
