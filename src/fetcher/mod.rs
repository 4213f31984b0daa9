pub mod service;

use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

use crate::query::QueryParams;
use crate::resource::ResourceKind;

pub use service::{
    CredentialProvider, EnvCredentials, HttpRecordService, NoCredentials, RecordService,
    ServiceOptions,
};

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid service URL {url}: {message}")]
    InvalidBaseUrl { url: String, message: String },

    #[error("failed to build HTTP client: {source}")]
    HttpClientBuild {
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to setup proxy: {proxy}: {source}")]
    ProxySetup {
        proxy: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("could not reach the record service: {source}")]
    Transport {
        #[source]
        source: reqwest::Error,
    },

    #[error("record service answered {status} for {url}")]
    Status { status: u16, url: String },

    #[error("record service sent a body that is not JSON: {source}")]
    Decode {
        #[source]
        source: serde_json::Error,
    },

    #[error("{message}")]
    Service { message: String },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FetchTicket(u64);

impl FetchTicket {
    pub fn seq(&self) -> u64 {
        self.0
    }
}

pub struct PendingFetch<S> {
    ticket: FetchTicket,
    kind: ResourceKind,
    query: QueryParams,
    service: Arc<S>,
}

impl<S: RecordService> PendingFetch<S> {
    pub fn ticket(&self) -> FetchTicket {
        self.ticket
    }

    pub fn query(&self) -> &QueryParams {
        &self.query
    }

    pub async fn send(self) -> FetchOutcome {
        let result = self.service.list_records(self.kind, &self.query).await;
        FetchOutcome {
            ticket: self.ticket,
            result,
        }
    }
}

#[derive(Debug)]
pub struct FetchOutcome {
    pub ticket: FetchTicket,
    pub result: Result<Value, FetchError>,
}

#[derive(Debug)]
pub enum Settled {
    Fresh(Value),
    Failed(FetchError),
    Stale(FetchTicket),
}

/// Issues listing requests for one view and decides which answers count.
///
/// Only the outcome of the most recently issued request is ever reported as
/// [`Settled::Fresh`] or [`Settled::Failed`]; everything older settles as
/// [`Settled::Stale`] no matter when it arrives. Requests are never cancelled
/// or retried here.
pub struct ListFetcher<S> {
    kind: ResourceKind,
    service: Arc<S>,
    issued: u64,
    in_flight: usize,
}

impl<S: RecordService> ListFetcher<S> {
    pub fn new(kind: ResourceKind, service: Arc<S>) -> Self {
        Self {
            kind,
            service,
            issued: 0,
            in_flight: 0,
        }
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn latest(&self) -> Option<FetchTicket> {
        (self.issued > 0).then_some(FetchTicket(self.issued))
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn begin(&mut self, query: QueryParams) -> PendingFetch<S> {
        self.issued += 1;
        self.in_flight += 1;
        let ticket = FetchTicket(self.issued);
        log::debug!(
            "{} request #{} issued ({} params)",
            self.kind,
            ticket.seq(),
            query.len()
        );
        PendingFetch {
            ticket,
            kind: self.kind,
            query,
            service: Arc::clone(&self.service),
        }
    }

    pub fn settle(&mut self, outcome: FetchOutcome) -> Settled {
        self.in_flight = self.in_flight.saturating_sub(1);
        let FetchOutcome { ticket, result } = outcome;
        if ticket.seq() != self.issued {
            log::debug!(
                "{} request #{} superseded by #{}, discarding its outcome",
                self.kind,
                ticket.seq(),
                self.issued
            );
            return Settled::Stale(ticket);
        }
        match result {
            Ok(value) => Settled::Fresh(value),
            Err(e) => Settled::Failed(e),
        }
    }

    pub async fn fetch(&mut self, query: QueryParams) -> Settled {
        let outcome = self.begin(query).send().await;
        self.settle(outcome)
    }
}
