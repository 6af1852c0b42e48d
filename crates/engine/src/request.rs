//! What callers submit and what the dispatch loop carries

use relay_core::{
    CorrelationToken, FetchParams, Outcome, RequestName, SeriesKey, Timestamp,
};
use relay_ports::{Reply, VenueCall};
use std::sync::Arc;
use tokio::time::Instant;

use crate::error::Result;

/// Turns a reply into an outcome plus any requests it triggers
pub trait Decoder: Send + Sync {
    fn decode(&self, reply: &Reply) -> Result<Decoded>;
}

impl<F> Decoder for F
where
    F: Fn(&Reply) -> Result<Decoded> + Send + Sync,
{
    fn decode(&self, reply: &Reply) -> Result<Decoded> {
        self(reply)
    }
}

/// Decoder output
#[derive(Debug)]
pub struct Decoded {
    pub outcome: Outcome,
    /// Submitted after the reply has been handled, in order
    pub follow_ups: Vec<Submission>,
}

impl Decoded {
    pub fn new(outcome: Outcome) -> Self {
        Self {
            outcome,
            follow_ups: Vec::new(),
        }
    }

    pub fn with_follow_up(mut self, submission: Submission) -> Self {
        self.follow_ups.push(submission);
        self
    }
}

/// How the rows of a paged series are read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesSpec {
    /// Field holding the sortable series key (e.g. candle time)
    pub key_field: String,
    /// Fields copied into the accumulator
    pub fields: Vec<String>,
}

impl SeriesSpec {
    pub fn new<I, S>(key_field: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            key_field: key_field.into(),
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }
}

/// Reply handling chosen at submission
#[derive(Clone)]
pub enum Decoding {
    /// Any reply completes the request with [`Outcome::Ack`]
    Ack,
    With(Arc<dyn Decoder>),
    /// Paged fetch merged into a per-entity accumulator
    Series(SeriesSpec),
}

impl std::fmt::Debug for Decoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Decoding::Ack => f.write_str("Ack"),
            Decoding::With(_) => f.write_str("With(..)"),
            Decoding::Series(spec) => f.debug_tuple("Series").field(spec).finish(),
        }
    }
}

/// A named venue call as handed to the broker
#[derive(Debug, Clone)]
pub struct Submission {
    pub call: VenueCall,
    /// Entity a paged fetch accumulates for, e.g. a stock code
    pub entity: String,
    pub decoding: Decoding,
}

impl Submission {
    pub fn ack(call: VenueCall) -> Self {
        Self {
            call,
            entity: String::new(),
            decoding: Decoding::Ack,
        }
    }

    pub fn decoded(call: VenueCall, decoder: impl Decoder + 'static) -> Self {
        Self {
            call,
            entity: String::new(),
            decoding: Decoding::With(Arc::new(decoder)),
        }
    }

    pub fn series(call: VenueCall, entity: impl Into<String>, spec: SeriesSpec) -> Self {
        Self {
            call,
            entity: entity.into(),
            decoding: Decoding::Series(spec),
        }
    }

    pub fn with_entity(mut self, entity: impl Into<String>) -> Self {
        self.entity = entity.into();
        self
    }

    pub fn name(&self) -> &RequestName {
        &self.call.name
    }
}

/// A submission waiting in the queue or in flight
#[derive(Debug, Clone)]
pub struct Request {
    /// Per dispatch; each page of a paged fetch gets its own
    pub token: CorrelationToken,
    /// Token of the submission this request descends from
    pub origin: CorrelationToken,
    pub call: VenueCall,
    pub entity: String,
    pub decoding: Decoding,
    /// Parameters as they were when the request was created
    pub params: FetchParams,
    /// Registry generation `params` came from; `None` when none were set
    pub params_generation: Option<u64>,
    /// Dispatches performed so far
    pub attempts: u32,
    /// Do not dispatch before this instant (retry backoff)
    pub not_before: Option<Instant>,
}

impl Request {
    pub fn new(submission: Submission, params: Option<(u64, FetchParams)>) -> Self {
        let (params_generation, params) = match params {
            Some((generation, params)) => (Some(generation), params),
            None => (None, FetchParams::default()),
        };
        let token = CorrelationToken::new();
        Self {
            token,
            origin: token,
            call: submission.call,
            entity: submission.entity,
            decoding: submission.decoding,
            params,
            params_generation,
            attempts: 0,
            not_before: None,
        }
    }

    pub fn name(&self) -> &RequestName {
        &self.call.name
    }

    pub fn is_continuation(&self) -> bool {
        self.call.continuation
    }

    pub fn series_key(&self) -> SeriesKey {
        SeriesKey::new(self.name().clone(), self.entity.clone())
    }

    /// Request for the next page: fresh token, same origin, entity and params snapshot
    pub fn next_page(&self) -> Self {
        Self {
            token: CorrelationToken::new(),
            origin: self.origin,
            call: self.call.next_page(),
            entity: self.entity.clone(),
            decoding: self.decoding.clone(),
            params: self.params,
            params_generation: self.params_generation,
            attempts: 0,
            not_before: None,
        }
    }
}

/// Final report for one request, handed to the completion handler of its name
#[derive(Debug, Clone)]
pub struct Completion {
    /// The token `submit` returned, also for multi-page fetches
    pub token: CorrelationToken,
    pub name: RequestName,
    pub entity: String,
    pub attempts: u32,
    pub result: Result<Outcome>,
    pub completed_at: Timestamp,
}

impl Completion {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }

    pub fn outcome(&self) -> Option<&Outcome> {
        self.result.as_ref().ok()
    }
}

pub type CompletionHandler = Arc<dyn Fn(Completion) + Send + Sync>;
