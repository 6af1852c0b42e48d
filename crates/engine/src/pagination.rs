//! Merging paged replies into one series per entity

use dashmap::DashMap;
use relay_core::values::parse_series_time;
use relay_core::{ResultAccumulator, SeriesKey, WindowCheck};
use relay_ports::Reply;

use crate::request::{Request, SeriesSpec};

/// What to do after a page was merged
#[derive(Debug, Clone, PartialEq)]
pub enum PageVerdict {
    /// More pages are needed; the caller queues a continuation
    Continue { merged: usize },
    /// The series is finished
    Complete(ResultAccumulator),
    /// The series was restarted by a newer fetch, or never started
    Superseded,
    /// Extra page for a series this fetch already completed
    Ignored,
}

/// Per-entity accumulators for paged fetches
///
/// Rows arrive newest first. Rows newer than the window end are skipped,
/// the first row older than the window start ends the fetch.
#[derive(Debug, Default)]
pub struct Paginator {
    series: DashMap<SeriesKey, ResultAccumulator>,
}

impl Paginator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge one reply page for `request`
    pub fn merge(&self, request: &Request, spec: &SeriesSpec, reply: &Reply) -> PageVerdict {
        let key = request.series_key();
        if !request.is_continuation() {
            let accumulator =
                ResultAccumulator::new(spec.fields.iter().cloned()).started_by(request.origin);
            self.series.insert(key.clone(), accumulator);
        }

        let Some(mut accumulator) = self.series.get_mut(&key) else {
            log::warn!("Continuation page for {key} without a started series");
            return PageVerdict::Superseded;
        };
        if !accumulator.is_from(request.origin) {
            log::warn!(
                "Fetch {} of {key} was restarted by {:?}; dropping its page",
                request.origin,
                accumulator.origin().map(|origin| origin.to_string())
            );
            return PageVerdict::Superseded;
        }
        if accumulator.is_complete() {
            log::debug!("Dropping extra page for completed series {key}");
            return PageVerdict::Ignored;
        }

        let params = request.params;
        let fields: Vec<&str> = spec.fields.iter().map(String::as_str).collect();
        let page = reply.page.as_ref();
        let before = accumulator.len();
        let mut cutoff = false;

        for index in 0..page.len() {
            if params.cap_reached(accumulator.len()) {
                break;
            }
            let Some(series_time) = page
                .field(index, &spec.key_field)
                .as_deref()
                .and_then(parse_series_time)
            else {
                log::debug!("Skipping row {index} of {key}: no usable {}", spec.key_field);
                continue;
            };
            match params.check(series_time) {
                WindowCheck::After => continue,
                WindowCheck::Before => {
                    cutoff = true;
                    break;
                }
                WindowCheck::Inside => accumulator.append(&page.record(index, &fields)),
            }
        }
        accumulator.page_merged();

        let merged = accumulator.len() - before;
        let complete =
            !reply.more || cutoff || params.cap_reached(accumulator.len()) || page.is_empty();
        log::debug!(
            "Merged page {} of {key}: {merged} rows, {} total, more={}, cutoff={cutoff}",
            accumulator.pages(),
            accumulator.len(),
            reply.more
        );

        if complete {
            accumulator.mark_complete();
            PageVerdict::Complete(accumulator.clone())
        } else {
            PageVerdict::Continue { merged }
        }
    }

    pub fn snapshot(&self, key: &SeriesKey) -> Option<ResultAccumulator> {
        self.series.get(key).map(|entry| entry.value().clone())
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}
