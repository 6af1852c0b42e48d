//! Entry point for everything the venue reports back

use relay_core::Outcome;
use relay_ports::{Notification, NotificationSink, Push, Reply};
use std::sync::Arc;

use crate::error::EngineError;
use crate::events::EngineEvent;
use crate::pagination::PageVerdict;
use crate::request::{Decoding, Request};
use crate::shared::Shared;

/// Routes venue notifications to the request in flight or to push handlers
///
/// Safe to call from any thread. Never blocks beyond short map updates.
#[derive(Clone)]
pub struct CallbackRouter {
    shared: Arc<Shared>,
}

impl CallbackRouter {
    pub(crate) fn new(shared: Arc<Shared>) -> Self {
        Self { shared }
    }

    fn on_reply(&self, reply: Reply) {
        log::debug!(
            "Reply {} with {} item(s), more={}",
            reply.name,
            reply.page.len(),
            reply.more
        );
        if let Some(message) = &reply.message {
            log::info!("{}: {message}", reply.name);
        }

        let Some(request) = self.shared.claim_reply(&reply.name) else {
            log::warn!("Unsolicited reply {}; keeping it aside", reply.name);
            self.shared.events.publish(EngineEvent::Unsolicited {
                name: reply.name.clone(),
            });
            if let Some(evicted) = self.shared.stray.push(reply) {
                log::debug!("Evicted stray reply {}", evicted.name);
            }
            return;
        };

        self.handle(&request, &reply);

        if self.shared.lock.release(request.token) {
            self.shared.events.publish(EngineEvent::Released {
                token: request.token,
                name: request.name().clone(),
            });
        }
    }

    fn handle(&self, request: &Request, reply: &Reply) {
        match &request.decoding {
            Decoding::Ack => self.shared.finish(request, Ok(Outcome::Ack)),
            Decoding::With(decoder) => match decoder.decode(reply) {
                Ok(decoded) => {
                    self.shared.finish(request, Ok(decoded.outcome));
                    for follow_up in decoded.follow_ups {
                        let name = follow_up.name().clone();
                        if let Err(err) = self.shared.submit(follow_up) {
                            log::error!("Follow-up {name} of {} not queued: {err}", request.name());
                        }
                    }
                }
                Err(err) => self.shared.finish(request, Err(err)),
            },
            Decoding::Series(spec) => match self.shared.paginator.merge(request, spec, reply) {
                PageVerdict::Continue { .. } => {
                    let next = request.next_page();
                    log::debug!("Queued next page of {} ({})", request.series_key(), next.token);
                    self.shared.events.publish(EngineEvent::Submitted {
                        token: next.token,
                        name: next.name().clone(),
                    });
                    self.shared.queue.enqueue_back(next);
                }
                PageVerdict::Complete(series) => {
                    self.shared.finish(request, Ok(Outcome::Series(series)))
                }
                PageVerdict::Superseded => {
                    let name = request.name().clone();
                    self.shared.finish(request, Err(EngineError::Superseded { name }))
                }
                PageVerdict::Ignored => {
                    log::debug!("{} ({}) already completed", request.series_key(), request.origin)
                }
            },
        }
    }

    fn on_push(&self, push: Push) {
        match self.shared.push_handlers.get(&push.topic).map(|entry| entry.value().clone()) {
            Some(handler) => {
                log::debug!("Push {} with {} item(s)", push.topic, push.page.len());
                handler(&push);
            }
            None => log::debug!("No handler for push topic {}", push.topic),
        }
    }
}

impl NotificationSink for CallbackRouter {
    fn deliver(&self, notification: Notification) {
        match notification {
            Notification::Reply(reply) => self.on_reply(reply),
            Notification::Push(push) => self.on_push(push),
        }
    }
}
