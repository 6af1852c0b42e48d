use relay_core::RequestName;
use std::sync::Arc;

use crate::page::PageReader;

/// Anything the venue tells us asynchronously
#[derive(Clone)]
pub enum Notification {
    /// Result of a call, released against the request in flight
    Reply(Reply),
    /// Unsolicited stream update; never answers a call
    Push(Push),
}

impl Notification {
    pub fn reply(name: impl Into<RequestName>, more: bool, page: impl PageReader + 'static) -> Self {
        Notification::Reply(Reply {
            name: name.into(),
            more,
            page: Arc::new(page),
            message: None,
        })
    }

    pub fn push(topic: impl Into<String>, page: impl PageReader + 'static) -> Self {
        Notification::Push(Push {
            topic: topic.into(),
            page: Arc::new(page),
        })
    }
}

impl std::fmt::Debug for Notification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Notification::Reply(reply) => reply.fmt(f),
            Notification::Push(push) => push.fmt(f),
        }
    }
}

/// Correlated result of a call
#[derive(Clone)]
pub struct Reply {
    /// Request name the venue echoes back
    pub name: RequestName,
    /// The venue holds at least one more page for this fetch
    pub more: bool,
    pub page: Arc<dyn PageReader>,
    /// Free-text message the venue attached, if any
    pub message: Option<String>,
}

impl Reply {
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl std::fmt::Debug for Reply {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reply")
            .field("name", &self.name)
            .field("more", &self.more)
            .field("items", &self.page.len())
            .field("message", &self.message)
            .finish()
    }
}

/// Unsolicited update on a topic (execution notices, balances, real-time data)
#[derive(Clone)]
pub struct Push {
    pub topic: String,
    pub page: Arc<dyn PageReader>,
}

impl std::fmt::Debug for Push {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Push")
            .field("topic", &self.topic)
            .field("items", &self.page.len())
            .finish()
    }
}
