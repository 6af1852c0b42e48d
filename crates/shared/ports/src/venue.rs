use relay_core::RequestName;
use serde::{Deserialize, Serialize};

use crate::error::VenueResult;
use crate::notification::Notification;

/// One call to the venue's native interface
///
/// `args` are positional, `inputs` are named input values set before the
/// call. `name` is echoed back in the reply and is the correlation key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VenueCall {
    pub name: RequestName,
    /// Native action identifier, e.g. a transaction code
    pub action: String,
    /// Screen number the venue groups replies under
    #[serde(default)]
    pub screen: Option<String>,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub inputs: Vec<(String, String)>,
    /// Ask for the next page of a previous call with the same name
    #[serde(default)]
    pub continuation: bool,
}

impl VenueCall {
    pub fn new(name: impl Into<RequestName>, action: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            action: action.into(),
            screen: None,
            args: Vec::new(),
            inputs: Vec::new(),
            continuation: false,
        }
    }

    pub fn screen(mut self, screen: impl Into<String>) -> Self {
        self.screen = Some(screen.into());
        self
    }

    pub fn arg(mut self, value: impl ToString) -> Self {
        self.args.push(value.to_string());
        self
    }

    pub fn input(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.inputs.push((key.into(), value.to_string()));
        self
    }

    pub fn input_value(&self, key: &str) -> Option<&str> {
        self.inputs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Same call, asking for the next page
    pub fn next_page(&self) -> Self {
        Self {
            continuation: true,
            ..self.clone()
        }
    }
}

/// Port for the external trading venue
///
/// The venue accepts one call at a time and answers later through a
/// [`NotificationSink`]. `invoke` only reports whether the call was accepted.
pub trait Venue: Send + Sync {
    fn invoke(&self, call: &VenueCall) -> VenueResult<()>;

    /// Venue name for logging
    fn name(&self) -> &str {
        "Venue"
    }
}

/// Port the venue uses to hand back notifications
///
/// Called from the venue's own thread or task. Implementations must not block.
pub trait NotificationSink: Send + Sync {
    fn deliver(&self, notification: Notification);
}
