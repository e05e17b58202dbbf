use serde_json::{Map, Value};
use snafu::{ensure, ResultExt};

use crate::{
    error::{EncodeBodySnafu, MissingEventSnafu, Result},
    recipient::Recipients,
    Contact,
};

/// Accumulates the parameters of one "send notification" call.
///
/// Setters consume and return the builder so calls chain. A builder can be
/// dispatched more than once; its state persists between sends, and repeated
/// [`overrides`](Self::overrides) calls merge rather than replace. Both are
/// deliberate contracts, covered by tests below.
#[derive(Clone, Debug)]
pub struct SendRequest {
    event: Option<String>,
    to: Option<Recipients>,
    from: Option<Contact>,
    payload: Value,
    channel: Option<String>,
    language: Option<String>,
    overrides: Option<Value>,
    idempotency_key: Option<String>,
}

impl Default for SendRequest {
    fn default() -> Self {
        Self {
            event: None,
            to: None,
            from: None,
            payload: Value::Object(Map::new()),
            channel: None,
            language: None,
            overrides: None,
            idempotency_key: None,
        }
    }
}

impl SendRequest {
    /// Creates an empty request. An event name must be set before sending.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the event name (the server-side template/trigger to fire).
    #[must_use]
    pub fn event(mut self, event: impl Into<String>) -> Self {
        self.event = Some(event.into());
        self
    }

    /// Sets the recipient(s): a bare identifier, a [`Contact`], or a list
    /// mixing both. Leaving this unset broadcasts — the service resolves the
    /// delivery targets from its own subscriber data.
    #[must_use]
    pub fn to(mut self, recipients: impl Into<Recipients>) -> Self {
        self.to = Some(recipients.into());
        self
    }

    /// Sets the sender contact.
    #[must_use]
    pub fn from_contact(mut self, contact: Contact) -> Self {
        self.from = Some(contact);
        self
    }

    /// Replaces the template payload wholesale.
    #[must_use]
    pub fn payload(mut self, payload: Value) -> Self {
        self.payload = payload;
        self
    }

    /// Forces a delivery channel (`email`, `sms`, `slack`, `push`, ...).
    ///
    /// The string is passed through unvalidated so channels added server-side
    /// work without an SDK update. Unset, the service applies its own
    /// routing.
    #[must_use]
    pub fn channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = Some(channel.into());
        self
    }

    /// Sets the language tag (e.g. an ISO code), passed through unvalidated.
    #[must_use]
    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Merges provider overrides into the request.
    ///
    /// Object values merge shallowly into overrides from earlier calls: keys
    /// in the new object win, keys only present earlier are kept. A
    /// non-object value replaces whatever was accumulated; null counts as
    /// unset and stays off the wire.
    #[must_use]
    pub fn overrides(mut self, overrides: Value) -> Self {
        match (&mut self.overrides, overrides) {
            (Some(Value::Object(existing)), Value::Object(new)) => existing.extend(new),
            (slot, new) => *slot = Some(new),
        }
        self
    }

    /// Sets the idempotency key, sent as the `X-Idempotency-Key` header. The
    /// service deduplicates repeated sends carrying the same key.
    #[must_use]
    pub fn idempotency_key(mut self, key: impl Into<String>) -> Self {
        self.idempotency_key = Some(key.into());
        self
    }

    /// Finalizes the accumulated state into path, body and header material.
    ///
    /// Optional body fields are omitted when unset — the wire convention is
    /// absence, not null. Borrows the builder so it stays reusable.
    pub(crate) fn build(&self) -> Result<BuiltRequest> {
        ensure!(
            self.event.as_deref().is_some_and(|event| !event.is_empty()),
            MissingEventSnafu
        );
        let event = self.event.as_deref().unwrap_or_default();

        let mut path = format!("send/{event}");
        if let Some(channel) = &self.channel {
            path.push('/');
            path.push_str(channel);
        }

        let mut body = Map::new();
        body.insert("payload".to_owned(), self.payload.clone());
        if let Some(to) = &self.to {
            let to = serde_json::to_value(to).context(EncodeBodySnafu)?;
            body.insert("to".to_owned(), to);
        }
        if let Some(from) = &self.from {
            let from = serde_json::to_value(from).context(EncodeBodySnafu)?;
            body.insert("from".to_owned(), from);
        }
        if let Some(language) = &self.language {
            body.insert("language".to_owned(), Value::String(language.clone()));
        }
        match &self.overrides {
            Some(Value::Object(overrides)) if overrides.is_empty() => {}
            Some(Value::Null) | None => {}
            Some(overrides) => {
                body.insert("overrides".to_owned(), overrides.clone());
            }
        }

        Ok(BuiltRequest {
            path,
            body: Value::Object(body),
            idempotency_key: self.idempotency_key.clone(),
        })
    }
}

/// A finalized request descriptor, ready for either dispatch path.
#[derive(Clone, Debug)]
pub(crate) struct BuiltRequest {
    pub path: String,
    pub body: Value,
    pub idempotency_key: Option<String>,
}
