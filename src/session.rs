use chrono::{DateTime, FixedOffset, Utc};
use tracing::{info, warn};

use crate::config::Config;
use crate::dispatch::{DispatchRequest, Outcome, Status};
use crate::embed::{Embed, FieldUpdate, ScalarEdit, SubObjectUpdate};
use crate::error::{self, Validation};
use crate::message::{self, Payload, SenderIdentity};
use crate::notify::{Notifier, Ticket};
use crate::preview::{Preview, Projector};
use crate::validate;
use crate::webhook;

/// Everything the operator is editing, owned by the shell for one session.
#[derive(Debug, Clone)]
pub struct Session {
    pub webhook: String,
    pub identity: SenderIdentity,
    pub embed: Embed,
    offset: FixedOffset,
    notifier: Notifier,
}

impl Session {
    pub fn new(config: &Config) -> Self {
        Self::with_offset(config, validate::local_offset())
    }

    /// A session whose viewer sits at `offset` from UTC.
    pub fn with_offset(config: &Config, offset: FixedOffset) -> Self {
        Self {
            webhook: String::new(),
            identity: SenderIdentity::default(),
            embed: Embed::new(),
            offset,
            notifier: Notifier::new(config.notice_duration),
        }
    }

    pub fn set_webhook(&mut self, raw: &str) {
        self.webhook = raw.to_string();
    }

    pub fn set_username(&mut self, raw: &str) {
        self.identity.set_username(raw);
    }

    pub fn set_avatar_url(&mut self, raw: &str) {
        self.identity.set_avatar_url(raw);
    }

    /// Reads `raw` as a local date-time in the session's offset. Blank clears it.
    pub fn set_timestamp(&mut self, raw: &str) -> Result<(), Validation> {
        self.embed.set_scalar(ScalarEdit::Timestamp {
            raw: raw.to_string(),
            offset: self.offset,
        })
    }

    /// Applies a scalar edit to the embed.
    ///
    /// The `offset` carried by [`ScalarEdit::Timestamp`] is ignored and replaced by the
    /// session's own; use [`Session::set_timestamp`] to skip building one.
    pub fn edit(&mut self, edit: ScalarEdit) -> Result<(), Validation> {
        let edit = match edit {
            ScalarEdit::Timestamp { raw, .. } => ScalarEdit::Timestamp {
                raw,
                offset: self.offset,
            },
            other => other,
        };
        self.embed.set_scalar(edit)
    }

    pub fn edit_sub_object(&mut self, update: SubObjectUpdate) {
        self.embed.set_sub_object(update);
    }

    pub fn add_field(&mut self) -> Result<usize, Validation> {
        self.embed.add_field()
    }

    pub fn remove_field(&mut self, index: usize) {
        self.embed.remove_field(index);
    }

    pub fn update_field(&mut self, index: usize, update: FieldUpdate) -> Result<(), Validation> {
        self.embed.update_field(index, update)
    }

    pub fn preview(&self) -> Preview {
        Projector::with_offset(self.offset).project(&self.embed, &self.identity)
    }

    pub fn payload(&self) -> Payload {
        message::serialize(&self.embed, &self.identity)
    }

    /// Snapshots the payload for sending. Without a usable webhook URL nothing is
    /// sent and the problem is shown instead.
    pub fn prepare_dispatch(
        &mut self,
        now: DateTime<Utc>,
    ) -> Result<DispatchRequest, error::General> {
        match webhook::parse_url(&self.webhook) {
            Ok(url) => Ok(DispatchRequest {
                url: url.to_string(),
                payload: self.payload(),
            }),
            Err(err) => {
                warn!(%err, "dispatch not attempted");
                self.notifier.show(Status::error(err.to_string()), now);
                Err(err)
            }
        }
    }

    /// Surfaces a finished dispatch. The embed is left as it is either way.
    pub fn finish_dispatch(&mut self, outcome: &Outcome, now: DateTime<Utc>) -> Ticket {
        self.notifier.show(outcome.status(), now)
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn notifier_mut(&mut self) -> &mut Notifier {
        &mut self.notifier
    }

    /// Clears the webhook, identity and embed.
    pub fn reset(&mut self) {
        info!("resetting session");
        self.webhook.clear();
        self.identity = SenderIdentity::default();
        self.embed.reset();
    }
}
