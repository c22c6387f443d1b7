//! The single visible status notification and its auto-dismiss deadline.
//!
//! Showing a notification replaces the current one and issues a new [`Ticket`].
//! A shell timer armed for an older ticket finds it stale and does nothing, so
//! timers never stack.

use chrono::{DateTime, Utc};

use crate::dispatch::Status;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket(u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub status: Status,
    pub expires_at: DateTime<Utc>,
    pub ticket: Ticket,
}

#[derive(Debug, Clone)]
pub struct Notifier {
    duration: chrono::Duration,
    generation: u64,
    current: Option<Notice>,
}

impl Notifier {
    pub fn new(duration: std::time::Duration) -> Self {
        Self {
            duration: chrono::Duration::from_std(duration)
                .unwrap_or_else(|_| chrono::Duration::seconds(3)),
            generation: 0,
            current: None,
        }
    }

    /// Replaces whatever is showing and restarts the dismissal deadline.
    pub fn show(&mut self, status: Status, now: DateTime<Utc>) -> Ticket {
        self.generation += 1;
        let ticket = Ticket(self.generation);
        self.current = Some(Notice {
            status,
            expires_at: now + self.duration,
            ticket,
        });
        ticket
    }

    /// Dismisses only if `ticket` is still the current notification.
    pub fn dismiss(&mut self, ticket: Ticket) -> bool {
        match &self.current {
            Some(notice) if notice.ticket == ticket => {
                self.current = None;
                true
            }
            _ => false,
        }
    }

    /// Drops the notification once its deadline has passed.
    pub fn tick(&mut self, now: DateTime<Utc>) {
        if self
            .current
            .as_ref()
            .is_some_and(|notice| now >= notice.expires_at)
        {
            self.current = None;
        }
    }

    pub fn visible(&self, now: DateTime<Utc>) -> Option<&Notice> {
        self.current
            .as_ref()
            .filter(|notice| now < notice.expires_at)
    }

    pub fn clear(&mut self) {
        self.current = None;
    }

    /// Time left before the current notification goes away.
    pub fn remaining(&self, now: DateTime<Utc>) -> Option<std::time::Duration> {
        self.visible(now)
            .and_then(|notice| (notice.expires_at - now).to_std().ok())
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(std::time::Duration::from_secs(3))
    }
}
