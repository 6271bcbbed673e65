#![allow(dead_code)]

use std::sync::Mutex;

use newsletter::{
    ExecError, MailContent, MailError, Mailer, RepoError, RepoResult, Subscriber,
    SubscriberRepository,
};

/// In-memory repository keyed by email.
#[derive(Default)]
pub struct MemoryRepo {
    pub rows: Mutex<Vec<Subscriber>>,
    pub fail_reads: bool,
    pub fail_writes: bool,
    pub inserted: Mutex<Vec<Subscriber>>,
    pub updated: Mutex<Vec<Subscriber>>,
}

impl MemoryRepo {
    pub fn with(rows: Vec<Subscriber>) -> Self {
        Self {
            rows: Mutex::new(rows),
            ..Self::default()
        }
    }

    pub fn failing_reads() -> Self {
        Self {
            fail_reads: true,
            ..Self::default()
        }
    }

    pub fn failing_writes(rows: Vec<Subscriber>) -> Self {
        Self {
            fail_writes: true,
            ..Self::with(rows)
        }
    }

    fn boom() -> RepoError {
        RepoError::Exec(ExecError::Connection("unreachable".into()))
    }
}

impl SubscriberRepository for MemoryRepo {
    async fn get_all_subscribers(&self) -> RepoResult<Vec<Subscriber>> {
        if self.fail_reads {
            return Err(Self::boom());
        }
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.is_subscribed && s.del_flag != Some(true))
            .cloned()
            .collect())
    }

    async fn find_by_email(&self, email: &str) -> RepoResult<Vec<Subscriber>> {
        if self.fail_reads {
            return Err(Self::boom());
        }
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.email == email && s.del_flag != Some(true))
            .cloned()
            .collect())
    }

    async fn insert(&self, subscriber: &Subscriber) -> RepoResult<()> {
        if self.fail_writes {
            return Err(Self::boom());
        }
        self.inserted.lock().unwrap().push(subscriber.clone());
        let mut row = subscriber.clone();
        row.is_subscribed = true;
        self.rows.lock().unwrap().push(row);
        Ok(())
    }

    async fn update_by_email(&self, subscriber: &Subscriber) -> RepoResult<()> {
        if self.fail_writes {
            return Err(Self::boom());
        }
        self.updated.lock().unwrap().push(subscriber.clone());
        for row in self.rows.lock().unwrap().iter_mut() {
            if row.email == subscriber.email {
                row.name = subscriber.name.clone();
                row.is_subscribed = subscriber.is_subscribed;
            }
        }
        Ok(())
    }

    async fn purge_deleted(&self) -> RepoResult<u64> {
        if self.fail_writes {
            return Err(Self::boom());
        }
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|s| s.del_flag != Some(true));
        Ok((before - rows.len()) as u64)
    }
}

/// Mailer that records every message.
#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<MailContent>>,
    pub fail: bool,
}

impl Mailer for RecordingMailer {
    async fn send(&self, content: &MailContent) -> Result<(), MailError> {
        if self.fail {
            return Err(MailError::Transport("smtp down".into()));
        }
        content.recipients()?;
        self.sent.lock().unwrap().push(content.clone());
        Ok(())
    }
}

pub fn subscriber(email: &str, name: &str, subscribed: bool) -> Subscriber {
    Subscriber {
        is_subscribed: subscribed,
        ..Subscriber::new(email, name)
    }
}
