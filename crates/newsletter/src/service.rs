//! Subscription rules.
//!
//! Every operation reports failures as an [`ErrorCode`]; repository and mail
//! errors are logged here and collapsed to `INTERNAL_SERVER_ERROR`.

use std::sync::OnceLock;

use crate::entity::Subscriber;
use crate::error::ErrorCode;
use crate::mailer::{MailContent, Mailer};
use crate::repository::SubscriberRepository;

pub type ServiceResult<T> = Result<T, ErrorCode>;

/// Best-effort email check: something, `@`, something, `.`, something.
pub fn is_email(s: &str) -> bool {
    static EMAIL_RE: OnceLock<regex::Regex> = OnceLock::new();
    EMAIL_RE
        .get_or_init(|| {
            regex::Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("invalid built-in email regex")
        })
        .is_match(s)
}

/// Subject and body of the newsletter mail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Newsletter {
    pub subject: String,
    pub body: String,
}

impl Default for Newsletter {
    fn default() -> Self {
        Self {
            subject: "Test sent mail for subscribers".to_string(),
            body: "This email sent for notification. Test sent mail for subscribers".to_string(),
        }
    }
}

pub struct SubscriberService<R, M> {
    repo: R,
    mailer: M,
    newsletter: Newsletter,
}

impl<R, M> SubscriberService<R, M>
where
    R: SubscriberRepository,
    M: Mailer,
{
    pub fn new(repo: R, mailer: M) -> Self {
        Self {
            repo,
            mailer,
            newsletter: Newsletter::default(),
        }
    }

    pub fn with_newsletter(mut self, newsletter: Newsletter) -> Self {
        self.newsletter = newsletter;
        self
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    pub fn mailer(&self) -> &M {
        &self.mailer
    }

    pub async fn get_all_subscribers(&self) -> ServiceResult<Vec<Subscriber>> {
        let list = self.repo.get_all_subscribers().await.map_err(|e| {
            tracing::warn!(error = %e, "get_all_subscribers failed");
            ErrorCode::InternalServerError
        })?;
        if list.is_empty() {
            return Err(ErrorCode::DataNotFound);
        }
        Ok(list)
    }

    pub async fn find_by_email(&self, email: &str) -> ServiceResult<Vec<Subscriber>> {
        let list = self.lookup(email).await?;
        if list.is_empty() {
            return Err(ErrorCode::DataNotFound);
        }
        Ok(list)
    }

    pub async fn insert(&self, subscriber: &Subscriber) -> ServiceResult<()> {
        self.repo.insert(subscriber).await.map_err(|e| {
            tracing::warn!(error = %e, "insert failed");
            ErrorCode::InternalServerError
        })
    }

    pub async fn update_by_email(&self, subscriber: &Subscriber) -> ServiceResult<()> {
        self.repo.update_by_email(subscriber).await.map_err(|e| {
            tracing::warn!(error = %e, "update_by_email failed");
            ErrorCode::InternalServerError
        })
    }

    /// Insert a new subscriber or re-activate an existing one.
    pub async fn subscribe(&self, request: Subscriber) -> ServiceResult<()> {
        if !is_email(&request.email) {
            return Err(ErrorCode::BadRequest);
        }

        let found = self.lookup(&request.email).await?;
        match found.first() {
            None => {
                self.insert(&Subscriber::new(request.email, request.name))
                    .await
            }
            Some(existing) => {
                let update = Subscriber {
                    is_subscribed: true,
                    ..contact_update(request, existing)
                };
                self.update_by_email(&update).await
            }
        }
    }

    /// Mark an existing subscriber as unsubscribed.
    pub async fn unsubscribe(&self, request: Subscriber) -> ServiceResult<()> {
        let found = self.lookup(&request.email).await?;
        let Some(existing) = found.first() else {
            return Err(ErrorCode::DataNotFound);
        };
        let update = Subscriber {
            is_subscribed: false,
            ..contact_update(request, existing)
        };
        self.update_by_email(&update).await
    }

    /// Mail the newsletter to every active subscriber; returns the count sent.
    pub async fn send_newsletter(&self) -> ServiceResult<usize> {
        let subscribers = self.get_all_subscribers().await?;

        for subscriber in &subscribers {
            let mail = MailContent::new(
                vec![subscriber.email.clone()],
                self.newsletter.subject.clone(),
                self.newsletter.body.clone(),
            );
            self.mailer.send(&mail).await.map_err(|e| {
                tracing::warn!(email = %subscriber.email, error = %e, "newsletter send failed");
                ErrorCode::InternalServerError
            })?;
        }

        tracing::info!(sent = subscribers.len(), "newsletter sent");
        Ok(subscribers.len())
    }

    /// Remove soft-deleted rows; returns the number removed.
    pub async fn purge_deleted(&self) -> ServiceResult<u64> {
        self.repo.purge_deleted().await.map_err(|e| {
            tracing::warn!(error = %e, "purge_deleted failed");
            ErrorCode::InternalServerError
        })
    }

    async fn lookup(&self, email: &str) -> ServiceResult<Vec<Subscriber>> {
        self.repo.find_by_email(email).await.map_err(|e| {
            tracing::warn!(error = %e, "find_by_email failed");
            ErrorCode::InternalServerError
        })
    }
}

/// Contact fields for an update; a blank name keeps the stored one.
fn contact_update(request: Subscriber, existing: &Subscriber) -> Subscriber {
    let name = if request.name.trim().is_empty() {
        existing.name.clone()
    } else {
        request.name
    };
    Subscriber::new(request.email, name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_check() {
        assert!(is_email("ann@example.com"));
        assert!(is_email("a.b+c@mail.example.co.th"));
        assert!(!is_email(""));
        assert!(!is_email("ann"));
        assert!(!is_email("ann@example"));
        assert!(!is_email("ann @example.com"));
    }

    #[test]
    fn blank_name_keeps_stored_name() {
        let existing = Subscriber::new("a@b.co", "Ann");
        let update = contact_update(Subscriber::new("a@b.co", " "), &existing);
        assert_eq!(update.name, "Ann");

        let update = contact_update(Subscriber::new("a@b.co", "Anna"), &existing);
        assert_eq!(update.name, "Anna");
        assert_eq!(update.email, "a@b.co");
    }

    #[test]
    fn default_newsletter_text() {
        let n = Newsletter::default();
        assert_eq!(n.subject, "Test sent mail for subscribers");
        assert!(n.body.starts_with("This email sent for notification."));
    }
}
