//! Supersession tickets for in-flight layout passes.

use crate::LayoutError;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Identifies one pass among all requests made for the same document.
///
/// A newer request bumps the shared counter; the older pass notices at its
/// next suspension point and stops.
#[derive(Debug, Clone)]
pub struct GenerationTicket {
    latest: Arc<AtomicU64>,
    ticket: u64,
}

impl GenerationTicket {
    /// Bumps `latest` and returns a ticket for the new request.
    pub fn issue(latest: &Arc<AtomicU64>) -> Self {
        let ticket = latest.fetch_add(1, Ordering::SeqCst) + 1;
        Self {
            latest: Arc::clone(latest),
            ticket,
        }
    }

    /// A ticket nobody can supersede.
    pub fn detached() -> Self {
        Self {
            latest: Arc::new(AtomicU64::new(0)),
            ticket: 0,
        }
    }

    pub fn id(&self) -> u64 {
        self.ticket
    }

    pub fn is_current(&self) -> bool {
        self.latest.load(Ordering::SeqCst) == self.ticket
    }

    pub fn check(&self) -> Result<(), LayoutError> {
        if self.is_current() {
            Ok(())
        } else {
            log::debug!("Generation {} superseded", self.ticket);
            Err(LayoutError::Superseded)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newer_ticket_supersedes_older() {
        let latest = Arc::new(AtomicU64::new(0));
        let first = GenerationTicket::issue(&latest);
        assert!(first.check().is_ok());
        let second = GenerationTicket::issue(&latest);
        assert!(matches!(first.check(), Err(LayoutError::Superseded)));
        assert!(second.is_current());
        assert!(GenerationTicket::detached().is_current());
    }
}
