//! Unbounded, ordered, multi-writer single-reader queues.
//!
//! Every actor owns exactly one [`Mailbox`]; anyone holding a clone of the
//! matching [`MailboxSender`] may write to it. Posting never blocks. Messages
//! from one sender arrive in the order they were posted, but nothing is
//! promised about the interleaving of different senders.

use core::fmt;
use futures_channel::mpsc;
use futures_util::{FutureExt, StreamExt};

use crate::*;

/// Creates a connected sender/mailbox pair.
pub fn mailbox<T>() -> (MailboxSender<T>, Mailbox<T>) {
    let (tx, rx) = mpsc::unbounded();
    (MailboxSender { tx }, Mailbox { rx })
}

pub struct MailboxSender<T> {
    tx: mpsc::UnboundedSender<T>,
}

impl<T> MailboxSender<T> {
    /// Queues `msg` without waiting. Fails only once the reader is gone.
    pub fn post(&self, msg: T) -> Result<()> {
        self.tx
            .unbounded_send(msg)
            .map_err(|_| GameError::MailboxClosed)
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

impl<T> Clone for MailboxSender<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<T> fmt::Debug for MailboxSender<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MailboxSender")
            .field("closed", &self.is_closed())
            .finish()
    }
}

pub struct Mailbox<T> {
    rx: mpsc::UnboundedReceiver<T>,
}

impl<T> Mailbox<T> {
    /// Waits for the next message. `None` once every sender is dropped and the
    /// queue is drained.
    pub async fn recv(&mut self) -> Option<T> {
        self.rx.next().await
    }

    /// Takes the next message if one is already queued.
    pub fn try_recv(&mut self) -> Option<T> {
        self.rx.next().now_or_never().flatten()
    }
}

impl<T> fmt::Debug for Mailbox<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mailbox").finish_non_exhaustive()
    }
}
