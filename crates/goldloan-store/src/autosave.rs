//! # Autosave Driver
//!
//! Runs a [`FormSession`] on a tokio task and supplies the clock.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   AutosaveHandle                     AutosaveDriver (spawned)           │
//! │   ──────────────                     ─────────────────────────          │
//! │   edit(e)     ──► Command::Edit ───► session.apply(e, now)   ─┐         │
//! │               ◄── oneshot result ◄────────────────────────────┘         │
//! │                                                                         │
//! │   submit()    ──► Command::Submit ─► session.submit()                   │
//! │   snapshot()  ──► Command::Snapshot► session.record().clone()           │
//! │                                                                         │
//! │                                      sleep_until(deadline) ─►           │
//! │                                        session.poll(now)  (save)        │
//! │                                                                         │
//! │   shutdown()  ──► shutdown channel ─► session.flush(), loop exits       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Commands are handled one at a time, in order, so the session has a
//! single writer. Queued commands are always taken before a shutdown
//! request, so no edit sent ahead of `shutdown()` is lost.

use goldloan_core::{ApplicationData, Edit};
use tokio::sync::{mpsc, oneshot};
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info};

use crate::error::{StoreError, StoreResult};
use crate::session::FormSession;
use crate::storage::Storage;

/// Capacity of the command channel.
const COMMAND_BUFFER: usize = 64;

enum Command {
    Edit(Edit, oneshot::Sender<StoreResult<()>>),
    Submit(oneshot::Sender<StoreResult<()>>),
    Snapshot(oneshot::Sender<ApplicationData>),
}

// =============================================================================
// Handle
// =============================================================================

/// Handle for talking to a running driver.
#[derive(Clone)]
pub struct AutosaveHandle {
    command_tx: mpsc::Sender<Command>,
    shutdown_tx: mpsc::Sender<()>,
}

impl AutosaveHandle {
    /// Applies an edit and waits until the session has taken it.
    pub async fn edit(&self, edit: Edit) -> StoreResult<()> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(Command::Edit(edit, reply_tx)).await?;
        reply_rx.await.map_err(|_| StoreError::ChannelClosed)?
    }

    /// Submits the record.
    pub async fn submit(&self) -> StoreResult<()> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(Command::Submit(reply_tx)).await?;
        reply_rx.await.map_err(|_| StoreError::ChannelClosed)?
    }

    /// A copy of the record as the session currently holds it.
    pub async fn snapshot(&self) -> StoreResult<ApplicationData> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(Command::Snapshot(reply_tx)).await?;
        reply_rx.await.map_err(|_| StoreError::ChannelClosed)
    }

    /// Asks the driver to flush and stop.
    pub async fn shutdown(&self) -> StoreResult<()> {
        self.shutdown_tx
            .send(())
            .await
            .map_err(|_| StoreError::ChannelClosed)
    }

    async fn send(&self, command: Command) -> StoreResult<()> {
        self.command_tx
            .send(command)
            .await
            .map_err(|_| StoreError::ChannelClosed)
    }
}

// =============================================================================
// Driver
// =============================================================================

pub struct AutosaveDriver<S> {
    session: FormSession<S>,
    command_rx: mpsc::Receiver<Command>,
    shutdown_rx: mpsc::Receiver<()>,
}

impl<S: Storage + 'static> AutosaveDriver<S> {
    /// Creates a driver for `session` and returns its handle.
    pub fn new(session: FormSession<S>) -> (Self, AutosaveHandle) {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        let driver = AutosaveDriver {
            session,
            command_rx,
            shutdown_rx,
        };
        let handle = AutosaveHandle {
            command_tx,
            shutdown_tx,
        };

        (driver, handle)
    }

    /// Spawns the driver on the current runtime.
    pub fn spawn(
        session: FormSession<S>,
    ) -> (tokio::task::JoinHandle<FormSession<S>>, AutosaveHandle) {
        let (driver, handle) = Self::new(session);
        (tokio::spawn(driver.run()), handle)
    }

    /// Runs until shutdown or until every handle is dropped, then flushes
    /// pending edits and hands the session back.
    pub async fn run(mut self) -> FormSession<S> {
        info!("Autosave driver starting");

        loop {
            let deadline = self.session.next_deadline();

            tokio::select! {
                biased;

                command = self.command_rx.recv() => match command {
                    Some(command) => self.handle(command),
                    None => {
                        debug!("All handles dropped");
                        break;
                    }
                },

                _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    self.session.poll(Instant::now());
                }

                _ = self.shutdown_rx.recv() => {
                    info!("Autosave driver shutting down");
                    break;
                }
            }
        }

        self.session.flush();
        info!("Autosave driver stopped");
        self.session
    }

    fn handle(&mut self, command: Command) {
        // A dropped reply receiver only means the caller stopped waiting
        match command {
            Command::Edit(edit, reply) => {
                let _ = reply.send(self.session.apply(edit, Instant::now()));
            }
            Command::Submit(reply) => {
                let _ = reply.send(self.session.submit());
            }
            Command::Snapshot(reply) => {
                let _ = reply.send(self.session.record().clone());
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FormSettings;
    use crate::slot::ApplicationSlot;
    use crate::storage::MemoryStorage;
    use goldloan_core::report::OrnamentField;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::time::sleep;

    fn stored_gross(storage: &MemoryStorage) -> Option<String> {
        storage
            .read("ApplicationData")
            .unwrap()
            .map(|doc| ApplicationData::from_document(&doc).unwrap())
            .map(|app| app.ornaments[0].gross_weight.clone())
    }

    fn spawn(
        storage: &Arc<MemoryStorage>,
    ) -> (tokio::task::JoinHandle<FormSession<Arc<MemoryStorage>>>, AutosaveHandle) {
        let session = FormSession::open(
            ApplicationSlot::new(Arc::clone(storage)),
            &FormSettings::default(),
        );
        AutosaveDriver::spawn(session)
    }

    fn set_gross(value: &str) -> Edit {
        Edit::SetOrnament {
            index: 0,
            field: OrnamentField::GrossWeight,
            value: value.into(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_saves_after_settle_window() {
        let storage = Arc::new(MemoryStorage::new());
        let (task, handle) = spawn(&storage);

        handle.edit(set_gross("1")).await.unwrap();
        sleep(Duration::from_millis(200)).await;
        handle.edit(set_gross("15")).await.unwrap();

        sleep(Duration::from_millis(200)).await;
        assert_eq!(stored_gross(&storage), None);

        sleep(Duration::from_millis(150)).await;
        assert_eq!(stored_gross(&storage).as_deref(), Some("15"));

        handle.shutdown().await.unwrap();
        task.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_structural_edit_is_not_delayed() {
        let storage = Arc::new(MemoryStorage::new());
        let (task, handle) = spawn(&storage);

        handle.edit(Edit::AddOrnament).await.unwrap();
        let saved = storage.read("ApplicationData").unwrap().unwrap();
        assert_eq!(ApplicationData::from_document(&saved).unwrap().ornaments.len(), 2);

        handle.shutdown().await.unwrap();
        task.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_flushes_pending() {
        let storage = Arc::new(MemoryStorage::new());
        let (task, handle) = spawn(&storage);

        handle.edit(set_gross("9.5")).await.unwrap();
        handle.shutdown().await.unwrap();
        let session = task.await.unwrap();

        assert_eq!(stored_gross(&storage).as_deref(), Some("9.5"));
        assert!(!session.has_pending_save());
    }

    #[tokio::test(start_paused = true)]
    async fn test_queued_edits_win_over_shutdown() {
        let storage = Arc::new(MemoryStorage::new());
        let session = FormSession::open(
            ApplicationSlot::new(Arc::clone(&storage)),
            &FormSettings::default(),
        );
        let (driver, handle) = AutosaveDriver::new(session);

        // Queue edits and the shutdown before the driver starts polling
        let mut replies = Vec::new();
        for value in ["1", "2", "3"] {
            let (reply_tx, reply_rx) = oneshot::channel();
            handle.send(Command::Edit(set_gross(value), reply_tx)).await.unwrap();
            replies.push(reply_rx);
        }
        handle.shutdown().await.unwrap();

        let session = driver.run().await;

        for reply in replies {
            assert!(reply.await.unwrap().is_ok());
        }
        assert_eq!(session.record().ornaments[0].gross_weight, "3");
        assert_eq!(stored_gross(&storage).as_deref(), Some("3"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_handles_stops_driver() {
        let storage = Arc::new(MemoryStorage::new());
        let (task, handle) = spawn(&storage);

        handle.edit(set_gross("4")).await.unwrap();
        drop(handle);

        let session = task.await.unwrap();
        assert_eq!(session.record().ornaments[0].gross_weight, "4");
        assert_eq!(stored_gross(&storage).as_deref(), Some("4"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_submit_and_snapshot() {
        let storage = Arc::new(MemoryStorage::new());
        let (task, handle) = spawn(&storage);

        let err = handle.submit().await.unwrap_err();
        assert!(matches!(err, StoreError::SubmissionRejected(_)));

        handle
            .edit(Edit::RemoveOrnament { index: 0 })
            .await
            .unwrap();
        assert!(handle.snapshot().await.unwrap().ornaments.is_empty());

        handle.shutdown().await.unwrap();
        task.await.unwrap();
        assert!(matches!(
            handle.edit(Edit::AddOrnament).await,
            Err(StoreError::ChannelClosed)
        ));
    }
}
