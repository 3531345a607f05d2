use crossbeam_channel::{RecvTimeoutError, Sender, bounded};
use parking_lot::Mutex;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::*;

/// Called with the slot index after each background save.
pub type SaveHook = Arc<dyn Fn(usize) + Send + Sync>;

/// Background thread that periodically writes a session to its slot.
///
/// The snapshot is taken under the session lock, so it is always either before or
/// after a transition. Stopping joins the thread: once [`Autosave::stop`] returns
/// nothing more is written.
pub struct Autosave {
    stop_tx: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl Autosave {
    pub fn spawn<S: SlotStore + ?Sized + 'static>(
        index: usize,
        session: Arc<Mutex<Session>>,
        store: Arc<S>,
        interval: Duration,
        on_save: Option<SaveHook>,
    ) -> std::io::Result<Self> {
        let (stop_tx, stop_rx) = bounded::<()>(1);

        let handle = thread::Builder::new()
            .name(format!("autosave-slot-{index}"))
            .spawn(move || {
                loop {
                    match stop_rx.recv_timeout(interval) {
                        Err(RecvTimeoutError::Timeout) => {}
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }

                    let snapshot = {
                        let session = session.lock();
                        // a settled round is saved on exit, not in the background
                        (!session.phase().is_ended()).then(|| session.snapshot())
                    };
                    let Some(snapshot) = snapshot else {
                        log::trace!("Skipping autosave of slot {}, round ended", index);
                        continue;
                    };

                    store.write(index, &snapshot);
                    log::info!("Slot {} auto-saved", index);
                    if let Some(hook) = &on_save {
                        hook(index);
                    }
                }
                log::debug!("Autosave for slot {} stopped", index);
            })?;

        log::debug!("Autosave for slot {} every {:?}", index, interval);
        Ok(Self {
            stop_tx: Some(stop_tx),
            handle: Some(handle),
        })
    }

    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.try_send(());
        }
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("Autosave thread panicked");
            }
        }
    }
}

impl Drop for Autosave {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn shared_session() -> Arc<Mutex<Session>> {
        Arc::new(Mutex::new(Session::new(
            GameConfig::default(),
            SessionDefaults::default(),
        )))
    }

    #[test]
    fn saves_periodically_until_stopped() {
        let store = Arc::new(MemoryStore::new());
        let fired = Arc::new(AtomicUsize::new(0));
        let hook: SaveHook = {
            let fired = fired.clone();
            Arc::new(move |_: usize| {
                fired.fetch_add(1, Ordering::SeqCst);
            })
        };

        let autosave = Autosave::spawn(
            2,
            shared_session(),
            store.clone(),
            Duration::from_millis(10),
            Some(hook),
        )
        .unwrap();
        thread::sleep(Duration::from_millis(100));
        autosave.stop();

        let after_stop = fired.load(Ordering::SeqCst);
        assert!(after_stop >= 1);
        assert!(store.read(2).is_some());

        thread::sleep(Duration::from_millis(50));
        assert_eq!(fired.load(Ordering::SeqCst), after_stop);
    }

    #[test]
    fn ended_rounds_are_not_autosaved() {
        let store = Arc::new(MemoryStore::new());
        let session = shared_session();
        {
            let mut session = session.lock();
            session
                .start_round(10.0, 3, &mut RngSource::from_seed(1))
                .unwrap();
            session.cash_out();
        }

        let autosave =
            Autosave::spawn(0, session, store.clone(), Duration::from_millis(5), None).unwrap();
        thread::sleep(Duration::from_millis(40));
        drop(autosave);

        assert!(store.read(0).is_none());
    }
}
