use parking_lot::Mutex;
use std::sync::Arc;

use crate::*;

struct ActiveSlot {
    index: usize,
    session: Arc<Mutex<Session>>,
    autosave: Option<Autosave>,
}

/// Command surface for front ends: slot management plus the round commands of
/// the loaded session.
///
/// All session mutation goes through one mutex, shared with the autosave thread.
pub struct Controller<S: SlotStore + 'static> {
    settings: Settings,
    store: Arc<S>,
    source: Box<dyn UniformSource + Send>,
    active: Option<ActiveSlot>,
    on_save: Option<SaveHook>,
}

impl<S: SlotStore + 'static> Controller<S> {
    pub fn new(store: S, settings: Settings, source: Box<dyn UniformSource + Send>) -> Self {
        let settings = Settings {
            game: settings.game.sanitized(),
            ..settings
        };
        Self {
            settings,
            store: Arc::new(store),
            source,
            active: None,
            on_save: None,
        }
    }

    /// Registers a callback run after every autosave, e.g. to show a notice.
    pub fn with_save_hook(mut self, hook: impl Fn(usize) + Send + Sync + 'static) -> Self {
        self.on_save = Some(Arc::new(hook));
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn slots(&self) -> SlotTable {
        self.store.read_all()
    }

    pub fn active_slot(&self) -> Option<usize> {
        self.active.as_ref().map(|active| active.index)
    }

    /// Makes slot `index` the active session. An empty or unusable slot starts
    /// from the configured defaults. Any previously active slot is saved first.
    pub fn load_slot(&mut self, index: usize) -> Result<SessionStatus> {
        if index >= SLOT_COUNT {
            return Err(GameError::OutOfRangeSlot(index));
        }
        if self.active.is_some() {
            self.save_and_exit()?;
        }

        let session = match self.store.read(index) {
            Some(slot) => Session::from_snapshot(self.settings.game, slot.state).unwrap_or_else(
                |err| {
                    log::warn!("Slot {} could not be restored ({}), starting fresh", index, err);
                    self.fresh_session()
                },
            ),
            None => self.fresh_session(),
        };
        log::info!(
            "Loaded slot {} with balance {} ({:?})",
            index,
            session.balance(),
            session.phase()
        );

        let session = Arc::new(Mutex::new(session));
        let autosave = self.spawn_autosave(index, &session);
        let status = session.lock().status();
        self.active = Some(ActiveSlot {
            index,
            session,
            autosave,
        });
        Ok(status)
    }

    pub fn status(&self) -> Result<SessionStatus> {
        Ok(self.active()?.session.lock().status())
    }

    pub fn set_bet(&mut self, bet: Coins) -> Result<SessionStatus> {
        self.with_session(|session, _| session.set_bet(bet))
    }

    pub fn set_mine_count(&mut self, mines: TileCount) -> Result<SessionStatus> {
        self.with_session(|session, _| session.set_mine_count(mines))
    }

    pub fn start_round(&mut self, bet: Coins, mines: TileCount) -> Result<SessionStatus> {
        self.with_session(|session, source| session.start_round(bet, mines, source))
    }

    pub fn reveal_tile(&mut self, index: usize) -> Result<SessionStatus> {
        self.with_session(|session, _| {
            session.reveal_tile(index);
            Ok(())
        })
    }

    pub fn cash_out(&mut self) -> Result<SessionStatus> {
        self.with_session(|session, _| {
            session.cash_out();
            Ok(())
        })
    }

    pub fn play_again(&mut self) -> Result<SessionStatus> {
        self.with_session(|session, _| {
            session.play_again();
            Ok(())
        })
    }

    /// Stops autosave, writes the session to its slot and unloads it.
    pub fn save_and_exit(&mut self) -> Result<SessionSnapshot> {
        let active = self.active.take().ok_or(GameError::NoActiveSlot)?;
        if let Some(autosave) = active.autosave {
            autosave.stop();
        }
        let snapshot = active.session.lock().snapshot();
        self.store.write(active.index, &snapshot);
        log::info!("Slot {} saved", active.index);
        Ok(snapshot)
    }

    /// Empties slot `index`. The active session, if it lives there, keeps
    /// running and is written back on exit.
    pub fn delete_slot(&mut self, index: usize) {
        self.store.clear(index);
        log::info!("Slot {} deleted", index);
    }

    fn fresh_session(&self) -> Session {
        Session::new(self.settings.game, self.settings.defaults)
    }

    fn spawn_autosave(&self, index: usize, session: &Arc<Mutex<Session>>) -> Option<Autosave> {
        let interval = self.settings.autosave.interval()?;
        Autosave::spawn(
            index,
            session.clone(),
            self.store.clone(),
            interval,
            self.on_save.clone(),
        )
        .map_err(|err| log::error!("Could not start autosave for slot {}: {}", index, err))
        .ok()
    }

    fn active(&self) -> Result<&ActiveSlot> {
        self.active.as_ref().ok_or(GameError::NoActiveSlot)
    }

    fn with_session(
        &mut self,
        f: impl FnOnce(&mut Session, &mut dyn UniformSource) -> Result<()>,
    ) -> Result<SessionStatus> {
        let active = self.active.as_ref().ok_or(GameError::NoActiveSlot)?;
        let mut session = active.session.lock();
        f(&mut *session, &mut *self.source)?;
        Ok(session.status())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> Controller<MemoryStore> {
        let settings = Settings {
            autosave: AutosaveConfig { interval_secs: 0 },
            ..Settings::default()
        };
        Controller::new(
            MemoryStore::new(),
            settings,
            Box::new(RngSource::from_seed(99)),
        )
    }

    #[test]
    fn commands_need_a_loaded_slot() {
        let mut controller = controller();
        assert_eq!(
            controller.start_round(10.0, 3).unwrap_err(),
            GameError::NoActiveSlot
        );
        assert_eq!(controller.cash_out().unwrap_err(), GameError::NoActiveSlot);
        assert_eq!(controller.save_and_exit().unwrap_err(), GameError::NoActiveSlot);
    }

    #[test]
    fn empty_slot_starts_from_defaults() {
        let mut controller = controller();
        let status = controller.load_slot(3).unwrap();

        assert_eq!(status.snapshot.balance, 1000.0);
        assert_eq!(status.snapshot.bet_amount, 10.0);
        assert_eq!(status.snapshot.mine_count, 3);
        assert_eq!(status.snapshot.game_state, GamePhase::Betting);
        assert_eq!(controller.active_slot(), Some(3));
        assert_eq!(
            controller.load_slot(SLOT_COUNT).unwrap_err(),
            GameError::OutOfRangeSlot(SLOT_COUNT)
        );
    }

    #[test]
    fn invalid_bet_leaves_session_untouched() {
        let mut controller = controller();
        let before = controller.load_slot(0).unwrap();

        assert!(matches!(
            controller.start_round(2000.0, 3),
            Err(GameError::InvalidBet { .. })
        ));
        assert_eq!(controller.status().unwrap(), before);
    }

    #[test]
    fn save_and_load_round_trip() {
        let mut controller = controller();
        controller.load_slot(1).unwrap();
        let status = controller.start_round(25.0, 5).unwrap();
        let gem = status
            .snapshot
            .grid
            .iter()
            .position(|tile| !tile.is_mine())
            .unwrap();
        controller.reveal_tile(gem).unwrap();

        let saved = controller.save_and_exit().unwrap();
        assert_eq!(controller.active_slot(), None);
        let loaded = controller.load_slot(1).unwrap();

        assert_eq!(loaded.snapshot, saved);
        assert_eq!(loaded.snapshot.revealed_safe_tiles, 1);
        assert_eq!(loaded.multiplier, multiplier(25, 5, 1));
        assert_eq!(controller.slots().get(1).unwrap().state, saved);
    }

    #[test]
    fn switching_slots_saves_the_previous_one() {
        let mut controller = controller();
        controller.load_slot(0).unwrap();
        controller.start_round(100.0, 3).unwrap();

        controller.load_slot(5).unwrap();

        let slots = controller.slots();
        assert_eq!(slots.get(0).unwrap().state.balance, 900.0);
        assert_eq!(slots.get(0).unwrap().state.game_state, GamePhase::Playing);
        assert_eq!(controller.active_slot(), Some(5));
    }

    #[test]
    fn corrupt_slot_is_replaced_by_defaults() {
        let mut table = SlotTable::default();
        let mut broken = Session::new(GameConfig::default(), SessionDefaults::default()).snapshot();
        broken.game_state = GamePhase::Playing;
        table.set(2, Some(SaveSlot::stamped_now(broken)));
        let mut controller = Controller::new(
            MemoryStore::with_table(table),
            Settings::default(),
            Box::new(RngSource::from_seed(1)),
        );

        let status = controller.load_slot(2).unwrap();

        assert_eq!(status.snapshot.game_state, GamePhase::Betting);
        assert!(status.snapshot.grid.is_empty());
    }

    #[test]
    fn full_round_through_the_command_surface() {
        let mut controller = controller();
        controller.load_slot(0).unwrap();
        let status = controller.start_round(10.0, 3).unwrap();
        let mine = status
            .snapshot
            .grid
            .iter()
            .position(|tile| tile.is_mine())
            .unwrap();

        let status = controller.reveal_tile(mine).unwrap();
        assert!(status.snapshot.is_lost);
        assert_eq!(status.result, Some(RoundResult::Lost { bet: 10.0 }));

        let status = controller.cash_out().unwrap();
        assert_eq!(status.snapshot.balance, 990.0);

        let status = controller.play_again().unwrap();
        assert_eq!(status.snapshot.game_state, GamePhase::Betting);
        assert_eq!(status.snapshot.balance, 990.0);
    }

    #[test]
    fn deleting_a_slot_empties_it() {
        let mut controller = controller();
        controller.load_slot(4).unwrap();
        controller.save_and_exit().unwrap();
        assert!(controller.store().read(4).is_some());

        controller.delete_slot(4);
        controller.delete_slot(SLOT_COUNT + 3);

        assert_eq!(controller.slots().occupied(), 0);
    }

    #[test]
    fn autosave_runs_for_the_loaded_slot() {
        let settings = Settings {
            autosave: AutosaveConfig { interval_secs: 1 },
            ..Settings::default()
        };
        let saves = Arc::new(Mutex::new(Vec::new()));
        let mut controller = Controller::new(
            MemoryStore::new(),
            settings,
            Box::new(RngSource::from_seed(1)),
        )
        .with_save_hook({
            let saves = saves.clone();
            move |index: usize| saves.lock().push(index)
        });

        controller.load_slot(6).unwrap();
        std::thread::sleep(std::time::Duration::from_millis(1_500));
        controller.save_and_exit().unwrap();

        assert_eq!(saves.lock().first(), Some(&6));
    }
}
