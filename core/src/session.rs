use crate::*;

/// How a finished round was settled.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum RoundResult {
    Lost { bet: Coins },
    Won { payout: Coins, multiplier: f64 },
}

/// Read-only view handed to front ends after every command.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionStatus {
    pub snapshot: SessionSnapshot,
    pub multiplier: f64,
    pub current_payout: Coins,
    pub next_payout: Coins,
    pub can_cash_out: bool,
    pub result: Option<RoundResult>,
}

/// Player balance plus the round being played with it.
#[derive(Clone, Debug, PartialEq)]
pub struct Session {
    config: GameConfig,
    balance: Coins,
    bet_amount: Coins,
    mine_count: TileCount,
    round: Round,
}

impl Session {
    pub fn new(config: GameConfig, defaults: SessionDefaults) -> Self {
        Self {
            config,
            balance: defaults.balance,
            bet_amount: defaults.bet_amount,
            mine_count: clamp_mines(&config, defaults.mine_count),
            round: Round::new(config),
        }
    }

    /// Restores a stored session. A round in play or ended must be consistent
    /// with its grid. A betting snapshot only keeps its amounts and a mine count
    /// pulled into range, since its round is rebuilt empty.
    pub fn from_snapshot(config: GameConfig, snapshot: SessionSnapshot) -> Result<Self> {
        if !snapshot.balance.is_finite() || !snapshot.bet_amount.is_finite() {
            return Err(GameError::CorruptSnapshot("amounts must be finite"));
        }
        let round = Round::restore(
            config,
            snapshot.game_state,
            snapshot.mine_count,
            snapshot.grid,
            snapshot.revealed_safe_tiles,
            snapshot.is_lost,
        )?;
        Ok(Self {
            config,
            balance: snapshot.balance,
            bet_amount: snapshot.bet_amount,
            mine_count: clamp_mines(&config, snapshot.mine_count),
            round,
        })
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            balance: self.balance,
            bet_amount: self.bet_amount,
            mine_count: self.mine_count,
            game_state: self.round.phase(),
            grid: self.round.grid().clone(),
            revealed_safe_tiles: self.round.revealed_safe_tiles(),
            is_lost: self.round.is_lost(),
        }
    }

    pub fn status(&self) -> SessionStatus {
        SessionStatus {
            snapshot: self.snapshot(),
            multiplier: self.multiplier(),
            current_payout: self.current_payout(),
            next_payout: self.next_payout(),
            can_cash_out: self.can_cash_out(),
            result: self.result(),
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn balance(&self) -> Coins {
        self.balance
    }

    pub fn bet_amount(&self) -> Coins {
        self.bet_amount
    }

    pub fn mine_count(&self) -> TileCount {
        self.mine_count
    }

    pub fn phase(&self) -> GamePhase {
        self.round.phase()
    }

    pub fn round(&self) -> &Round {
        &self.round
    }

    pub fn multiplier(&self) -> f64 {
        self.round.multiplier()
    }

    pub fn current_payout(&self) -> Coins {
        payout(self.bet_amount, self.multiplier())
    }

    pub fn next_payout(&self) -> Coins {
        let next = if self.phase().is_playing() {
            self.round.next_multiplier()
        } else {
            self.config.multiplier(self.mine_count, 1)
        };
        payout(self.bet_amount, next)
    }

    /// Whether a front end should offer cashing out. [`Session::cash_out`] itself
    /// also accepts a round with no gems found and simply returns the stake.
    pub fn can_cash_out(&self) -> bool {
        self.phase().is_playing() && self.round.revealed_safe_tiles() > 0
    }

    pub fn result(&self) -> Option<RoundResult> {
        if !self.phase().is_ended() {
            return None;
        }
        Some(if self.round.is_lost() {
            RoundResult::Lost {
                bet: self.bet_amount,
            }
        } else {
            RoundResult::Won {
                payout: self.current_payout(),
                multiplier: self.multiplier(),
            }
        })
    }

    pub fn set_bet(&mut self, bet: Coins) -> Result<()> {
        self.check_betting()?;
        self.bet_amount = bet;
        Ok(())
    }

    pub fn set_mine_count(&mut self, mines: TileCount) -> Result<()> {
        self.check_betting()?;
        self.mine_count = self.config.validate_mines(mines)?;
        Ok(())
    }

    /// Stakes `bet` on a new board with `mines` mines.
    ///
    /// Everything is validated and the grid generated before the balance is
    /// touched, so a rejected start leaves the session exactly as it was.
    pub fn start_round(
        &mut self,
        bet: Coins,
        mines: TileCount,
        source: &mut (impl UniformSource + ?Sized),
    ) -> Result<()> {
        self.check_betting()?;
        if !bet.is_finite() || bet <= 0.0 || bet > self.balance {
            return Err(GameError::InvalidBet {
                bet,
                balance: self.balance,
            });
        }
        let mines = self.config.validate_mines(mines)?;
        let grid = create_grid(self.config.total_tiles, mines, source)?;

        self.bet_amount = bet;
        self.mine_count = mines;
        self.balance -= bet;
        self.round.begin(grid, mines);
        log::debug!(
            "Round started: bet {}, {} mines, balance {}",
            bet,
            mines,
            self.balance
        );
        Ok(())
    }

    pub fn reveal_tile(&mut self, index: usize) -> RevealOutcome {
        let outcome = self.round.reveal(index);
        match outcome {
            RevealOutcome::HitMine => {
                log::debug!("Round lost on tile {}, stake {} gone", index, self.bet_amount);
            }
            RevealOutcome::Cleared { multiplier } => {
                self.credit(multiplier);
                log::debug!("Board cleared at x{}, balance {}", multiplier, self.balance);
            }
            RevealOutcome::Gem { .. } | RevealOutcome::NoChange => {}
        }
        outcome
    }

    /// Collects `bet * multiplier`. Returns the payout, or `None` outside play.
    pub fn cash_out(&mut self) -> Option<Coins> {
        let multiplier = self.round.settle()?;
        let paid = self.credit(multiplier);
        log::debug!("Cashed out {} at x{}, balance {}", paid, multiplier, self.balance);
        Some(paid)
    }

    /// Returns to betting after a finished round. Balance carries over.
    pub fn play_again(&mut self) -> bool {
        self.round.reset()
    }

    fn credit(&mut self, multiplier: f64) -> Coins {
        let mut paid = payout(self.bet_amount, multiplier);
        if !(paid.is_finite() && (self.balance + paid).is_finite()) {
            log::error!(
                "Payout of {} at x{} does not fit a balance of {}, returning the stake",
                self.bet_amount,
                multiplier,
                self.balance
            );
            paid = self.bet_amount;
        }
        self.balance += paid;
        paid
    }

    fn check_betting(&self) -> Result<()> {
        if self.phase() == GamePhase::Betting {
            Ok(())
        } else {
            Err(GameError::RoundInProgress)
        }
    }
}

fn clamp_mines(config: &GameConfig, mines: TileCount) -> TileCount {
    mines.min(config.max_mines()).max(config.min_mines())
}
