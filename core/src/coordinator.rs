use ndarray::Array2;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::*;

/// Cloneable input side of a running game, used by the presentation layer and
/// the ticker.
#[derive(Clone, Debug)]
pub struct GameHandle {
    sender: MailboxSender<GameSignal>,
}

impl GameHandle {
    pub fn press_tile(&self, coords: Coord2, side: ClickSide) -> Result<()> {
        self.sender.post(GameSignal::TilePress { coords, side })
    }

    pub fn press_face(&self) -> Result<()> {
        self.sender.post(GameSignal::FacePress)
    }

    pub fn tick(&self) -> Result<()> {
        self.sender.post(GameSignal::ClockTick)
    }

    /// Stops every cell and ends the coordinator loop.
    pub fn shutdown(&self) -> Result<()> {
        self.sender.post(GameSignal::Shutdown)
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

/// A spawned coordinator together with its snapshot stream.
#[derive(Debug)]
pub struct Game {
    pub handle: GameHandle,
    pub snapshots: Mailbox<GameSnapshot>,
    pub task: JoinHandle<()>,
}

/// Spawns a coordinator and the first cell population on the current tokio
/// runtime. The first snapshot on the stream is the fresh board.
pub fn spawn_game<G>(generator: G) -> Game
where
    G: LayoutGenerator + Send + 'static,
{
    let (snapshot_tx, snapshots) = mailbox();
    let (coordinator, sender) = Coordinator::new(generator, snapshot_tx);
    let task = tokio::spawn(coordinator.run());
    Game {
        handle: GameHandle { sender },
        snapshots,
        task,
    }
}

/// Single owner of the aggregated grid and the play-state. Every mutation goes
/// through one of its two mailboxes, so it never needs a lock.
pub(crate) struct Coordinator<G> {
    generator: G,
    layout: MineLayout,
    /// Presses, ticks and shutdown from [`GameHandle`]s. Closes once every
    /// handle is dropped.
    inputs: Mailbox<GameSignal>,
    /// State changes from cells. Never closes, the coordinator keeps `reporter`.
    reports: Mailbox<GameSignal>,
    /// Handed to every cell so it can report back.
    reporter: MailboxSender<GameSignal>,
    snapshots: MailboxSender<GameSnapshot>,
    population: CellPopulation,
    cells: Array2<CellState>,
    play_state: PlayState,
    started_at: Option<Instant>,
    elapsed_secs: u64,
}

impl<G: LayoutGenerator> Coordinator<G> {
    pub(crate) fn new(
        mut generator: G,
        snapshots: MailboxSender<GameSnapshot>,
    ) -> (Self, MailboxSender<GameSignal>) {
        let (sender, inputs) = mailbox();
        let (reporter, reports) = mailbox();
        let layout = generator.generate();
        let (population, cells) = CellPopulation::spawn(&layout, 0, &reporter);
        let coordinator = Self {
            generator,
            layout,
            inputs,
            reports,
            reporter,
            snapshots,
            population,
            cells,
            play_state: PlayState::Init,
            started_at: None,
            elapsed_secs: 0,
        };
        (coordinator, sender)
    }

    pub(crate) async fn run(mut self) {
        log::debug!("Coordinator started on a {:?} board", self.layout.size());
        if self.publish().is_err() {
            self.population.stop_all();
            return;
        }

        loop {
            let signal = tokio::select! {
                biased;
                Some(report) = self.reports.recv() => report,
                input = self.inputs.recv() => match input {
                    Some(signal) => signal,
                    None => {
                        log::info!("Every game handle dropped, stopping");
                        self.population.stop_all();
                        break;
                    }
                },
            };
            if self.snapshots.is_closed() {
                log::info!("Snapshot stream dropped, stopping");
                self.population.stop_all();
                break;
            }
            match self.handle(signal) {
                Ok(Flow::Continue) => {}
                Ok(Flow::Stop) => break,
                Err(err) => {
                    log::info!("Snapshot stream closed ({}), stopping", err);
                    self.population.stop_all();
                    break;
                }
            }
        }
        log::debug!("Coordinator stopped");
    }

    pub(crate) fn handle(&mut self, signal: GameSignal) -> Result<Flow> {
        use GameSignal::*;

        match signal {
            TilePress { coords, side } => self.on_tile_press(coords, side)?,
            FacePress => self.on_face_press()?,
            StateChange { round, state } => self.on_state_change(round, state)?,
            ClockTick => self.on_clock_tick()?,
            Shutdown => {
                self.population.stop_all();
                return Ok(Flow::Stop);
            }
        }
        Ok(Flow::Continue)
    }

    fn on_tile_press(&mut self, coords: Coord2, side: ClickSide) -> Result<()> {
        if self.play_state.is_finished() {
            log::debug!("Round over, ignoring {:?} press at {:?}", side, coords);
            return Ok(());
        }

        if self.cells.get(coords.to_nd_index()).is_none() {
            log::warn!("Press at {:?} is off the board, ignored", coords);
            return Ok(());
        }

        if side == ClickSide::Primary && self.play_state == PlayState::Init {
            self.play_state = PlayState::Playing;
            self.started_at = Some(Instant::now());
            log::debug!("Round {} started", self.population.round());
        }
        self.population.post(coords, side.into());
        self.publish()
    }

    fn on_face_press(&mut self) -> Result<()> {
        self.play_state = PlayState::Init;
        self.started_at = None;
        self.elapsed_secs = 0;
        self.population.stop_all();

        let round = self.population.round().wrapping_add(1);
        self.layout = self.generator.generate();
        let (population, cells) = CellPopulation::spawn(&self.layout, round, &self.reporter);
        // the old population is dropped here; its actors exit once they read Stop
        self.population = population;
        self.cells = cells;
        log::debug!("Reset to round {}", round);
        self.publish()
    }

    fn on_state_change(&mut self, round: Round, state: CellState) -> Result<()> {
        if round != self.population.round() {
            log::trace!("Dropping stale state from round {} for {:?}", round, state.coords);
            return Ok(());
        }
        let Some(slot) = self.cells.get_mut(state.coords.to_nd_index()) else {
            return Ok(());
        };
        *slot = state;

        if self.play_state.is_playing() {
            if let Some(outcome) = self.evaluate() {
                self.finish(outcome);
            }
        }
        self.publish()
    }

    fn on_clock_tick(&mut self) -> Result<()> {
        if !self.play_state.is_playing() {
            return Ok(());
        }
        self.update_elapsed();
        self.publish()
    }

    /// Lost beats won: a revealed mine ends the round regardless of the count.
    fn evaluate(&self) -> Option<PlayState> {
        if self.cells.iter().any(CellState::is_revealed_mine) {
            return Some(PlayState::Lost);
        }
        let revealed = self.cells.iter().filter(|cell| cell.revealed).count();
        if revealed == usize::from(self.layout.safe_cell_count()) {
            return Some(PlayState::Won);
        }
        None
    }

    fn finish(&mut self, outcome: PlayState) {
        self.update_elapsed();
        self.play_state = outcome;
        self.population.stop_all();
        log::info!(
            "Round {} ended: {:?} after {}s",
            self.population.round(),
            outcome,
            self.elapsed_secs
        );
    }

    fn update_elapsed(&mut self) {
        if let Some(started_at) = self.started_at {
            self.elapsed_secs = started_at.elapsed().as_secs();
        }
    }

    fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            cells: self.cells.clone(),
            play_state: self.play_state,
            elapsed_secs: self.elapsed_secs,
            mines: self.layout.mine_count(),
        }
    }

    fn publish(&self) -> Result<()> {
        self.snapshots.post(self.snapshot())
    }
}
