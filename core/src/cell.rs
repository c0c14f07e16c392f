use ndarray::Array2;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::*;

/// Immutable view of one cell, as last reported by its actor.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellState {
    pub coords: Coord2,
    pub mine: bool,
    pub revealed: bool,
    pub flagged: bool,
    pub adjacent_mines: u8,
}

impl CellState {
    pub const fn hidden(coords: Coord2, mine: bool, adjacent_mines: u8) -> Self {
        Self {
            coords,
            mine,
            revealed: false,
            flagged: false,
            adjacent_mines,
        }
    }

    pub const fn is_revealed_mine(&self) -> bool {
        self.revealed && self.mine
    }
}

type Neighbors = SmallVec<[MailboxSender<CellSignal>; 8]>;

/// One board position. Owns its state exclusively and only reacts to signals
/// from its own mailbox, one at a time.
pub(crate) struct CellActor {
    coords: Coord2,
    mine: bool,
    adjacent_mines: u8,
    revealed: bool,
    flagged: bool,
    /// May lag behind the neighbors' real flags while notifications are in flight.
    flagged_neighbors: u8,
    round: Round,
    inbox: Mailbox<CellSignal>,
    neighbors: Neighbors,
    coordinator: MailboxSender<GameSignal>,
}

impl CellActor {
    pub(crate) fn new(
        coords: Coord2,
        layout: &MineLayout,
        round: Round,
        inbox: Mailbox<CellSignal>,
        neighbors: Neighbors,
        coordinator: MailboxSender<GameSignal>,
    ) -> Self {
        Self {
            coords,
            mine: layout.contains_mine(coords),
            adjacent_mines: layout.adjacent_mine_count(coords),
            revealed: false,
            flagged: false,
            flagged_neighbors: 0,
            round,
            inbox,
            neighbors,
            coordinator,
        }
    }

    pub(crate) fn state(&self) -> CellState {
        CellState {
            coords: self.coords,
            mine: self.mine,
            revealed: self.revealed,
            flagged: self.flagged,
            adjacent_mines: self.adjacent_mines,
        }
    }

    pub(crate) async fn run(mut self) {
        while let Some(signal) = self.inbox.recv().await {
            if self.handle(signal).is_stop() {
                break;
            }
        }
        log::trace!("Cell {:?} of round {} stopped", self.coords, self.round);
    }

    pub(crate) fn handle(&mut self, signal: CellSignal) -> Flow {
        use CellSignal::*;

        log::trace!("Cell {:?} <- {:?}", self.coords, signal);
        match signal {
            LeftClick if self.can_chord() => self.reveal_neighbors(),
            LeftClick => self.reveal(),
            RightClick if self.can_chord() => self.reveal_neighbors(),
            RightClick if !self.revealed => self.toggle_flag(),
            RightClick => {}
            NeighborReveal => self.reveal(),
            NeighborFlagSet => self.flagged_neighbors = self.flagged_neighbors.saturating_add(1),
            NeighborFlagUnset => self.flagged_neighbors = self.flagged_neighbors.saturating_sub(1),
            Stop => return Flow::Stop,
        }

        let notification = GameSignal::StateChange {
            round: self.round,
            state: self.state(),
        };
        match self.coordinator.post(notification) {
            Ok(()) => Flow::Continue,
            Err(_) => {
                log::debug!("Coordinator gone, cell {:?} stopping", self.coords);
                Flow::Stop
            }
        }
    }

    fn can_chord(&self) -> bool {
        self.revealed && self.flagged_neighbors == self.adjacent_mines
    }

    /// Idempotent: flagged or already revealed cells ignore it, which is what
    /// bounds the flood fill.
    fn reveal(&mut self) {
        if self.flagged || self.revealed {
            return;
        }
        self.revealed = true;
        if !self.mine && self.adjacent_mines == 0 {
            self.reveal_neighbors();
        }
    }

    fn reveal_neighbors(&self) {
        self.tell_neighbors(CellSignal::NeighborReveal);
    }

    fn toggle_flag(&mut self) {
        self.flagged = !self.flagged;
        self.tell_neighbors(if self.flagged {
            CellSignal::NeighborFlagSet
        } else {
            CellSignal::NeighborFlagUnset
        });
    }

    fn tell_neighbors(&self, signal: CellSignal) {
        for neighbor in &self.neighbors {
            // a stopped neighbor simply never reads it
            let _ = neighbor.post(signal);
        }
    }
}

/// The live set of cell actors for one round.
pub(crate) struct CellPopulation {
    round: Round,
    mailboxes: Array2<MailboxSender<CellSignal>>,
}

impl CellPopulation {
    /// Spawns one actor per position of `layout`, wired to its neighbors and to
    /// `coordinator`. Returns the population and the initial cell states.
    pub(crate) fn spawn(
        layout: &MineLayout,
        round: Round,
        coordinator: &MailboxSender<GameSignal>,
    ) -> (Self, Array2<CellState>) {
        let size = layout.size();
        let (senders, mut inboxes): (Vec<_>, Vec<_>) = iter_coords(size)
            .map(|_| {
                let (tx, rx) = mailbox();
                (tx, Some(rx))
            })
            .unzip();
        let columns = usize::from(size.1);
        let index = |(row, col): Coord2| usize::from(row) * columns + usize::from(col);

        let mailboxes = Array2::from_shape_fn(size.to_nd_index(), |(row, col)| {
            senders[index((row as Coord, col as Coord))].clone()
        });

        let mut states = Array2::default(size.to_nd_index());
        for coords in iter_coords(size) {
            let Some(inbox) = inboxes[index(coords)].take() else {
                continue;
            };
            let neighbors = layout
                .iter_neighbors(coords)
                .map(|pos| senders[index(pos)].clone())
                .collect();
            let actor = CellActor::new(
                coords,
                layout,
                round,
                inbox,
                neighbors,
                coordinator.clone(),
            );
            states[coords.to_nd_index()] = actor.state();
            tokio::spawn(actor.run());
        }

        log::debug!(
            "Spawned {} cell actors for round {}",
            mailboxes.len(),
            round
        );
        (Self { round, mailboxes }, states)
    }

    pub(crate) fn round(&self) -> Round {
        self.round
    }

    /// Forwards `signal` to the cell at `coords`, if that cell exists.
    pub(crate) fn post(&self, coords: Coord2, signal: CellSignal) {
        let Some(cell) = self.mailboxes.get(coords.to_nd_index()) else {
            return;
        };
        if cell.post(signal).is_err() {
            log::trace!("Cell {:?} already stopped, dropped {:?}", coords, signal);
        }
    }

    #[cfg(test)]
    pub(crate) fn sender(&self, coords: Coord2) -> Option<MailboxSender<CellSignal>> {
        self.mailboxes.get(coords.to_nd_index()).cloned()
    }

    pub(crate) fn stop_all(&self) {
        for cell in &self.mailboxes {
            let _ = cell.post(CellSignal::Stop);
        }
        log::debug!("Sent stop to round {} cells", self.round);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Harness {
        cell: CellActor,
        cell_tx: MailboxSender<CellSignal>,
        neighbors: Vec<Mailbox<CellSignal>>,
        coordinator: Mailbox<GameSignal>,
    }

    /// A cell with `neighbor_count` neighbor mailboxes owned by the test.
    fn harness(mine: bool, adjacent_mines: u8, neighbor_count: usize) -> Harness {
        let (cell_tx, inbox) = mailbox();
        let (coordinator_tx, coordinator) = mailbox();
        let (senders, neighbors): (Neighbors, Vec<_>) =
            (0..neighbor_count).map(|_| mailbox()).unzip();
        let cell = CellActor {
            coords: (1, 1),
            mine,
            adjacent_mines,
            revealed: false,
            flagged: false,
            flagged_neighbors: 0,
            round: 3,
            inbox,
            neighbors: senders,
            coordinator: coordinator_tx,
        };
        Harness {
            cell,
            cell_tx,
            neighbors,
            coordinator,
        }
    }

    impl Harness {
        fn neighbor_signals(&mut self) -> Vec<Vec<CellSignal>> {
            self.neighbors
                .iter_mut()
                .map(|rx| core::iter::from_fn(|| rx.try_recv()).collect())
                .collect()
        }

        fn last_state(&mut self) -> Option<CellState> {
            core::iter::from_fn(|| self.coordinator.try_recv())
                .map(|signal| match signal {
                    GameSignal::StateChange { round, state } => {
                        assert_eq!(round, 3);
                        state
                    }
                    other => panic!("unexpected {other:?}"),
                })
                .last()
        }
    }

    #[test]
    fn left_click_on_zero_cell_fans_out_reveal() {
        let mut h = harness(false, 0, 3);

        assert_eq!(h.cell.handle(CellSignal::LeftClick), Flow::Continue);

        assert!(h.last_state().unwrap().revealed);
        for signals in h.neighbor_signals() {
            assert_eq!(signals, vec![CellSignal::NeighborReveal]);
        }
    }

    #[test]
    fn reveal_of_numbered_cell_stays_local() {
        let mut h = harness(false, 2, 8);

        h.cell.handle(CellSignal::NeighborReveal);

        let state = h.last_state().unwrap();
        assert!(state.revealed);
        assert_eq!(state.adjacent_mines, 2);
        assert!(h.neighbor_signals().iter().all(Vec::is_empty));
    }

    #[test]
    fn revealing_a_mine_does_not_flood() {
        let mut h = harness(true, 0, 3);

        h.cell.handle(CellSignal::LeftClick);

        assert!(h.last_state().unwrap().is_revealed_mine());
        assert!(h.neighbor_signals().iter().all(Vec::is_empty));
    }

    #[test]
    fn repeated_reveal_is_idempotent() {
        let mut h = harness(false, 0, 2);

        h.cell.handle(CellSignal::NeighborReveal);
        h.neighbor_signals();
        h.cell.handle(CellSignal::NeighborReveal);
        h.cell.handle(CellSignal::NeighborReveal);

        assert!(h.last_state().unwrap().revealed);
        assert!(h.neighbor_signals().iter().all(Vec::is_empty));
    }

    #[test]
    fn flagged_cell_ignores_neighbor_reveal() {
        let mut h = harness(false, 0, 2);

        h.cell.handle(CellSignal::RightClick);
        h.neighbor_signals();
        h.cell.handle(CellSignal::NeighborReveal);
        h.cell.handle(CellSignal::LeftClick);

        let state = h.last_state().unwrap();
        assert!(state.flagged);
        assert!(!state.revealed);
        assert!(h.neighbor_signals().iter().all(Vec::is_empty));
    }

    #[test]
    fn right_click_toggles_flag_and_tells_neighbors() {
        let mut h = harness(true, 1, 2);

        h.cell.handle(CellSignal::RightClick);
        assert!(h.last_state().unwrap().flagged);
        h.cell.handle(CellSignal::RightClick);
        assert!(!h.last_state().unwrap().flagged);

        for signals in h.neighbor_signals() {
            assert_eq!(
                signals,
                vec![CellSignal::NeighborFlagSet, CellSignal::NeighborFlagUnset]
            );
        }
    }

    #[test]
    fn chord_requires_matching_flag_count() {
        let mut h = harness(false, 2, 4);
        h.cell.handle(CellSignal::LeftClick);
        h.cell.handle(CellSignal::NeighborFlagSet);

        // one flag short: right click does nothing, left click re-reveals nothing
        h.cell.handle(CellSignal::RightClick);
        h.cell.handle(CellSignal::LeftClick);
        assert!(h.neighbor_signals().iter().all(Vec::is_empty));

        h.cell.handle(CellSignal::NeighborFlagSet);
        h.cell.handle(CellSignal::LeftClick);
        for signals in h.neighbor_signals() {
            assert_eq!(signals, vec![CellSignal::NeighborReveal]);
        }

        h.cell.handle(CellSignal::RightClick);
        for signals in h.neighbor_signals() {
            assert_eq!(signals, vec![CellSignal::NeighborReveal]);
        }
    }

    #[test]
    fn flag_count_tracks_set_and_unset() {
        let mut h = harness(false, 1, 4);
        h.cell.handle(CellSignal::NeighborReveal);
        for signal in [
            CellSignal::NeighborFlagSet,
            CellSignal::NeighborFlagSet,
            CellSignal::NeighborFlagUnset,
        ] {
            h.cell.handle(signal);
        }
        assert_eq!(h.cell.flagged_neighbors, 1);
        assert!(h.cell.can_chord());
    }

    #[test]
    fn right_click_on_revealed_mismatch_is_noop() {
        let mut h = harness(false, 1, 3);
        h.cell.handle(CellSignal::LeftClick);
        let before = h.last_state().unwrap();

        h.cell.handle(CellSignal::RightClick);

        assert_eq!(h.last_state(), Some(before));
        assert!(!before.flagged);
        assert!(h.neighbor_signals().iter().all(Vec::is_empty));
    }

    #[test]
    fn stop_emits_no_notification() {
        let mut h = harness(false, 0, 1);
        assert_eq!(h.cell.handle(CellSignal::Stop), Flow::Stop);
        assert_eq!(h.last_state(), None);
    }

    #[test]
    fn closed_coordinator_stops_the_cell() {
        let mut h = harness(false, 1, 1);
        drop(h.coordinator);
        assert_eq!(h.cell.handle(CellSignal::LeftClick), Flow::Stop);
    }

    #[tokio::test]
    async fn run_processes_until_stop() {
        let Harness {
            cell,
            cell_tx,
            mut coordinator,
            ..
        } = harness(false, 1, 0);
        cell_tx.post(CellSignal::LeftClick).unwrap();
        cell_tx.post(CellSignal::Stop).unwrap();
        cell_tx.post(CellSignal::RightClick).unwrap();

        cell.run().await;

        let Some(GameSignal::StateChange { state, .. }) = coordinator.recv().await else {
            panic!("expected a state change");
        };
        assert!(state.revealed);
        assert_eq!(coordinator.try_recv(), None);
        assert!(cell_tx.post(CellSignal::LeftClick).is_err());
    }
}
