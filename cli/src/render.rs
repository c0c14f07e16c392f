use cellsweep_core::{CellState, GameSnapshot, PlayState};
use std::io;

const MAX_COUNTER: u64 = 999;

fn glyph(cell: &CellState) -> char {
    match (cell.revealed, cell.flagged) {
        (true, _) if cell.mine => '*',
        (true, _) if cell.adjacent_mines == 0 => '.',
        (true, _) => char::from(b'0' + cell.adjacent_mines.min(8)),
        (false, true) => 'F',
        (false, false) => '#',
    }
}

fn face(play_state: PlayState) -> &'static str {
    match play_state {
        PlayState::Init | PlayState::Playing => ":)",
        PlayState::Lost => ":(",
        PlayState::Won => "B)",
    }
}

/// Flag counter, face and clock, each counter capped at three digits.
pub fn render_header(snapshot: &GameSnapshot) -> String {
    let flags = u64::from(snapshot.flags_remaining()).min(MAX_COUNTER);
    let time = snapshot.elapsed_secs.min(MAX_COUNTER);
    format!("{:03}  {}  {:03}\n", flags, face(snapshot.play_state), time)
}

/// Header line plus the grid with row and column indices.
pub fn render_board(snapshot: &GameSnapshot) -> String {
    use core::fmt::Write;

    let (_, columns) = snapshot.size();
    let mut out = render_header(snapshot);

    out.push_str("   ");
    for col in 0..columns {
        let _ = write!(out, "{}", col % 10);
    }
    out.push('\n');

    for (row, cells) in snapshot.cells.rows().into_iter().enumerate() {
        let _ = write!(out, "{:>2} ", row);
        out.extend(cells.iter().map(glyph));
        out.push('\n');
    }
    out
}

/// Terminal side of the snapshot boundary: remembers what was last shown so
/// tick-only updates print just the header line.
pub struct View {
    json: bool,
    shown: Option<GameSnapshot>,
    latest: Option<GameSnapshot>,
}

impl View {
    pub fn new(json: bool) -> Self {
        Self {
            json,
            shown: None,
            latest: None,
        }
    }

    /// Input is only forwarded while the round is still open.
    pub fn accepts_presses(&self) -> bool {
        self.latest
            .as_ref()
            .is_none_or(|snapshot| !snapshot.play_state.is_finished())
    }

    pub fn show(&mut self, snapshot: GameSnapshot, out: &mut impl io::Write) -> anyhow::Result<()> {
        if self.json {
            serde_json::to_writer(&mut *out, &snapshot)?;
            writeln!(out)?;
        } else if self.needs_redraw(&snapshot) {
            write!(out, "\n{}", render_board(&snapshot))?;
            self.shown = Some(snapshot.clone());
        } else if self.clock_moved(&snapshot) {
            write!(out, "{}", render_header(&snapshot))?;
            self.shown = Some(snapshot.clone());
        }
        out.flush()?;
        self.latest = Some(snapshot);
        Ok(())
    }

    /// Redraws the last snapshot regardless of what changed.
    pub fn redraw(&mut self, out: &mut impl io::Write) -> anyhow::Result<()> {
        if let Some(snapshot) = &self.latest {
            write!(out, "\n{}", render_board(snapshot))?;
            out.flush()?;
            self.shown = Some(snapshot.clone());
        }
        Ok(())
    }

    fn needs_redraw(&self, snapshot: &GameSnapshot) -> bool {
        self.shown.as_ref().is_none_or(|shown| {
            shown.play_state != snapshot.play_state || shown.cells != snapshot.cells
        })
    }

    fn clock_moved(&self, snapshot: &GameSnapshot) -> bool {
        self.shown
            .as_ref()
            .is_some_and(|shown| shown.elapsed_secs != snapshot.elapsed_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cellsweep_core::Coord;
    use ndarray::Array2;

    fn snapshot(play_state: PlayState) -> GameSnapshot {
        let mut cells = Array2::from_shape_fn((2, 3), |(r, c)| {
            CellState::hidden((r as Coord, c as Coord), (r, c) == (0, 0), 0)
        });
        cells[[0, 1]].flagged = true;
        cells[[1, 0]].revealed = true;
        cells[[1, 0]].adjacent_mines = 1;
        cells[[1, 2]].revealed = true;
        GameSnapshot {
            cells,
            play_state,
            elapsed_secs: 1234,
            mines: 3,
        }
    }

    #[test]
    fn renders_counters_face_and_glyphs() {
        let text = render_board(&snapshot(PlayState::Playing));
        assert_eq!(text, "002  :)  999\n   012\n 0 #F#\n 1 1#.\n");
    }

    #[test]
    fn revealed_mine_and_faces() {
        let mut lost = snapshot(PlayState::Lost);
        lost.cells[[0, 0]].revealed = true;
        let text = render_board(&lost);
        assert!(text.starts_with("002  :(  999\n"));
        assert!(text.contains(" 0 *F#\n"));
        assert!(render_board(&snapshot(PlayState::Won)).contains("B)"));
    }

    #[test]
    fn tick_only_updates_print_the_header() {
        let mut view = View::new(false);
        let mut out = Vec::new();
        let mut first = snapshot(PlayState::Playing);
        first.elapsed_secs = 4;
        view.show(first.clone(), &mut out).unwrap();
        let first_len = out.len();

        // same second again: nothing to print
        view.show(first, &mut out).unwrap();
        assert_eq!(out.len(), first_len);

        let mut ticked = snapshot(PlayState::Playing);
        ticked.elapsed_secs = 5;
        view.show(ticked, &mut out).unwrap();
        assert_eq!(&out[first_len..], b"002  :)  005\n");

        view.show(snapshot(PlayState::Lost), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.ends_with(" 1 1#.\n"));
        assert!(text.contains("002  :(  999\n"));
        assert!(!view.accepts_presses());
    }

    #[test]
    fn json_mode_writes_every_snapshot() {
        let mut view = View::new(true);
        let mut out = Vec::new();
        view.show(snapshot(PlayState::Init), &mut out).unwrap();
        view.show(snapshot(PlayState::Init), &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        let parsed: GameSnapshot = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(parsed.play_state, PlayState::Init);
        assert!(view.accepts_presses());
    }
}
