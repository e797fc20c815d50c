use std::fmt::Write as _;
use std::io::{self, Write};

use serde::Serialize;
use sweeper_core::*;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum Format {
    /// Board drawn with characters, for people
    #[default]
    Text,
    /// One JSON object per update, for other front ends
    Json,
}

pub const LOSE_MESSAGE: &str = "GAME OVER - YOU LOSE! (n to restart)";
pub const WIN_MESSAGE: &str = "CONGRATULATIONS - YOU WIN! (n to restart)";

pub const fn glyph(view: CellView) -> char {
    match view {
        CellView::Hidden => '#',
        CellView::Flagged => 'F',
        CellView::Mine => '*',
        CellView::Open(0) => '.',
        CellView::Open(count) => (b'0' + count) as char,
    }
}

pub fn phase_message(phase: GamePhase) -> Option<&'static str> {
    match phase {
        GamePhase::Playing => None,
        GamePhase::Lost => Some(LOSE_MESSAGE),
        GamePhase::Won => Some(WIN_MESSAGE),
    }
}

fn board_rows<G>(session: &GameSession<G>) -> Vec<String> {
    let (rows, cols) = session.size();
    (0..rows)
        .map(|row| {
            (0..cols)
                .filter_map(|col| session.cell_view((row, col)))
                .map(glyph)
                .collect()
        })
        .collect()
}

/// Draws the board with row and column labels, then the status line.
pub fn text<G>(session: &GameSession<G>, notice: Option<&str>) -> String {
    let (_, cols) = session.size();
    let mut out = String::new();

    // column labels only show the last digit to keep one character per cell
    out.push_str("    ");
    for col in 0..cols {
        let _ = write!(out, "{} ", col % 10);
    }
    out.push('\n');

    for (row, cells) in board_rows(session).iter().enumerate() {
        let _ = write!(out, "{row:>3} ");
        for cell in cells.chars() {
            out.push(cell);
            out.push(' ');
        }
        out.push('\n');
    }

    let _ = writeln!(
        out,
        "Time: {} sec  Mines: {}",
        session.elapsed_secs(),
        session.mines_remaining()
    );
    if let Some(message) = phase_message(session.phase()) {
        let _ = writeln!(out, "{message}");
    }
    if let Some(notice) = notice {
        let _ = writeln!(out, "{notice}");
    }
    out
}

#[derive(Serialize)]
pub struct Frame<'a> {
    pub phase: GamePhase,
    pub elapsed_secs: u64,
    pub mines_remaining: isize,
    pub flags_placed: CellCount,
    pub board: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<&'a str>,
}

impl<'a> Frame<'a> {
    pub fn new<G>(session: &GameSession<G>, notice: Option<&'a str>) -> Self {
        Self {
            phase: session.phase(),
            elapsed_secs: session.elapsed_secs(),
            mines_remaining: session.mines_remaining(),
            flags_placed: session.flags_placed(),
            board: board_rows(session),
            notice,
        }
    }
}

pub fn write_frame<G>(
    out: &mut impl Write,
    format: Format,
    session: &GameSession<G>,
    notice: Option<&str>,
) -> io::Result<()> {
    match format {
        Format::Text => write!(out, "{}", text(session, notice))?,
        Format::Json => {
            serde_json::to_writer(&mut *out, &Frame::new(session, notice))?;
            writeln!(out)?;
        }
    }
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedLayout(MineLayout);

    impl MineGenerator for FixedLayout {
        fn generate(&mut self, _config: GameConfig, _exclude: ExclusionZone) -> MineLayout {
            self.0.clone()
        }
    }

    fn session() -> GameSession<FixedLayout> {
        let layout = MineLayout::from_mine_coords((2, 3), &[(0, 2)]).unwrap();
        GameSession::new(layout.game_config(), FixedLayout(layout))
    }

    #[test]
    fn glyphs_for_every_view() {
        assert_eq!(glyph(CellView::Hidden), '#');
        assert_eq!(glyph(CellView::Flagged), 'F');
        assert_eq!(glyph(CellView::Mine), '*');
        assert_eq!(glyph(CellView::Open(0)), '.');
        assert_eq!(glyph(CellView::Open(8)), '8');
    }

    #[test]
    fn text_shows_board_and_status() {
        let mut session = session();
        session.handle_primary_action((1, 0), 0);
        session.handle_secondary_action((0, 2));

        let expected = "    0 1 2 \n  0 . 1 F \n  1 . 1 # \nTime: 0 sec  Mines: 0\n";
        assert_eq!(text(&session, None), expected);
    }

    #[test]
    fn text_ends_with_outcome_and_notice() {
        let mut session = session();
        session.handle_primary_action((1, 0), 0);
        session.handle_primary_action((0, 2), 3_000);

        let out = text(&session, Some("hello"));

        assert!(out.contains("  0 . 1 * \n"));
        assert!(out.contains("Time: 3 sec"));
        assert!(out.ends_with(&format!("{LOSE_MESSAGE}\nhello\n")));
    }

    #[test]
    fn json_frame_lists_rows() {
        let mut session = session();
        session.handle_primary_action((1, 0), 0);
        let mut out = Vec::new();

        write_frame(&mut out, Format::Json, &session, None).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["phase"], "Playing");
        assert_eq!(value["mines_remaining"], 1);
        assert_eq!(value["board"][0], ".1#");
        assert!(value.get("notice").is_none());
    }
}
