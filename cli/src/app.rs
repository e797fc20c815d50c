use std::io::{self, Write};

use sweeper_core::*;
use web_time::Instant;

use crate::command::{Command, HELP};
use crate::render::{self, Format};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Milliseconds since the front end started, the time base handed to the session.
#[derive(Copy, Clone, Debug)]
pub struct Clock {
    started: Instant,
}

impl Clock {
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
        }
    }

    pub fn now(&self) -> Millis {
        self.started.elapsed().as_millis() as Millis
    }
}

/// Maps player commands onto the session and keeps what is shown next to the
/// board. Game rules stay in the session.
pub struct App<G = RandomMineGenerator> {
    session: GameSession<G>,
    format: Format,
    notice: Option<String>,
}

impl<G: MineGenerator> App<G> {
    pub fn new(session: GameSession<G>, format: Format) -> Self {
        Self {
            session,
            format,
            notice: None,
        }
    }

    pub fn session(&self) -> &GameSession<G> {
        &self.session
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn set_notice(&mut self, notice: impl Into<String>) {
        self.notice = Some(notice.into());
    }

    pub fn handle(&mut self, command: Command, now: Millis) -> Flow {
        log::trace!("command {:?} at {}ms", command, now);
        self.notice = None;

        match command {
            Command::Reveal(coords) => {
                if self.check_on_board(coords) {
                    self.session.handle_primary_action(coords, now);
                }
            }
            Command::Flag(coords) => {
                if self.check_on_board(coords) {
                    let outcome = self.session.handle_secondary_action(coords);
                    if !outcome.has_update() && self.session.is_first_click() {
                        self.set_notice("Reveal a cell before placing flags");
                    }
                }
            }
            Command::NewGame => {
                let config = self.session.config();
                self.session.reset(config);
            }
            Command::Help => self.set_notice(HELP),
            Command::Quit => return Flow::Quit,
        }
        Flow::Continue
    }

    /// Advances the timer, then draws the current state.
    pub fn draw(&mut self, out: &mut impl Write, now: Millis) -> io::Result<()> {
        self.session.tick(now);
        render::write_frame(out, self.format, &self.session, self.notice())
    }

    fn check_on_board(&mut self, coords: Coord2) -> bool {
        let layout = self.session.engine().mine_layout();
        let Err(err) = layout.validate_coords(coords) else {
            return true;
        };
        let (rows, cols) = layout.size();
        self.set_notice(format!(
            "{err}: ({}, {}) is off the board, rows are 0-{} and columns 0-{}",
            coords.0,
            coords.1,
            rows - 1,
            cols - 1
        ));
        false
    }
}
