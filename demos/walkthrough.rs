//! Walk out of the start tile of "level 1", then hand over to the arrow keys.
//!
//! Run with `cargo run --example walkthrough`; quit with `q` or Esc.

use anyhow::Result;

use planes::config::Settings;
use planes::renderer::{Renderer, TerminalRenderer};
use planes::session::{
    InputSource, Pacer, RealPacer, Session, SessionError, SessionResult, TerminalInput,
};

fn main() -> Result<()> {
    let settings = Settings::load();
    let input = TerminalInput::new(settings.key_bindings.clone());
    let mut session = Session::new(settings, TerminalRenderer::new()?, input, RealPacer::new());

    match walk(&mut session) {
        Ok(()) | Err(SessionError::Terminated) => Ok(()),
        Err(e) => Err(e.into()),
    }
}

fn walk<R, I, P>(session: &mut Session<R, I, P>) -> SessionResult<()>
where
    R: Renderer,
    I: InputSource,
    P: Pacer,
{
    session.load_level("level 1")?;
    session.set_speed(5);

    session.turn_left()?;
    for _ in 0..3 {
        session.move_forward()?;
    }

    session.operate()
}
