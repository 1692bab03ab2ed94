#![forbid(unsafe_code)]

//! Script replay against a live [`Program`].

use std::io;

use exo_runtime::{NarrativeSession, Program, ProgramConfig, Renderer};

use crate::script::Step;

/// Start the program, replay `steps` in order, and hand back the session
/// and renderer.
///
/// Every step is resolved against the dataset as it stands when the step
/// runs, and the program settles after each one. Replay stops at the first
/// `quit`.
pub fn replay<R: Renderer>(
    session: NarrativeSession,
    renderer: R,
    steps: &[Step],
    config: ProgramConfig,
) -> io::Result<(NarrativeSession, R)> {
    let mut program = Program::with_config(session, renderer, config);
    program.start()?;
    for (idx, step) in steps.iter().enumerate() {
        if !program.is_running() {
            tracing::debug!(remaining = steps.len() - idx, "replay stopped early");
            break;
        }
        let msg = step.resolve(program.model().dataset());
        program.dispatch(msg)?;
        program.settle()?;
    }
    // Without a script (or with `--no-wait`) the load may still be running.
    program.settle()?;
    tracing::info!(
        frames = program.frame_count(),
        scene = %program.model().scene(),
        "replay finished"
    );
    Ok(program.into_parts())
}
