#![forbid(unsafe_code)]

//! Deterministic program simulator for testing.
//!
//! `ProgramSimulator` runs a [`Model`] without threads: [`Cmd::Task`]
//! closures execute inline, so a session's dataset load completes inside
//! [`init`](ProgramSimulator::init). Renders go to a [`RecordingRenderer`].
//!
//! # Example
//!
//! ```ignore
//! use exo_runtime::simulator::ProgramSimulator;
//!
//! let mut sim = ProgramSimulator::new(NarrativeSession::new(source));
//! sim.init();
//! sim.send(NarrativeMsg::ExploreRequested);
//! let frame = sim.capture_frame().unwrap();
//! assert_eq!(frame.scene, Scene::Dashboard);
//! ```

use crate::program::{Cmd, Model};
use crate::renderer::{LoadStatus, RecordingRenderer, Renderer, SceneFrame};

/// Record of a command executed during simulation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CmdRecord {
    None,
    Quit,
    /// Message fed back to the model (not stored).
    Msg,
    Batch(usize),
    Sequence(usize),
    Log(String),
    /// Background task executed synchronously.
    Task(Option<String>),
}

/// Deterministic driver for [`Model`] testing.
pub struct ProgramSimulator<M: Model> {
    model: M,
    renderer: RecordingRenderer,
    command_log: Vec<CmdRecord>,
    running: bool,
}

impl<M: Model> ProgramSimulator<M> {
    /// The model is not initialized until [`init`](Self::init) is called.
    pub fn new(model: M) -> Self {
        Self {
            model,
            renderer: RecordingRenderer::default(),
            command_log: Vec::new(),
            running: true,
        }
    }

    /// Call `Model::init()` and execute the returned commands.
    pub fn init(&mut self) {
        let cmd = self.model.init();
        self.execute_cmd(cmd);
    }

    /// Dispatch a message through `Model::update()`.
    pub fn send(&mut self, msg: M::Message) {
        if !self.running {
            return;
        }
        let cmd = self.model.update(msg);
        self.execute_cmd(cmd);
    }

    /// Dispatch several messages in order, stopping on quit.
    pub fn send_all(&mut self, msgs: impl IntoIterator<Item = M::Message>) {
        for msg in msgs {
            if !self.running {
                break;
            }
            self.send(msg);
        }
    }

    /// Render the model and return the frame it produced, if any.
    ///
    /// Returns `None` when the model reported a load status instead of a
    /// scene.
    pub fn capture_frame(&mut self) -> Option<&SceneFrame> {
        let before = self.renderer.frames().len();
        if self.model.view(&mut self.renderer).is_err() {
            return None;
        }
        if self.renderer.frames().len() > before {
            self.renderer.last_frame()
        } else {
            None
        }
    }

    pub fn frames(&self) -> &[SceneFrame] {
        self.renderer.frames()
    }

    pub fn statuses(&self) -> &[LoadStatus] {
        self.renderer.statuses()
    }

    /// Lines emitted via `Cmd::Log`.
    pub fn logs(&self) -> &[String] {
        self.renderer.logs()
    }

    pub fn command_log(&self) -> &[CmdRecord] {
        &self.command_log
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut M {
        &mut self.model
    }

    /// Returns `false` after a `Cmd::Quit` has been executed.
    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn clear_frames(&mut self) {
        self.renderer.clear();
    }

    fn execute_cmd(&mut self, cmd: Cmd<M::Message>) {
        match cmd {
            Cmd::None => {
                self.command_log.push(CmdRecord::None);
            }
            Cmd::Quit => {
                self.running = false;
                self.command_log.push(CmdRecord::Quit);
            }
            Cmd::Msg(m) => {
                self.command_log.push(CmdRecord::Msg);
                let cmd = self.model.update(m);
                self.execute_cmd(cmd);
            }
            Cmd::Batch(cmds) => {
                self.command_log.push(CmdRecord::Batch(cmds.len()));
                self.execute_all(cmds);
            }
            Cmd::Sequence(cmds) => {
                self.command_log.push(CmdRecord::Sequence(cmds.len()));
                self.execute_all(cmds);
            }
            Cmd::Log(text) => {
                self.command_log.push(CmdRecord::Log(text.clone()));
                let _ = self.renderer.log(&text);
            }
            Cmd::Task(spec, f) => {
                self.command_log.push(CmdRecord::Task(spec.name));
                let msg = f();
                let cmd = self.model.update(msg);
                self.execute_cmd(cmd);
            }
        }
    }

    fn execute_all(&mut self, cmds: Vec<Cmd<M::Message>>) {
        for c in cmds {
            self.execute_cmd(c);
            if !self.running {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    struct Echo {
        seen: Vec<u32>,
    }

    impl Model for Echo {
        type Message = u32;

        fn init(&mut self) -> Cmd<u32> {
            Cmd::task_named("seed", || 7)
        }

        fn update(&mut self, msg: u32) -> Cmd<u32> {
            self.seen.push(msg);
            match msg {
                0 => Cmd::quit(),
                7 => Cmd::batch(vec![Cmd::log("seeded"), Cmd::msg(8)]),
                _ => Cmd::none(),
            }
        }

        fn view(&self, renderer: &mut dyn Renderer) -> io::Result<()> {
            renderer.status(&LoadStatus::Loading {
                source: format!("{:?}", self.seen),
            })
        }
    }

    #[test]
    fn tasks_run_inline_during_init() {
        let mut sim = ProgramSimulator::new(Echo { seen: vec![] });
        sim.init();
        assert_eq!(sim.model().seen, vec![7, 8]);
        assert_eq!(sim.logs(), ["seeded".to_owned()]);
        assert_eq!(
            sim.command_log(),
            [
                CmdRecord::Task(Some("seed".into())),
                CmdRecord::Batch(2),
                CmdRecord::Log("seeded".into()),
                CmdRecord::Msg,
                CmdRecord::None,
            ]
        );
    }

    #[test]
    fn quit_stops_further_sends() {
        let mut sim = ProgramSimulator::new(Echo { seen: vec![] });
        sim.send_all([1, 0, 2]);
        assert!(!sim.is_running());
        assert_eq!(sim.model().seen, vec![1, 0]);
    }

    #[test]
    fn status_renders_yield_no_frame() {
        let mut sim = ProgramSimulator::new(Echo { seen: vec![] });
        assert!(sim.capture_frame().is_none());
        assert_eq!(sim.statuses().len(), 1);
    }
}
