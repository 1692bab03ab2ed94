#![forbid(unsafe_code)]

//! Elm-style message loop for the narrative.
//!
//! The program runs a single-threaded update loop: every message is fully
//! processed (update, command execution, render) before the next one is
//! taken. The only concurrency is [`Cmd::Task`], whose closure runs on a
//! spawned thread and posts its result back as a message.
//!
//! # Example
//!
//! ```ignore
//! use exo_runtime::{NarrativeMsg, NarrativeSession, Program, RecordingRenderer};
//!
//! let session = NarrativeSession::from_path("catalog.csv");
//! let mut program = Program::new(session, RecordingRenderer::default());
//! program.run([NarrativeMsg::YearSelected(2019), NarrativeMsg::ExploreRequested])?;
//! ```

use std::any::Any;
use std::borrow::Cow;
use std::io;
use std::sync::mpsc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use tracing::debug_span;

use crate::renderer::Renderer;

/// The application model.
pub trait Model: Sized {
    /// Messages the model reacts to.
    type Message: Send + 'static;

    /// Called once when the program starts.
    fn init(&mut self) -> Cmd<Self::Message> {
        Cmd::none()
    }

    /// The state transition function.
    fn update(&mut self, msg: Self::Message) -> Cmd<Self::Message>;

    /// Describe the current state to the renderer.
    fn view(&self, renderer: &mut dyn Renderer) -> io::Result<()>;
}

/// Best-effort text of a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_owned()
    }
}

/// Diagnostics metadata for background tasks.
#[derive(Debug, Clone, Default)]
pub struct TaskSpec {
    pub name: Option<String>,
}

impl TaskSpec {
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
        }
    }
}

/// Side effects returned from `init()` and `update()`.
#[derive(Default)]
pub enum Cmd<M> {
    /// No operation.
    #[default]
    None,
    /// Stop the program.
    Quit,
    /// Execute commands in order, stopping early on quit.
    Batch(Vec<Cmd<M>>),
    /// Execute commands sequentially.
    Sequence(Vec<Cmd<M>>),
    /// Feed a message straight back into `update()`.
    Msg(M),
    /// Forward a line to the renderer's log.
    Log(String),
    /// Run a blocking closure on a background thread; its return value is
    /// delivered to `update()`.
    Task(TaskSpec, Box<dyn FnOnce() -> M + Send>),
}

impl<M: std::fmt::Debug> std::fmt::Debug for Cmd<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::Quit => write!(f, "Quit"),
            Self::Batch(cmds) => f.debug_tuple("Batch").field(cmds).finish(),
            Self::Sequence(cmds) => f.debug_tuple("Sequence").field(cmds).finish(),
            Self::Msg(m) => f.debug_tuple("Msg").field(m).finish(),
            Self::Log(s) => f.debug_tuple("Log").field(s).finish(),
            Self::Task(spec, _) => f.debug_struct("Task").field("spec", spec).finish(),
        }
    }
}

impl<M> Cmd<M> {
    #[inline]
    pub fn none() -> Self {
        Self::None
    }

    #[inline]
    pub fn quit() -> Self {
        Self::Quit
    }

    #[inline]
    pub fn msg(m: M) -> Self {
        Self::Msg(m)
    }

    #[inline]
    pub fn log(msg: impl Into<String>) -> Self {
        Self::Log(msg.into())
    }

    /// Create a batch, collapsing empty and single-element lists.
    pub fn batch(mut cmds: Vec<Self>) -> Self {
        match cmds.len() {
            0 => Self::None,
            1 => cmds.pop().unwrap_or(Self::None),
            _ => Self::Batch(cmds),
        }
    }

    /// Create a sequence, collapsing empty and single-element lists.
    pub fn sequence(mut cmds: Vec<Self>) -> Self {
        match cmds.len() {
            0 => Self::None,
            1 => cmds.pop().unwrap_or(Self::None),
            _ => Self::Sequence(cmds),
        }
    }

    /// Stable name for tracing.
    #[inline]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Quit => "Quit",
            Self::Batch(_) => "Batch",
            Self::Sequence(_) => "Sequence",
            Self::Msg(_) => "Msg",
            Self::Log(_) => "Log",
            Self::Task(..) => "Task",
        }
    }

    /// Create a background task command.
    pub fn task<F>(f: F) -> Self
    where
        F: FnOnce() -> M + Send + 'static,
    {
        Self::Task(TaskSpec::default(), Box::new(f))
    }

    /// Create a named background task command.
    pub fn task_named<F>(name: impl Into<String>, f: F) -> Self
    where
        F: FnOnce() -> M + Send + 'static,
    {
        Self::Task(TaskSpec::named(name), Box::new(f))
    }
}

/// Loop behavior knobs.
#[derive(Debug, Clone)]
pub struct ProgramConfig {
    /// Block in [`Program::start`] until tasks spawned by `init()` finish.
    pub await_init_tasks: bool,
    /// How long [`Program::settle`] waits on the task channel between
    /// checks for finished threads.
    pub settle_poll: Duration,
}

impl Default for ProgramConfig {
    fn default() -> Self {
        Self {
            await_init_tasks: true,
            settle_poll: Duration::from_millis(5),
        }
    }
}

impl ProgramConfig {
    #[must_use]
    pub fn with_await_init_tasks(mut self, wait: bool) -> Self {
        self.await_init_tasks = wait;
        self
    }

    #[must_use]
    pub fn with_settle_poll(mut self, poll: Duration) -> Self {
        self.settle_poll = poll;
        self
    }
}

/// Drives a [`Model`] and hands every render to a [`Renderer`].
pub struct Program<M: Model, R: Renderer> {
    model: M,
    renderer: R,
    config: ProgramConfig,
    running: bool,
    dirty: bool,
    frame_idx: u64,
    last_update_us: Option<u64>,
    task_sender: mpsc::Sender<M::Message>,
    task_receiver: mpsc::Receiver<M::Message>,
    task_handles: Vec<JoinHandle<()>>,
}

impl<M: Model, R: Renderer> Program<M, R> {
    pub fn new(model: M, renderer: R) -> Self {
        Self::with_config(model, renderer, ProgramConfig::default())
    }

    pub fn with_config(model: M, renderer: R, config: ProgramConfig) -> Self {
        let (task_sender, task_receiver) = mpsc::channel();
        Self {
            model,
            renderer,
            config,
            running: true,
            dirty: true,
            frame_idx: 0,
            last_update_us: None,
            task_sender,
            task_receiver,
            task_handles: Vec::new(),
        }
    }

    /// Initialize the model and render the first frame.
    pub fn start(&mut self) -> io::Result<()> {
        let cmd = {
            let _span = debug_span!("exo.program.init").entered();
            self.model.init()
        };
        self.execute_cmd(cmd)?;
        if self.config.await_init_tasks {
            self.settle()?;
        }
        self.render_if_dirty()
    }

    /// Process one message to completion.
    ///
    /// Results of finished background tasks are applied first, so the
    /// message sees every state change that has already happened.
    pub fn dispatch(&mut self, msg: M::Message) -> io::Result<()> {
        if !self.running {
            return Ok(());
        }
        self.process_task_results()?;
        if !self.running {
            return Ok(());
        }
        let cmd = self.timed_update("dispatch", msg);
        self.execute_cmd(cmd)?;
        self.render_if_dirty()
    }

    /// Block until every spawned task has finished and its message has
    /// been applied.
    pub fn settle(&mut self) -> io::Result<()> {
        while self.running && !self.task_handles.is_empty() {
            match self.task_receiver.recv_timeout(self.config.settle_poll) {
                Ok(msg) => {
                    let cmd = self.timed_update("task", msg);
                    self.execute_cmd(cmd)?;
                }
                Err(mpsc::RecvTimeoutError::Timeout) => {}
                Err(mpsc::RecvTimeoutError::Disconnected) => break,
            }
            self.reap_finished_tasks();
        }
        self.process_task_results()?;
        self.render_if_dirty()
    }

    /// Start, replay `messages` in order, and settle after each one.
    pub fn run<I>(&mut self, messages: I) -> io::Result<()>
    where
        I: IntoIterator<Item = M::Message>,
    {
        self.start()?;
        for msg in messages {
            if !self.running {
                break;
            }
            self.dispatch(msg)?;
            self.settle()?;
        }
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    /// Number of renders so far.
    pub fn frame_count(&self) -> u64 {
        self.frame_idx
    }

    /// Duration of the most recent `update()` call.
    pub fn last_update_us(&self) -> Option<u64> {
        self.last_update_us
    }

    /// Background tasks still running.
    pub fn pending_tasks(&self) -> usize {
        self.task_handles.len()
    }

    pub fn into_parts(self) -> (M, R) {
        (self.model, self.renderer)
    }

    fn timed_update(&mut self, msg_type: &'static str, msg: M::Message) -> Cmd<M::Message> {
        let _span = debug_span!(
            "exo.program.update",
            msg_type,
            duration_us = tracing::field::Empty,
            cmd_type = tracing::field::Empty
        )
        .entered();
        let start = Instant::now();
        let cmd = self.model.update(msg);
        let elapsed_us = start.elapsed().as_micros() as u64;
        self.last_update_us = Some(elapsed_us);
        tracing::Span::current().record("duration_us", elapsed_us);
        tracing::Span::current().record("cmd_type", cmd.type_name());
        self.dirty = true;
        cmd
    }

    fn process_task_results(&mut self) -> io::Result<()> {
        while let Ok(msg) = self.task_receiver.try_recv() {
            let cmd = self.timed_update("task", msg);
            self.execute_cmd(cmd)?;
        }
        Ok(())
    }

    fn execute_cmd(&mut self, cmd: Cmd<M::Message>) -> io::Result<()> {
        match cmd {
            Cmd::None => {}
            Cmd::Quit => self.running = false,
            Cmd::Msg(m) => {
                let cmd = self.timed_update("msg", m);
                self.execute_cmd(cmd)?;
            }
            Cmd::Batch(cmds) | Cmd::Sequence(cmds) => {
                for c in cmds {
                    self.execute_cmd(c)?;
                    if !self.running {
                        break;
                    }
                }
            }
            Cmd::Log(text) => {
                self.renderer.log(&sanitize(&text))?;
            }
            Cmd::Task(spec, f) => {
                tracing::debug!(task = spec.name.as_deref().unwrap_or("unnamed"), "spawning task");
                let sender = self.task_sender.clone();
                let handle = std::thread::spawn(move || {
                    let msg = f();
                    let _ = sender.send(msg);
                });
                self.task_handles.push(handle);
            }
        }
        Ok(())
    }

    fn reap_finished_tasks(&mut self) {
        if self.task_handles.is_empty() {
            return;
        }

        let mut remaining = Vec::with_capacity(self.task_handles.len());
        for handle in self.task_handles.drain(..) {
            if handle.is_finished() {
                if let Err(payload) = handle.join() {
                    let msg = panic_message(payload.as_ref());
                    tracing::error!("spawned task panicked: {msg}");
                }
            } else {
                remaining.push(handle);
            }
        }
        self.task_handles = remaining;
    }

    fn render_if_dirty(&mut self) -> io::Result<()> {
        if !self.dirty || !self.running {
            return Ok(());
        }
        self.frame_idx = self.frame_idx.wrapping_add(1);
        let _span = debug_span!("exo.program.view", frame_idx = self.frame_idx).entered();
        self.model.view(&mut self.renderer)?;
        self.dirty = false;
        Ok(())
    }
}

/// Strip control characters other than tab; one log call is one line.
fn sanitize(text: &str) -> Cow<'_, str> {
    if text.chars().all(|c| c == '\t' || !c.is_control()) {
        return Cow::Borrowed(text);
    }
    Cow::Owned(
        text.chars()
            .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
            .filter(|&c| c == '\t' || !c.is_control())
            .collect(),
    )
}
