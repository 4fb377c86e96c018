use std::cell::Cell;
use std::rc::Rc;

use crate::canvas::Canvas;

/// A renderer that owns its model and redraws it once per frame
pub trait Animation {
    /// Short name for logs
    fn name(&self) -> &'static str;

    /// Discard the model and rebuild it for a surface of this size
    fn regenerate(&mut self, width: u32, height: u32);

    /// Advance one frame and draw it: update first, then draw
    fn frame(&mut self, canvas: &mut dyn Canvas);
}

/// Revocable flag shared between a running task and whoever may tear it down.
/// Frames are single-threaded, so a shared `Cell` is enough.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Rc<Cell<bool>>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.get()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TaskState {
    /// Mounted, waiting to be told to start
    Idle,
    Running,
    /// Torn down; never runs again
    Stopped,
}

/// Explicit start/stop wrapper around an [`Animation`].
///
/// The host calls [`tick`](Self::tick) once per display refresh and only
/// requests another frame while it returns `true`. Stopping (or dropping)
/// revokes the token so no further frame runs.
pub struct AnimationTask<A: Animation> {
    animation: A,
    state: TaskState,
    token: Option<CancelToken>,
    frames: u64,
    size: (u32, u32),
}

impl<A: Animation> AnimationTask<A> {
    pub fn new(animation: A) -> Self {
        Self {
            animation,
            state: TaskState::Idle,
            token: None,
            frames: 0,
            size: (0, 0),
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> TaskState {
        self.state
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    #[cfg(test)]
    pub fn animation(&self) -> &A {
        &self.animation
    }

    pub fn is_running(&self) -> bool {
        self.state == TaskState::Running && self.token.as_ref().is_some_and(|t| !t.is_cancelled())
    }

    /// Begin the frame chain. Returns the token that stops it, or `None` if
    /// the task was already stopped.
    pub fn start(&mut self) -> Option<CancelToken> {
        match self.state {
            TaskState::Idle => {
                let token = CancelToken::new();
                self.token = Some(token.clone());
                self.state = TaskState::Running;
                log::debug!("{}: started", self.animation.name());
                Some(token)
            }
            TaskState::Running => self.token.clone(),
            TaskState::Stopped => {
                log::warn!("{}: start ignored, task already stopped", self.animation.name());
                None
            }
        }
    }

    pub fn stop(&mut self) {
        if let Some(token) = self.token.take() {
            token.cancel();
        }
        if self.state != TaskState::Stopped {
            log::debug!("{}: stopped after {} frames", self.animation.name(), self.frames);
            self.state = TaskState::Stopped;
        }
    }

    /// Rebuild the model for a new container size. Zero-area means there is
    /// no container yet; the request is dropped until a real size arrives.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            log::debug!("{}: ignoring resize to {}x{}", self.animation.name(), width, height);
            return;
        }
        self.size = (width, height);
        self.animation.regenerate(width, height);
    }

    /// Run one frame if running. Returns whether the next frame should be
    /// scheduled; a missing canvas skips drawing but keeps the chain alive.
    pub fn tick(&mut self, canvas: Option<&mut dyn Canvas>) -> bool {
        if !self.is_running() {
            if self.state == TaskState::Running {
                // Cancelled from outside through a cloned token
                self.stop();
            }
            return false;
        }
        if let Some(canvas) = canvas {
            if self.size != (0, 0) {
                self.animation.frame(canvas);
                self.frames += 1;
            }
        }
        true
    }
}

impl<A: Animation> Drop for AnimationTask<A> {
    fn drop(&mut self) {
        if let Some(token) = self.token.take() {
            token.cancel();
        }
    }
}
