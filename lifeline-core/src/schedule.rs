use std::{cell::RefCell, collections::VecDeque, fmt, mem, rc::Rc};

use tracing::debug;

use crate::error::Error;

pub type Task = Box<dyn FnOnce()>;

/// Point in the event loop at which deferred notifications run.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Tick {
    AnimationFrame,
    Timeout,
}

/// The scheduling capabilities of a host environment.
pub trait EventLoop {
    fn has_animation_frames(&self) -> bool;

    fn has_timers(&self) -> bool;

    fn request_animation_frame(&self, task: Task);

    fn set_timeout(&self, task: Task);
}

/// Defers work to the next tick of an [`EventLoop`], preferring animation
/// frames over timers.
#[derive(Clone)]
pub struct Deferrer {
    event_loop: Rc<dyn EventLoop>,
    tick: Tick,
}

impl Deferrer {
    pub fn new(event_loop: Rc<dyn EventLoop>) -> Result<Self, Error> {
        let tick = if event_loop.has_animation_frames() {
            Tick::AnimationFrame
        } else if event_loop.has_timers() {
            Tick::Timeout
        } else {
            return Err(Error::NoScheduler);
        };

        debug!(?tick, "deferred tick selected");
        Ok(Self { event_loop, tick })
    }

    pub fn tick(&self) -> Tick {
        self.tick
    }

    pub fn defer<F>(&self, f: F)
    where
        F: FnOnce() + 'static,
    {
        match self.tick {
            Tick::AnimationFrame => self.event_loop.request_animation_frame(Box::new(f)),
            Tick::Timeout => self.event_loop.set_timeout(Box::new(f)),
        }
    }
}

impl fmt::Debug for Deferrer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Deferrer").field("tick", &self.tick).finish()
    }
}

/// An event loop driven by hand, for hosts without a browser and for tests.
///
/// Tasks queued while a batch runs are left for the next batch, the same way
/// a callback requesting another animation frame waits for the next frame.
pub struct LocalLoop {
    frames: Option<RefCell<VecDeque<Task>>>,
    timers: Option<RefCell<VecDeque<Task>>>,
}

impl Default for LocalLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalLoop {
    pub fn new() -> Self {
        Self {
            frames: Some(RefCell::default()),
            timers: Some(RefCell::default()),
        }
    }

    pub fn without_frames(mut self) -> Self {
        self.frames = None;
        self
    }

    pub fn without_timers(mut self) -> Self {
        self.timers = None;
        self
    }

    pub fn pending_frames(&self) -> usize {
        self.frames.as_ref().map_or(0, |queue| queue.borrow().len())
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.as_ref().map_or(0, |queue| queue.borrow().len())
    }

    /// Runs every task queued for the current frame, returning how many ran.
    pub fn run_frame(&self) -> usize {
        self.frames.as_ref().map_or(0, run_batch)
    }

    /// Runs every queued timer task, returning how many ran.
    pub fn run_timers(&self) -> usize {
        self.timers.as_ref().map_or(0, run_batch)
    }

    /// Alternates frames and timers until both queues are empty.
    pub fn run_until_idle(&self) -> usize {
        let mut total = 0;
        loop {
            let ran = self.run_frame() + self.run_timers();
            if ran == 0 {
                return total;
            }
            total += ran;
        }
    }
}

impl EventLoop for LocalLoop {
    fn has_animation_frames(&self) -> bool {
        self.frames.is_some()
    }

    fn has_timers(&self) -> bool {
        self.timers.is_some()
    }

    fn request_animation_frame(&self, task: Task) {
        self.frames
            .as_ref()
            .expect("animation frames unsupported by this event loop")
            .borrow_mut()
            .push_back(task);
    }

    fn set_timeout(&self, task: Task) {
        self.timers
            .as_ref()
            .expect("timers unsupported by this event loop")
            .borrow_mut()
            .push_back(task);
    }
}

fn run_batch(queue: &RefCell<VecDeque<Task>>) -> usize {
    let batch = mem::take(&mut *queue.borrow_mut());
    let ran = batch.len();
    for task in batch {
        task();
    }
    ran
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    #[test]
    fn prefers_frames() {
        let event_loop = Rc::new(LocalLoop::new());
        let deferrer = Deferrer::new(event_loop.clone()).unwrap();
        assert_eq!(deferrer.tick(), Tick::AnimationFrame);

        let ran = Rc::new(Cell::new(false));
        let r = ran.clone();
        deferrer.defer(move || r.set(true));

        assert!(!ran.get());
        assert_eq!(event_loop.pending_frames(), 1);
        assert_eq!(event_loop.run_timers(), 0);
        assert_eq!(event_loop.run_frame(), 1);
        assert!(ran.get());
    }

    #[test]
    fn falls_back_to_timers() {
        let event_loop = Rc::new(LocalLoop::new().without_frames());
        let deferrer = Deferrer::new(event_loop.clone()).unwrap();
        assert_eq!(deferrer.tick(), Tick::Timeout);

        deferrer.defer(|| {});
        assert_eq!(event_loop.pending_timers(), 1);
        assert_eq!(event_loop.run_frame(), 0);
        assert_eq!(event_loop.run_timers(), 1);
    }

    #[test]
    fn no_scheduler() {
        let event_loop = Rc::new(LocalLoop::new().without_frames().without_timers());
        assert!(matches!(
            Deferrer::new(event_loop),
            Err(Error::NoScheduler)
        ));
    }

    #[test]
    fn nested_tasks_wait_for_next_frame() {
        let event_loop = Rc::new(LocalLoop::new());
        let deferrer = Deferrer::new(event_loop.clone()).unwrap();
        let order = Rc::new(RefCell::new(vec![]));

        let (d, o) = (deferrer.clone(), order.clone());
        deferrer.defer(move || {
            o.borrow_mut().push(1);
            let o = o.clone();
            d.defer(move || o.borrow_mut().push(2));
        });

        assert_eq!(event_loop.run_frame(), 1);
        assert_eq!(*order.borrow(), [1]);
        assert_eq!(event_loop.run_until_idle(), 1);
        assert_eq!(*order.borrow(), [1, 2]);
    }
}
