//! The lighting worker — renders the shared mode onto the tree at ~20 Hz.
//!
//! Each tick the controller reads `SharedState::mode`, re-seeds the
//! [`Animator`] when the mode changed since the previous tick, advances one
//! animation frame and pushes it to the hardware.  The loop runs until
//! shutdown is signalled; the tree handle is released on every exit path.
//!
//! A [`TreeError::Closed`] from the hardware ends the loop cleanly (the
//! handle was released under us, typically during shutdown); any other tree
//! error is logged and terminates the worker after release.

use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::state::{Mode, SharedState};

use super::patterns::Animator;
use super::tree::{TreeError, TreeLights};

/// Frame period — ~20 Hz.  A design parameter, not a real-time deadline.
pub const TICK_PERIOD: Duration = Duration::from_millis(50);

// ---------------------------------------------------------------------------
// LightingController
// ---------------------------------------------------------------------------

/// Owns the tree handle and the animation state.
///
/// Construct, then call [`LightingController::run`] on a dedicated thread.
/// Tests drive [`LightingController::step`] directly instead of spinning the
/// timed loop.
pub struct LightingController<T: TreeLights> {
    tree: T,
    state: std::sync::Arc<SharedState>,
    animator: Animator,
    rng: SmallRng,
    /// Mode rendered on the previous tick; `None` before the first tick so
    /// the initial frame always seeds.
    current_mode: Option<Mode>,
}

impl<T: TreeLights> LightingController<T> {
    pub fn new(tree: T, state: std::sync::Arc<SharedState>) -> Self {
        Self {
            tree,
            state,
            animator: Animator::new(),
            rng: SmallRng::from_entropy(),
            current_mode: None,
        }
    }

    /// Deterministic RNG for tests.
    #[cfg(test)]
    pub fn with_rng_seed(tree: T, state: std::sync::Arc<SharedState>, seed: u64) -> Self {
        Self {
            tree,
            state,
            animator: Animator::new(),
            rng: SmallRng::seed_from_u64(seed),
            current_mode: None,
        }
    }

    /// Render one frame: detect a mode transition, advance the animation,
    /// write the frame to the hardware.
    ///
    /// Returns `Ok(true)` to keep ticking, `Ok(false)` when the tree handle
    /// reported it was already closed (clean exit).
    pub fn step(&mut self) -> Result<bool, TreeError> {
        let mode = self.state.mode();

        if self.current_mode != Some(mode) {
            log::debug!(
                "lights: {} -> {}",
                self.current_mode.map(Mode::word).unwrap_or("(start)"),
                mode.word()
            );
            self.animator.transition(mode, &mut self.rng);
            self.current_mode = Some(mode);
        }

        self.animator.tick(mode, &mut self.rng);

        for (index, colour) in self.animator.frame().iter().enumerate() {
            match self.tree.set(index, *colour) {
                Ok(()) => {}
                Err(TreeError::Closed) => return Ok(false),
                Err(err) => return Err(err),
            }
        }
        Ok(true)
    }

    /// Worker loop.  Consumes the controller; the tree is released before
    /// returning, whatever the exit path.
    pub fn run(mut self) {
        log::info!("lighting worker started");
        loop {
            if self.state.is_shutdown() {
                break;
            }
            match self.step() {
                Ok(true) => {}
                Ok(false) => {
                    log::info!("tree handle closed while rendering; lighting worker exiting");
                    break;
                }
                Err(err) => {
                    log::error!("lighting worker stopping on hardware error: {err}");
                    break;
                }
            }
            std::thread::sleep(TICK_PERIOD);
        }

        // Guaranteed release; an already-closed handle is fine here.
        match self.tree.close() {
            Ok(()) | Err(TreeError::Closed) => {}
            Err(err) => log::warn!("failed to release tree: {err}"),
        }
        log::info!("lighting worker stopped");
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lights::colour::{Colour, NamedColour};
    use crate::lights::tree::{MemoryTree, STAR_INDEX};
    use std::sync::Arc;

    fn controller(state: Arc<SharedState>) -> LightingController<MemoryTree> {
        LightingController::with_rng_seed(MemoryTree::new(), state, 7)
    }

    #[test]
    fn first_step_seeds_initial_mode() {
        let state = Arc::new(SharedState::new()); // starts in disco
        let mut ctrl = controller(Arc::clone(&state));
        ctrl.step().unwrap();

        // After seed + one tick, group 0 is red rotated one hue step.
        assert_eq!(ctrl.tree.frame()[0], Colour::RED.rotate_hue(10.0));
        assert_eq!(ctrl.tree.frame()[STAR_INDEX], Colour::WHITE);
    }

    #[test]
    fn solid_mode_renders_on_next_tick() {
        let state = Arc::new(SharedState::new());
        let mut ctrl = controller(Arc::clone(&state));
        ctrl.step().unwrap();

        state.set_mode(Mode::Solid(NamedColour::Purple));
        ctrl.step().unwrap();

        for (i, light) in ctrl.tree.frame().iter().enumerate() {
            let expected = if i == STAR_INDEX {
                Colour::WHITE
            } else {
                Colour::PURPLE
            };
            assert_eq!(*light, expected, "light {i}");
        }
    }

    #[test]
    fn returning_to_disco_reseeds_groups() {
        let state = Arc::new(SharedState::new());
        let mut ctrl = controller(Arc::clone(&state));
        for _ in 0..10 {
            ctrl.step().unwrap();
        }

        state.set_mode(Mode::Solid(NamedColour::Red));
        ctrl.step().unwrap();
        state.set_mode(Mode::Disco);
        ctrl.step().unwrap();

        // Seed red/green/blue then exactly one tick of rotation.
        assert_eq!(ctrl.tree.frame()[0], Colour::RED.rotate_hue(10.0));
        assert_eq!(ctrl.tree.frame()[1], Colour::GREEN.rotate_hue(10.0));
        assert_eq!(ctrl.tree.frame()[2], Colour::BLUE.rotate_hue(10.0));
    }

    #[test]
    fn closed_tree_ends_loop_cleanly() {
        let state = Arc::new(SharedState::new());
        let mut tree = MemoryTree::new();
        tree.close().unwrap();
        let mut ctrl = LightingController::with_rng_seed(tree, state, 7);
        assert!(matches!(ctrl.step(), Ok(false)));
    }

    /// Shared-handle backend so a test can inspect the tree after `run`
    /// has consumed the controller.
    #[derive(Clone)]
    struct SharedTree(Arc<std::sync::Mutex<MemoryTree>>);

    impl SharedTree {
        fn new() -> Self {
            Self(Arc::new(std::sync::Mutex::new(MemoryTree::new())))
        }
    }

    impl TreeLights for SharedTree {
        fn set(&mut self, index: usize, colour: Colour) -> Result<(), TreeError> {
            self.0.lock().unwrap().set(index, colour)
        }

        fn close(&mut self) -> Result<(), TreeError> {
            self.0.lock().unwrap().close()
        }
    }

    #[test]
    fn run_exits_on_shutdown_and_closes_tree_once() {
        let state = Arc::new(SharedState::new());
        let tree = SharedTree::new();
        let ctrl = LightingController::with_rng_seed(tree.clone(), Arc::clone(&state), 7);

        let handle = std::thread::spawn(move || ctrl.run());
        std::thread::sleep(Duration::from_millis(120));
        state.signal_shutdown();
        handle.join().expect("lighting worker should exit");

        let tree = tree.0.lock().unwrap();
        assert!(tree.is_closed());
        assert_eq!(tree.close_calls(), 1, "handle must be released exactly once");
    }
}
