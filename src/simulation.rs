//! The simulation facade: configuration, integrator and interaction in one
//! object, plus a queue for commands issued between ticks.

use crate::config::KnitConfig;
use crate::error::{KnitError, Result};
use crate::float::Float;
use crate::force::ForceTerm;
use crate::integrator::{Integrator, SimState, TickReport};
use crate::interaction::{DragTarget, InteractionController};
use crate::observer::{NoOpStepObserver, StepObserver};
use crate::topology::Topology;
use crate::vec::Vec2;
use crate::vertex::Vertex;

/// A command queued with [`Simulation::submit`] and applied right before
/// the next tick.
#[derive(Clone, Debug, PartialEq)]
pub enum Intent<F: Float> {
    SetConfig(KnitConfig<F>),
    SetForceTerm(ForceTerm, bool),
    Pin(usize),
    Unpin(usize),
    BeginDrag(DragTarget),
    DragBy(F, F),
    DragTo(F, F),
    EndDrag,
    Reheat(F),
}

/// A knit mesh relaxing under the configured forces.
///
/// ```
/// use knitmesh::{KnitConfig, SimState, Simulation};
///
/// let mut sim: Simulation = Simulation::new(KnitConfig::new().with_dimensions(4, 4)).unwrap();
/// sim.start_simulation().unwrap();
/// while sim.state() == SimState::Running {
///     sim.tick().unwrap();
/// }
/// assert_eq!(sim.positions().len(), 25);
/// ```
pub struct Simulation<F: Float = f64> {
    config: KnitConfig<F>,
    integrator: Integrator<F>,
    interaction: InteractionController,
    pending: Vec<Intent<F>>,
    rejected: Vec<KnitError>,
}

impl<F: Float> Simulation<F> {
    /// An idle simulation. Fails if `config` does not validate.
    pub fn new(config: KnitConfig<F>) -> Result<Self> {
        config.validate()?;
        Ok(Simulation {
            integrator: Integrator::new(&config),
            config,
            interaction: InteractionController::new(),
            pending: Vec::new(),
            rejected: Vec::new(),
        })
    }

    /// Build the topology for the configured dimensions without starting.
    pub fn build_topology(&self) -> Result<Topology> {
        Topology::build(self.config.width, self.config.height)
    }

    /// Build a fresh topology and start from the undeformed grid.
    /// Pins and any drag in progress are discarded.
    pub fn start_simulation(&mut self) -> Result<()> {
        let topology = self.build_topology()?;
        self.interaction.cancel();
        self.integrator.start(topology, &self.config);
        Ok(())
    }

    /// Drop the topology and go idle. Pending commands stay queued.
    pub fn stop(&mut self) {
        self.interaction.cancel();
        self.integrator.stop();
    }

    /// Apply queued intents, then advance one step.
    pub fn tick(&mut self) -> Result<TickReport<F>> {
        self.step(&mut NoOpStepObserver)
    }

    /// Like [`tick`](Self::tick), reporting progress to `observer`.
    ///
    /// Intents that fail are carried in the report's `rejected` list. When
    /// the simulation is not running they are kept for the next tick that does run.
    pub fn step<O: StepObserver<F>>(&mut self, observer: &mut O) -> Result<TickReport<F>> {
        self.apply_pending();
        let state = self.integrator.state();
        if state != SimState::Running {
            return Err(KnitError::NotRunning { state });
        }
        let rejected = std::mem::take(&mut self.rejected);
        self.integrator.advance(observer, rejected)
    }

    /// Replace the configuration.
    ///
    /// An invalid config is rejected and the current one stays in effect.
    /// A dimension change restarts a started simulation on a new topology;
    /// any other change is applied live and reheats.
    pub fn set_config(&mut self, config: KnitConfig<F>) -> Result<()> {
        config.validate()?;
        let restart = self.config.changes_topology(&config);
        self.config = config;

        if self.integrator.topology().is_none() {
            self.integrator.configure(&self.config);
            return Ok(());
        }
        if restart {
            ftlog::info!("grid resized to {}x{}, restarting", self.config.width, self.config.height);
            return self.start_simulation();
        }
        self.integrator.configure(&self.config);
        self.integrator.reheat(self.integrator.alpha_target())
    }

    /// Switch one force term on or off and reheat. Configurable terms are
    /// also updated in the stored config.
    pub fn set_force_term(&mut self, term: ForceTerm, enabled: bool) -> Result<()> {
        self.config = self.config.clone().with_force(term, enabled);
        self.integrator.set_force_term(term, enabled);
        self.integrator.reheat(self.integrator.alpha_target())
    }

    /// Resume cooling toward `target`, which must lie in `[0, 1]`.
    pub fn reheat(&mut self, target: F) -> Result<()> {
        self.integrator.reheat(target)
    }

    /// Fix `vertex` at its current position.
    pub fn pin(&mut self, vertex: usize) -> Result<()> {
        self.interaction.pin(&mut self.integrator, vertex)
    }

    /// Release a pin and reheat.
    pub fn unpin(&mut self, vertex: usize) -> Result<()> {
        self.interaction.unpin(&mut self.integrator, vertex)
    }

    /// Grab `target`; its vertices follow the drag until `end_drag`.
    pub fn begin_drag(&mut self, target: DragTarget) -> Result<()> {
        self.interaction.begin_drag(&mut self.integrator, target)
    }

    /// Move the grabbed vertices by `(dx, dy)`.
    pub fn drag_by(&mut self, dx: F, dy: F) -> Result<()> {
        self.interaction.drag_by(&mut self.integrator, dx, dy)
    }

    /// Move the grab so its first vertex lands on `(x, y)`.
    pub fn drag_to(&mut self, x: F, y: F) -> Result<()> {
        self.interaction.drag_to(&mut self.integrator, x, y)
    }

    /// Let go of the grabbed vertices.
    pub fn end_drag(&mut self) -> Result<()> {
        self.interaction.end_drag(&mut self.integrator)
    }

    /// Queue `intent` for the next tick.
    pub fn submit(&mut self, intent: Intent<F>) {
        self.pending.push(intent);
    }

    /// Apply queued intents in submission order. Only the last queued
    /// `SetConfig` is applied; earlier ones are superseded.
    fn apply_pending(&mut self) {
        let pending = std::mem::take(&mut self.pending);
        if pending.is_empty() {
            return;
        }
        let last_config = pending.iter().rposition(|i| matches!(i, Intent::SetConfig(_)));

        for (index, intent) in pending.into_iter().enumerate() {
            let result = match intent {
                Intent::SetConfig(config) => {
                    if Some(index) != last_config {
                        continue;
                    }
                    self.set_config(config)
                }
                Intent::SetForceTerm(term, enabled) => self.set_force_term(term, enabled),
                Intent::Pin(v) => self.pin(v),
                Intent::Unpin(v) => self.unpin(v),
                Intent::BeginDrag(target) => self.begin_drag(target),
                Intent::DragBy(dx, dy) => self.drag_by(dx, dy),
                Intent::DragTo(x, y) => self.drag_to(x, y),
                Intent::EndDrag => self.end_drag(),
                Intent::Reheat(target) => self.reheat(target),
            };
            if let Err(err) = result {
                ftlog::debug!("queued command rejected: {}", err);
                self.rejected.push(err);
            }
        }
    }

    pub fn config(&self) -> &KnitConfig<F> { &self.config }
    pub fn state(&self) -> SimState { self.integrator.state() }
    pub fn alpha(&self) -> F { self.integrator.alpha() }
    pub fn topology(&self) -> Option<&Topology> { self.integrator.topology() }
    pub fn vertices(&self) -> &[Vertex<F>] { self.integrator.vertices() }
    pub fn positions(&self) -> Vec<Vec2<F>> { self.integrator.positions() }
    pub fn integrator(&self) -> &Integrator<F> { &self.integrator }
    pub fn is_dragging(&self) -> bool { self.interaction.is_dragging() }
    /// Commands queued for the next tick.
    pub fn pending(&self) -> &[Intent<F>] { &self.pending }
}
