//! Velocity-damped relaxation with alpha cooling.
//!
//! The integrator owns every mutable array of the simulation. One `tick`
//! cools alpha, lets each active force term add to the velocities, then
//! moves the free vertices and snaps the fixed ones.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::KnitConfig;
use crate::error::{KnitError, Result};
use crate::float::Float;
use crate::force::{centering_shift, relax_links, CenterMode, ForceModel, ForceSet, ForceTerm};
use crate::observer::StepObserver;
use crate::quadtree::QuadTree;
use crate::topology::{LinkClass, Topology};
use crate::vec::Vec2;
use crate::vertex::Vertex;

/// Lifecycle of a simulation.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SimState {
    /// No topology.
    Idle,
    /// Alpha above the settle threshold; `tick` advances the mesh.
    Running,
    /// Cooled down. Needs a reheat to move again.
    Settled,
}

/// Outcome of one tick.
#[derive(Clone, Debug, PartialEq)]
pub struct TickReport<F: Float> {
    /// Ticks completed since the last start.
    pub tick: u64,
    pub alpha: F,
    pub state: SimState,
    /// One `NumericDivergence` per vertex rolled back during this tick.
    pub divergences: Vec<KnitError>,
    /// Queued commands that failed when drained before this tick.
    pub rejected: Vec<KnitError>,
}

pub struct Integrator<F: Float> {
    state: SimState,
    topology: Option<Topology>,
    vertices: Vec<Vertex<F>>,
    model: ForceModel<F>,
    forces: ForceSet,
    center_mode: CenterMode,
    alpha: F,
    alpha_target: F,
    alpha_min: F,
    alpha_decay: F,
    velocity_decay: F,
    reheat_alpha: F,
    unfold_ticks: usize,
    unfold_remaining: usize,
    ticks: u64,
}

impl<F: Float> Integrator<F> {
    /// An idle integrator using the coefficients of `config`.
    pub fn new(config: &KnitConfig<F>) -> Self {
        Integrator {
            state: SimState::Idle,
            topology: None,
            vertices: Vec::new(),
            model: ForceModel::new(config),
            forces: ForceSet::from_config(config),
            center_mode: CenterMode::Full,
            alpha: F::zero(),
            alpha_target: F::zero(),
            alpha_min: config.alpha_min,
            alpha_decay: config.alpha_decay,
            velocity_decay: config.velocity_decay,
            reheat_alpha: config.reheat_alpha,
            unfold_ticks: config.unfold_ticks,
            unfold_remaining: 0,
            ticks: 0,
        }
    }

    /// Lay the vertices out on the undeformed grid and start running hot.
    ///
    /// Any previous state is discarded. Positions are `origin + (x, y) * edge_length`,
    /// offset by a seeded uniform jitter of up to `config.jitter` per axis.
    pub fn start(&mut self, topology: Topology, config: &KnitConfig<F>) {
        self.configure(config);

        let mut rng = StdRng::seed_from_u64(config.seed);
        let jitter = config.jitter;
        let edge = config.edge_length;
        self.vertices = (0..topology.vertex_count())
            .map(|v| {
                let (x, y) = topology.coords(v);
                let mut pos = Vec2::new(
                    config.origin_x + F::from_f64(x as f64) * edge,
                    config.origin_y + F::from_f64(y as f64) * edge,
                );
                if jitter > F::zero() {
                    let jx: f64 = rng.gen_range(-1.0..=1.0);
                    let jy: f64 = rng.gen_range(-1.0..=1.0);
                    pos += Vec2::new(F::from_f64(jx) * jitter, F::from_f64(jy) * jitter);
                }
                Vertex::new(pos)
            })
            .collect();

        ftlog::info!(
            "simulation started: {}x{} cells, {} vertices",
            topology.width(),
            topology.height(),
            self.vertices.len()
        );

        self.topology = Some(topology);
        self.alpha = F::one();
        self.alpha_target = F::zero();
        self.center_mode = CenterMode::Full;
        self.unfold_remaining = config.unfold_ticks;
        self.forces.set(ForceTerm::Unfold, self.unfold_remaining > 0);
        self.ticks = 0;
        self.state = SimState::Running;
    }

    /// Drop the topology and every per-vertex array.
    pub fn stop(&mut self) {
        self.topology = None;
        self.vertices.clear();
        self.unfold_remaining = 0;
        self.forces.remove(ForceTerm::Unfold);
        self.alpha = F::zero();
        self.state = SimState::Idle;
    }

    /// Take new coefficients without touching positions.
    ///
    /// Enable flags of the configurable terms are re-read from `config`.
    /// Centering keeps its current flag and a running unfold keeps its
    /// remaining ticks.
    pub fn configure(&mut self, config: &KnitConfig<F>) {
        self.model = ForceModel::new(config);
        let centering = self.forces.contains(ForceTerm::Center);
        let unfolding = self.forces.contains(ForceTerm::Unfold) && self.unfold_remaining > 0;
        self.forces = ForceSet::from_config(config);
        self.forces.set(ForceTerm::Center, centering);
        self.forces.set(ForceTerm::Unfold, unfolding);
        self.unfold_ticks = config.unfold_ticks;
        self.alpha_min = config.alpha_min;
        self.alpha_decay = config.alpha_decay;
        self.velocity_decay = config.velocity_decay;
        self.reheat_alpha = config.reheat_alpha;
    }

    /// Resume stepping toward `target`. Alpha is raised to at least
    /// `max(reheat_alpha, target)`.
    ///
    /// A target outside `[0, 1]` is rejected and nothing changes.
    pub fn reheat(&mut self, target: F) -> Result<()> {
        check_alpha_target(target)?;
        if self.topology.is_none() {
            return Err(KnitError::NoTopology);
        }
        self.alpha_target = target;
        let floor = self.reheat_alpha.max(target);
        if self.alpha < floor {
            self.alpha = floor;
        }
        if self.state != SimState::Running {
            ftlog::debug!("reheated to alpha {}", self.alpha);
        }
        self.state = SimState::Running;
        Ok(())
    }

    /// Advance one step.
    pub fn tick<O: StepObserver<F>>(&mut self, observer: &mut O) -> Result<TickReport<F>> {
        self.advance(observer, Vec::new())
    }

    /// Advance one step, carrying `rejected` into the report.
    pub(crate) fn advance<O: StepObserver<F>>(
        &mut self,
        observer: &mut O,
        rejected: Vec<KnitError>,
    ) -> Result<TickReport<F>> {
        if self.state != SimState::Running {
            return Err(KnitError::NotRunning { state: self.state });
        }
        let Some(topology) = self.topology.as_ref() else {
            return Err(KnitError::NoTopology);
        };

        self.alpha = self.alpha + (self.alpha_target - self.alpha) * self.alpha_decay;
        let alpha = self.alpha;

        let positions: Vec<Vec2<F>> = self.vertices.iter().map(|v| v.pos).collect();
        let mut velocities: Vec<Vec2<F>> = self.vertices.iter().map(|v| v.vel).collect();

        let shift = if self.forces.contains(ForceTerm::Center) {
            let vertices = &self.vertices;
            centering_shift(
                &positions,
                |i| !vertices[i].is_fixed(),
                self.model.center(),
                self.model.center_strength(self.center_mode),
            )
        } else {
            Vec2::zero()
        };

        for class in LinkClass::ALL {
            if !self.forces.contains(class.into()) {
                continue;
            }
            let params = self.model.link_params(class);
            for pass in 0..self.model.iterations() {
                relax_links(
                    topology.links(class),
                    topology.degrees(class),
                    params,
                    alpha,
                    &positions,
                    &mut velocities,
                );
                observer.on_relaxation_pass(class, pass);
            }
        }

        let charge = self.forces.contains(ForceTerm::Charge);
        let unfold = self.forces.contains(ForceTerm::Unfold);
        if charge || unfold {
            let tree = QuadTree::build(&positions);
            if charge {
                self.model.charge().apply(&tree, &positions, alpha, &mut velocities);
            }
            if unfold {
                self.model.unfold().apply(&tree, &positions, alpha, &mut velocities);
            }
        }

        if self.forces.contains(ForceTerm::Collision) {
            self.model.collision().apply(&positions, &mut velocities);
        }
        observer.on_forces_applied();

        let mut divergences = Vec::new();
        for (i, vertex) in self.vertices.iter_mut().enumerate() {
            let start = positions[i];
            vertex.vel = velocities[i];
            if vertex.held {
                vertex.held = false;
                vertex.pos = start;
                vertex.vel = Vec2::zero();
                continue;
            }
            vertex.integrate(self.velocity_decay, shift);
            if !vertex.is_finite() {
                ftlog::warn!("vertex {} diverged at tick {}, reset to its last position", i, self.ticks + 1);
                vertex.pos = start;
                vertex.vel = Vec2::zero();
                vertex.held = true;
                divergences.push(KnitError::NumericDivergence { vertex: i });
                observer.on_divergence(i);
            }
        }

        self.ticks += 1;
        if self.unfold_remaining > 0 {
            self.unfold_remaining -= 1;
            if self.unfold_remaining == 0 {
                self.forces.remove(ForceTerm::Unfold);
                ftlog::debug!("unfold expired after {} ticks", self.ticks);
            }
        }

        if self.alpha <= self.alpha_min {
            self.state = SimState::Settled;
            ftlog::info!("simulation settled after {} ticks", self.ticks);
        }

        let report = TickReport { tick: self.ticks, alpha, state: self.state, divergences, rejected };
        observer.on_tick_complete(&report);
        Ok(report)
    }

    /// Switch one term on or off. Enabling `Unfold` arms it for
    /// `unfold_ticks` ticks; with zero ticks it stays off.
    pub fn set_force_term(&mut self, term: ForceTerm, enabled: bool) {
        if term == ForceTerm::Unfold {
            self.unfold_remaining = if enabled { self.unfold_ticks } else { 0 };
            self.forces.set(term, self.unfold_remaining > 0);
        } else {
            self.forces.set(term, enabled);
        }
    }

    /// Alpha the cooling approaches. Must lie in `[0, 1]`.
    pub fn set_alpha_target(&mut self, target: F) -> Result<()> {
        check_alpha_target(target)?;
        self.alpha_target = target;
        Ok(())
    }

    pub fn set_center_mode(&mut self, mode: CenterMode) {
        self.center_mode = mode;
    }

    /// Replace the force coefficients only; enable flags stay as they are.
    pub fn set_model(&mut self, model: ForceModel<F>) {
        self.model = model;
    }

    pub fn vertex(&self, index: usize) -> Result<&Vertex<F>> {
        self.check_vertex(index)?;
        Ok(&self.vertices[index])
    }

    pub(crate) fn vertex_mut(&mut self, index: usize) -> Result<&mut Vertex<F>> {
        self.check_vertex(index)?;
        Ok(&mut self.vertices[index])
    }

    fn check_vertex(&self, index: usize) -> Result<()> {
        match &self.topology {
            Some(topology) => topology.check_vertex(index),
            None => Err(KnitError::NoTopology),
        }
    }

    pub fn state(&self) -> SimState { self.state }
    pub fn alpha(&self) -> F { self.alpha }
    pub fn alpha_target(&self) -> F { self.alpha_target }
    pub fn center_mode(&self) -> CenterMode { self.center_mode }
    pub fn forces(&self) -> ForceSet { self.forces }
    pub fn model(&self) -> &ForceModel<F> { &self.model }
    pub fn ticks(&self) -> u64 { self.ticks }
    pub fn topology(&self) -> Option<&Topology> { self.topology.as_ref() }
    pub fn vertices(&self) -> &[Vertex<F>] { &self.vertices }

    pub fn positions(&self) -> Vec<Vec2<F>> {
        self.vertices.iter().map(|v| v.pos).collect()
    }
}

fn check_alpha_target<F: Float>(target: F) -> Result<()> {
    if target >= F::zero() && target <= F::one() {
        Ok(())
    } else {
        Err(KnitError::InvalidCoefficient { name: "alpha_target", reason: "must be in [0, 1]" })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::NoOpStepObserver;

    fn started(config: &KnitConfig<f64>) -> Integrator<f64> {
        let topology = Topology::build(config.width, config.height).expect("valid dimensions");
        let mut integrator = Integrator::new(config);
        integrator.start(topology, config);
        integrator
    }

    #[test]
    fn start_places_undeformed_grid() {
        let config = KnitConfig::new().with_dimensions(3, 2).with_edge_length(10.0).with_origin(5.0, -5.0);
        let integrator = started(&config);
        assert_eq!(integrator.state(), SimState::Running);
        assert_eq!(integrator.alpha(), 1.0);
        // 4 x 3 vertices, row-major.
        assert_eq!(integrator.vertices().len(), 12);
        assert_eq!(integrator.positions()[0], Vec2::new(5.0, -5.0));
        assert_eq!(integrator.positions()[5], Vec2::new(15.0, 5.0));
        assert!(integrator.vertices().iter().all(|v| v.vel.is_zero()));
        assert!(integrator.forces().contains(ForceTerm::Unfold));
    }

    #[test]
    fn jitter_is_seeded() {
        let config = KnitConfig::new().with_dimensions(4, 4).with_jitter(2.0, 7);
        let a = started(&config).positions();
        let b = started(&config).positions();
        assert_eq!(a, b);
        assert_ne!(a[0], Vec2::new(0.0, 0.0));
        assert!(a[0].x.abs() <= 2.0 && a[0].y.abs() <= 2.0);
    }

    #[test]
    fn tick_requires_running() {
        let mut integrator = Integrator::new(&KnitConfig::<f64>::new());
        let err = integrator.tick(&mut NoOpStepObserver).unwrap_err();
        assert_eq!(err, KnitError::NotRunning { state: SimState::Idle });
    }

    #[test]
    fn alpha_decays_before_forces() {
        let config = KnitConfig::new().with_dimensions(2, 2);
        let mut integrator = started(&config);
        let report = integrator.tick(&mut NoOpStepObserver).expect("running");
        let expected = 1.0 - config.alpha_decay;
        assert!((report.alpha - expected).abs() < 1e-12);
        assert_eq!(report.tick, 1);
    }

    #[test]
    fn settles_near_300_ticks() {
        let config = KnitConfig::new().with_dimensions(2, 2).with_only(&[]).with_unfold(0.0, 0);
        let mut integrator = started(&config);
        let mut ticks = 0;
        while integrator.state() == SimState::Running {
            integrator.tick(&mut NoOpStepObserver).expect("running");
            ticks += 1;
            assert!(ticks < 1000, "never settled");
        }
        assert!((295..=305).contains(&ticks), "settled after {ticks}");
        assert!(integrator.alpha() <= config.alpha_min);
    }

    #[test]
    fn reheat_restores_running_with_alpha_floor() {
        let config = KnitConfig::new().with_dimensions(2, 2).with_cooling(0.5, 0.5);
        let mut integrator = started(&config);
        integrator.tick(&mut NoOpStepObserver).expect("running");
        assert_eq!(integrator.state(), SimState::Settled);

        integrator.reheat(0.0).expect("has topology");
        assert_eq!(integrator.state(), SimState::Running);
        assert_eq!(integrator.alpha(), 0.5);

        integrator.reheat(0.9).expect("has topology");
        assert_eq!(integrator.alpha(), 0.9);
        assert_eq!(integrator.alpha_target(), 0.9);
    }

    #[test]
    fn reheat_rejects_bad_target_and_keeps_state() {
        let config = KnitConfig::new().with_dimensions(2, 2).with_cooling(0.5, 0.5);
        let mut integrator = started(&config);
        integrator.tick(&mut NoOpStepObserver).expect("running");
        let alpha = integrator.alpha();

        for target in [f64::NAN, f64::INFINITY, -0.1, 1.5] {
            let err = integrator.reheat(target).unwrap_err();
            assert!(matches!(err, KnitError::InvalidCoefficient { name: "alpha_target", .. }));
            assert_eq!(integrator.state(), SimState::Settled);
            assert_eq!(integrator.alpha(), alpha);
            assert_eq!(integrator.alpha_target(), 0.0);
        }
        assert!(integrator.set_alpha_target(f64::NAN).is_err());
        assert_eq!(integrator.alpha_target(), 0.0);
        integrator.set_alpha_target(1.0).expect("in range");
        assert_eq!(integrator.alpha_target(), 1.0);
    }

    #[test]
    fn reheat_without_topology_fails() {
        let mut integrator = Integrator::new(&KnitConfig::<f64>::new());
        assert_eq!(integrator.reheat(0.3), Err(KnitError::NoTopology));
    }

    #[test]
    fn fixed_vertex_does_not_move() {
        let config = KnitConfig::new().with_dimensions(3, 3);
        let mut integrator = started(&config);
        let anchor = Vec2::new(100.0, 100.0);
        integrator.vertex_mut(5).expect("in range").fix_at(anchor);
        for _ in 0..20 {
            integrator.tick(&mut NoOpStepObserver).expect("running");
            assert_eq!(integrator.positions()[5], anchor);
            assert!(integrator.vertices()[5].vel.is_zero());
        }
    }

    #[test]
    fn unfold_expires_after_configured_ticks() {
        let config = KnitConfig::new().with_dimensions(3, 3).with_unfold(-300.0, 4);
        let mut integrator = started(&config);
        for _ in 0..3 {
            integrator.tick(&mut NoOpStepObserver).expect("running");
            assert!(integrator.forces().contains(ForceTerm::Unfold));
        }
        integrator.tick(&mut NoOpStepObserver).expect("running");
        assert!(!integrator.forces().contains(ForceTerm::Unfold));
    }

    #[test]
    fn re_enabled_unfold_expires_again() {
        let config = KnitConfig::new().with_dimensions(3, 3).with_unfold(-300.0, 4);
        let mut integrator = started(&config);
        for _ in 0..10 {
            integrator.tick(&mut NoOpStepObserver).expect("running");
        }
        assert!(!integrator.forces().contains(ForceTerm::Unfold));

        integrator.set_force_term(ForceTerm::Unfold, true);
        assert!(integrator.forces().contains(ForceTerm::Unfold));
        for _ in 0..4 {
            integrator.tick(&mut NoOpStepObserver).expect("running");
        }
        assert!(!integrator.forces().contains(ForceTerm::Unfold));
    }

    #[test]
    fn unfold_with_zero_ticks_cannot_be_enabled() {
        let config = KnitConfig::new().with_dimensions(2, 2).with_unfold(-300.0, 0);
        let mut integrator = started(&config);
        integrator.set_force_term(ForceTerm::Unfold, true);
        assert!(!integrator.forces().contains(ForceTerm::Unfold));
    }

    #[test]
    fn configure_keeps_disabled_centering() {
        let config = KnitConfig::new().with_dimensions(2, 2);
        let mut integrator = started(&config);
        integrator.set_force_term(ForceTerm::Center, false);
        integrator.configure(&config.clone().with_edge_length(25.0));
        assert!(!integrator.forces().contains(ForceTerm::Center));
        assert!(integrator.forces().contains(ForceTerm::Stretch));
    }

    #[test]
    fn configure_keeps_active_unfold() {
        let config = KnitConfig::new().with_dimensions(3, 3);
        let mut integrator = started(&config);
        integrator.configure(&config.clone().with_edge_length(25.0));
        assert!(integrator.forces().contains(ForceTerm::Unfold));
    }

    #[test]
    fn diverged_vertex_is_reset_and_held() {
        let config = KnitConfig::new().with_dimensions(2, 2);
        let mut integrator = started(&config);
        let before = integrator.positions();
        integrator.vertex_mut(4).expect("in range").vel = Vec2::new(f64::NAN, 0.0);

        let report = integrator.tick(&mut NoOpStepObserver).expect("running");
        assert_eq!(report.divergences, vec![KnitError::NumericDivergence { vertex: 4 }]);
        assert_eq!(integrator.positions()[4], before[4]);
        assert!(integrator.vertices()[4].is_fixed());
        assert!(integrator.vertices().iter().all(|v| v.is_finite()));
        // The others kept moving.
        assert_ne!(integrator.positions()[0], before[0]);

        let report = integrator.tick(&mut NoOpStepObserver).expect("running");
        assert!(report.divergences.is_empty());
        assert_eq!(integrator.positions()[4], before[4]);
        assert!(!integrator.vertices()[4].is_fixed());
    }

    #[test]
    fn stop_discards_state() {
        let config = KnitConfig::new().with_dimensions(2, 2);
        let mut integrator = started(&config);
        integrator.stop();
        assert_eq!(integrator.state(), SimState::Idle);
        assert!(integrator.topology().is_none());
        assert!(integrator.vertices().is_empty());
        assert_eq!(integrator.vertex(0).unwrap_err(), KnitError::NoTopology);
    }
}
