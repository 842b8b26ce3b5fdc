//! Force terms: link relaxation, centering, and the model that derives every
//! coefficient from the current configuration.
//!
//! Nothing here holds mutable state. The integrator asks the model for the
//! parameters of each active term and evaluates them against a snapshot of
//! positions taken at the start of the tick.

use crate::charge::ManyBody;
use crate::collide::Collide;
use crate::config::KnitConfig;
use crate::float::Float;
use crate::topology::{Link, LinkClass};
use crate::vec::Vec2;

/// Named force terms the integrator can switch on and off.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ForceTerm {
    Stretch,
    Shear,
    Strut,
    Charge,
    Collision,
    /// Pulls the centroid of the free vertices toward the center point.
    Center,
    /// Short-lived strong repulsion that separates a freshly built mesh.
    Unfold,
}

impl ForceTerm {
    pub const ALL: [ForceTerm; 7] = [
        ForceTerm::Stretch,
        ForceTerm::Shear,
        ForceTerm::Strut,
        ForceTerm::Charge,
        ForceTerm::Collision,
        ForceTerm::Center,
        ForceTerm::Unfold,
    ];

    /// Terms that have an enable flag in `KnitConfig`.
    pub const CONFIGURABLE: [ForceTerm; 5] = [
        ForceTerm::Stretch,
        ForceTerm::Shear,
        ForceTerm::Strut,
        ForceTerm::Charge,
        ForceTerm::Collision,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ForceTerm::Stretch => "stretch",
            ForceTerm::Shear => "shear",
            ForceTerm::Strut => "strut",
            ForceTerm::Charge => "charge",
            ForceTerm::Collision => "collision",
            ForceTerm::Center => "center",
            ForceTerm::Unfold => "unfold",
        }
    }

    fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

impl From<LinkClass> for ForceTerm {
    fn from(class: LinkClass) -> Self {
        match class {
            LinkClass::Stretch => ForceTerm::Stretch,
            LinkClass::Shear => ForceTerm::Shear,
            LinkClass::Strut => ForceTerm::Strut,
        }
    }
}

/// Set of active force terms.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ForceSet {
    bits: u8,
}

impl ForceSet {
    pub fn empty() -> Self {
        ForceSet { bits: 0 }
    }

    /// Terms enabled by `config`, plus centering. Unfold is armed separately
    /// by the integrator on start.
    pub fn from_config<F: Float>(config: &KnitConfig<F>) -> Self {
        let mut set = ForceSet::empty();
        for term in ForceTerm::CONFIGURABLE {
            set.set(term, config.is_enabled(term));
        }
        set.insert(ForceTerm::Center);
        set
    }

    pub fn contains(&self, term: ForceTerm) -> bool {
        self.bits & term.bit() != 0
    }

    pub fn insert(&mut self, term: ForceTerm) {
        self.bits |= term.bit();
    }

    pub fn remove(&mut self, term: ForceTerm) {
        self.bits &= !term.bit();
    }

    pub fn set(&mut self, term: ForceTerm, enabled: bool) {
        if enabled {
            self.insert(term);
        } else {
            self.remove(term);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = ForceTerm> + '_ {
        ForceTerm::ALL.into_iter().filter(move |&term| self.contains(term))
    }
}

/// Strength of the centering term relative to its configured value.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CenterMode {
    /// Initial layout: full strength.
    Full,
    /// After the first interaction.
    Reduced,
    /// While a drag is in progress.
    Suspended,
}

/// Rest distance and stiffness of one link class.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LinkParams<F: Float> {
    pub rest: F,
    pub stiffness: F,
}

/// Force coefficients derived from a `KnitConfig`.
#[derive(Clone, Debug, PartialEq)]
pub struct ForceModel<F: Float> {
    config: KnitConfig<F>,
}

impl<F: Float> ForceModel<F> {
    pub fn new(config: &KnitConfig<F>) -> Self {
        ForceModel { config: config.clone() }
    }

    pub fn config(&self) -> &KnitConfig<F> { &self.config }

    /// Stretch rests at `edge_length`, shear at `shear_ratio * edge_length * sqrt(2)`,
    /// strut at `2 * edge_length`.
    pub fn link_params(&self, class: LinkClass) -> LinkParams<F> {
        let c = &self.config;
        match class {
            LinkClass::Stretch => LinkParams { rest: c.edge_length, stiffness: c.k_stretch },
            LinkClass::Shear => LinkParams {
                rest: c.shear_ratio * c.edge_length * F::two().sqrt(),
                stiffness: c.k_shear,
            },
            LinkClass::Strut => LinkParams { rest: F::two() * c.edge_length, stiffness: c.k_strut },
        }
    }

    pub fn iterations(&self) -> usize { self.config.iterations }

    pub fn charge(&self) -> ManyBody<F> {
        ManyBody::new(self.config.charge_strength, self.config.max_charge_distance, self.config.theta)
    }

    /// The unfold term: a many-body repulsion capped at five edge lengths.
    pub fn unfold(&self) -> ManyBody<F> {
        let reach = F::from_f64(5.0) * self.config.edge_length;
        ManyBody::new(self.config.unfold_strength, reach, self.config.theta)
    }

    pub fn collision(&self) -> Collide<F> {
        Collide::new(self.config.vertex_radius)
    }

    pub fn center(&self) -> Vec2<F> {
        Vec2::new(self.config.center_x, self.config.center_y)
    }

    pub fn center_strength(&self, mode: CenterMode) -> F {
        match mode {
            CenterMode::Full => self.config.center_strength,
            CenterMode::Reduced => self.config.center_strength * self.config.reduced_center_factor,
            CenterMode::Suspended => F::zero(),
        }
    }
}

/// One relaxation pass over `links`, nudging velocities so each link's
/// predicted length (`position + velocity`) moves toward `params.rest`.
///
/// Positions are read-only. Velocities are updated link by link in
/// enumeration order, so the result is deterministic. Each endpoint takes a
/// share of the correction weighted by the other endpoint's degree. Links
/// whose endpoints coincide, or whose length is not finite, contribute nothing.
pub(crate) fn relax_links<F: Float>(
    links: &[Link],
    degrees: &[u32],
    params: LinkParams<F>,
    alpha: F,
    positions: &[Vec2<F>],
    velocities: &mut [Vec2<F>],
) {
    for link in links {
        let (s, t) = (link.source, link.target);
        let delta = (positions[t] + velocities[t]) - (positions[s] + velocities[s]);
        let length = delta.length();
        if length == F::zero() || !length.is_finite() {
            continue;
        }

        let pull = delta.scale((length - params.rest) / length * alpha * params.stiffness);
        let ds = F::from_f64(degrees[s] as f64);
        let dt = F::from_f64(degrees[t] as f64);
        let bias = ds / (ds + dt);

        velocities[t] -= pull.scale(bias);
        velocities[s] += pull.scale(F::one() - bias);
    }
}

/// Offset that moves the centroid of the free vertices `strength` of the way
/// toward `center`. Zero when nothing is free.
pub(crate) fn centering_shift<F: Float>(
    positions: &[Vec2<F>],
    is_free: impl Fn(usize) -> bool,
    center: Vec2<F>,
    strength: F,
) -> Vec2<F> {
    let mut sum = Vec2::zero();
    let mut count = 0usize;
    for (i, &p) in positions.iter().enumerate() {
        if is_free(i) {
            sum += p;
            count += 1;
        }
    }
    if count == 0 || strength == F::zero() {
        return Vec2::zero();
    }
    let centroid = sum.scale(F::one() / F::from_f64(count as f64));
    (center - centroid).scale(strength)
}
