//! Configuration for mesh size, force coefficients and cooling.

use crate::error::{KnitError, Result};
use crate::float::Float;
use crate::force::ForceTerm;

/// Every tunable of the knit relaxation.
///
/// All values have defaults. Changing `width` or `height` rebuilds the
/// topology; everything else is applied live and reheats the simulation.
///
/// # Builder Pattern
/// ```
/// use knitmesh::config::KnitConfig;
///
/// let config: KnitConfig<f64> = KnitConfig::new()
///     .with_dimensions(12, 8)
///     .with_edge_length(15.0)
///     .with_iterations(5)
///     .with_charge(-60.0, 80.0);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct KnitConfig<F: Float> {
    /// Cells per course. Default: 30.
    pub width: usize,
    /// Cells per wale. Default: 30.
    pub height: usize,
    /// Rest length of a stretch link. Default: 20.
    pub edge_length: F,
    /// Relaxation passes per tick for each link class, 1 to 15. Default: 3.
    pub iterations: usize,

    pub enable_stretch: bool,
    pub enable_shear: bool,
    pub enable_strut: bool,
    pub enable_charge: bool,
    pub enable_collision: bool,

    /// Stretch stiffness. Default: 1.
    pub k_stretch: F,
    /// Shear stiffness. Default: 0.5.
    pub k_shear: F,
    /// Strut stiffness. Default: 1.
    pub k_strut: F,
    /// Shear rest distance as a fraction of the cell diagonal. Default: 0.5.
    pub shear_ratio: F,

    /// Many-body strength; negative repels. Default: -100.
    pub charge_strength: F,
    /// Pairs further apart than this do not interact. Default: 100.
    pub max_charge_distance: F,
    /// Barnes-Hut opening criterion. Default: 0.9.
    pub theta: F,

    /// Collision disc radius; vertices stay `2 * vertex_radius` apart. Default: 3.
    pub vertex_radius: F,

    pub center_x: F,
    pub center_y: F,
    /// Centering strength before any interaction. Default: 1.
    pub center_strength: F,
    /// Multiplier applied to `center_strength` once interaction begins. Default: 1/20.
    pub reduced_center_factor: F,

    /// Where grid vertex `(0, 0)` is placed on start.
    pub origin_x: F,
    pub origin_y: F,
    /// Maximum uniform offset added to each initial coordinate. Default: 0 (none).
    pub jitter: F,
    /// Seed for the jitter generator.
    pub seed: u64,

    /// Strength of the transient unfold repulsion. Default: -300.
    pub unfold_strength: F,
    /// Number of ticks the unfold term stays active after a start. Default: 18.
    pub unfold_ticks: usize,

    /// At or below this alpha the simulation settles. Default: 0.001.
    pub alpha_min: F,
    /// Fraction of the gap to alpha target closed per tick. Default: `1 - 0.001^(1/300)`.
    pub alpha_decay: F,
    /// Velocity retained per tick. Default: 0.6.
    pub velocity_decay: F,
    /// Alpha floor applied by a reheat. Default: 0.4.
    pub reheat_alpha: F,
}

impl<F: Float> KnitConfig<F> {
    /// Create a new config with default values.
    pub fn new() -> Self {
        let alpha_min = F::from_f64(0.001);
        KnitConfig {
            width: 30,
            height: 30,
            edge_length: F::from_f64(20.0),
            iterations: 3,
            enable_stretch: true,
            enable_shear: true,
            enable_strut: true,
            enable_charge: true,
            enable_collision: true,
            k_stretch: F::one(),
            k_shear: F::half(),
            k_strut: F::one(),
            shear_ratio: F::half(),
            charge_strength: F::from_f64(-100.0),
            max_charge_distance: F::from_f64(100.0),
            theta: F::from_f64(0.9),
            vertex_radius: F::from_f64(3.0),
            center_x: F::zero(),
            center_y: F::zero(),
            center_strength: F::one(),
            reduced_center_factor: F::from_f64(0.05),
            origin_x: F::zero(),
            origin_y: F::zero(),
            jitter: F::zero(),
            seed: 0,
            unfold_strength: F::from_f64(-300.0),
            unfold_ticks: 18,
            alpha_min,
            alpha_decay: F::one() - alpha_min.powf(F::one() / F::from_f64(300.0)),
            velocity_decay: F::from_f64(0.6),
            reheat_alpha: F::from_f64(0.4),
        }
    }

    /// Set the grid size in cells.
    pub fn with_dimensions(mut self, width: usize, height: usize) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Set the stretch rest length.
    pub fn with_edge_length(mut self, edge_length: F) -> Self {
        self.edge_length = edge_length;
        self
    }

    /// Set the relaxation passes per link class per tick.
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    /// Enable or disable one force term.
    ///
    /// `Center` and `Unfold` are not configuration toggles; they are driven
    /// by the integrator and ignored here.
    pub fn with_force(mut self, term: ForceTerm, enabled: bool) -> Self {
        match term {
            ForceTerm::Stretch => self.enable_stretch = enabled,
            ForceTerm::Shear => self.enable_shear = enabled,
            ForceTerm::Strut => self.enable_strut = enabled,
            ForceTerm::Charge => self.enable_charge = enabled,
            ForceTerm::Collision => self.enable_collision = enabled,
            ForceTerm::Center | ForceTerm::Unfold => {}
        }
        self
    }

    /// Keep only the given configurable terms enabled.
    pub fn with_only(mut self, terms: &[ForceTerm]) -> Self {
        for term in ForceTerm::CONFIGURABLE {
            self = self.with_force(term, terms.contains(&term));
        }
        self
    }

    /// Set the stretch stiffness.
    pub fn with_stretch(mut self, k: F) -> Self {
        self.k_stretch = k;
        self
    }

    /// Set the shear stiffness and rest ratio.
    pub fn with_shear(mut self, k: F, ratio: F) -> Self {
        self.k_shear = k;
        self.shear_ratio = ratio;
        self
    }

    /// Set the strut stiffness.
    pub fn with_strut(mut self, k: F) -> Self {
        self.k_strut = k;
        self
    }

    /// Set the repulsion strength and its cutoff distance.
    pub fn with_charge(mut self, strength: F, max_distance: F) -> Self {
        self.charge_strength = strength;
        self.max_charge_distance = max_distance;
        self
    }

    /// Set the collision radius.
    pub fn with_vertex_radius(mut self, radius: F) -> Self {
        self.vertex_radius = radius;
        self
    }

    /// Set the point the centering force pulls toward.
    pub fn with_center(mut self, x: F, y: F) -> Self {
        self.center_x = x;
        self.center_y = y;
        self
    }

    /// Set where grid vertex `(0, 0)` starts.
    pub fn with_origin(mut self, x: F, y: F) -> Self {
        self.origin_x = x;
        self.origin_y = y;
        self
    }

    /// Jitter the initial layout by up to `amount` per coordinate.
    pub fn with_jitter(mut self, amount: F, seed: u64) -> Self {
        self.jitter = amount;
        self.seed = seed;
        self
    }

    /// Set the unfold strength and lifetime; `ticks = 0` disables it.
    pub fn with_unfold(mut self, strength: F, ticks: usize) -> Self {
        self.unfold_strength = strength;
        self.unfold_ticks = ticks;
        self
    }

    /// Set the fraction of velocity kept each tick.
    pub fn with_velocity_decay(mut self, velocity_decay: F) -> Self {
        self.velocity_decay = velocity_decay;
        self
    }

    /// Set the settle threshold and the per-tick alpha decay.
    pub fn with_cooling(mut self, alpha_min: F, alpha_decay: F) -> Self {
        self.alpha_min = alpha_min;
        self.alpha_decay = alpha_decay;
        self
    }

    /// Whether a configurable term is switched on.
    pub fn is_enabled(&self, term: ForceTerm) -> bool {
        match term {
            ForceTerm::Stretch => self.enable_stretch,
            ForceTerm::Shear => self.enable_shear,
            ForceTerm::Strut => self.enable_strut,
            ForceTerm::Charge => self.enable_charge,
            ForceTerm::Collision => self.enable_collision,
            ForceTerm::Center => true,
            ForceTerm::Unfold => self.unfold_ticks > 0,
        }
    }

    /// True when `other` needs a different topology than `self`.
    pub fn changes_topology(&self, other: &Self) -> bool {
        self.width != other.width || self.height != other.height
    }

    /// Check every value against its allowed range.
    ///
    /// Dimensions are checked first so a zero-sized grid is always reported
    /// as `InvalidDimension`.
    pub fn validate(&self) -> Result<()> {
        let addressable = self
            .width
            .checked_add(1)
            .zip(self.height.checked_add(1))
            .and_then(|(cols, rows)| cols.checked_mul(rows))
            .is_some();
        if self.width == 0 || self.height == 0 || !addressable {
            return Err(KnitError::InvalidDimension { width: self.width, height: self.height });
        }
        let zero = F::zero();
        let one = F::one();

        check("iterations", (1..=15).contains(&self.iterations), "must be between 1 and 15")?;
        check("edge_length", self.edge_length.is_finite() && self.edge_length > zero, "must be positive")?;
        check("k_stretch", non_negative(self.k_stretch), "must be non-negative")?;
        check("k_shear", non_negative(self.k_shear), "must be non-negative")?;
        check("k_strut", non_negative(self.k_strut), "must be non-negative")?;
        check("shear_ratio", self.shear_ratio.is_finite() && self.shear_ratio > zero, "must be positive")?;
        check("charge_strength", self.charge_strength.is_finite() && self.charge_strength <= zero, "must be zero or negative")?;
        check("max_charge_distance", non_negative(self.max_charge_distance), "must be non-negative")?;
        check("theta", self.theta.is_finite() && self.theta > zero, "must be positive")?;
        check("vertex_radius", self.vertex_radius.is_finite() && self.vertex_radius >= F::two(), "must be at least 2")?;
        check("center", self.center_x.is_finite() && self.center_y.is_finite(), "must be finite")?;
        check("center_strength", unit(self.center_strength), "must be in [0, 1]")?;
        check("reduced_center_factor", unit(self.reduced_center_factor), "must be in [0, 1]")?;
        check("origin", self.origin_x.is_finite() && self.origin_y.is_finite(), "must be finite")?;
        check("jitter", non_negative(self.jitter), "must be non-negative")?;
        check("unfold_strength", self.unfold_strength.is_finite() && self.unfold_strength <= zero, "must be zero or negative")?;
        check("alpha_min", self.alpha_min > zero && self.alpha_min < one, "must be in (0, 1)")?;
        check("alpha_decay", self.alpha_decay > zero && self.alpha_decay <= one, "must be in (0, 1]")?;
        check("velocity_decay", unit(self.velocity_decay), "must be in [0, 1]")?;
        check("reheat_alpha", unit(self.reheat_alpha), "must be in [0, 1]")?;
        Ok(())
    }
}

impl<F: Float> Default for KnitConfig<F> {
    fn default() -> Self {
        Self::new()
    }
}

fn check(name: &'static str, ok: bool, reason: &'static str) -> Result<()> {
    if ok {
        Ok(())
    } else {
        Err(KnitError::InvalidCoefficient { name, reason })
    }
}

fn non_negative<F: Float>(value: F) -> bool {
    value.is_finite() && value >= F::zero()
}

fn unit<F: Float>(value: F) -> bool {
    value >= F::zero() && value <= F::one()
}
