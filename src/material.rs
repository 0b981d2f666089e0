//! Physics Materials
//!
//! A [`Material`] is a restitution/friction pair attached to each body.
//! When two bodies touch, the manifold carries a single combined value per
//! property, produced by [`Material::combine`]:
//!
//! - **Restitution**: when exactly one body is static, the dynamic body's
//!   restitution wins (a wall has no say in how bouncy a ball is);
//!   otherwise the mean of both.
//! - **Friction**: geometric mean `sqrt(fa * fb)`, so one frictionless
//!   surface silences the pair.

/// Surface properties of a body: bounciness and roughness, both in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Material {
    /// Coefficient of restitution (0 = perfectly inelastic, 1 = elastic).
    pub restitution: f64,
    /// Coulomb friction coefficient.
    pub friction: f64,
}

impl Material {
    /// Balanced default surface.
    pub const DEFAULT: Self = Self {
        restitution: 0.5,
        friction: 0.3,
    };

    /// Rubber-ball surface: high bounce, low grip.
    pub const BOUNCY: Self = Self {
        restitution: 0.9,
        friction: 0.1,
    };

    /// Dense, grippy surface: barely bounces, stops fast.
    pub const HEAVY: Self = Self {
        restitution: 0.1,
        friction: 0.8,
    };

    /// Light surface: lively bounce, little grip.
    pub const LIGHT: Self = Self {
        restitution: 0.7,
        friction: 0.2,
    };

    /// Ice-like surface: no tangential resistance at all.
    pub const FRICTIONLESS: Self = Self {
        restitution: 0.5,
        friction: 0.0,
    };

    /// Create a material with explicit coefficients.
    #[inline]
    #[must_use]
    pub const fn new(restitution: f64, friction: f64) -> Self {
        Self {
            restitution,
            friction,
        }
    }

    /// Combine two bodies' materials into per-pair coefficients.
    ///
    /// `a_static`/`b_static` select the restitution rule: against a static
    /// body the dynamic one's restitution applies unchanged.
    #[must_use]
    pub fn combine(a: Material, b: Material, a_static: bool, b_static: bool) -> Material {
        let restitution = match (a_static, b_static) {
            (true, false) => b.restitution,
            (false, true) => a.restitution,
            _ => (a.restitution + b.restitution) * 0.5,
        };
        Material {
            restitution,
            friction: (a.friction * b.friction).sqrt(),
        }
    }
}

impl Default for Material {
    #[inline]
    fn default() -> Self {
        Self::DEFAULT
    }
}

// ============================================================================
// Tests
// ============================================================================
