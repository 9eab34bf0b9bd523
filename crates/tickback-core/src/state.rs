//! Per-tick input and state values
//!
//! `State` is compared with a distance tolerance, never with exact float
//! equality, because it crosses the network and is recomputed on both sides.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Mul, Sub};

/// Default divergence tolerance in distance units
pub const DEFAULT_TOLERANCE: f32 = 0.05;

/// A three-component vector used for positions and movement
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3::new(0.0, 0.0, 0.0);

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Euclidean length
    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Euclidean distance to another point
    pub fn distance(self, other: Vec3) -> f32 {
        (self - other).length()
    }

    /// Linear interpolation; `t` is not clamped, so values outside `[0, 1]`
    /// extrapolate along the same line.
    pub fn lerp_unclamped(self, other: Vec3, t: f32) -> Vec3 {
        self + (other - self) * t
    }
}

impl Add for Vec3 {
    type Output = Vec3;

    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Vec3;

    fn sub(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f32> for Vec3 {
    type Output = Vec3;

    fn mul(self, rhs: f32) -> Vec3 {
        Vec3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl fmt::Display for Vec3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.3}, {:.3}, {:.3})", self.x, self.y, self.z)
    }
}

/// One tick of input for the controlled entity
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Input {
    /// Desired movement direction, scaled by the simulation speed
    pub movement: Vec3,
}

impl Input {
    pub const NONE: Input = Input {
        movement: Vec3::ZERO,
    };

    pub fn new(movement: Vec3) -> Self {
        Self { movement }
    }
}

/// Simulation result for one tick
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct State {
    pub position: Vec3,
}

impl State {
    pub fn new(position: Vec3) -> Self {
        Self { position }
    }

    pub fn at(x: f32, y: f32, z: f32) -> Self {
        Self::new(Vec3::new(x, y, z))
    }

    /// Tolerance-based equality used for divergence detection.
    ///
    /// Two states match when their positions are at most `tolerance` apart.
    pub fn approx_eq(&self, other: &State, tolerance: f32) -> bool {
        self.position.distance(other.position) <= tolerance
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.position.fmt(f)
    }
}
