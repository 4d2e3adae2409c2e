//! Bodies made of spherical joints held together by distance constraints

use bitflags::bitflags;

use crate::foundation::bounds::AABB;
use crate::foundation::math::Vec3;
use super::PhysicsError;

/// World units represented by one step of [`Joint::size`]
pub const JOINT_SIZE_STEP: f32 = 1.0 / 32.0;

/// Point mass with a collision radius
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Joint {
    /// World-space position
    pub position: Vec3,
    /// World units per second
    pub velocity: Vec3,
    /// Quantized radius, see [`JOINT_SIZE_STEP`]
    pub size: u8,
}

impl Joint {
    /// Joint at rest with `radius` rounded to the nearest size step
    pub fn new(position: Vec3, radius: f32) -> Self {
        let steps = (radius / JOINT_SIZE_STEP).round();
        let size = if steps.is_nan() { 0 } else { steps.clamp(0.0, f32::from(u8::MAX)) as u8 };
        Self {
            position,
            velocity: Vec3::zeros(),
            size,
        }
    }

    /// Builder-style initial velocity
    pub fn with_velocity(mut self, velocity: Vec3) -> Self {
        self.velocity = velocity;
        self
    }

    /// Collision radius in world units
    pub fn radius(&self) -> f32 {
        f32::from(self.size) * JOINT_SIZE_STEP
    }
}

/// Distance constraint between two joints of the same body
///
/// The rest length is taken from the joints' initial separation and is
/// never modified afterwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Connection {
    a: usize,
    b: usize,
    rest_length: f32,
}

impl Connection {
    /// First joint index
    pub fn a(&self) -> usize {
        self.a
    }

    /// Second joint index
    pub fn b(&self) -> usize {
        self.b
    }

    /// Length the constraint relaxes towards
    pub fn rest_length(&self) -> f32 {
        self.rest_length
    }
}

bitflags! {
    /// Per-body simulation switches
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct BodyFlags: u8 {
        /// Asleep; skipped until woken or hit
        const DEACTIVATED        = 0b0000_0001;
        /// All joints share one velocity
        const NON_ROTATING       = 0b0000_0010;
        /// Never simulated
        const DISABLED           = 0b0000_0100;
        /// Constraints only partially corrected each pass
        const SOFT               = 0b0000_1000;
        /// Constraints are not relaxed at all
        const SIMPLE_CONNECTIONS = 0b0001_0000;
        /// Never put to sleep
        const ALWAYS_ACTIVE      = 0b0010_0000;
    }
}

/// A simulated object
#[derive(Debug, Clone)]
pub struct Body {
    joints: Vec<Joint>,
    connections: Vec<Connection>,
    joint_mass: f32,
    /// Fraction of tangential velocity removed on contact, `0..=1`
    pub friction: f32,
    /// Fraction of normal velocity kept (reflected) on contact, `0..=1`
    pub elasticity: f32,
    /// Simulation switches
    pub flags: BodyFlags,
    pub(crate) pending_collision: bool,
    pub(crate) idle_steps: u32,
}

impl Body {
    /// Create a body, deriving every connection's rest length from `joints`
    ///
    /// `mass` is spread evenly over the joints.
    pub fn new(joints: Vec<Joint>, connections: &[(usize, usize)], mass: f32) -> Result<Self, PhysicsError> {
        if joints.is_empty() {
            log::error!("Cannot create a body without joints");
            return Err(PhysicsError::EmptyBody);
        }
        if !mass.is_finite() || mass <= 0.0 {
            log::error!("Cannot create a body with mass {}", mass);
            return Err(PhysicsError::InvalidMass(mass));
        }

        let joint_count = joints.len();
        let connections = connections
            .iter()
            .map(|&(a, b)| {
                if a == b || a >= joint_count || b >= joint_count {
                    log::error!("Rejected connection {} -> {} ({} joints)", a, b, joint_count);
                    return Err(PhysicsError::InvalidConnection { a, b, joint_count });
                }
                Ok(Connection {
                    a,
                    b,
                    rest_length: (joints[b].position - joints[a].position).norm(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            joint_mass: mass / joint_count as f32,
            joints,
            connections,
            friction: 0.5,
            elasticity: 0.5,
            flags: BodyFlags::empty(),
            pending_collision: false,
            idle_steps: 0,
        })
    }

    /// Single-joint body
    pub fn sphere(position: Vec3, radius: f32, mass: f32) -> Result<Self, PhysicsError> {
        Self::new(vec![Joint::new(position, radius)], &[], mass)
    }

    /// Builder-style friction, clamped to `0..=1`
    pub fn with_friction(mut self, friction: f32) -> Self {
        self.friction = friction.clamp(0.0, 1.0);
        self
    }

    /// Builder-style elasticity, clamped to `0..=1`
    pub fn with_elasticity(mut self, elasticity: f32) -> Self {
        self.elasticity = elasticity.clamp(0.0, 1.0);
        self
    }

    /// Builder-style flags
    pub fn with_flags(mut self, flags: BodyFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Joints in creation order
    pub fn joints(&self) -> &[Joint] {
        &self.joints
    }

    /// Mutable joints; the joint count is fixed after creation
    pub fn joints_mut(&mut self) -> &mut [Joint] {
        &mut self.joints
    }

    /// Joint by index
    pub fn joint(&self, index: usize) -> Option<&Joint> {
        self.joints.get(index)
    }

    /// Distance constraints
    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// Mass carried by each joint
    pub fn joint_mass(&self) -> f32 {
        self.joint_mass
    }

    /// Total mass
    pub fn mass(&self) -> f32 {
        self.joint_mass * self.joints.len() as f32
    }

    /// Mean joint position
    pub fn center(&self) -> Vec3 {
        self.joints.iter().map(|joint| joint.position).sum::<Vec3>() / self.joints.len() as f32
    }

    /// Mean joint velocity
    pub fn mean_velocity(&self) -> Vec3 {
        self.joints.iter().map(|joint| joint.velocity).sum::<Vec3>() / self.joints.len() as f32
    }

    /// Fastest joint speed
    pub fn max_speed(&self) -> f32 {
        self.joints
            .iter()
            .map(|joint| joint.velocity.norm())
            .fold(0.0, f32::max)
    }

    /// Move every joint by `offset`
    pub fn translate(&mut self, offset: Vec3) {
        for joint in &mut self.joints {
            joint.position += offset;
        }
    }

    /// Give every joint the same velocity
    pub fn set_velocity(&mut self, velocity: Vec3) {
        for joint in &mut self.joints {
            joint.velocity = velocity;
        }
    }

    /// Box around every joint sphere
    pub fn bounds(&self) -> AABB {
        self.joints
            .iter()
            .map(|joint| AABB::from_center_extents(joint.position, Vec3::repeat(joint.radius())))
            .reduce(|acc, bounds| acc.union(&bounds))
            .unwrap_or_default()
    }

    /// Whether a collision is waiting to wake this body
    pub fn has_pending_collision(&self) -> bool {
        self.pending_collision
    }

    /// Consecutive steps spent below the sleep speed
    pub fn idle_steps(&self) -> u32 {
        self.idle_steps
    }

    /// Whether the next step will simulate this body
    pub fn is_active(&self) -> bool {
        !self.flags.contains(BodyFlags::DISABLED)
            && (!self.flags.contains(BodyFlags::DEACTIVATED) || self.pending_collision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn triangle_body() -> Body {
        let joints = vec![
            Joint::new(Vec3::new(0.0, 0.0, 0.0), 0.25),
            Joint::new(Vec3::new(3.0, 0.0, 0.0), 0.25),
            Joint::new(Vec3::new(0.0, 4.0, 0.0), 0.25),
        ];
        Body::new(joints, &[(0, 1), (1, 2), (2, 0)], 6.0).unwrap()
    }

    #[test]
    fn test_joint_size_quantization() {
        let joint = Joint::new(Vec3::zeros(), 0.5);
        assert_eq!(joint.size, 16);
        assert_relative_eq!(joint.radius(), 0.5);

        assert_eq!(Joint::new(Vec3::zeros(), 0.04).size, 1);
        assert_eq!(Joint::new(Vec3::zeros(), -1.0).size, 0);
        assert_eq!(Joint::new(Vec3::zeros(), 1000.0).size, u8::MAX);
        assert_eq!(Joint::new(Vec3::zeros(), f32::NAN).size, 0);
    }

    #[test]
    fn test_rest_lengths_from_initial_positions() {
        let body = triangle_body();
        let lengths: Vec<f32> = body.connections().iter().map(Connection::rest_length).collect();
        assert_relative_eq!(lengths[0], 3.0);
        assert_relative_eq!(lengths[1], 5.0);
        assert_relative_eq!(lengths[2], 4.0);
        assert_relative_eq!(body.joint_mass(), 2.0);
        assert_relative_eq!(body.mass(), 6.0);
    }

    #[test]
    fn test_rest_lengths_survive_joint_edits() {
        let mut body = triangle_body();
        let before: Vec<f32> = body.connections().iter().map(Connection::rest_length).collect();
        body.joints_mut()[1].position = Vec3::new(10.0, 10.0, 10.0);
        body.translate(Vec3::new(-1.0, 2.0, 0.5));
        let after: Vec<f32> = body.connections().iter().map(Connection::rest_length).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_invalid_bodies_are_rejected() {
        let joint = Joint::new(Vec3::zeros(), 0.1);
        assert!(matches!(Body::new(Vec::new(), &[], 1.0), Err(PhysicsError::EmptyBody)));
        assert!(matches!(Body::new(vec![joint], &[], 0.0), Err(PhysicsError::InvalidMass(_))));
        assert!(matches!(Body::new(vec![joint], &[], f32::NAN), Err(PhysicsError::InvalidMass(_))));
        assert!(matches!(
            Body::new(vec![joint, joint], &[(0, 0)], 1.0),
            Err(PhysicsError::InvalidConnection { a: 0, b: 0, joint_count: 2 })
        ));
        assert!(matches!(
            Body::new(vec![joint, joint], &[(0, 2)], 1.0),
            Err(PhysicsError::InvalidConnection { b: 2, .. })
        ));
    }

    #[test]
    fn test_aggregates() {
        let mut body = triangle_body();
        assert_relative_eq!(body.center(), Vec3::new(1.0, 4.0 / 3.0, 0.0), epsilon = 1e-6);

        body.set_velocity(Vec3::new(0.0, -2.0, 0.0));
        body.joints_mut()[0].velocity = Vec3::new(0.0, 4.0, 0.0);
        assert_relative_eq!(body.max_speed(), 4.0);
        assert_relative_eq!(body.mean_velocity(), Vec3::zeros(), epsilon = 1e-6);

        let bounds = body.bounds();
        assert_relative_eq!(bounds.min, Vec3::new(-0.25, -0.25, -0.25));
        assert_relative_eq!(bounds.max, Vec3::new(3.25, 4.25, 0.25));
    }

    #[test]
    fn test_activity_follows_flags() {
        let mut body = Body::sphere(Vec3::zeros(), 0.5, 1.0).unwrap();
        assert!(body.is_active());

        body.flags.insert(BodyFlags::DEACTIVATED);
        assert!(!body.is_active());
        body.pending_collision = true;
        assert!(body.is_active());

        body.flags = BodyFlags::DISABLED;
        assert!(!body.is_active());
    }

    #[test]
    fn test_builders_clamp() {
        let body = Body::sphere(Vec3::zeros(), 0.5, 1.0)
            .unwrap()
            .with_friction(2.0)
            .with_elasticity(-1.0)
            .with_flags(BodyFlags::SOFT | BodyFlags::ALWAYS_ACTIVE);
        assert_relative_eq!(body.friction, 1.0);
        assert_relative_eq!(body.elasticity, 0.0);
        assert!(body.flags.contains(BodyFlags::SOFT));
    }
}
