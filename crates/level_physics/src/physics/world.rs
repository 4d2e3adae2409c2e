//! World stepping
//!
//! Bodies are advanced with semi-implicit Euler, their distance constraints
//! relaxed, and every joint is then resolved against the static environment:
//! first along its swept path from the previous position, then by the closest
//! point check at its final position.

use serde::{Deserialize, Serialize};

use crate::foundation::math::Vec3;
use super::body::{Body, BodyFlags, Joint};
use super::PhysicsError;

/// Gap left between a swept joint and the surface it stopped at
const CONTACT_SKIN: f32 = 1.0e-4;

/// First contact found along a joint's path
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepContact {
    /// Fraction of the displacement covered before contact, in `[0, 1]`
    pub t: f32,
    /// Contact point on the geometry
    pub point: Vec3,
    /// Unit surface normal at the contact, pointing back toward the joint
    pub normal: Vec3,
}

/// Static geometry as seen by the integrator
pub trait Environment {
    /// Closest point on static geometry within `max_distance` of `point`
    ///
    /// Returns `point` itself when it lies inside solid volume and `None`
    /// when nothing is within range.
    fn closest_point(&self, point: Vec3, max_distance: f32) -> Option<Vec3>;

    /// First contact of a sphere of `radius` moving from `start` by `displacement`
    ///
    /// Environments without a swept query only get the closest point check,
    /// so joints moving further than their radius per step can pass through
    /// thin geometry.
    fn first_contact(&self, _start: Vec3, _displacement: Vec3, _radius: f32) -> Option<SweepContact> {
        None
    }
}

impl<F> Environment for F
where
    F: Fn(Vec3, f32) -> Option<Vec3>,
{
    fn closest_point(&self, point: Vec3, max_distance: f32) -> Option<Vec3> {
        self(point, max_distance)
    }
}

/// Veto hook consulted before a contact is resolved
pub trait CollisionApproval {
    /// Whether joint `joint` of body `body` may collide at `point`
    fn approve(&self, body: usize, joint: usize, point: Vec3) -> bool;
}

impl<F> CollisionApproval for F
where
    F: Fn(usize, usize, Vec3) -> bool,
{
    fn approve(&self, body: usize, joint: usize, point: Vec3) -> bool {
        self(body, joint, point)
    }
}

/// Integrator settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Acceleration applied to every joint, units per second squared
    pub gravity: Vec3,
    /// Constraint passes per step
    pub relaxation_iterations: u32,
    /// Share of the constraint error corrected per pass on soft bodies
    pub soft_stiffness: f32,
    /// Joint speed below which a body counts as idle
    pub sleep_speed: f32,
    /// Idle steps before a body is deactivated, 0 never deactivates
    pub sleep_after_steps: u32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            gravity: Vec3::new(0.0, -9.81, 0.0),
            relaxation_iterations: 4,
            soft_stiffness: 0.5,
            sleep_speed: 0.01,
            sleep_after_steps: 0,
        }
    }
}

/// What a single [`World::step`] did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepReport {
    /// Bodies that were simulated
    pub simulated: usize,
    /// Bodies skipped as disabled or asleep
    pub skipped: usize,
    /// Joints pushed out of geometry
    pub contacts: usize,
    /// Joints restored after ending up inside solid volume
    pub restored: usize,
    /// Bodies put to sleep this step
    pub deactivated: usize,
}

/// Bodies plus the environment they move through
pub struct World {
    bodies: Vec<Body>,
    environment: Box<dyn Environment>,
    approval: Option<Box<dyn CollisionApproval>>,
    config: WorldConfig,
}

impl World {
    /// Create a world over `bodies`
    pub fn new(bodies: Vec<Body>, environment: Box<dyn Environment>, config: WorldConfig) -> Self {
        log::debug!("World created with {} bodies", bodies.len());
        Self {
            bodies,
            environment,
            approval: None,
            config,
        }
    }

    /// Install a hook that may veto individual contacts
    pub fn with_collision_approval(mut self, approval: Box<dyn CollisionApproval>) -> Self {
        self.approval = Some(approval);
        self
    }

    /// Integrator settings
    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// Replace the integrator settings
    pub fn set_config(&mut self, config: WorldConfig) {
        self.config = config;
    }

    /// The static environment
    pub fn environment(&self) -> &dyn Environment {
        self.environment.as_ref()
    }

    /// All bodies
    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    /// Body by index
    pub fn body(&self, index: usize) -> Option<&Body> {
        self.bodies.get(index)
    }

    /// Mutable body by index
    pub fn body_mut(&mut self, index: usize) -> Option<&mut Body> {
        self.bodies.get_mut(index)
    }

    /// Append a body, returning its index
    pub fn add_body(&mut self, body: Body) -> usize {
        self.bodies.push(body);
        self.bodies.len() - 1
    }

    /// Remove a body; later bodies shift down by one index
    pub fn remove_body(&mut self, index: usize) -> Result<Body, PhysicsError> {
        if index >= self.bodies.len() {
            return Err(PhysicsError::BodyNotFound(index));
        }
        Ok(self.bodies.remove(index))
    }

    /// Clear the sleep state of a body
    pub fn wake(&mut self, index: usize) -> Result<(), PhysicsError> {
        let body = self.bodies.get_mut(index).ok_or(PhysicsError::BodyNotFound(index))?;
        body.flags.remove(BodyFlags::DEACTIVATED);
        body.idle_steps = 0;
        Ok(())
    }

    /// Let a sleeping body run for one step
    pub fn notify_collision(&mut self, index: usize) -> Result<(), PhysicsError> {
        let body = self.bodies.get_mut(index).ok_or(PhysicsError::BodyNotFound(index))?;
        body.pending_collision = true;
        Ok(())
    }

    /// Advance every active body by `dt` seconds
    pub fn step(&mut self, dt: f32) -> Result<StepReport, PhysicsError> {
        if !dt.is_finite() || dt <= 0.0 {
            log::error!("Rejected world step with dt {}", dt);
            return Err(PhysicsError::InvalidTimeStep(dt));
        }

        let mut report = StepReport::default();
        let environment = self.environment.as_ref();
        let approval = self.approval.as_deref();

        for (index, body) in self.bodies.iter_mut().enumerate() {
            if !body.is_active() {
                report.skipped += 1;
                continue;
            }
            body.pending_collision = false;
            report.simulated += 1;

            let previous: Vec<Vec3> = body.joints().iter().map(|joint| joint.position).collect();

            integrate(body, self.config.gravity, dt);
            if body.flags.contains(BodyFlags::NON_ROTATING) {
                share_velocity(body, &previous, dt);
            }
            if !body.flags.contains(BodyFlags::SIMPLE_CONNECTIONS) && !body.connections().is_empty() {
                relax(body, &self.config);
                rederive_velocities(body, &previous, dt);
            }

            let (contacts, restored) = resolve_contacts(index, body, &previous, environment, approval);
            report.contacts += contacts;
            report.restored += restored;

            if update_sleep(body, &self.config) {
                log::debug!("Body {} deactivated after {} idle steps", index, body.idle_steps);
                report.deactivated += 1;
            }
        }

        log::trace!("World step: {:?}", report);
        Ok(report)
    }
}

impl std::fmt::Debug for World {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("World")
            .field("bodies", &self.bodies.len())
            .field("approval", &self.approval.is_some())
            .field("config", &self.config)
            .finish()
    }
}

/// Semi-implicit Euler: velocity first, then position from the new velocity
fn integrate(body: &mut Body, gravity: Vec3, dt: f32) {
    for joint in body.joints_mut() {
        joint.velocity += gravity * dt;
        joint.position += joint.velocity * dt;
    }
}

fn share_velocity(body: &mut Body, previous: &[Vec3], dt: f32) {
    let mean = body.mean_velocity();
    for (joint, start) in body.joints_mut().iter_mut().zip(previous) {
        joint.velocity = mean;
        joint.position = start + mean * dt;
    }
}

fn relax(body: &mut Body, config: &WorldConfig) {
    let stiffness = if body.flags.contains(BodyFlags::SOFT) {
        config.soft_stiffness
    } else {
        1.0
    };
    let connections = body.connections().to_vec();
    let joints = body.joints_mut();

    for _ in 0..config.relaxation_iterations {
        for connection in &connections {
            let delta = joints[connection.b()].position - joints[connection.a()].position;
            let length = delta.norm();
            if length <= f32::EPSILON {
                continue;
            }
            // Equal joint masses: each end takes half the correction
            let correction = delta * (0.5 * stiffness * (length - connection.rest_length()) / length);
            joints[connection.a()].position += correction;
            joints[connection.b()].position -= correction;
        }
    }
}

fn rederive_velocities(body: &mut Body, previous: &[Vec3], dt: f32) {
    for (joint, start) in body.joints_mut().iter_mut().zip(previous) {
        joint.velocity = (joint.position - start) / dt;
    }
}

/// Returns `(contacts, restored)`
fn resolve_contacts(
    body_index: usize,
    body: &mut Body,
    previous: &[Vec3],
    environment: &dyn Environment,
    approval: Option<&dyn CollisionApproval>,
) -> (usize, usize) {
    let friction = body.friction;
    let elasticity = body.elasticity;
    let approved = |joint: usize, point: Vec3| approval.map_or(true, |hook| hook.approve(body_index, joint, point));
    let mut contacts = 0;
    let mut restored = 0;

    for (joint_index, (joint, start)) in body.joints_mut().iter_mut().zip(previous).enumerate() {
        let radius = joint.radius();
        let mut touched = false;

        let displacement = joint.position - start;
        if displacement != Vec3::zeros() {
            if let Some(contact) = environment.first_contact(*start, displacement, radius) {
                if approved(joint_index, contact.point) {
                    joint.position = start + displacement * contact.t + contact.normal * CONTACT_SKIN;
                    bounce(joint, contact.normal, friction, elasticity);
                    touched = true;
                }
            }
        }

        if let Some(closest) = environment.closest_point(joint.position, radius) {
            if !approved(joint_index, closest) {
                contacts += usize::from(touched);
                continue;
            }

            if closest == joint.position {
                joint.position = *start;
                joint.velocity = Vec3::zeros();
                restored += 1;
                continue;
            }

            let offset = joint.position - closest;
            let distance = offset.norm();
            if distance < radius {
                let normal = offset / distance;
                joint.position = closest + normal * radius;
                bounce(joint, normal, friction, elasticity);
                touched = true;
            }
        }

        contacts += usize::from(touched);
    }

    (contacts, restored)
}

/// Reflect the velocity off a surface with unit `normal`
fn bounce(joint: &mut Joint, normal: Vec3, friction: f32, elasticity: f32) {
    let normal_speed = joint.velocity.dot(&normal);
    let normal_velocity = normal * normal_speed;
    let tangential = (joint.velocity - normal_velocity) * (1.0 - friction);
    joint.velocity = if normal_speed < 0.0 {
        tangential - normal_velocity * elasticity
    } else {
        tangential + normal_velocity
    };
}

/// Returns true when the body was put to sleep
fn update_sleep(body: &mut Body, config: &WorldConfig) -> bool {
    if config.sleep_after_steps == 0 || body.flags.contains(BodyFlags::ALWAYS_ACTIVE) {
        return false;
    }

    if body.max_speed() < config.sleep_speed {
        body.idle_steps += 1;
    } else {
        body.idle_steps = 0;
    }

    if body.idle_steps >= config.sleep_after_steps && !body.flags.contains(BodyFlags::DEACTIVATED) {
        body.flags.insert(BodyFlags::DEACTIVATED);
        return true;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn empty_space() -> Box<dyn Environment> {
        Box::new(|_point: Vec3, _max: f32| -> Option<Vec3> { None })
    }

    /// Solid below y = 0
    fn floor() -> Box<dyn Environment> {
        Box::new(|point: Vec3, max: f32| -> Option<Vec3> {
            if point.y < 0.0 {
                Some(point)
            } else if point.y <= max {
                Some(Vec3::new(point.x, 0.0, point.z))
            } else {
                None
            }
        })
    }

    /// One-sided plate at y = 0 facing +Y, with no solid volume behind it
    struct Plate;

    impl Environment for Plate {
        fn closest_point(&self, point: Vec3, max: f32) -> Option<Vec3> {
            (point.y.abs() <= max).then(|| Vec3::new(point.x, 0.0, point.z))
        }

        fn first_contact(&self, start: Vec3, displacement: Vec3, radius: f32) -> Option<SweepContact> {
            if start.y < 0.0 || displacement.y >= 0.0 {
                return None;
            }
            let t = ((start.y - radius) / -displacement.y).max(0.0);
            (t <= 1.0).then(|| SweepContact {
                t,
                point: Vec3::new(start.x + displacement.x * t, 0.0, start.z + displacement.z * t),
                normal: Vec3::y(),
            })
        }
    }

    fn fast_faller() -> Body {
        Body::new(
            vec![Joint::new(Vec3::new(0.0, 0.6, 0.0), 0.25).with_velocity(Vec3::new(0.0, -60.0, 0.0))],
            &[],
            1.0,
        )
        .unwrap()
    }

    fn weightless() -> WorldConfig {
        WorldConfig {
            gravity: Vec3::zeros(),
            relaxation_iterations: 1,
            ..WorldConfig::default()
        }
    }

    /// Two joints one unit apart flying away from each other at 1 unit/s
    fn stretching_pair(flags: BodyFlags) -> Body {
        let joints = vec![
            Joint::new(Vec3::zeros(), 0.0).with_velocity(Vec3::new(-1.0, 0.0, 0.0)),
            Joint::new(Vec3::new(1.0, 0.0, 0.0), 0.0).with_velocity(Vec3::new(1.0, 0.0, 0.0)),
        ];
        Body::new(joints, &[(0, 1)], 2.0).unwrap().with_flags(flags)
    }

    fn separation(body: &Body) -> f32 {
        (body.joints()[1].position - body.joints()[0].position).norm()
    }

    #[test]
    fn test_semi_implicit_free_fall() {
        let config = WorldConfig {
            gravity: Vec3::new(0.0, -10.0, 0.0),
            ..WorldConfig::default()
        };
        let body = Body::sphere(Vec3::new(0.0, 5.0, 0.0), 0.5, 1.0).unwrap();
        let mut world = World::new(vec![body], empty_space(), config);

        let report = world.step(0.1).unwrap();
        assert_eq!(report.simulated, 1);
        let joint = world.bodies()[0].joints()[0];
        assert_relative_eq!(joint.velocity.y, -1.0, epsilon = 1e-6);
        assert_relative_eq!(joint.position.y, 4.9, epsilon = 1e-6);
    }

    #[test]
    fn test_rigid_relaxation_restores_rest_length() {
        let mut world = World::new(vec![stretching_pair(BodyFlags::empty())], empty_space(), weightless());
        world.step(0.5).unwrap();

        let body = &world.bodies()[0];
        assert_relative_eq!(separation(body), 1.0, epsilon = 1e-6);
        assert_relative_eq!(body.joints()[0].velocity, Vec3::zeros(), epsilon = 1e-6);
        assert_relative_eq!(body.joints()[1].velocity, Vec3::zeros(), epsilon = 1e-6);
    }

    #[test]
    fn test_soft_relaxation_is_partial() {
        let mut world = World::new(vec![stretching_pair(BodyFlags::SOFT)], empty_space(), weightless());
        world.step(0.5).unwrap();
        assert_relative_eq!(separation(&world.bodies()[0]), 1.5, epsilon = 1e-6);
    }

    #[test]
    fn test_simple_connections_skip_relaxation() {
        let mut world = World::new(
            vec![stretching_pair(BodyFlags::SIMPLE_CONNECTIONS)],
            empty_space(),
            weightless(),
        );
        world.step(0.5).unwrap();
        assert_relative_eq!(separation(&world.bodies()[0]), 2.0, epsilon = 1e-6);
    }

    #[test]
    fn test_non_rotating_shares_mean_velocity() {
        let mut body = stretching_pair(BodyFlags::NON_ROTATING);
        body.joints_mut()[1].velocity = Vec3::new(3.0, 0.0, 0.0);
        let mut world = World::new(vec![body], empty_space(), weightless());
        world.step(0.5).unwrap();

        let body = &world.bodies()[0];
        for joint in body.joints() {
            assert_relative_eq!(joint.velocity, Vec3::new(1.0, 0.0, 0.0), epsilon = 1e-6);
        }
        assert_relative_eq!(body.joints()[0].position, Vec3::new(0.5, 0.0, 0.0), epsilon = 1e-6);
        assert_relative_eq!(separation(body), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_rest_lengths_never_change_while_stepping() {
        let joints = vec![
            Joint::new(Vec3::new(0.0, 2.0, 0.0), 0.25).with_velocity(Vec3::new(3.0, 0.0, 0.0)),
            Joint::new(Vec3::new(1.0, 2.0, 0.0), 0.25),
            Joint::new(Vec3::new(0.0, 3.0, 1.0), 0.25).with_velocity(Vec3::new(0.0, 0.0, -2.0)),
        ];
        let body = Body::new(joints, &[(0, 1), (1, 2), (2, 0)], 3.0)
            .unwrap()
            .with_flags(BodyFlags::SOFT);
        let before: Vec<f32> = body.connections().iter().map(|c| c.rest_length()).collect();

        let mut world = World::new(vec![body], floor(), WorldConfig::default());
        for _ in 0..120 {
            world.step(1.0 / 60.0).unwrap();
        }
        let after: Vec<f32> = world.bodies()[0].connections().iter().map(|c| c.rest_length()).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_floor_contact_bounces_and_slows() {
        let body = Body::new(
            vec![Joint::new(Vec3::new(0.0, 0.6, 0.0), 0.5).with_velocity(Vec3::new(1.0, -2.0, 0.0))],
            &[],
            1.0,
        )
        .unwrap();
        let mut world = World::new(vec![body], floor(), weightless());
        let report = world.step(0.1).unwrap();

        assert_eq!(report.contacts, 1);
        let joint = world.bodies()[0].joints()[0];
        assert_relative_eq!(joint.position, Vec3::new(0.1, 0.5, 0.0), epsilon = 1e-6);
        assert_relative_eq!(joint.velocity, Vec3::new(0.5, 1.0, 0.0), epsilon = 1e-6);
    }

    #[test]
    fn test_fast_joint_stops_at_first_contact() {
        let mut world = World::new(vec![fast_faller()], Box::new(Plate), weightless());
        let report = world.step(1.0 / 60.0).unwrap();

        assert_eq!(report.contacts, 1);
        let joint = world.bodies()[0].joints()[0];
        assert_relative_eq!(joint.position.y, 0.25 + CONTACT_SKIN, epsilon = 1e-5);
        assert_relative_eq!(joint.velocity, Vec3::new(0.0, 30.0, 0.0), epsilon = 1e-4);
    }

    #[test]
    fn test_closest_point_alone_lets_fast_joints_tunnel() {
        let plate_without_sweep = |point: Vec3, max: f32| -> Option<Vec3> { Plate.closest_point(point, max) };
        let mut world = World::new(vec![fast_faller()], Box::new(plate_without_sweep), weightless());
        let report = world.step(1.0 / 60.0).unwrap();

        assert_eq!(report.contacts, 0);
        assert_relative_eq!(world.bodies()[0].joints()[0].position.y, -0.4, epsilon = 1e-5);
    }

    #[test]
    fn test_vetoed_sweep_contact_passes_through() {
        let mut world = World::new(vec![fast_faller()], Box::new(Plate), weightless())
            .with_collision_approval(Box::new(|_body: usize, _joint: usize, _point: Vec3| false));
        let report = world.step(1.0 / 60.0).unwrap();

        assert_eq!(report.contacts, 0);
        assert!(world.bodies()[0].joints()[0].position.y < 0.0);
    }

    #[test]
    fn test_joint_inside_solid_is_restored() {
        let body = Body::new(
            vec![Joint::new(Vec3::new(0.0, 0.05, 0.0), 0.0).with_velocity(Vec3::new(0.0, -1.0, 0.0))],
            &[],
            1.0,
        )
        .unwrap();
        let mut world = World::new(vec![body], floor(), weightless());
        let report = world.step(0.1).unwrap();

        assert_eq!(report.restored, 1);
        let joint = world.bodies()[0].joints()[0];
        assert_relative_eq!(joint.position, Vec3::new(0.0, 0.05, 0.0), epsilon = 1e-6);
        assert_eq!(joint.velocity, Vec3::zeros());
    }

    #[test]
    fn test_approval_can_veto_contacts() {
        let body = Body::sphere(Vec3::new(0.0, 0.3, 0.0), 0.5, 1.0).unwrap();
        let mut world = World::new(vec![body], floor(), weightless())
            .with_collision_approval(Box::new(|body: usize, joint: usize, _point: Vec3| body != 0 || joint != 0));
        let report = world.step(0.1).unwrap();

        assert_eq!(report.contacts, 0);
        assert_relative_eq!(world.bodies()[0].joints()[0].position.y, 0.3, epsilon = 1e-6);
    }

    #[test]
    fn test_disabled_and_sleeping_bodies_are_skipped() {
        let falling = Body::sphere(Vec3::new(0.0, 10.0, 0.0), 0.5, 1.0).unwrap();
        let disabled = falling.clone().with_flags(BodyFlags::DISABLED);
        let asleep = falling.clone().with_flags(BodyFlags::DEACTIVATED);
        let mut world = World::new(vec![falling, disabled, asleep], empty_space(), WorldConfig::default());

        let report = world.step(0.1).unwrap();
        assert_eq!(report.simulated, 1);
        assert_eq!(report.skipped, 2);
        assert_relative_eq!(world.bodies()[1].joints()[0].position.y, 10.0);
        assert_relative_eq!(world.bodies()[2].joints()[0].position.y, 10.0);

        // A pending collision runs a sleeping body for exactly one step
        world.notify_collision(2).unwrap();
        assert_eq!(world.step(0.1).unwrap().simulated, 2);
        assert!(world.bodies()[2].joints()[0].position.y < 10.0);
        assert!(!world.bodies()[2].has_pending_collision());
        assert_eq!(world.step(0.1).unwrap().simulated, 1);

        world.wake(2).unwrap();
        assert_eq!(world.step(0.1).unwrap().simulated, 2);
    }

    #[test]
    fn test_idle_bodies_fall_asleep() {
        let config = WorldConfig {
            gravity: Vec3::zeros(),
            sleep_after_steps: 3,
            ..WorldConfig::default()
        };
        let resting = Body::sphere(Vec3::zeros(), 0.5, 1.0).unwrap();
        let pinned = resting.clone().with_flags(BodyFlags::ALWAYS_ACTIVE);
        let mut world = World::new(vec![resting, pinned], empty_space(), config);

        let deactivated: usize = (0..3).map(|_| world.step(0.1).unwrap().deactivated).sum();
        assert_eq!(deactivated, 1);
        assert!(world.bodies()[0].flags.contains(BodyFlags::DEACTIVATED));
        assert!(!world.bodies()[1].flags.contains(BodyFlags::DEACTIVATED));
        assert_eq!(world.step(0.1).unwrap().skipped, 1);
    }

    #[test]
    fn test_sleep_disabled_by_default() {
        let body = Body::sphere(Vec3::zeros(), 0.5, 1.0).unwrap();
        let mut world = World::new(vec![body], empty_space(), weightless());
        for _ in 0..50 {
            world.step(0.1).unwrap();
        }
        assert!(world.bodies()[0].is_active());
    }

    #[test]
    fn test_invalid_arguments() {
        let mut world = World::new(Vec::new(), empty_space(), WorldConfig::default());
        assert!(matches!(world.step(0.0), Err(PhysicsError::InvalidTimeStep(_))));
        assert!(matches!(world.step(f32::NAN), Err(PhysicsError::InvalidTimeStep(_))));
        assert!(matches!(world.wake(3), Err(PhysicsError::BodyNotFound(3))));
        assert!(matches!(world.notify_collision(0), Err(PhysicsError::BodyNotFound(0))));
        assert!(matches!(world.remove_body(0), Err(PhysicsError::BodyNotFound(0))));

        let index = world.add_body(Body::sphere(Vec3::zeros(), 0.5, 1.0).unwrap());
        assert_eq!(index, 0);
        assert!(world.remove_body(index).is_ok());
        assert!(world.bodies().is_empty());
    }
}
