//! Tests for host physics (AABB probe, gravity, integration)

#[cfg(test)]
mod tests {
    use bevy::prelude::*;

    use super::super::components::*;
    use super::super::physics::*;
    use crate::interaction::{ContactPhase, ObjectHandle, SurfaceLayer};

    fn test_app() -> App {
        let mut app = App::new();
        app.insert_resource(Time::<Fixed>::from_hz(60.0))
            .init_resource::<HostConfig>()
            .add_systems(FixedUpdate, (apply_gravity, integrate_bodies, settle_carryables, probe_contacts).chain());
        app
    }

    fn spawn_probe(app: &mut App, position: Vec2) -> Entity {
        app.world_mut()
            .spawn((
                Player,
                Transform::from_xyz(position.x, position.y, 0.0),
                KinematicBody { gravity_scale: 0.0, ..Default::default() },
                BodyShape::new(1.0, 1.0),
                ContactMemory::default(),
                ContactInbox::default(),
            ))
            .id()
    }

    fn spawn_object(app: &mut App, handle: u64, position: Vec2, size: Vec2, surface: Option<Surface>) -> Entity {
        let mut entity = app.world_mut().spawn((
            ObjectId(ObjectHandle(handle)),
            Transform::from_xyz(position.x, position.y, 0.0),
            BodyShape::new(size.x, size.y),
        ));
        if let Some(surface) = surface {
            entity.insert(surface);
        }
        entity.id()
    }

    fn take_inbox(app: &mut App, player: Entity) -> Vec<(ObjectHandle, ContactPhase)> {
        let mut inbox = app.world_mut().get_mut::<ContactInbox>(player).unwrap();
        std::mem::take(&mut inbox.0)
            .contacts
            .into_iter()
            .map(|contact| (contact.other, contact.phase))
            .collect()
    }

    #[test]
    fn test_aabb_penetration_axis_and_normal() {
        // Стоим на полу: проникновение по Y минимально
        let hit = aabb_penetration(Vec2::new(0.0, 0.45), Vec2::splat(0.5), Vec2::ZERO, Vec2::new(5.0, 0.0)).unwrap();
        assert_eq!(hit.normal, Vec2::Y);
        assert!((hit.depth - 0.05).abs() < 1e-5);

        // Упёрлись в стену слева от себя
        let hit = aabb_penetration(Vec2::new(0.9, 0.0), Vec2::splat(0.5), Vec2::ZERO, Vec2::new(0.5, 5.0)).unwrap();
        assert_eq!(hit.normal, Vec2::X);

        // Далеко
        assert!(aabb_penetration(Vec2::new(3.0, 0.0), Vec2::splat(0.5), Vec2::ZERO, Vec2::splat(0.5)).is_none());
    }

    #[test]
    fn test_touching_within_skin_counts() {
        let gap = CONTACT_SKIN * 0.5;
        let hit = aabb_penetration(Vec2::new(0.0, 1.0 + gap), Vec2::splat(0.5), Vec2::ZERO, Vec2::splat(0.5));
        assert!(hit.is_some_and(|hit| hit.depth <= 0.0));
    }

    #[test]
    fn test_gravity_respects_scale_and_kinematic() {
        let mut app = test_app();
        let falling = app.world_mut().spawn((Transform::default(), KinematicBody::default())).id();
        let floating = app
            .world_mut()
            .spawn((Transform::default(), KinematicBody { gravity_scale: 0.0, ..Default::default() }))
            .id();
        let held = app
            .world_mut()
            .spawn((Transform::default(), KinematicBody { kinematic: true, ..Default::default() }))
            .id();

        app.world_mut().run_schedule(FixedUpdate);

        let world = app.world();
        assert!(world.get::<KinematicBody>(falling).unwrap().velocity.y < 0.0);
        assert!(world.get::<Transform>(falling).unwrap().translation.y < 0.0);
        assert_eq!(world.get::<KinematicBody>(floating).unwrap().velocity, Vec2::ZERO);
        assert_eq!(world.get::<Transform>(held).unwrap().translation, Vec3::ZERO);
    }

    #[test]
    fn test_probe_lands_on_floor_and_reports_ground() {
        let mut app = test_app();
        let player = spawn_probe(&mut app, Vec2::new(0.0, 0.45));
        spawn_object(&mut app, 1, Vec2::new(0.0, -0.5), Vec2::new(10.0, 1.0), Some(Surface { layer: SurfaceLayer::Ground, solid: true }));

        app.world_mut().run_schedule(FixedUpdate);

        let contacts = app.world().get::<ContactInbox>(player).unwrap().0.contacts.clone();
        assert_eq!(contacts.len(), 1);
        assert_eq!(contacts[0].phase, ContactPhase::Collision);
        assert_eq!(contacts[0].normals, vec![Vec2::Y]);

        // Вытолкнуло на поверхность пола
        let y = app.world().get::<Transform>(player).unwrap().translation.y;
        assert!((y - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_probe_emits_ended_when_contact_lost() {
        let mut app = test_app();
        let player = spawn_probe(&mut app, Vec2::ZERO);
        let crate_entity = spawn_object(&mut app, 7, Vec2::new(0.5, 0.0), Vec2::splat(0.5), None);

        app.world_mut().run_schedule(FixedUpdate);
        assert_eq!(take_inbox(&mut app, player), vec![(ObjectHandle(7), ContactPhase::Overlap)]);

        app.world_mut().get_mut::<Transform>(crate_entity).unwrap().translation.x = 10.0;
        app.world_mut().run_schedule(FixedUpdate);
        assert_eq!(take_inbox(&mut app, player), vec![(ObjectHandle(7), ContactPhase::OverlapEnded)]);

        // Больше ничего не приходит
        app.world_mut().run_schedule(FixedUpdate);
        assert!(take_inbox(&mut app, player).is_empty());
    }

    #[test]
    fn test_despawned_object_produces_ended() {
        let mut app = test_app();
        let player = spawn_probe(&mut app, Vec2::ZERO);
        let wall = spawn_object(&mut app, 3, Vec2::new(0.9, 0.0), Vec2::new(1.0, 4.0), Some(Surface { layer: SurfaceLayer::Other, solid: true }));

        app.world_mut().run_schedule(FixedUpdate);
        take_inbox(&mut app, player);

        app.world_mut().despawn(wall);
        app.world_mut().run_schedule(FixedUpdate);
        assert_eq!(take_inbox(&mut app, player), vec![(ObjectHandle(3), ContactPhase::CollisionEnded)]);
    }

    #[test]
    fn test_solid_ladder_side_reports_both_and_does_not_push() {
        let mut app = test_app();
        let player = spawn_probe(&mut app, Vec2::ZERO);
        spawn_object(&mut app, 5, Vec2::new(0.3, 0.5), Vec2::new(0.5, 2.0), Some(Surface { layer: SurfaceLayer::Climbable, solid: true }));

        app.world_mut().run_schedule(FixedUpdate);

        let contacts = app.world().get::<ContactInbox>(player).unwrap().0.contacts.clone();
        let phases: Vec<_> = contacts.iter().map(|c| c.phase).collect();
        assert_eq!(phases, vec![ContactPhase::Collision, ContactPhase::Overlap]);
        assert_eq!(contacts[0].normals, vec![Vec2::NEG_X]);
        assert_eq!(app.world().get::<Transform>(player).unwrap().translation.x, 0.0);
    }

    #[test]
    fn test_thrown_carryable_lands_on_floor() {
        let mut app = test_app();
        spawn_object(&mut app, 1, Vec2::new(0.0, -0.5), Vec2::new(20.0, 1.0), Some(Surface { layer: SurfaceLayer::Ground, solid: true }));
        let item = app
            .world_mut()
            .spawn((
                Transform::from_xyz(0.0, 2.0, 0.0),
                BodyShape::new(0.5, 0.5),
                KinematicBody { velocity: Vec2::new(3.0, 0.0), ..Default::default() },
                CarryableItem { throw_force: 100.0 },
            ))
            .id();

        for _ in 0..180 {
            app.world_mut().run_schedule(FixedUpdate);
        }

        let transform = app.world().get::<Transform>(item).unwrap();
        let body = app.world().get::<KinematicBody>(item).unwrap();
        assert!((transform.translation.y - 0.25).abs() < 0.05, "лежит на полу: {}", transform.translation.y);
        assert!(transform.translation.x > 0.0);
        assert_eq!(body.velocity.x, 0.0);
    }
}
