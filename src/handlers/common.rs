//! Behavior shared by several phase handlers.
//!
//! Every effect here depends on optional collaborators: when a resource or
//! event channel is missing the effect is skipped.

use bevy::prelude::*;

use super::components::*;
use crate::core::{Phase, PlayerLoadRequested, PlayerSaveRequested, PlayerSnapshot};

/// The player entity, if one exists.
pub fn player_entity(world: &mut World) -> Option<Entity> {
    world
        .query_filtered::<Entity, With<Player>>()
        .iter(world)
        .next()
}

pub fn player_position(world: &mut World) -> Option<Vec3> {
    let player = player_entity(world)?;
    world.get::<Transform>(player).map(|transform| transform.translation)
}

pub fn player_status(world: &mut World) -> Option<PlayerStatus> {
    let player = player_entity(world)?;
    world.get::<PlayerStatus>(player).copied()
}

pub fn spawn_player(world: &mut World, position: Vec3) -> Entity {
    info!("Spawning player at {}", position);
    world
        .spawn((
            Name::new("Player"),
            Player,
            PlayerStatus::Alive,
            Inventory::default(),
            Transform::from_translation(position),
            Visibility::default(),
        ))
        .id()
}

pub fn despawn_player(world: &mut World) {
    if let Some(player) = player_entity(world) {
        world.despawn(player);
    }
}

/// Snapshot the player and hand it to the save collaborator.
pub fn save_player_state(world: &mut World, phase: Phase) {
    let Some(player) = player_entity(world) else {
        return;
    };
    let Some(position) = world.get::<Transform>(player).map(|t| t.translation) else {
        return;
    };
    let inventory = world
        .get::<Inventory>(player)
        .map(|inventory| inventory.items.clone())
        .unwrap_or_default();
    let snapshot = PlayerSnapshot {
        position,
        inventory,
    };

    if let Some(mut saved) = world.get_resource_mut::<SavedPlayer>() {
        saved.0 = Some(snapshot.clone());
    }
    if let Some(mut events) = world.get_resource_mut::<Events<PlayerSaveRequested>>() {
        events.send(PlayerSaveRequested { phase, snapshot });
    }
}

/// Ask for the saved player state and apply what is already known.
///
/// Only the inventory is restored; each phase decides where the player
/// stands.
pub fn load_player_state(world: &mut World, phase: Phase) {
    if let Some(mut events) = world.get_resource_mut::<Events<PlayerLoadRequested>>() {
        events.send(PlayerLoadRequested { phase });
    }

    let Some(items) = world
        .get_resource::<SavedPlayer>()
        .and_then(|saved| saved.0.as_ref())
        .map(|snapshot| snapshot.inventory.clone())
    else {
        return;
    };
    if let Some(player) = player_entity(world) {
        world.entity_mut(player).insert(Inventory { items });
    }
}

/// Where the player last stood when their state was saved.
pub fn saved_position(world: &World) -> Option<Vec3> {
    world
        .get_resource::<SavedPlayer>()
        .and_then(|saved| saved.0.as_ref())
        .map(|snapshot| snapshot.position)
}

/// End the stage in progress, if any.
///
/// Runs when the stage is left for good: straight from the stage, or from
/// the pause screen to anything but the stage.
pub fn end_stage(world: &mut World) {
    if world.remove_resource::<StageRun>().is_none() {
        return;
    }
    info!("Ending stage");
    save_player_state(world, Phase::Stage);
    set_enemy_spawning(world, false);
    hide_overlay(world, Overlay::BossWarning);
    despawn_portals(world, Phase::Town);
}

pub fn spawn_portal(world: &mut World, position: Vec3, destination: Phase) -> Entity {
    info!("Opening portal to {} at {}", destination, position);
    world
        .spawn((
            Name::new(format!("Portal to {}", destination)),
            Portal { destination },
            Transform::from_translation(position),
            Visibility::default(),
        ))
        .id()
}

/// Remove every portal leading to `destination`.
pub fn despawn_portals(world: &mut World, destination: Phase) {
    let portals: Vec<Entity> = world
        .query::<(Entity, &Portal)>()
        .iter(world)
        .filter(|(_, portal)| portal.destination == destination)
        .map(|(entity, _)| entity)
        .collect();
    for portal in portals {
        world.despawn(portal);
    }
}

/// Show `overlay`, replacing any copy already on screen.
pub fn show_overlay(world: &mut World, overlay: Overlay) {
    hide_overlay(world, overlay);
    let title = match overlay {
        Overlay::MainMenu => "ETERNAL WARRIOR\nPress Enter",
        Overlay::Pause => "PAUSED",
        Overlay::GameOver => "YOU DIED\nPress Enter",
        Overlay::BossWarning => "THE BOSS APPROACHES",
    };
    world.spawn((
        Name::new(format!("{:?} overlay", overlay)),
        overlay,
        Text::new(title),
        TextFont {
            font_size: 48.0,
            ..default()
        },
        TextColor(Color::srgb(0.8, 0.7, 0.6)),
        Node {
            position_type: PositionType::Absolute,
            top: Val::Percent(40.0),
            left: Val::Percent(35.0),
            ..default()
        },
    ));
}

pub fn hide_overlay(world: &mut World, overlay: Overlay) {
    let shown: Vec<Entity> = world
        .query::<(Entity, &Overlay)>()
        .iter(world)
        .filter(|(_, shown)| **shown == overlay)
        .map(|(entity, _)| entity)
        .collect();
    for entity in shown {
        world.despawn(entity);
    }
}

/// Remove every overlay.
pub fn clear_overlays(world: &mut World) {
    let shown: Vec<Entity> = world
        .query_filtered::<Entity, With<Overlay>>()
        .iter(world)
        .collect();
    for entity in shown {
        world.despawn(entity);
    }
}

pub fn set_inventory_accessible(world: &mut World, accessible: bool) {
    if let Some(mut inventory) = world.get_resource_mut::<InventoryAccess>() {
        inventory.accessible = accessible;
    }
}

pub fn set_enemy_spawning(world: &mut World, active: bool) {
    if let Some(mut spawning) = world.get_resource_mut::<EnemySpawning>() {
        spawning.active = active;
        if !active {
            spawning.boss_requested = false;
        }
    }
}

/// Freeze or resume game time. Real time keeps running for menus.
pub fn set_time_paused(world: &mut World, paused: bool) {
    if let Some(mut time) = world.get_resource_mut::<Time<Virtual>>() {
        if paused {
            time.pause();
        } else {
            time.unpause();
        }
    }
}

pub fn key_just_pressed(world: &World, key: KeyCode) -> bool {
    world
        .get_resource::<ButtonInput<KeyCode>>()
        .is_some_and(|input| input.just_pressed(key))
}

/// Drive a single handler callback against a bare world.
#[cfg(test)]
pub(crate) mod harness {
    use std::collections::VecDeque;

    use bevy::prelude::*;

    use crate::core::Phase;
    use crate::phase::{HandlerError, PhaseContext, PhaseHandler};

    /// Enter `phase` coming from `previous`. Returns the requested transitions.
    pub fn enter(
        handler: &mut impl PhaseHandler,
        world: &mut World,
        phase: Phase,
        previous: Option<Phase>,
    ) -> Result<Vec<Phase>, HandlerError> {
        let mut queue = VecDeque::new();
        let mut ctx = PhaseContext::new(world, &mut queue, phase).entering_from(previous);
        handler.on_enter(&mut ctx)?;
        Ok(queue.into())
    }

    pub fn update(
        handler: &mut impl PhaseHandler,
        world: &mut World,
        phase: Phase,
    ) -> Result<Vec<Phase>, HandlerError> {
        let mut queue = VecDeque::new();
        let mut ctx = PhaseContext::new(world, &mut queue, phase);
        handler.on_update(&mut ctx)?;
        Ok(queue.into())
    }

    pub fn exit(
        handler: &mut impl PhaseHandler,
        world: &mut World,
        phase: Phase,
        next: Option<Phase>,
    ) -> Result<(), HandlerError> {
        let mut queue = VecDeque::new();
        let mut ctx = PhaseContext::new(world, &mut queue, phase).leaving_for(next);
        handler.on_exit(&mut ctx)
    }

    /// Press `key` for the next update.
    pub fn press(world: &mut World, key: KeyCode) {
        let mut input = ButtonInput::<KeyCode>::default();
        input.press(key);
        world.insert_resource(input);
    }

    pub fn count<C: Component>(world: &mut World) -> usize {
        world.query::<&C>().iter(world).count()
    }
}
