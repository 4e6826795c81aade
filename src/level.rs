//! Level loop.
//!
//! [`LevelSimulation`] owns the ECS world of one level and the schedule that
//! advances it. Building a level loads (or receives) the animation tables,
//! builds the obstacle graph, spawns the player, the moogle, every task bot
//! and every trap, and enters their initial states. Each [`tick`] then runs
//! the stages in a fixed order, every stage finishing for all entities before
//! the next one starts:
//!
//! 1. drain finished background loads
//! 2. level clock and outcome
//! 3. drop the stale rule snapshot
//! 4. rule evaluation for task bots that are due
//! 5. state machines (player, task bots, moogles, traps)
//! 6. control input, then movement
//! 7. steering agents
//! 8. contacts
//! 9. charge bars, animation, depth
//!
//! Entities are only added while the level is built, never during a tick.
//!
//! [`tick`]: LevelSimulation::tick

use std::time::Duration;

use bevy_ecs::message::Messages;
use bevy_ecs::prelude::*;
use glam::Vec2;
use log::info;
use thiserror::Error;

use crate::components::input::Input;
use crate::entities::{self, AssemblyError, GroundBotSpawn};
use crate::events::loading::LoadMessage;
use crate::resources::animationstore::{AnimationStore, TextureAtlases};
use crate::resources::gameplayconfig::GameplayConfig;
use crate::resources::levelconfig::{LevelConfigError, LevelConfiguration, Locomotion};
use crate::resources::levelentities::LevelEntities;
use crate::resources::leveloutcome::{LevelOutcome, LevelPhase};
use crate::resources::loading::{setup_animation_loading, shutdown_animation_loading};
use crate::resources::obstaclegraph::ObstacleGraph;
use crate::resources::snapshot::LevelStateSnapshot;
use crate::resources::worldtime::WorldTime;
use crate::states::{MoogleState, PlayerBotState, TaskBotState, TrapState};
use crate::systems::agent::agent_system;
use crate::systems::animation::animation;
use crate::systems::charge::update_charge_bars;
use crate::systems::contact::contact_system;
use crate::systems::depth::update_depth;
use crate::systems::input::apply_input;
use crate::systems::intelligence::intelligence_system;
use crate::systems::loading::{
    apply_loaded_animations, poll_loading_messages, update_loading_messages, wait_for_animations,
};
use crate::systems::movement::movement_system;
use crate::systems::outcome::{change_level_phase, level_outcome_system};
use crate::systems::rules::{invalidate_snapshot, rules_system};
use crate::systems::time::update_world_time;

/// How long level construction waits for the loading thread.
pub const ANIMATION_LOAD_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum LevelError {
    #[error(transparent)]
    Config(#[from] LevelConfigError),
    #[error(transparent)]
    Assembly(#[from] AssemblyError),
    #[error("animation loading failed: {0}")]
    Animations(String),
}

pub struct LevelSimulation {
    world: World,
    schedule: Schedule,
    player: Entity,
}

impl LevelSimulation {
    /// Load every animation set from `atlases` on the loading thread, then
    /// build the level.
    pub fn new(config: GameplayConfig, level: LevelConfiguration, atlases: TextureAtlases) -> Result<Self, LevelError> {
        let mut world = World::new();
        world.insert_resource(config);
        setup_animation_loading(&mut world, atlases);
        if let Err(e) = wait_for_animations(&mut world, ANIMATION_LOAD_TIMEOUT) {
            shutdown_animation_loading(&mut world);
            return Err(LevelError::Animations(e));
        }
        Self::build(world, level)
    }

    /// Build the level from animation tables that are already loaded.
    pub fn with_animations(
        config: GameplayConfig,
        level: LevelConfiguration,
        store: AnimationStore,
    ) -> Result<Self, LevelError> {
        let mut world = World::new();
        world.insert_resource(config);
        world.insert_resource(store);
        Self::build(world, level)
    }

    fn build(mut world: World, level: LevelConfiguration) -> Result<Self, LevelError> {
        world.insert_resource(WorldTime::default());
        world.init_resource::<GameplayConfig>();
        world.init_resource::<AnimationStore>();
        world.init_resource::<Messages<LoadMessage>>();
        world.init_resource::<LevelStateSnapshot>();
        world.init_resource::<LevelEntities>();
        world.insert_resource(LevelOutcome::new(level.time_limit));

        let buffer_radius = world.resource::<GameplayConfig>().task_bot.pathfinding_graph_buffer_radius;
        let graph = ObstacleGraph::new(level.polygon_obstacles(), buffer_radius);
        info!(
            "Obstacle graph: {} obstacles, {} nodes",
            graph.obstacles().len(),
            graph.node_count()
        );
        world.insert_resource(graph);

        let player = entities::spawn_player_bot(
            &mut world,
            level.player_spawn_position()?,
            level.initial_player_bot_orientation()?,
        )?;
        entities::spawn_moogle(&mut world, level.moogle_spawn_position()?, level.moogle_orientation()?)?;

        for task_bot in &level.task_bot_configurations {
            match task_bot.locomotion()? {
                Locomotion::Ground => {
                    entities::spawn_ground_bot(
                        &mut world,
                        GroundBotSpawn {
                            good_path: level.path_points(&task_bot.good_path_node_names)?,
                            bad_path: level.path_points(&task_bot.bad_path_node_names)?,
                            starts_bad: task_bot.starts_bad,
                            facing: task_bot.initial_orientation()?,
                        },
                    )?;
                }
            }
        }
        for trap in &level.trap_configurations {
            entities::spawn_trap(&mut world, level.trap_position(trap)?, trap.initial_orientation()?)?;
        }

        info!(
            "Level ready: {} entities, {:.0}s on the clock",
            world.resource::<LevelEntities>().len(),
            level.time_limit
        );
        world.insert_resource(level);

        Ok(Self {
            world,
            schedule: level_schedule(),
            player,
        })
    }

    /// Advance the level by `dt` seconds. Does nothing unless the level is
    /// active. Returns the phase after the tick.
    pub fn tick(&mut self, dt: f32) -> LevelPhase {
        if !self.world.resource::<LevelOutcome>().is_active() {
            return self.phase();
        }
        update_world_time(&mut self.world, dt);
        self.schedule.run(&mut self.world);
        self.world.clear_trackers();
        self.phase()
    }

    pub fn phase(&self) -> LevelPhase {
        self.world.resource::<LevelOutcome>().phase()
    }

    pub fn outcome(&self) -> &LevelOutcome {
        self.world.resource::<LevelOutcome>()
    }

    pub fn pause(&mut self) -> bool {
        change_level_phase(&mut self.world, LevelPhase::Paused)
    }

    pub fn resume(&mut self) -> bool {
        change_level_phase(&mut self.world, LevelPhase::Active)
    }

    pub fn player(&self) -> Entity {
        self.player
    }

    /// Thumbstick-style displacement for the player; stays until replaced.
    pub fn drive_player(&mut self, displacement: Vec2) {
        if let Some(mut input) = self.world.get_mut::<Input>(self.player) {
            input.did_update_displacement(displacement);
        }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }
}

impl Drop for LevelSimulation {
    fn drop(&mut self) {
        shutdown_animation_loading(&mut self.world);
    }
}

/// The stages of one tick, in order.
pub fn level_schedule() -> Schedule {
    let mut schedule = Schedule::default();
    schedule.add_systems(
        (
            (
                update_loading_messages,
                poll_loading_messages,
                apply_loaded_animations,
                level_outcome_system,
                invalidate_snapshot,
                rules_system,
            )
                .chain(),
            (
                intelligence_system::<PlayerBotState>,
                intelligence_system::<TaskBotState>,
                intelligence_system::<MoogleState>,
                intelligence_system::<TrapState>,
            )
                .chain(),
            (
                apply_input,
                movement_system,
                agent_system,
                contact_system,
                update_charge_bars,
                animation,
                update_depth,
            )
                .chain(),
        )
            .chain(),
    );
    schedule
}
