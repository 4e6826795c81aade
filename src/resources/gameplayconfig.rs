//! Gameplay tuning resource.
//!
//! Every number that shapes how the level plays lives here. Defaults are the
//! shipped tuning; an INI file can override any of them.
//!
//! # Configuration File Format
//!
//! ```ini
//! [player]
//! movement_speed = 300.0
//! hit_state_duration = 0.75
//!
//! [taskbot]
//! maximum_speed_when_bad = 120.0
//!
//! [groundbot]
//! maximum_attack_distance = 300.0
//!
//! [flocking]
//! separation_radius = 25.3
//!
//! [trap]
//! charge_loss_per_contact = 50.0
//!
//! [level]
//! maximum_delta_time = 0.016666
//! ```

use bevy_ecs::prelude::*;
use configparser::ini::Ini;
use glam::Vec2;
use log::info;
use std::f32::consts::PI;
use std::path::PathBuf;

const DEFAULT_CONFIG_PATH: &str = "./gameplay.ini";

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerBotConfig {
    pub movement_speed: f32,
    pub angular_speed: f32,
    pub physics_body_radius: f32,
    pub physics_body_offset: Vec2,
    pub initial_charge: f64,
    pub maximum_charge: f64,
    pub hit_state_duration: f32,
    pub recharge_delay_when_inactive: f32,
    pub recharge_amount_per_second: f64,
    pub appear_duration: f32,
}

impl Default for PlayerBotConfig {
    fn default() -> Self {
        Self {
            movement_speed: 300.0,
            angular_speed: PI * 1.4,
            physics_body_radius: 15.0,
            physics_body_offset: Vec2::new(0.0, -25.0),
            initial_charge: 100.0,
            maximum_charge: 100.0,
            hit_state_duration: 0.75,
            recharge_delay_when_inactive: 1.0,
            recharge_amount_per_second: 50.0,
            appear_duration: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TaskBotConfig {
    pub rules_update_wait_duration: f32,
    pub behavior_update_wait_duration: f32,
    pub threshold_proximity_to_patrol_path_start_point: f32,
    pub maximum_speed_when_good: f32,
    pub maximum_speed_when_bad: f32,
    pub maximum_acceleration: f32,
    pub agent_mass: f32,
    pub physics_body_radius: f32,
    pub physics_body_offset: Vec2,
    pub max_prediction_time_when_following_path: f32,
    pub max_prediction_time_for_obstacle_avoidance: f32,
    pub patrol_path_radius: f32,
    pub hunt_path_radius: f32,
    pub return_to_patrol_path_radius: f32,
    pub pathfinding_graph_buffer_radius: f32,
    pub pre_attack_state_duration: f32,
    pub zapped_state_duration: f32,
}

impl Default for TaskBotConfig {
    fn default() -> Self {
        Self {
            rules_update_wait_duration: 0.5,
            behavior_update_wait_duration: 0.25,
            threshold_proximity_to_patrol_path_start_point: 50.0,
            maximum_speed_when_good: 250.0,
            maximum_speed_when_bad: 120.0,
            maximum_acceleration: 300.0,
            agent_mass: 0.25,
            physics_body_radius: 35.0,
            physics_body_offset: Vec2::new(0.0, -25.0),
            max_prediction_time_when_following_path: 1.5,
            max_prediction_time_for_obstacle_avoidance: 1.5,
            patrol_path_radius: 10.0,
            hunt_path_radius: 20.0,
            return_to_patrol_path_radius: 20.0,
            pathfinding_graph_buffer_radius: 30.0,
            pre_attack_state_duration: 0.5,
            zapped_state_duration: 0.75,
        }
    }
}

impl TaskBotConfig {
    pub fn maximum_speed_for_is_good(&self, is_good: bool) -> f32 {
        if is_good {
            self.maximum_speed_when_good
        } else {
            self.maximum_speed_when_bad
        }
    }

    /// Extrusion used to find the obstacles a path endpoint is stuck in.
    pub fn obstacle_extrusion_radius(&self) -> f32 {
        self.pathfinding_graph_buffer_radius + 5.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroundBotConfig {
    pub maximum_charge: f64,
    pub charge_loss_per_contact: f64,
    pub maximum_attack_distance: f32,
    pub attack_end_proximity: f32,
    pub pre_attack_rotation_speed: f32,
    pub movement_speed_multiplier_when_attacking: f32,
    pub angular_speed_multiplier_when_attacking: f32,
    pub delay_between_attacks: f32,
}

impl Default for GroundBotConfig {
    fn default() -> Self {
        Self {
            maximum_charge: 100.0,
            charge_loss_per_contact: 25.0,
            maximum_attack_distance: 300.0,
            attack_end_proximity: 7.0,
            pre_attack_rotation_speed: PI / 4.0,
            movement_speed_multiplier_when_attacking: 3.0,
            angular_speed_multiplier_when_attacking: 3.0,
            delay_between_attacks: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlockingConfig {
    pub separation_radius: f32,
    pub separation_angle: f32,
    pub separation_weight: f32,
    pub alignment_radius: f32,
    pub alignment_angle: f32,
    pub alignment_weight: f32,
    pub cohesion_radius: f32,
    pub cohesion_angle: f32,
    pub cohesion_weight: f32,
    pub agent_search_distance_for_flocking: f32,
}

impl Default for FlockingConfig {
    fn default() -> Self {
        Self {
            separation_radius: 25.3,
            separation_angle: 3.0 * (PI / 4.0),
            separation_weight: 2.0,
            alignment_radius: 43.333,
            alignment_angle: PI / 4.0,
            alignment_weight: 1.667,
            cohesion_radius: 50.0,
            cohesion_angle: PI / 2.0,
            cohesion_weight: 1.667,
            agent_search_distance_for_flocking: 50.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MoogleConfig {
    pub physics_body_radius: f32,
    pub physics_body_offset: Vec2,
}

impl Default for MoogleConfig {
    fn default() -> Self {
        Self {
            physics_body_radius: 30.0,
            physics_body_offset: Vec2::new(0.0, -25.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrapConfig {
    pub physics_body_radius: f32,
    pub physics_body_offset: Vec2,
    pub charge_loss_per_contact: f64,
}

impl Default for TrapConfig {
    fn default() -> Self {
        Self {
            physics_body_radius: 10.0,
            physics_body_offset: Vec2::ZERO,
            charge_loss_per_contact: 50.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LevelTuning {
    /// Longest tick the simulation will step in one go.
    pub maximum_delta_time: f32,
}

impl Default for LevelTuning {
    fn default() -> Self {
        Self {
            maximum_delta_time: 1.0 / 60.0,
        }
    }
}

#[derive(Resource, Debug, Clone, Default)]
pub struct GameplayConfig {
    pub player_bot: PlayerBotConfig,
    pub task_bot: TaskBotConfig,
    pub ground_bot: GroundBotConfig,
    pub flocking: FlockingConfig,
    pub moogle: MoogleConfig,
    pub trap: TrapConfig,
    pub level: LevelTuning,
    pub config_path: Option<PathBuf>,
}

impl GameplayConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: Some(path.into()),
            ..Self::default()
        }
    }

    /// Override values from the INI file. Missing keys keep their current
    /// values.
    pub fn load_from_file(&mut self) -> Result<(), String> {
        let path = self
            .config_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
        let mut config = Ini::new();
        config
            .load(&path)
            .map_err(|e| format!("Failed to load gameplay config file: {}", e))?;

        // [player] section
        let p = &mut self.player_bot;
        read_f32(&config, "player", "movement_speed", &mut p.movement_speed);
        read_f32(&config, "player", "angular_speed", &mut p.angular_speed);
        read_f32(&config, "player", "physics_body_radius", &mut p.physics_body_radius);
        read_f64(&config, "player", "initial_charge", &mut p.initial_charge);
        read_f64(&config, "player", "maximum_charge", &mut p.maximum_charge);
        read_f32(&config, "player", "hit_state_duration", &mut p.hit_state_duration);
        read_f32(&config, "player", "recharge_delay_when_inactive", &mut p.recharge_delay_when_inactive);
        read_f64(&config, "player", "recharge_amount_per_second", &mut p.recharge_amount_per_second);
        read_f32(&config, "player", "appear_duration", &mut p.appear_duration);

        // [taskbot] section
        let t = &mut self.task_bot;
        read_f32(&config, "taskbot", "rules_update_wait_duration", &mut t.rules_update_wait_duration);
        read_f32(&config, "taskbot", "behavior_update_wait_duration", &mut t.behavior_update_wait_duration);
        read_f32(
            &config,
            "taskbot",
            "threshold_proximity_to_patrol_path_start_point",
            &mut t.threshold_proximity_to_patrol_path_start_point,
        );
        read_f32(&config, "taskbot", "maximum_speed_when_good", &mut t.maximum_speed_when_good);
        read_f32(&config, "taskbot", "maximum_speed_when_bad", &mut t.maximum_speed_when_bad);
        read_f32(&config, "taskbot", "maximum_acceleration", &mut t.maximum_acceleration);
        read_f32(&config, "taskbot", "agent_mass", &mut t.agent_mass);
        read_f32(&config, "taskbot", "physics_body_radius", &mut t.physics_body_radius);
        read_f32(&config, "taskbot", "patrol_path_radius", &mut t.patrol_path_radius);
        read_f32(&config, "taskbot", "hunt_path_radius", &mut t.hunt_path_radius);
        read_f32(&config, "taskbot", "return_to_patrol_path_radius", &mut t.return_to_patrol_path_radius);
        read_f32(&config, "taskbot", "pathfinding_graph_buffer_radius", &mut t.pathfinding_graph_buffer_radius);
        read_f32(&config, "taskbot", "pre_attack_state_duration", &mut t.pre_attack_state_duration);
        read_f32(&config, "taskbot", "zapped_state_duration", &mut t.zapped_state_duration);

        // [groundbot] section
        let g = &mut self.ground_bot;
        read_f64(&config, "groundbot", "maximum_charge", &mut g.maximum_charge);
        read_f64(&config, "groundbot", "charge_loss_per_contact", &mut g.charge_loss_per_contact);
        read_f32(&config, "groundbot", "maximum_attack_distance", &mut g.maximum_attack_distance);
        read_f32(&config, "groundbot", "attack_end_proximity", &mut g.attack_end_proximity);
        read_f32(&config, "groundbot", "pre_attack_rotation_speed", &mut g.pre_attack_rotation_speed);
        read_f32(
            &config,
            "groundbot",
            "movement_speed_multiplier_when_attacking",
            &mut g.movement_speed_multiplier_when_attacking,
        );
        read_f32(
            &config,
            "groundbot",
            "angular_speed_multiplier_when_attacking",
            &mut g.angular_speed_multiplier_when_attacking,
        );
        read_f32(&config, "groundbot", "delay_between_attacks", &mut g.delay_between_attacks);

        // [flocking] section
        let f = &mut self.flocking;
        read_f32(&config, "flocking", "separation_radius", &mut f.separation_radius);
        read_f32(&config, "flocking", "separation_angle", &mut f.separation_angle);
        read_f32(&config, "flocking", "separation_weight", &mut f.separation_weight);
        read_f32(&config, "flocking", "alignment_radius", &mut f.alignment_radius);
        read_f32(&config, "flocking", "alignment_angle", &mut f.alignment_angle);
        read_f32(&config, "flocking", "alignment_weight", &mut f.alignment_weight);
        read_f32(&config, "flocking", "cohesion_radius", &mut f.cohesion_radius);
        read_f32(&config, "flocking", "cohesion_angle", &mut f.cohesion_angle);
        read_f32(&config, "flocking", "cohesion_weight", &mut f.cohesion_weight);
        read_f32(
            &config,
            "flocking",
            "agent_search_distance_for_flocking",
            &mut f.agent_search_distance_for_flocking,
        );

        // [moogle] and [trap] sections
        read_f32(&config, "moogle", "physics_body_radius", &mut self.moogle.physics_body_radius);
        read_f32(&config, "trap", "physics_body_radius", &mut self.trap.physics_body_radius);
        read_f64(&config, "trap", "charge_loss_per_contact", &mut self.trap.charge_loss_per_contact);

        // [level] section
        read_f32(&config, "level", "maximum_delta_time", &mut self.level.maximum_delta_time);

        info!(
            "Loaded gameplay config from {}: player speed={}, taskbot speed good/bad={}/{}, attack distance={}",
            path.display(),
            self.player_bot.movement_speed,
            self.task_bot.maximum_speed_when_good,
            self.task_bot.maximum_speed_when_bad,
            self.ground_bot.maximum_attack_distance
        );

        Ok(())
    }
}

fn read_f64(config: &Ini, section: &str, key: &str, target: &mut f64) {
    if let Some(value) = config.getfloat(section, key).ok().flatten() {
        *target = value;
    }
}

fn read_f32(config: &Ini, section: &str, key: &str, target: &mut f32) {
    if let Some(value) = config.getfloat(section, key).ok().flatten() {
        *target = value as f32;
    }
}
