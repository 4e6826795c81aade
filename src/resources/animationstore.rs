//! Animation resource registry.
//!
//! Clip tables are built once per [`AnimationSet`] from texture atlases and
//! shared by every entity of that kind through `Arc`. The store has an
//! explicit lifecycle: [`AnimationStore::needs_loading`] tells the loader
//! which sets are missing, [`AnimationStore::insert`] publishes a loaded set
//! and [`AnimationStore::purge`] drops it again.
//!
//! Texture names inside an atlas follow `{identifier}_{direction}_{frame}`,
//! where `direction` is the raw [`CompassDirection`] index.

use std::path::Path;
use std::sync::Arc;

use bevy_ecs::prelude::Resource;
use rustc_hash::FxHashMap;
use serde::Deserialize;
use thiserror::Error;

use crate::components::animation::{AnimationClip, AnimationState, AnimationTable};
use crate::components::entitykind::EntityKind;
use crate::components::orientation::CompassDirection;

#[derive(Debug, Error)]
pub enum AnimationLoadError {
    #[error("failed to read texture atlas manifest: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse texture atlas manifest: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("texture atlas `{0}` could not be found")]
    MissingAtlas(String),
}

/// Group of animations shared by one kind of entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnimationSet {
    PlayerBot,
    GroundBot,
    Moogle,
    Trap,
}

impl AnimationSet {
    pub const ALL: [AnimationSet; 4] = [
        AnimationSet::PlayerBot,
        AnimationSet::GroundBot,
        AnimationSet::Moogle,
        AnimationSet::Trap,
    ];

    /// Set whose clips an entity of `kind` plays.
    pub fn for_kind(kind: EntityKind) -> Self {
        match kind {
            EntityKind::PlayerBot => AnimationSet::PlayerBot,
            EntityKind::TaskBot => AnimationSet::GroundBot,
            EntityKind::Moogle => AnimationSet::Moogle,
            EntityKind::Trap => AnimationSet::Trap,
        }
    }

    pub fn atlas_names(self) -> &'static [&'static str] {
        match self {
            AnimationSet::PlayerBot => &[
                "PlayerBotIdle",
                "PlayerBotWalk",
                "PlayerBotInactive",
                "PlayerBotHit",
            ],
            AnimationSet::GroundBot => &[
                "GroundBotGoodWalk",
                "GroundBotBadWalk",
                "GroundBotAttack",
                "GroundBotZapped",
            ],
            AnimationSet::Moogle => &["Moogle"],
            AnimationSet::Trap => &["Trap"],
        }
    }
}

/// Texture names per atlas, as produced by the asset pipeline.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct TextureAtlases {
    pub atlases: FxHashMap<String, Vec<String>>,
}

impl TextureAtlases {
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, AnimationLoadError> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    pub fn atlas(&self, name: &str) -> Result<&[String], AnimationLoadError> {
        self.atlases
            .get(name)
            .map(Vec::as_slice)
            .ok_or_else(|| AnimationLoadError::MissingAtlas(name.to_string()))
    }

    /// Atlases with one texture per frame for every direction, named after
    /// each identifier of every set. Useful when no asset manifest exists.
    pub fn placeholder(frames: usize) -> Self {
        let mut atlases = FxHashMap::default();
        for set in AnimationSet::ALL {
            for name in set.atlas_names() {
                let textures = CompassDirection::ALL
                    .iter()
                    .flat_map(|direction| {
                        (0..frames).map(move |frame| format!("{}_{}_{:04}", name, direction.raw(), frame))
                    })
                    .collect();
                atlases.insert(name.to_string(), textures);
            }
        }
        Self { atlases }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ClipOptions {
    pub body_action: Option<&'static str>,
    pub shadow_action: Option<&'static str>,
    pub play_once: bool,
    pub play_backwards: bool,
}

fn direction_textures(atlas: &[String], identifier: &str, direction: CompassDirection) -> Vec<String> {
    let prefix = format!("{}_{}_", identifier, direction.raw());
    let mut names: Vec<String> = atlas
        .iter()
        .filter(|name| name.starts_with(&prefix))
        .cloned()
        .collect();
    names.sort();
    names
}

/// One clip per compass direction that has textures in `atlas`.
pub fn animations_from_atlas(
    atlas: &[String],
    identifier: &str,
    state: AnimationState,
    options: &ClipOptions,
) -> FxHashMap<CompassDirection, AnimationClip> {
    let mut clips = FxHashMap::default();
    for direction in CompassDirection::ALL {
        let mut names = direction_textures(atlas, identifier, direction);
        if names.is_empty() {
            continue;
        }
        if options.play_backwards {
            names.reverse();
        }
        clips.insert(
            direction,
            AnimationClip {
                animation_state: state,
                compass_direction: direction,
                textures: names.into_iter().map(Arc::from).collect(),
                frame_offset: 0,
                repeat_textures_forever: !options.play_once,
                body_action: options.body_action.map(Arc::from),
                shadow_action: options.shadow_action.map(Arc::from),
            },
        );
    }
    clips
}

pub fn first_texture_for_orientation(
    atlas: &[String],
    identifier: &str,
    direction: CompassDirection,
) -> Option<Arc<str>> {
    direction_textures(atlas, identifier, direction)
        .into_iter()
        .next()
        .map(Arc::from)
}

/// Everything loaded for one [`AnimationSet`].
#[derive(Debug, Clone, Default)]
pub struct AnimationAssets {
    pub animations: Arc<AnimationTable>,
    /// Second table for kinds that swap appearance (bad ground bots).
    pub bad_animations: Option<Arc<AnimationTable>>,
    /// Static texture shown while the body is hidden.
    pub appear_textures: FxHashMap<CompassDirection, Arc<str>>,
}

impl AnimationAssets {
    pub fn appear_texture(&self, direction: CompassDirection) -> Option<Arc<str>> {
        self.appear_textures.get(&direction).cloned()
    }
}

fn appear_textures(atlas: &[String], identifier: &str) -> FxHashMap<CompassDirection, Arc<str>> {
    CompassDirection::ALL
        .iter()
        .filter_map(|direction| {
            first_texture_for_orientation(atlas, identifier, *direction).map(|texture| (*direction, texture))
        })
        .collect()
}

/// Build the clip tables of `set` from `atlases`.
pub fn load_animation_set(
    set: AnimationSet,
    atlases: &TextureAtlases,
) -> Result<AnimationAssets, AnimationLoadError> {
    let defaults = ClipOptions::default();
    let mut assets = AnimationAssets::default();
    let mut table = AnimationTable::default();

    match set {
        AnimationSet::PlayerBot => {
            let idle = atlases.atlas("PlayerBotIdle")?;
            let walk = atlases.atlas("PlayerBotWalk")?;
            let inactive = atlases.atlas("PlayerBotInactive")?;
            let hit = atlases.atlas("PlayerBotHit")?;
            assets.appear_textures = appear_textures(idle, "PlayerBotIdle");
            table.insert(
                AnimationState::Idle,
                animations_from_atlas(idle, "PlayerBotIdle", AnimationState::Idle, &defaults),
            );
            table.insert(
                AnimationState::WalkForward,
                animations_from_atlas(walk, "PlayerBotWalk", AnimationState::WalkForward, &defaults),
            );
            table.insert(
                AnimationState::WalkBackward,
                animations_from_atlas(
                    walk,
                    "PlayerBotWalk",
                    AnimationState::WalkBackward,
                    &ClipOptions {
                        play_backwards: true,
                        ..ClipOptions::default()
                    },
                ),
            );
            table.insert(
                AnimationState::Inactive,
                animations_from_atlas(inactive, "PlayerBotInactive", AnimationState::Inactive, &defaults),
            );
            table.insert(
                AnimationState::Hit,
                animations_from_atlas(
                    hit,
                    "PlayerBotHit",
                    AnimationState::Hit,
                    &ClipOptions {
                        play_once: true,
                        ..ClipOptions::default()
                    },
                ),
            );
        }
        AnimationSet::GroundBot => {
            let good_walk = atlases.atlas("GroundBotGoodWalk")?;
            let bad_walk = atlases.atlas("GroundBotBadWalk")?;
            let attack = atlases.atlas("GroundBotAttack")?;
            let zapped = atlases.atlas("GroundBotZapped")?;
            table.insert(
                AnimationState::WalkForward,
                animations_from_atlas(good_walk, "GroundBotGoodWalk", AnimationState::WalkForward, &defaults),
            );

            let mut bad = AnimationTable::default();
            bad.insert(
                AnimationState::WalkForward,
                animations_from_atlas(bad_walk, "GroundBotBadWalk", AnimationState::WalkForward, &defaults),
            );
            bad.insert(
                AnimationState::Attack,
                animations_from_atlas(
                    attack,
                    "GroundBotAttack",
                    AnimationState::Attack,
                    &ClipOptions {
                        body_action: Some("ZappedShake"),
                        shadow_action: Some("ZappedShadowShake"),
                        play_once: true,
                        ..ClipOptions::default()
                    },
                ),
            );
            bad.insert(
                AnimationState::Zapped,
                animations_from_atlas(
                    zapped,
                    "GroundBotZapped",
                    AnimationState::Zapped,
                    &ClipOptions {
                        body_action: Some("ZappedShake"),
                        shadow_action: Some("ZappedShadowShake"),
                        ..ClipOptions::default()
                    },
                ),
            );
            assets.bad_animations = Some(Arc::new(bad));
        }
        AnimationSet::Moogle | AnimationSet::Trap => {
            let identifier = if set == AnimationSet::Moogle { "Moogle" } else { "Trap" };
            let atlas = atlases.atlas(identifier)?;
            assets.appear_textures = appear_textures(atlas, identifier);
            table.insert(
                AnimationState::Idle,
                animations_from_atlas(atlas, identifier, AnimationState::Idle, &defaults),
            );
        }
    }

    assets.animations = Arc::new(table);
    Ok(assets)
}

/// Central registry of loaded animation sets.
#[derive(Resource, Debug, Default)]
pub struct AnimationStore {
    sets: FxHashMap<AnimationSet, AnimationAssets>,
}

impl AnimationStore {
    pub fn needs_loading(&self, set: AnimationSet) -> bool {
        !self.sets.contains_key(&set)
    }

    pub fn insert(&mut self, set: AnimationSet, assets: AnimationAssets) {
        self.sets.insert(set, assets);
    }

    pub fn purge(&mut self, set: AnimationSet) {
        self.sets.remove(&set);
    }

    pub fn get(&self, set: AnimationSet) -> Option<&AnimationAssets> {
        self.sets.get(&set)
    }

    pub fn all_loaded(&self) -> bool {
        AnimationSet::ALL.iter().all(|set| !self.needs_loading(*set))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn atlas(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn clips_group_textures_by_direction_prefix() {
        let textures = atlas(&[
            "Walk_1_0001",
            "Walk_0_0001",
            "Walk_0_0000",
            "Walk_10_0000",
            "Walk_1_0000",
        ]);
        let clips = animations_from_atlas(
            &textures,
            "Walk",
            AnimationState::WalkForward,
            &ClipOptions::default(),
        );
        let east = &clips[&CompassDirection::East];
        assert_eq!(east.len(), 2);
        assert_eq!(&*east.textures[0], "Walk_0_0000");
        assert_eq!(clips[&CompassDirection::from_raw(1)].len(), 2);
        assert_eq!(clips[&CompassDirection::from_raw(10)].len(), 1);
        assert!(!clips.contains_key(&CompassDirection::from_raw(2)));
    }

    #[test]
    fn backwards_clips_reverse_texture_order() {
        let textures = atlas(&["Walk_0_0000", "Walk_0_0001", "Walk_0_0002"]);
        let clips = animations_from_atlas(
            &textures,
            "Walk",
            AnimationState::WalkBackward,
            &ClipOptions {
                play_backwards: true,
                ..ClipOptions::default()
            },
        );
        assert_eq!(&*clips[&CompassDirection::East].textures[0], "Walk_0_0002");
    }

    #[test]
    fn store_lifecycle() {
        let atlases = TextureAtlases::placeholder(3);
        let mut store = AnimationStore::default();
        assert!(store.needs_loading(AnimationSet::GroundBot));

        let assets = load_animation_set(AnimationSet::GroundBot, &atlases).unwrap();
        assert!(assets.bad_animations.is_some());
        store.insert(AnimationSet::GroundBot, assets);
        assert!(!store.needs_loading(AnimationSet::GroundBot));
        assert!(!store.all_loaded());

        store.purge(AnimationSet::GroundBot);
        assert!(store.needs_loading(AnimationSet::GroundBot));
    }

    #[test]
    fn missing_atlas_is_reported() {
        let atlases = TextureAtlases::default();
        let error = load_animation_set(AnimationSet::Trap, &atlases).unwrap_err();
        assert!(matches!(error, AnimationLoadError::MissingAtlas(name) if name == "Trap"));
    }
}
