//! Logical animation states and the per-entity animation component.
//!
//! An [`AnimationClip`] is the immutable description of one
//! (state, compass direction) pair: its texture sequence, whether it loops and
//! which body/shadow side-effect actions run alongside it. Clips are grouped
//! in an [`AnimationTable`] that the owning entity receives at construction.
//!
//! The [`Animation`] component works in two steps each tick:
//! 1. [`Animation::update`] consumes the one-shot `requested_state` and
//!    switches clips, resuming a same-state clip mid-cycle.
//! 2. [`Animation::advance_playback`] steps the active texture sequence at
//!    [`TIME_PER_FRAME`] and reports the texture to show.

use bevy_ecs::prelude::Component;
use log::warn;
use rustc_hash::FxHashMap;
use std::sync::Arc;

use crate::components::orientation::CompassDirection;

/// Seconds each texture of a clip stays on screen.
pub const TIME_PER_FRAME: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnimationState {
    Idle,
    WalkForward,
    WalkBackward,
    PreAttack,
    Attack,
    Zapped,
    Hit,
    Inactive,
}

impl AnimationState {
    /// Locomotion states may be replaced by movement; anything else is an
    /// override that movement must not clobber. An absent state is free.
    pub fn can_be_overwritten(state: Option<AnimationState>) -> bool {
        matches!(
            state,
            None | Some(AnimationState::Idle)
                | Some(AnimationState::WalkForward)
                | Some(AnimationState::WalkBackward)
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnimationClip {
    pub animation_state: AnimationState,
    pub compass_direction: CompassDirection,
    pub textures: Arc<[Arc<str>]>,
    /// Index of the texture playback starts from.
    pub frame_offset: usize,
    pub repeat_textures_forever: bool,
    pub body_action: Option<Arc<str>>,
    pub shadow_action: Option<Arc<str>>,
}

impl AnimationClip {
    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    /// Texture at `frame` of the sequence rotated to start at `frame_offset`.
    pub fn offset_texture(&self, frame: usize) -> Option<&Arc<str>> {
        if self.textures.is_empty() {
            return None;
        }
        self.textures.get((self.frame_offset + frame) % self.textures.len())
    }
}

/// Clips by logical state, then by facing.
pub type AnimationTable = FxHashMap<AnimationState, FxHashMap<CompassDirection, AnimationClip>>;

#[derive(Component, Clone, Debug)]
pub struct Animation {
    /// One-shot request, consumed by the next animation stage.
    pub requested_state: Option<AnimationState>,
    table: Arc<AnimationTable>,
    current: Option<AnimationClip>,
    /// Time accumulated on ticks that carried a request since the current
    /// clip started.
    elapsed_animation_duration: f32,
    /// Index into the offset texture sequence.
    frame_index: usize,
    /// Time spent on `frame_index`.
    frame_time: f32,
    body_action: Option<Arc<str>>,
    shadow_action: Option<Arc<str>>,
    body_action_starts: u32,
    shadow_action_starts: u32,
}

impl Animation {
    pub fn new(table: Arc<AnimationTable>) -> Self {
        Self {
            requested_state: None,
            table,
            current: None,
            elapsed_animation_duration: 0.0,
            frame_index: 0,
            frame_time: 0.0,
            body_action: None,
            shadow_action: None,
            body_action_starts: 0,
            shadow_action_starts: 0,
        }
    }

    pub fn table(&self) -> &Arc<AnimationTable> {
        &self.table
    }

    /// Swap the clip table (good/bad task bot appearance). The current clip
    /// keeps playing until the next request.
    pub fn set_table(&mut self, table: Arc<AnimationTable>) {
        self.table = table;
    }

    pub fn current(&self) -> Option<&AnimationClip> {
        self.current.as_ref()
    }

    pub fn current_state(&self) -> Option<AnimationState> {
        self.current.as_ref().map(|clip| clip.animation_state)
    }

    pub fn request(&mut self, state: AnimationState) {
        self.requested_state = Some(state);
    }

    /// Request `state` only if neither the playing clip nor a pending request
    /// is an override state.
    pub fn propose(&mut self, state: AnimationState) {
        if AnimationState::can_be_overwritten(self.current_state())
            && AnimationState::can_be_overwritten(self.requested_state)
        {
            self.requested_state = Some(state);
        }
    }

    pub fn body_action(&self) -> Option<&Arc<str>> {
        self.body_action.as_ref()
    }

    pub fn shadow_action(&self) -> Option<&Arc<str>> {
        self.shadow_action.as_ref()
    }

    /// How many times a body action was (re)started.
    pub fn body_action_starts(&self) -> u32 {
        self.body_action_starts
    }

    pub fn shadow_action_starts(&self) -> u32 {
        self.shadow_action_starts
    }

    pub fn frame_index(&self) -> usize {
        self.frame_index
    }

    /// Consume the pending request for an entity facing `direction`.
    pub fn update(&mut self, direction: CompassDirection, dt: f32) {
        if let Some(state) = self.requested_state.take() {
            self.run(state, direction, dt);
        }
    }

    fn run(&mut self, state: AnimationState, direction: CompassDirection, dt: f32) {
        self.elapsed_animation_duration += dt;

        if let Some(current) = self.current.as_ref() {
            if current.animation_state == state && current.compass_direction == direction {
                return;
            }
        }

        let Some(mut clip) = self
            .table
            .get(&state)
            .and_then(|by_direction| by_direction.get(&direction))
            .cloned()
        else {
            warn!(
                "Unknown animation for state {:?}, compass direction {:?}.",
                state, direction
            );
            return;
        };

        let previous = self.current.take();

        if previous.as_ref().and_then(|c| c.body_action.clone()) != clip.body_action {
            self.body_action = clip.body_action.clone();
            if self.body_action.is_some() {
                self.body_action_starts += 1;
            }
        }
        if previous.as_ref().and_then(|c| c.shadow_action.clone()) != clip.shadow_action {
            self.shadow_action = clip.shadow_action.clone();
            if self.shadow_action.is_some() {
                self.shadow_action_starts += 1;
            }
        }

        if clip.len() > 1 {
            if let Some(previous) = previous.as_ref() {
                if previous.animation_state == state && !previous.is_empty() {
                    let frames_played = (self.elapsed_animation_duration / TIME_PER_FRAME) as usize;
                    clip.frame_offset =
                        (previous.frame_offset + frames_played + 1) % previous.len();
                }
            }
        }

        self.current = Some(clip);
        self.frame_index = 0;
        self.frame_time = 0.0;
        self.elapsed_animation_duration = 0.0;
    }

    /// Texture currently on screen, then step playback forward by `dt`.
    pub fn advance_playback(&mut self, dt: f32) -> Option<Arc<str>> {
        let clip = self.current.as_ref()?;
        let texture = clip.offset_texture(self.frame_index).cloned();
        if clip.len() <= 1 {
            return texture;
        }

        self.frame_time += dt;
        while self.frame_time >= TIME_PER_FRAME {
            self.frame_time -= TIME_PER_FRAME;
            self.frame_index += 1;
            if self.frame_index >= clip.len() {
                if clip.repeat_textures_forever {
                    self.frame_index = 0;
                } else {
                    self.frame_index = clip.len() - 1;
                    self.frame_time = 0.0;
                    break;
                }
            }
        }
        texture
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clip(state: AnimationState, direction: CompassDirection, frames: usize) -> AnimationClip {
        AnimationClip {
            animation_state: state,
            compass_direction: direction,
            textures: (0..frames)
                .map(|i| Arc::from(format!("tex_{:02}_{:04}", direction.raw(), i)))
                .collect(),
            frame_offset: 0,
            repeat_textures_forever: true,
            body_action: None,
            shadow_action: None,
        }
    }

    fn table(clips: Vec<AnimationClip>) -> Arc<AnimationTable> {
        let mut table = AnimationTable::default();
        for clip in clips {
            table
                .entry(clip.animation_state)
                .or_default()
                .insert(clip.compass_direction, clip);
        }
        Arc::new(table)
    }

    #[test]
    fn request_is_consumed_once() {
        let mut animation = Animation::new(table(vec![clip(
            AnimationState::Idle,
            CompassDirection::East,
            4,
        )]));
        animation.request(AnimationState::Idle);
        animation.update(CompassDirection::East, 0.016);
        assert_eq!(animation.requested_state, None);
        assert_eq!(animation.current_state(), Some(AnimationState::Idle));
    }

    #[test]
    fn missing_clip_keeps_previous_visual() {
        let mut animation = Animation::new(table(vec![clip(
            AnimationState::Idle,
            CompassDirection::East,
            4,
        )]));
        animation.request(AnimationState::Idle);
        animation.update(CompassDirection::East, 0.016);
        animation.request(AnimationState::Hit);
        animation.update(CompassDirection::East, 0.016);
        assert_eq!(animation.current_state(), Some(AnimationState::Idle));
        assert_eq!(animation.requested_state, None);
    }

    #[test]
    fn propose_does_not_override_protected_states() {
        let mut animation = Animation::new(table(vec![clip(
            AnimationState::Attack,
            CompassDirection::East,
            4,
        )]));
        animation.request(AnimationState::Attack);
        animation.update(CompassDirection::East, 0.016);
        animation.propose(AnimationState::WalkForward);
        assert_eq!(animation.requested_state, None);

        let mut fresh = Animation::new(Arc::new(AnimationTable::default()));
        fresh.request(AnimationState::Hit);
        fresh.propose(AnimationState::Idle);
        assert_eq!(fresh.requested_state, Some(AnimationState::Hit));
    }

    #[test]
    fn same_body_action_is_not_restarted() {
        let mut east = clip(AnimationState::Zapped, CompassDirection::East, 3);
        east.body_action = Some(Arc::from("ZappedShake"));
        let mut north = clip(AnimationState::Zapped, CompassDirection::North, 3);
        north.body_action = Some(Arc::from("ZappedShake"));
        let mut animation = Animation::new(table(vec![east, north]));

        animation.request(AnimationState::Zapped);
        animation.update(CompassDirection::East, 0.016);
        assert_eq!(animation.body_action_starts(), 1);
        animation.request(AnimationState::Zapped);
        animation.update(CompassDirection::North, 0.016);
        assert_eq!(animation.body_action_starts(), 1);
        assert_eq!(animation.body_action().map(|a| &**a), Some("ZappedShake"));
    }

    #[test]
    fn looping_playback_wraps_and_one_shot_holds_last_frame() {
        let mut looping = Animation::new(table(vec![clip(
            AnimationState::WalkForward,
            CompassDirection::East,
            3,
        )]));
        looping.request(AnimationState::WalkForward);
        looping.update(CompassDirection::East, 0.0);
        let shown: Vec<usize> = (0..4)
            .map(|_| {
                let index = looping.frame_index();
                looping.advance_playback(0.125);
                index
            })
            .collect();
        assert_eq!(shown, vec![0, 1, 2, 0]);

        let mut once = clip(AnimationState::Attack, CompassDirection::East, 3);
        once.repeat_textures_forever = false;
        let mut one_shot = Animation::new(table(vec![once]));
        one_shot.request(AnimationState::Attack);
        one_shot.update(CompassDirection::East, 0.0);
        for _ in 0..10 {
            one_shot.advance_playback(0.125);
        }
        assert_eq!(one_shot.frame_index(), 2);
    }

    #[test]
    fn single_frame_clip_shows_static_texture() {
        let mut animation = Animation::new(table(vec![clip(
            AnimationState::Inactive,
            CompassDirection::East,
            1,
        )]));
        animation.request(AnimationState::Inactive);
        animation.update(CompassDirection::East, 0.0);
        for _ in 0..5 {
            let texture = animation.advance_playback(0.5);
            assert_eq!(texture.as_deref(), Some("tex_00_0000"));
        }
    }
}
