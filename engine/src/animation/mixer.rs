//! Action mixer
//!
//! Weight-only animation playback: named actions with a duration, a loop
//! flag, a play head and a blend weight. No skinning happens here; a renderer
//! reads the weights and times. Cross-fades ramp the outgoing weight to zero
//! and the incoming weight to one over the same window.

use std::collections::HashMap;

/// Handle to a registered action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActionId(pub usize);

/// The interface the state machine drives.
pub trait AnimationPlayer {
    /// Register a clip. Looping actions wrap; one-shots clamp on their last frame.
    fn register(&mut self, name: &str, duration: f32, looping: bool) -> ActionId;

    /// Start `id` at full weight and silence every other action.
    fn play(&mut self, id: ActionId);

    /// Fade `from` out and `to` in over `duration` seconds. `to` restarts.
    fn cross_fade(&mut self, from: Option<ActionId>, to: ActionId, duration: f32);

    fn weight(&self, id: ActionId) -> f32;

    /// Advance time. Returns the one-shot actions that finished this step.
    fn update(&mut self, dt: f32) -> Vec<ActionId>;
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Fade {
    from: f32,
    to: f32,
    elapsed: f32,
    duration: f32,
}

impl Fade {
    fn weight(&self) -> f32 {
        let t = (self.elapsed / self.duration).clamp(0.0, 1.0);
        self.from + (self.to - self.from) * t
    }

    fn is_done(&self) -> bool {
        self.elapsed >= self.duration
    }
}

#[derive(Debug, Clone)]
struct Action {
    name: String,
    duration: f32,
    looping: bool,
    time: f32,
    weight: f32,
    playing: bool,
    finished: bool,
    fade: Option<Fade>,
}

impl Action {
    fn stop(&mut self) {
        self.weight = 0.0;
        self.playing = false;
        self.fade = None;
    }

    fn restart(&mut self) {
        self.time = 0.0;
        self.finished = false;
        self.playing = true;
    }
}

/// In-memory [`AnimationPlayer`].
#[derive(Debug, Clone, Default)]
pub struct ActionMixer {
    actions: Vec<Action>,
    by_name: HashMap<String, ActionId>,
}

impl ActionMixer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn find(&self, name: &str) -> Option<ActionId> {
        self.by_name.get(name).copied()
    }

    pub fn name(&self, id: ActionId) -> Option<&str> {
        self.actions.get(id.0).map(|a| a.name.as_str())
    }

    /// Play head in seconds.
    pub fn time(&self, id: ActionId) -> f32 {
        self.actions.get(id.0).map_or(0.0, |a| a.time)
    }

    pub fn is_playing(&self, id: ActionId) -> bool {
        self.actions.get(id.0).is_some_and(|a| a.playing)
    }

    pub fn is_fading(&self) -> bool {
        self.actions.iter().any(|a| a.fade.is_some())
    }

    /// Actions with a nonzero weight.
    pub fn active(&self) -> impl Iterator<Item = (ActionId, f32)> + '_ {
        self.actions
            .iter()
            .enumerate()
            .filter(|(_, a)| a.weight > 0.0)
            .map(|(i, a)| (ActionId(i), a.weight))
    }
}

impl AnimationPlayer for ActionMixer {
    fn register(&mut self, name: &str, duration: f32, looping: bool) -> ActionId {
        if let Some(id) = self.find(name) {
            return id;
        }
        let id = ActionId(self.actions.len());
        self.actions.push(Action {
            name: name.to_string(),
            duration: duration.max(0.0),
            looping,
            time: 0.0,
            weight: 0.0,
            playing: false,
            finished: false,
            fade: None,
        });
        self.by_name.insert(name.to_string(), id);
        id
    }

    fn play(&mut self, id: ActionId) {
        if id.0 >= self.actions.len() {
            return;
        }
        for (i, action) in self.actions.iter_mut().enumerate() {
            if i == id.0 {
                action.restart();
                action.weight = 1.0;
                action.fade = None;
            } else {
                action.stop();
            }
        }
    }

    fn cross_fade(&mut self, from: Option<ActionId>, to: ActionId, duration: f32) {
        if to.0 >= self.actions.len() {
            return;
        }
        let from = from.filter(|f| *f != to && f.0 < self.actions.len());
        if duration <= 0.0 || from.is_none() {
            self.play(to);
            return;
        }

        for (i, action) in self.actions.iter_mut().enumerate() {
            if i == to.0 {
                action.restart();
                action.fade = Some(Fade {
                    from: 0.0,
                    to: 1.0,
                    elapsed: 0.0,
                    duration,
                });
                action.weight = 0.0;
            } else if Some(ActionId(i)) == from {
                action.fade = Some(Fade {
                    from: action.weight,
                    to: 0.0,
                    elapsed: 0.0,
                    duration,
                });
            } else {
                action.stop();
            }
        }
    }

    fn weight(&self, id: ActionId) -> f32 {
        self.actions.get(id.0).map_or(0.0, |a| a.weight)
    }

    fn update(&mut self, dt: f32) -> Vec<ActionId> {
        let mut finished = Vec::new();
        for (i, action) in self.actions.iter_mut().enumerate() {
            if !action.playing {
                continue;
            }

            if let Some(fade) = action.fade.as_mut() {
                fade.elapsed += dt;
                action.weight = fade.weight();
                if fade.is_done() {
                    action.fade = None;
                    if action.weight <= 0.0 {
                        action.stop();
                        continue;
                    }
                }
            }

            if action.looping {
                if action.duration > 0.0 {
                    action.time = (action.time + dt) % action.duration;
                }
            } else if !action.finished {
                action.time += dt;
                if action.time >= action.duration {
                    action.time = action.duration;
                    action.finished = true;
                    finished.push(ActionId(i));
                }
            }
        }
        finished
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mixer() -> (ActionMixer, ActionId, ActionId, ActionId) {
        let mut mixer = ActionMixer::new();
        let idle = mixer.register("Idle", 2.0, true);
        let walk = mixer.register("Walking", 1.0, true);
        let jump = mixer.register("Jumping", 0.8, false);
        (mixer, idle, walk, jump)
    }

    #[test]
    fn test_register_is_idempotent_by_name() {
        let (mut mixer, idle, _, _) = mixer();
        assert_eq!(mixer.register("Idle", 5.0, false), idle);
        assert_eq!(mixer.len(), 3);
        assert_eq!(mixer.name(idle), Some("Idle"));
    }

    #[test]
    fn test_play_silences_others() {
        let (mut mixer, idle, walk, _) = mixer();
        mixer.play(idle);
        mixer.play(walk);
        assert_eq!(mixer.weight(walk), 1.0);
        assert_eq!(mixer.weight(idle), 0.0);
        assert_eq!(mixer.active().count(), 1);
    }

    #[test]
    fn test_cross_fade_midpoint_and_end() {
        let (mut mixer, idle, walk, _) = mixer();
        mixer.play(idle);
        mixer.cross_fade(Some(idle), walk, 0.18);

        mixer.update(0.09);
        assert!((mixer.weight(idle) - 0.5).abs() < 1e-4);
        assert!((mixer.weight(walk) - 0.5).abs() < 1e-4);
        assert_eq!(mixer.active().count(), 2);

        mixer.update(0.09);
        assert!(mixer.weight(idle).abs() < 1e-4);
        assert!((mixer.weight(walk) - 1.0).abs() < 1e-4);

        mixer.update(0.01);
        assert_eq!(mixer.active().count(), 1);
        assert!(!mixer.is_fading());
    }

    #[test]
    fn test_new_fade_interrupts_old() {
        let (mut mixer, idle, walk, jump) = mixer();
        mixer.play(idle);
        mixer.cross_fade(Some(idle), walk, 0.2);
        mixer.update(0.1);
        mixer.cross_fade(Some(walk), jump, 0.2);
        assert_eq!(mixer.weight(idle), 0.0);
        assert!(!mixer.is_playing(idle));
        assert!((mixer.weight(walk) - 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_looping_wraps() {
        let (mut mixer, _, walk, _) = mixer();
        mixer.play(walk);
        assert!(mixer.update(1.25).is_empty());
        assert!((mixer.time(walk) - 0.25).abs() < 1e-5);
    }

    #[test]
    fn test_one_shot_clamps_and_reports_once() {
        let (mut mixer, _, _, jump) = mixer();
        mixer.play(jump);
        assert!(mixer.update(0.5).is_empty());
        assert_eq!(mixer.update(0.5), vec![jump]);
        assert_eq!(mixer.time(jump), 0.8);
        assert!(mixer.update(0.5).is_empty());
        // Clamped on the last frame, still weighted
        assert_eq!(mixer.weight(jump), 1.0);
    }

    #[test]
    fn test_cross_fade_without_source_snaps() {
        let (mut mixer, idle, _, _) = mixer();
        mixer.cross_fade(None, idle, 0.18);
        assert_eq!(mixer.weight(idle), 1.0);
    }
}
