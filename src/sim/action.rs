//! Scheduled node actions
//!
//! Actions are stateful: each one remembers how far it has run. A node's
//! actions are stepped by the scene every tick, and time left over when an
//! action finishes flows into the next step of a sequence.

use glam::Vec2;

use super::texture::Texture;

/// What an action may change on its node
pub struct ActionTarget<'a> {
    pub position: &'a mut Vec2,
    pub texture: Option<&'a mut Texture>,
    /// Set when the node should leave the scene
    pub remove: &'a mut bool,
}

/// Result of stepping an action
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Progress {
    Running,
    /// Finished, with unused time from this step
    Done { leftover: f32 },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Translate by `delta`, linearly, relative to where the node was when the action started
    MoveBy {
        delta: Vec2,
        duration: f32,
        elapsed: f32,
        origin: Option<Vec2>,
    },
    /// Translate to an absolute position
    MoveTo {
        target: Vec2,
        duration: f32,
        elapsed: f32,
        origin: Option<Vec2>,
    },
    Wait { duration: f32, elapsed: f32 },
    /// Show each frame for `time_per_frame`, once, ending on the last frame
    Animate {
        frames: Vec<Texture>,
        time_per_frame: f32,
        elapsed: f32,
    },
    Sequence { steps: Vec<Action>, index: usize },
    RepeatForever {
        template: Box<Action>,
        current: Box<Action>,
    },
    RemoveFromParent,
}

impl Action {
    pub fn move_by(delta: Vec2, duration: f32) -> Self {
        Action::MoveBy {
            delta,
            duration,
            elapsed: 0.0,
            origin: None,
        }
    }

    pub fn move_to(target: Vec2, duration: f32) -> Self {
        Action::MoveTo {
            target,
            duration,
            elapsed: 0.0,
            origin: None,
        }
    }

    pub fn wait(duration: f32) -> Self {
        Action::Wait {
            duration,
            elapsed: 0.0,
        }
    }

    pub fn animate(frames: Vec<Texture>, time_per_frame: f32) -> Self {
        Action::Animate {
            frames,
            time_per_frame,
            elapsed: 0.0,
        }
    }

    pub fn sequence(steps: Vec<Action>) -> Self {
        Action::Sequence { steps, index: 0 }
    }

    pub fn repeat_forever(action: Action) -> Self {
        Action::RepeatForever {
            current: Box::new(action.clone()),
            template: Box::new(action),
        }
    }

    pub fn remove_from_parent() -> Self {
        Action::RemoveFromParent
    }

    /// Total running time (infinite for repeats)
    pub fn duration(&self) -> f32 {
        match self {
            Action::MoveBy { duration, .. }
            | Action::MoveTo { duration, .. }
            | Action::Wait { duration, .. } => *duration,
            Action::Animate {
                frames,
                time_per_frame,
                ..
            } => frames.len() as f32 * time_per_frame,
            Action::Sequence { steps, .. } => steps.iter().map(Action::duration).sum(),
            Action::RepeatForever { .. } => f32::INFINITY,
            Action::RemoveFromParent => 0.0,
        }
    }

    /// Advance by `dt` seconds
    pub fn step(&mut self, target: &mut ActionTarget<'_>, dt: f32) -> Progress {
        match self {
            Action::MoveBy {
                delta,
                duration,
                elapsed,
                origin,
            } => {
                let start = *origin.get_or_insert(*target.position);
                *elapsed += dt;
                if *elapsed >= *duration {
                    *target.position = start + *delta;
                    Progress::Done {
                        leftover: *elapsed - *duration,
                    }
                } else {
                    *target.position = start + *delta * (*elapsed / *duration);
                    Progress::Running
                }
            }

            Action::MoveTo {
                target: end,
                duration,
                elapsed,
                origin,
            } => {
                let start = *origin.get_or_insert(*target.position);
                *elapsed += dt;
                if *elapsed >= *duration {
                    *target.position = *end;
                    Progress::Done {
                        leftover: *elapsed - *duration,
                    }
                } else {
                    *target.position = start.lerp(*end, *elapsed / *duration);
                    Progress::Running
                }
            }

            Action::Wait { duration, elapsed } => {
                *elapsed += dt;
                if *elapsed >= *duration {
                    Progress::Done {
                        leftover: *elapsed - *duration,
                    }
                } else {
                    Progress::Running
                }
            }

            Action::Animate {
                frames,
                time_per_frame,
                elapsed,
            } => {
                if frames.is_empty() {
                    return Progress::Done { leftover: dt };
                }
                *elapsed += dt;
                let total = frames.len() as f32 * *time_per_frame;
                let frame = ((*elapsed / *time_per_frame) as usize).min(frames.len() - 1);
                if let Some(texture) = target.texture.as_deref_mut() {
                    *texture = frames[frame];
                }
                if *elapsed >= total {
                    Progress::Done {
                        leftover: *elapsed - total,
                    }
                } else {
                    Progress::Running
                }
            }

            Action::Sequence { steps, index } => {
                let mut remaining = dt;
                while let Some(step) = steps.get_mut(*index) {
                    match step.step(target, remaining) {
                        Progress::Running => return Progress::Running,
                        Progress::Done { leftover } => {
                            *index += 1;
                            remaining = leftover;
                            if *target.remove {
                                break;
                            }
                        }
                    }
                }
                Progress::Done {
                    leftover: remaining,
                }
            }

            Action::RepeatForever { template, current } => {
                // A zero-length cycle runs once per step instead of spinning
                let cycle = template.duration();
                let mut remaining = dt;
                loop {
                    match current.step(target, remaining) {
                        Progress::Running => return Progress::Running,
                        Progress::Done { leftover } => {
                            **current = (**template).clone();
                            if cycle <= 0.0 || leftover <= 0.0 || *target.remove {
                                return Progress::Running;
                            }
                            remaining = leftover;
                        }
                    }
                }
            }

            Action::RemoveFromParent => {
                *target.remove = true;
                Progress::Done { leftover: dt }
            }
        }
    }
}
