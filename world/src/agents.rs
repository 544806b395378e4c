//! Robot state and the per-kind behaviour carried on each robot.

use glam::DVec2;
use rand::Rng;
use robot_arena_core::{
    AgentId, AgentKind, AgentSnapshot, Direction, EvasionPhase, Heading, ObstacleId,
};
use serde::{Deserialize, Serialize};

/// Ticks an avoider keeps its sideways heading after clearing an obstacle.
pub const EVASION_COOLDOWN_TICKS: u32 = 5;

/// Sideways turn applied while evading, in compass steps.
const EVASION_TURN: i32 = 2;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct Agent {
    id: AgentId,
    position: DVec2,
    radius: f64,
    speed: f64,
    behavior: Behavior,
}

/// Kind-specific state. The variant doubles as the kind tag.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) enum Behavior {
    Normal { heading: Direction },
    Weak { heading: Direction },
    Avoider { heading: Direction, evasion: Evasion },
    Beam { angle: f64, beam_end: DVec2 },
}

impl Agent {
    pub(crate) fn spawn<R: Rng + ?Sized>(
        id: AgentId,
        kind: AgentKind,
        position: DVec2,
        rng: &mut R,
    ) -> Self {
        let heading = Direction::random(rng);
        let radius = kind.radius();
        let behavior = match kind {
            AgentKind::Normal => Behavior::Normal { heading },
            AgentKind::Weak => Behavior::Weak { heading },
            AgentKind::Avoider => Behavior::Avoider {
                heading,
                evasion: Evasion::Normal,
            },
            AgentKind::Beam => {
                let angle = heading.radians();
                Behavior::Beam {
                    angle,
                    beam_end: beam_tip(position, radius, angle),
                }
            }
        };
        Self {
            id,
            position,
            radius,
            speed: kind.speed(),
            behavior,
        }
    }

    pub(crate) const fn id(&self) -> AgentId {
        self.id
    }

    pub(crate) const fn position(&self) -> DVec2 {
        self.position
    }

    pub(crate) const fn radius(&self) -> f64 {
        self.radius
    }

    pub(crate) const fn kind(&self) -> AgentKind {
        match self.behavior {
            Behavior::Normal { .. } => AgentKind::Normal,
            Behavior::Weak { .. } => AgentKind::Weak,
            Behavior::Avoider { .. } => AgentKind::Avoider,
            Behavior::Beam { .. } => AgentKind::Beam,
        }
    }

    pub(crate) const fn is_weak(&self) -> bool {
        matches!(self.behavior, Behavior::Weak { .. })
    }

    pub(crate) const fn behavior(&self) -> &Behavior {
        &self.behavior
    }

    pub(crate) fn behavior_mut(&mut self) -> &mut Behavior {
        &mut self.behavior
    }

    pub(crate) fn heading(&self) -> Heading {
        match self.behavior {
            Behavior::Normal { heading }
            | Behavior::Weak { heading }
            | Behavior::Avoider { heading, .. } => Heading::Compass(heading),
            Behavior::Beam { angle, .. } => Heading::Continuous(angle),
        }
    }

    /// Compass heading of robots that steer on the compass.
    pub(crate) fn compass(&self) -> Option<Direction> {
        match self.heading() {
            Heading::Compass(direction) => Some(direction),
            Heading::Continuous(_) => None,
        }
    }

    /// Replaces the compass heading chosen by the sensing pass.
    ///
    /// An avoider that is mid-evasion abandons it; the return value reports that.
    pub(crate) fn steer(&mut self, direction: Direction) -> bool {
        match &mut self.behavior {
            Behavior::Normal { heading } | Behavior::Weak { heading } => {
                *heading = direction;
                false
            }
            Behavior::Avoider { heading, evasion } => {
                *heading = direction;
                let abandoned = *evasion != Evasion::Normal;
                *evasion = Evasion::Normal;
                abandoned
            }
            Behavior::Beam { .. } => false,
        }
    }

    /// Turns the robot around after touching an obstacle.
    pub(crate) fn bounce(&mut self) {
        match &mut self.behavior {
            Behavior::Normal { heading }
            | Behavior::Weak { heading }
            | Behavior::Avoider { heading, .. } => *heading = heading.opposite(),
            Behavior::Beam { angle, .. } => {
                *angle = normalize_angle(*angle + std::f64::consts::PI);
            }
        }
    }

    /// Moves the robot one tick along its heading.
    pub(crate) fn advance(&mut self) {
        self.position += self.heading().unit() * self.speed;
    }

    pub(crate) fn relocate(&mut self, position: DVec2) {
        self.position = position;
        if let Behavior::Beam { angle, beam_end } = &mut self.behavior {
            *beam_end = beam_tip(position, self.radius, *angle);
        }
    }

    pub(crate) fn refresh_beam(&mut self) {
        self.relocate(self.position);
    }

    /// Whether the stored numbers match the kind's fixed tuning and are finite.
    pub(crate) fn is_well_formed(&self) -> bool {
        let kind = self.kind();
        let tuned = self.radius == kind.radius() && self.speed == kind.speed();
        let state = match self.behavior {
            Behavior::Beam { angle, beam_end } => angle.is_finite() && beam_end.is_finite(),
            Behavior::Avoider {
                evasion: Evasion::Recovering { remaining, .. },
                ..
            } => remaining <= EVASION_COOLDOWN_TICKS,
            _ => true,
        };
        tuned && self.position.is_finite() && state
    }

    pub(crate) fn evasion_phase(&self) -> EvasionPhase {
        match &self.behavior {
            Behavior::Avoider { evasion, .. } => evasion.phase(),
            _ => EvasionPhase::Normal,
        }
    }

    pub(crate) fn snapshot(&self) -> AgentSnapshot {
        let kind = self.kind();
        AgentSnapshot {
            id: self.id,
            kind,
            position: self.position,
            radius: self.radius,
            heading: self.heading(),
            color: kind.color(),
            evasion: self.evasion_phase(),
            beam_end: match self.behavior {
                Behavior::Beam { beam_end, .. } => Some(beam_end),
                _ => None,
            },
        }
    }
}

/// Avoider evasion state machine, advanced once per tick.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) enum Evasion {
    Normal,
    Evading {
        obstacle: ObstacleId,
        original: Direction,
        held: Direction,
    },
    Recovering {
        obstacle: ObstacleId,
        original: Direction,
        held: Direction,
        remaining: u32,
    },
}

/// Observable change produced by [`Evasion::advance`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum EvasionTransition {
    Started(ObstacleId),
    Ended,
}

impl Evasion {
    pub(crate) const fn phase(&self) -> EvasionPhase {
        match self {
            Self::Normal => EvasionPhase::Normal,
            Self::Evading { .. } => EvasionPhase::Evading,
            Self::Recovering { .. } => EvasionPhase::Recovering,
        }
    }

    /// Advances the machine given this tick's obstacle contact.
    ///
    /// `contact` carries the first obstacle the avoider touches and its centre.
    pub(crate) fn advance(
        &mut self,
        heading: &mut Direction,
        position: DVec2,
        contact: Option<(ObstacleId, DVec2)>,
    ) -> Option<EvasionTransition> {
        match (*self, contact) {
            (Self::Normal, None) => None,
            (Self::Normal, Some((obstacle, center))) => {
                let original = *heading;
                let held = sideways(original, position, center);
                *heading = held;
                *self = Self::Evading {
                    obstacle,
                    original,
                    held,
                };
                Some(EvasionTransition::Started(obstacle))
            }
            (Self::Evading { held, .. }, Some(_)) => {
                *heading = held;
                None
            }
            (
                Self::Evading {
                    obstacle,
                    original,
                    held,
                },
                None,
            ) => {
                *heading = held;
                *self = Self::Recovering {
                    obstacle,
                    original,
                    held,
                    remaining: EVASION_COOLDOWN_TICKS,
                };
                None
            }
            (
                Self::Recovering {
                    obstacle, held, original, ..
                },
                Some((touched, center)),
            ) => {
                let held = if touched == obstacle {
                    held
                } else {
                    sideways(original, position, center)
                };
                *heading = held;
                *self = Self::Evading {
                    obstacle: touched,
                    original,
                    held,
                };
                None
            }
            (
                Self::Recovering {
                    obstacle,
                    original,
                    held,
                    remaining,
                },
                None,
            ) => {
                let remaining = remaining.saturating_sub(1);
                if remaining == 0 {
                    *heading = original;
                    *self = Self::Normal;
                    Some(EvasionTransition::Ended)
                } else {
                    *heading = held;
                    *self = Self::Recovering {
                        obstacle,
                        original,
                        held,
                        remaining,
                    };
                    None
                }
            }
        }
    }
}

/// Heading turned a quarter away from the side the obstacle was approached on.
///
/// Diagonal headings are first snapped clockwise onto the compass axis they
/// lean towards.
fn sideways(heading: Direction, position: DVec2, center: DVec2) -> Direction {
    let bearing = if heading.is_diagonal() {
        heading.add(1)
    } else {
        heading
    };
    let (left, above) = (position.x < center.x, position.y < center.y);
    let (right, below) = (position.x > center.x, position.y > center.y);
    let vertical = matches!(bearing, Direction::North | Direction::South);
    let counter_clockwise = if vertical {
        (left && below) || (right && above)
    } else {
        (left && above) || (right && below)
    };
    if counter_clockwise {
        bearing.add(-EVASION_TURN)
    } else {
        bearing.add(EVASION_TURN)
    }
}

pub(crate) fn beam_tip(position: DVec2, radius: f64, angle: f64) -> DVec2 {
    position + DVec2::new(angle.cos(), angle.sin()) * (radius * 2.0)
}

pub(crate) fn normalize_angle(angle: f64) -> f64 {
    angle.rem_euclid(std::f64::consts::TAU)
}
