//! Eight-way compass used by robots that steer on discrete bearings.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Compass heading spaced in 45 degree steps.
///
/// Bearings start at east (0 degrees) and increase clockwise because the arena
/// uses screen coordinates where the y axis grows downwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// 0 degrees.
    East,
    /// 45 degrees.
    SouthEast,
    /// 90 degrees.
    South,
    /// 135 degrees.
    SouthWest,
    /// 180 degrees.
    West,
    /// 225 degrees.
    NorthWest,
    /// 270 degrees.
    North,
    /// 315 degrees.
    NorthEast,
}

const COMPASS: [Direction; 8] = [
    Direction::East,
    Direction::SouthEast,
    Direction::South,
    Direction::SouthWest,
    Direction::West,
    Direction::NorthWest,
    Direction::North,
    Direction::NorthEast,
];

const EASTWARD: [Direction; 3] = [Direction::NorthEast, Direction::East, Direction::SouthEast];
const SOUTHWARD: [Direction; 3] = [Direction::SouthEast, Direction::South, Direction::SouthWest];
const WESTWARD: [Direction; 3] = [Direction::SouthWest, Direction::West, Direction::NorthWest];
const NORTHWARD: [Direction; 3] = [Direction::NorthWest, Direction::North, Direction::NorthEast];

impl Direction {
    /// Every compass value in clockwise order starting at east.
    pub const ALL: [Direction; 8] = COMPASS;

    /// Position of the heading on the compass, `0` for east through `7` for north-east.
    #[must_use]
    pub const fn index(self) -> u8 {
        self as u8
    }

    /// Draws a heading uniformly from all eight values.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        COMPASS[rng.gen_range(0..COMPASS.len())]
    }

    /// Bearing expressed in whole degrees.
    #[must_use]
    pub const fn degrees(self) -> u16 {
        self.index() as u16 * 45
    }

    /// Bearing expressed in radians.
    #[must_use]
    pub fn radians(self) -> f64 {
        f64::from(self.degrees()).to_radians()
    }

    /// Heading four steps away.
    #[must_use]
    pub const fn opposite(self) -> Self {
        self.add(4)
    }

    /// Rotates the heading by `steps` multiples of 45 degrees.
    ///
    /// Positive values turn clockwise, negative values counter-clockwise.
    #[must_use]
    pub const fn add(self, steps: i32) -> Self {
        let index = (self.index() as i32 + steps.rem_euclid(8)) % 8;
        COMPASS[index as usize]
    }

    /// Whether the heading lies between two cardinal points.
    #[must_use]
    pub const fn is_diagonal(self) -> bool {
        self.index() % 2 == 1
    }

    /// Picks one of north-east, east or south-east.
    pub fn go_east<R: Rng + ?Sized>(rng: &mut R) -> Self {
        pick(rng, &EASTWARD)
    }

    /// Picks one of south-east, south or south-west.
    pub fn go_south<R: Rng + ?Sized>(rng: &mut R) -> Self {
        pick(rng, &SOUTHWARD)
    }

    /// Picks one of south-west, west or north-west.
    pub fn go_west<R: Rng + ?Sized>(rng: &mut R) -> Self {
        pick(rng, &WESTWARD)
    }

    /// Picks one of north-west, north or north-east.
    pub fn go_north<R: Rng + ?Sized>(rng: &mut R) -> Self {
        pick(rng, &NORTHWARD)
    }
}

fn pick<R: Rng + ?Sized>(rng: &mut R, choices: &[Direction; 3]) -> Direction {
    choices[rng.gen_range(0..choices.len())]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn add_wraps_modulo_eight() {
        for direction in Direction::ALL {
            assert_eq!(direction.add(8), direction);
            assert_eq!(direction.add(-8), direction);
            assert_eq!(direction.add(3).add(-3), direction);
        }
        assert_eq!(Direction::East.add(-1), Direction::NorthEast);
        assert_eq!(Direction::NorthEast.add(1), Direction::East);
        assert_eq!(Direction::South.add(-10), Direction::East);
    }

    #[test]
    fn add_accepts_extreme_step_counts() {
        // i32::MAX is 7 mod 8 and i32::MIN is 0 mod 8.
        assert_eq!(Direction::SouthEast.add(i32::MAX), Direction::East);
        assert_eq!(Direction::NorthEast.add(i32::MAX), Direction::North);
        for direction in Direction::ALL {
            assert_eq!(direction.add(i32::MIN), direction);
            assert_eq!(direction.add(i32::MAX), direction.add(-1));
        }
    }

    #[test]
    fn opposite_is_an_involution() {
        for direction in Direction::ALL {
            assert_eq!(direction.opposite().opposite(), direction);
            assert_ne!(direction.opposite(), direction);
        }
        assert_eq!(Direction::East.opposite(), Direction::West);
        assert_eq!(Direction::NorthEast.opposite(), Direction::SouthWest);
    }

    #[test]
    fn degrees_follow_compass_order() {
        assert_eq!(Direction::East.degrees(), 0);
        assert_eq!(Direction::South.degrees(), 90);
        assert_eq!(Direction::NorthEast.degrees(), 315);
        assert!((Direction::West.radians() - std::f64::consts::PI).abs() < 1e-12);
    }

    #[test]
    fn quadrant_pickers_stay_within_their_sets() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..200 {
            assert!(EASTWARD.contains(&Direction::go_east(&mut rng)));
            assert!(SOUTHWARD.contains(&Direction::go_south(&mut rng)));
            assert!(WESTWARD.contains(&Direction::go_west(&mut rng)));
            assert!(NORTHWARD.contains(&Direction::go_north(&mut rng)));
        }
    }

    #[test]
    fn quadrant_pickers_reach_every_member() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let mut seen = Vec::new();
        for _ in 0..200 {
            let direction = Direction::go_east(&mut rng);
            if !seen.contains(&direction) {
                seen.push(direction);
            }
        }
        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn seeded_sources_produce_identical_sequences() {
        let mut first = ChaCha8Rng::seed_from_u64(99);
        let mut second = ChaCha8Rng::seed_from_u64(99);
        let a: Vec<_> = (0..32).map(|_| Direction::random(&mut first)).collect();
        let b: Vec<_> = (0..32).map(|_| Direction::random(&mut second)).collect();
        assert_eq!(a, b);
    }
}
