//! Core types for the intersection simulation
//!
//! These are standalone types shared by every engine component.

/// A unique identifier for simulation entities
/// This is a simple wrapper around a usize for type safety
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SimId(pub usize);

/// A wrapper type for car IDs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CarId(pub SimId);

/// One of the two perpendicular travel lines through the intersection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    EastWest,
    NorthSouth,
}

impl Axis {
    pub const ALL: [Axis; 2] = [Axis::EastWest, Axis::NorthSouth];

    /// The perpendicular axis
    pub fn other(self) -> Axis {
        match self {
            Axis::EastWest => Axis::NorthSouth,
            Axis::NorthSouth => Axis::EastWest,
        }
    }

    /// The two opposing directions carried by this axis
    pub fn directions(self) -> [Direction; 2] {
        match self {
            Axis::EastWest => [Direction::EastWest, Direction::WestEast],
            Axis::NorthSouth => [Direction::NorthSouth, Direction::SouthNorth],
        }
    }
}

/// Direction of travel of a car.
///
/// Named after where the car enters and where it leaves: an `EastWest` car
/// enters at x = 0 and drives toward increasing x.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Enters on the left edge, travels toward increasing x
    EastWest,
    /// Enters on the right edge, travels toward decreasing x
    WestEast,
    /// Enters on the top edge, travels toward increasing y
    NorthSouth,
    /// Enters on the bottom edge, travels toward decreasing y
    SouthNorth,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::EastWest,
        Direction::WestEast,
        Direction::NorthSouth,
        Direction::SouthNorth,
    ];

    pub fn axis(self) -> Axis {
        match self {
            Direction::EastWest | Direction::WestEast => Axis::EastWest,
            Direction::NorthSouth | Direction::SouthNorth => Axis::NorthSouth,
        }
    }

    /// +1.0 when travelling toward increasing coordinates, -1.0 otherwise
    pub fn sign(self) -> f32 {
        match self {
            Direction::EastWest | Direction::NorthSouth => 1.0,
            Direction::WestEast | Direction::SouthNorth => -1.0,
        }
    }

    /// Dense index used for per-direction tables
    pub fn index(self) -> usize {
        match self {
            Direction::EastWest => 0,
            Direction::WestEast => 1,
            Direction::NorthSouth => 2,
            Direction::SouthNorth => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Direction::EastWest => "east-west",
            Direction::WestEast => "west-east",
            Direction::NorthSouth => "north-south",
            Direction::SouthNorth => "south-north",
        }
    }
}

/// Display colour of the signal facing one axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalColor {
    /// The controller is in its transition buffer
    Caution,
    Pass,
    Stop,
}

/// Simulated time per tick in milliseconds
pub const TICK_MS: u32 = 30;

/// Clearance buffer after an accepted switch request
pub const TRANSITION_BUFFER_MS: u32 = 2000;

/// Distance a moving car covers per tick
pub const CAR_SPEED: f32 = 6.0;

/// Gap between consecutive stop lines of one queue
pub const CAR_SPACING: f32 = 50.0;

/// Length of a car along its travel axis
pub const CAR_LENGTH: f32 = 40.0;

/// Time between spawns
pub const SPAWN_INTERVAL_MS: u32 = 800;

/// Completions needed to end an episode
pub const TARGET_CARS: u32 = 10;

/// Transit time of a car that never has to stop, used to normalize fitness
pub const REFERENCE_TRANSIT_MS: f64 = 5000.0;

pub const FIELD_WIDTH: f32 = 800.0;
pub const FIELD_HEIGHT: f32 = 600.0;

/// How far past the field edge a car must travel before it is removed
pub const EXIT_MARGIN: f32 = 30.0;

/// Distance from the centre of the field to the base stop line
pub const STOP_ZONE_OFFSET: f32 = 100.0;

/// Overshoot allowance past the base stop line
pub const STOP_MARGIN: f32 = 10.0;

/// Upper bound on ticks per episode
pub const TICK_CEILING: u64 = 20_000;
