//! Read-only views of an episode for display
//!
//! Renderers receive a [`Snapshot`] borrowed from the episode and cannot
//! change engine state.

use super::car::SimCar;
use super::config::SimConfig;
use super::lane_queue::LaneQueueModel;
use super::traffic_light::SimTrafficLight;
use super::types::{Axis, Direction, SignalColor};

/// Borrowed view of an episode after a tick
#[derive(Debug, Clone, Copy)]
pub struct Snapshot<'a> {
    pub tick: u64,
    pub time_ms: u64,
    pub light: &'a SimTrafficLight,
    pub lanes: &'a LaneQueueModel,
    pub cars: &'a [SimCar],
    pub spawned: u32,
    pub completed: u32,
}

/// Receives a snapshot after every tick
pub trait RenderHook {
    fn on_tick(&mut self, snapshot: &Snapshot<'_>);
}

impl<F> RenderHook for F
where
    F: FnMut(&Snapshot<'_>),
{
    fn on_tick(&mut self, snapshot: &Snapshot<'_>) {
        self(snapshot)
    }
}

/// World units per character cell
const MAP_SCALE: f32 = 20.0;

fn color_char(color: SignalColor) -> char {
    match color {
        SignalColor::Caution => 'Y',
        SignalColor::Pass => 'G',
        SignalColor::Stop => 'R',
    }
}

fn car_char(direction: Direction, stopped: bool) -> char {
    if stopped {
        return 'o';
    }
    match direction {
        Direction::EastWest => '>',
        Direction::WestEast => '<',
        Direction::NorthSouth => 'v',
        Direction::SouthNorth => '^',
    }
}

/// Draw a text map of the field: roads, the light and every car.
///
/// The light is drawn as two characters at the centre, the colour shown to
/// the east-west axis followed by the one shown to the north-south axis.
pub fn draw_map(snapshot: &Snapshot<'_>, config: &SimConfig) -> String {
    let width = (config.field_width / MAP_SCALE).ceil() as usize;
    let height = (config.field_height / MAP_SCALE).ceil() as usize;
    if width == 0 || height == 0 {
        return String::new();
    }

    // Helper to convert world coords to grid coords
    let to_grid = |x: f32, y: f32| -> Option<(usize, usize)> {
        if x < 0.0 || y < 0.0 {
            return None;
        }
        let col = (x / MAP_SCALE) as usize;
        let row = (y / MAP_SCALE) as usize;
        (col < width && row < height).then_some((row, col))
    };

    let mut grid = vec![vec![' '; width]; height];

    // Roads: one row and one column through the centre per lane
    for direction in Direction::ALL {
        let lane = config.lane_coordinate(direction);
        match direction.axis() {
            Axis::EastWest => {
                if let Some((row, _)) = to_grid(0.0, lane) {
                    for cell in grid[row].iter_mut() {
                        *cell = '-';
                    }
                }
            }
            Axis::NorthSouth => {
                if let Some((_, col)) = to_grid(lane, 0.0) {
                    for row in grid.iter_mut() {
                        row[col] = if row[col] == '-' { '+' } else { '|' };
                    }
                }
            }
        }
    }

    // Stop lines
    for direction in Direction::ALL {
        let stop = config.base_stop_line(direction);
        let lane = config.lane_coordinate(direction);
        let cell = match direction.axis() {
            Axis::EastWest => to_grid(stop, lane),
            Axis::NorthSouth => to_grid(lane, stop),
        };
        if let Some((row, col)) = cell {
            grid[row][col] = '#';
        }
    }

    // Cars
    for car in snapshot.cars {
        let (x, y) = car.xy();
        if let Some((row, col)) = to_grid(x, y) {
            grid[row][col] = car_char(car.direction, car.stopped);
        }
    }

    // Light
    if let Some((row, col)) = to_grid(config.center_x(), config.center_y()) {
        grid[row][col.saturating_sub(1)] = color_char(snapshot.light.color_for(Axis::EastWest));
        grid[row][col] = color_char(snapshot.light.color_for(Axis::NorthSouth));
    }

    let mut out = String::with_capacity((width + 1) * height);
    for row in &grid {
        out.extend(row.iter());
        out.push('\n');
    }
    out
}

/// One-line status of the snapshot
pub fn summary(snapshot: &Snapshot<'_>) -> String {
    let light = snapshot.light.observe();
    let queued: Vec<String> = Direction::ALL
        .iter()
        .map(|d| format!("{}={}", d.label(), snapshot.lanes.count(*d)))
        .collect();
    format!(
        "tick={} t={}ms light={:?} buffer={}ms cars={} spawned={} completed={} queues[{}]",
        snapshot.tick,
        snapshot.time_ms,
        light.active_axis,
        light.transition_remaining_ms,
        snapshot.cars.len(),
        snapshot.spawned,
        snapshot.completed,
        queued.join(" ")
    )
}
