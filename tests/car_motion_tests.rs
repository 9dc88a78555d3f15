//! Car motion, stop lines and queue accounting

use intersection_sim::simulation::{
    Axis, CarId, CarUpdateResult, Direction, LaneQueueModel, SimCar, SimConfig, SimId,
    SimTrafficLight,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn green_for(axis: Axis, config: &SimConfig) -> SimTrafficLight {
    SimTrafficLight::new(axis, config.transition_ms)
}

fn spawn(direction: Direction, lanes: &mut LaneQueueModel, config: &SimConfig) -> SimCar {
    let rank = lanes.register_spawn(direction);
    SimCar::new(CarId(SimId(0)), direction, config, 0, rank)
}

/// Step a car under a fixed light until it stops moving or `ticks` run out
fn settle(
    car: &mut SimCar,
    light: &SimTrafficLight,
    lanes: &mut LaneQueueModel,
    config: &SimConfig,
    ticks: usize,
) {
    for _ in 0..ticks {
        if car.update(config, light, lanes) == CarUpdateResult::Exited {
            return;
        }
    }
}

#[test]
fn test_entry_positions_and_lanes() {
    let config = SimConfig::default();
    let mut lanes = LaneQueueModel::new();

    assert_eq!(spawn(Direction::EastWest, &mut lanes, &config).xy(), (0.0, 315.0));
    assert_eq!(spawn(Direction::WestEast, &mut lanes, &config).xy(), (800.0, 270.0));
    assert_eq!(spawn(Direction::NorthSouth, &mut lanes, &config).xy(), (370.0, 0.0));
    assert_eq!(spawn(Direction::SouthNorth, &mut lanes, &config).xy(), (415.0, 600.0));
}

#[test]
fn test_crossed_set_exactly_once_in_every_direction() {
    let config = SimConfig::default();

    for direction in Direction::ALL {
        let mut lanes = LaneQueueModel::new();
        let light = green_for(direction.axis(), &config);
        let mut car = spawn(direction, &mut lanes, &config);
        assert_eq!(lanes.count(direction), 1);

        let mid = config.midpoint(direction);
        let mut crossings = 0;
        let mut exited = false;
        for _ in 0..500 {
            let before = car.position;
            match car.update(&config, &light, &mut lanes) {
                CarUpdateResult::Crossed => {
                    crossings += 1;
                    // Judged on the position before this tick's move
                    if direction.sign() > 0.0 {
                        assert!(before > mid, "{direction:?} crossed at {before}");
                    } else {
                        assert!(before < mid, "{direction:?} crossed at {before}");
                    }
                    assert_eq!(lanes.count(direction), 0);
                }
                CarUpdateResult::Continue => {
                    if !car.crossed {
                        assert_eq!(lanes.count(direction), 1);
                    }
                }
                CarUpdateResult::Exited => {
                    exited = true;
                    break;
                }
            }
        }

        assert!(exited, "{direction:?} never left the field");
        assert_eq!(crossings, 1, "{direction:?} crossed {crossings} times");
        assert!(car.crossed);
        assert_eq!(lanes.count(direction), 0);
    }
}

#[test]
fn test_crossing_released_on_tick_after_passing_midpoint() {
    let config = SimConfig::default();
    let mut lanes = LaneQueueModel::new();
    let light = green_for(Axis::EastWest, &config);
    let mut car = spawn(Direction::EastWest, &mut lanes, &config);
    car.position = 396.0;

    assert_eq!(car.update(&config, &light, &mut lanes), CarUpdateResult::Continue);
    assert_eq!(car.position, 402.0);
    assert!(!car.crossed);
    assert_eq!(lanes.count(Direction::EastWest), 1);

    assert_eq!(car.update(&config, &light, &mut lanes), CarUpdateResult::Crossed);
    assert_eq!(lanes.count(Direction::EastWest), 0);
}

#[test]
fn test_first_car_stops_at_base_line_on_red() {
    let config = SimConfig::default();
    let expected = [
        (Direction::EastWest, 300.0),
        (Direction::WestEast, 458.0),
        (Direction::NorthSouth, 204.0),
        (Direction::SouthNorth, 360.0),
    ];

    for (direction, stop) in expected {
        let mut lanes = LaneQueueModel::new();
        let light = green_for(direction.axis().other(), &config);
        let mut car = spawn(direction, &mut lanes, &config);

        settle(&mut car, &light, &mut lanes, &config, 300);

        assert_eq!(car.position, stop, "{direction:?}");
        assert!(car.stopped, "{direction:?}");
        assert!(!car.crossed, "{direction:?}");
        assert_eq!(lanes.count(direction), 1);
    }
}

#[test]
fn test_queued_cars_stop_further_back() {
    let config = SimConfig::default();
    let mut lanes = LaneQueueModel::new();
    let light = green_for(Axis::NorthSouth, &config);

    let mut first = spawn(Direction::EastWest, &mut lanes, &config);
    let mut second = spawn(Direction::EastWest, &mut lanes, &config);
    let mut third = spawn(Direction::EastWest, &mut lanes, &config);
    assert_eq!((first.queue_rank, second.queue_rank, third.queue_rank), (0, 1, 2));

    settle(&mut first, &light, &mut lanes, &config, 300);
    settle(&mut second, &light, &mut lanes, &config, 300);
    settle(&mut third, &light, &mut lanes, &config, 300);

    assert_eq!(first.position, 300.0);
    assert_eq!(second.position, 252.0);
    assert_eq!(third.position, 204.0);
    assert!(first.position - second.position >= config.car_spacing - config.car_speed);
}

#[test]
fn test_car_resumes_when_light_turns_green() {
    let config = SimConfig::default();
    let mut lanes = LaneQueueModel::new();
    let red = green_for(Axis::NorthSouth, &config);
    let mut car = spawn(Direction::EastWest, &mut lanes, &config);
    settle(&mut car, &red, &mut lanes, &config, 300);
    assert!(car.stopped);

    let green = green_for(Axis::EastWest, &config);
    car.update(&config, &green, &mut lanes);
    assert!(!car.stopped);
    assert_eq!(car.position, 306.0);
}

#[test]
fn test_effective_stop_line_moves_away_with_rank() {
    let config = SimConfig::default();

    for direction in Direction::ALL {
        let mid = config.midpoint(direction);
        let distances: Vec<f32> = (0..6)
            .map(|rank| {
                let car = SimCar::new(CarId(SimId(rank as usize)), direction, &config, 0, rank);
                (car.effective_stop_line(&config) - mid).abs()
            })
            .collect();
        for pair in distances.windows(2) {
            assert!(pair[1] > pair[0], "{direction:?}: {distances:?}");
        }
    }
}

#[test]
fn test_no_car_near_stop_line_moves_during_transition() {
    let config = SimConfig::default();
    let mut rng = StdRng::seed_from_u64(0xC0FFEE);
    let mut checked = 0;

    for i in 0..10_000 {
        let axis = if rng.random_bool(0.5) {
            Axis::EastWest
        } else {
            Axis::NorthSouth
        };
        let mut light = SimTrafficLight::new(axis, config.transition_ms);
        light.request_switch();
        light.advance(rng.random_range(0..config.transition_ms));
        assert!(light.is_transitioning());

        let direction = Direction::ALL[rng.random_range(0..4)];
        let rank = rng.random_range(0..6);
        let mut car = SimCar::new(CarId(SimId(i)), direction, &config, 0, rank);
        let span = config.midpoint(direction) * 2.0;
        car.position = rng.random_range(0.0..span);

        if car.near_stop_line(&config) {
            checked += 1;
            let before = car.position;
            car.apply_motion(&config, &light);
            assert!(car.stopped);
            assert_eq!(car.position, before);
        }
    }

    assert!(checked > 0, "no random state landed in a stop zone");
}

#[test]
fn test_exit_is_judged_on_the_far_side() {
    let config = SimConfig::default();
    let mut lanes = LaneQueueModel::new();

    let mut east = spawn(Direction::EastWest, &mut lanes, &config);
    east.position = 830.0;
    assert!(!east.has_exited(&config));
    east.position = 830.5;
    assert!(east.has_exited(&config));

    let mut north = spawn(Direction::SouthNorth, &mut lanes, &config);
    assert!(!north.has_exited(&config));
    north.position = -31.0;
    assert!(north.has_exited(&config));
}

#[test]
fn test_queue_counts_never_go_negative() {
    let mut lanes = LaneQueueModel::new();
    assert_eq!(lanes.register_spawn(Direction::WestEast), 0);
    assert_eq!(lanes.register_spawn(Direction::WestEast), 1);
    assert_eq!(lanes.register_spawn(Direction::NorthSouth), 0);
    assert_eq!(lanes.axis_total(Axis::EastWest), 2);
    assert_eq!(lanes.axis_total(Axis::NorthSouth), 1);

    lanes.release(Direction::WestEast);
    lanes.release(Direction::WestEast);
    lanes.release(Direction::WestEast);
    assert_eq!(lanes.count(Direction::WestEast), 0);
    assert_eq!(lanes.total(), 1);

    // Ranks restart once the queue has drained
    assert_eq!(lanes.register_spawn(Direction::WestEast), 0);
}
