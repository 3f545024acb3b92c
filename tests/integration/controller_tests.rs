//! Motion controller against a recording relay in virtual time.
//!
//! Timings assume the default config: 0.4 s hold, 1.0 s spacing,
//! 0.55 ft/s up, 0.62 ft/s down, 7.0833 ft door.

use core::time::Duration;

use futures_lite::future::zip;

use garagectl::adapters::signal::SimulatedSignal;
use garagectl::adapters::time::{ReactorDelay, VirtualClock};
use garagectl::app::status::DoorPosition;
use garagectl::config::TimingConfig;
use garagectl::drivers::actuator::Actuator;
use garagectl::error::{ActuatorError, Error};
use garagectl::motion::{DoorState, MotionController, MotionPhase, MovementRequest};

use super::mock_hw::{Edge, FailingSignal, RecordingSignal, presses};

const PRESS: f32 = 1.4;

fn secs(d: Duration) -> f32 {
    d.as_secs_f32()
}

fn close(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-3
}

#[test]
fn full_open_from_closed() {
    let clock = VirtualClock::new();
    let config = TimingConfig::default();
    let (signal, edges) = RecordingSignal::new(&clock);
    let act = Actuator::new(signal, &clock, &config);
    let ctrl = MotionController::new(&act, &config, DoorState::closed());

    let out = clock.block_on(ctrl.handle_request(MovementRequest::RelativeUp(None))).unwrap();

    assert_eq!(out.pulses, 1);
    assert!(close(ctrl.current_height(), 7.0833));
    assert_eq!(ctrl.position(), DoorPosition::FullyOpen);
    assert_eq!(
        edges.borrow()[..],
        [
            Edge { active: true, at: Duration::ZERO },
            Edge { active: false, at: config.pulse_hold() },
        ]
    );
    // press and cooldown, then the whole travel with no stop press
    assert!(close(secs(clock.now()), PRESS + 7.0833 / 0.55));
}

#[test]
fn half_open_down_three_feet_stops_early() {
    let clock = VirtualClock::new();
    let config = TimingConfig::default();
    let (signal, edges) = RecordingSignal::new(&clock);
    let act = Actuator::new(signal, &clock, &config);
    let half = config.door_height_ft / 2.0;
    let ctrl = MotionController::new(&act, &config, DoorState::resting(half, true));

    let out = clock
        .block_on(ctrl.handle_request(MovementRequest::RelativeDown(Some(3.0))))
        .unwrap();

    assert_eq!(out.pulses, 2);
    assert!(close(out.to_ft, half - 3.0));
    assert!(close(ctrl.current_height(), half - 3.0));
    assert!(!ctrl.state().last_direction_up);
    assert!(!ctrl.state().is_moving);

    // the stop press is issued one hold before the target is reached
    let stop_at = PRESS + 3.0 / 0.62 - 0.4;
    let edges = edges.borrow();
    assert_eq!(edges.len(), 4);
    assert!(edges[2].active);
    assert!(close(secs(edges[2].at), stop_at));
    assert!(close(secs(clock.now()), stop_at + PRESS));
}

#[test]
fn request_for_current_height_does_nothing() {
    let clock = VirtualClock::new();
    let config = TimingConfig::default();
    let (signal, edges) = RecordingSignal::new(&clock);
    let act = Actuator::new(signal, &clock, &config);
    let ctrl = MotionController::new(&act, &config, DoorState::resting(4.0, false));

    let out = clock
        .block_on(ctrl.handle_request(MovementRequest::AbsoluteHeight(4.0)))
        .unwrap();

    assert_eq!(out.pulses, 0);
    assert!(edges.borrow().is_empty());
    assert_eq!(ctrl.state(), DoorState::resting(4.0, false));
}

#[test]
fn out_of_range_target_is_clamped() {
    let clock = VirtualClock::new();
    let config = TimingConfig::default();
    let (signal, _edges) = RecordingSignal::new(&clock);
    let act = Actuator::new(signal, &clock, &config);
    let ctrl = MotionController::new(&act, &config, DoorState::resting(2.0, true));

    let out = clock
        .block_on(ctrl.handle_request(MovementRequest::AbsoluteHeight(-5.0)))
        .unwrap();

    assert_eq!(out.to_ft, 0.0);
    assert_eq!(ctrl.position(), DoorPosition::Closed);
    assert_eq!(out.pulses, 1, "floor is a hard limit, no stop press");
}

#[test]
fn same_direction_request_adds_two_presses() {
    let clock = VirtualClock::new();
    let config = TimingConfig::default();
    let (signal, edges) = RecordingSignal::new(&clock);
    let act = Actuator::new(signal, &clock, &config);
    let half = config.door_height_ft / 2.0;
    let ctrl = MotionController::new(&act, &config, DoorState::resting(half, true));

    let out = clock
        .block_on(ctrl.handle_request(MovementRequest::RelativeUp(Some(0.5))))
        .unwrap();

    assert_eq!(out.pulses, 4);
    assert_eq!(presses(&edges), 4);
    assert!(close(ctrl.current_height(), half + 0.5));
    assert!(ctrl.state().last_direction_up);
}

#[test]
fn short_stop_early_move_completes_immediately() {
    let clock = VirtualClock::new();
    let config = TimingConfig::default();
    let (signal, _edges) = RecordingSignal::new(&clock);
    let act = Actuator::new(signal, &clock, &config);
    let ctrl = MotionController::new(&act, &config, DoorState::resting(3.0, false));

    // 0.1 ft takes less than one hold, so the travel wait is clamped to zero
    let out = clock
        .block_on(ctrl.handle_request(MovementRequest::RelativeUp(Some(0.1))))
        .unwrap();

    assert_eq!(out.pulses, 2);
    assert!(close(ctrl.current_height(), 3.1));
    assert!(close(secs(clock.now()), 2.0 * PRESS));
}

#[test]
fn bounce_back_waits_out_the_reversal() {
    let clock = VirtualClock::new();
    let config = TimingConfig::default();
    let (signal, edges) = RecordingSignal::new(&clock);
    let act = Actuator::new(signal, &clock, &config);
    let ctrl = MotionController::new(&act, &config, DoorState::resting(0.3, false));

    let out = clock.block_on(ctrl.handle_request(MovementRequest::RelativeUp(None))).unwrap();

    assert_eq!(out.pulses, 1);
    assert_eq!(presses(&edges), 1);
    let reversal = 0.3 / 0.62 + 1.0 + 0.55 / 0.55;
    let rest = (7.0833 - 0.55) / 0.55;
    assert!(close(secs(clock.now()), PRESS + reversal + rest));
}

#[test]
fn second_request_in_flight_is_busy() {
    let clock = VirtualClock::new();
    let config = TimingConfig::default();
    let (signal, edges) = RecordingSignal::new(&clock);
    let act = Actuator::new(signal, &clock, &config);
    let ctrl = MotionController::new(&act, &config, DoorState::closed());

    let (first, second) = clock.block_on(zip(
        ctrl.handle_request(MovementRequest::RelativeUp(None)),
        ctrl.handle_request(MovementRequest::AbsoluteHeight(3.0)),
    ));

    assert!(first.is_ok());
    assert_eq!(second, Err(Error::Busy));
    assert_eq!(presses(&edges), 1);
}

#[test]
fn stop_cancels_travel_and_freezes_state() {
    let clock = VirtualClock::new();
    let config = TimingConfig::default();
    let (signal, edges) = RecordingSignal::new(&clock);
    let act = Actuator::new(signal, &clock, &config);
    let ctrl = MotionController::new(&act, &config, DoorState::closed());

    let (moved, stopped) = clock.block_on(zip(ctrl.handle_request(MovementRequest::RelativeUp(None)), async {
        clock.sleep(Duration::from_secs(5)).await;
        ctrl.stop().await
    }));

    assert_eq!(moved, Err(Error::Cancelled));
    let report = stopped.unwrap();
    assert_eq!(report.cancelled_timers, 1);
    assert!(report.pulsed);
    assert_eq!(ctrl.pending_timers(), 0);
    assert_eq!(ctrl.phase(), MotionPhase::Idle);
    assert!(!ctrl.state().is_moving);
    assert!(ctrl.is_halted());

    // nothing fires after the stop resolved
    let after_stop = edges.borrow().len();
    let height = ctrl.current_height();
    clock.block_on(clock.sleep(Duration::from_secs(60)));
    assert_eq!(edges.borrow().len(), after_stop);
    assert_eq!(ctrl.current_height(), height);
    assert_eq!(presses(&edges), 2);
}

#[test]
fn stop_on_idle_door_presses_nothing() {
    let clock = VirtualClock::new();
    let config = TimingConfig::default();
    let (signal, edges) = RecordingSignal::new(&clock);
    let act = Actuator::new(signal, &clock, &config);
    let ctrl = MotionController::new(&act, &config, DoorState::resting(2.0, true));

    let report = clock.block_on(ctrl.stop()).unwrap();

    assert!(!report.pulsed);
    assert!(edges.borrow().is_empty());
    assert_eq!(report.height_ft, 2.0);
}

#[test]
fn assert_failure_leaves_state_untouched() {
    let clock = VirtualClock::new();
    let config = TimingConfig::default();
    let act = Actuator::new(FailingSignal::new(0), &clock, &config);
    let ctrl = MotionController::new(&act, &config, DoorState::closed());

    let err = clock
        .block_on(ctrl.handle_request(MovementRequest::RelativeUp(None)))
        .unwrap_err();

    assert_eq!(err, Error::Actuator(ActuatorError::PinWriteFailed { active: true }));
    assert_eq!(ctrl.state(), DoorState::closed());
    assert_eq!(ctrl.phase(), MotionPhase::Idle);
}

#[test]
fn release_failure_is_not_rolled_back() {
    let clock = VirtualClock::new();
    let config = TimingConfig::default();
    let act = Actuator::new(FailingSignal::new(1), &clock, &config);
    let ctrl = MotionController::new(&act, &config, DoorState::closed());

    let err = clock
        .block_on(ctrl.handle_request(MovementRequest::RelativeUp(None)))
        .unwrap_err();

    assert_eq!(err, Error::Actuator(ActuatorError::PinWriteFailed { active: false }));
    // the contact did close, so the opener is assumed to have started
    assert!(ctrl.state().is_moving);
    assert_eq!(ctrl.current_height(), 0.0);
    assert_eq!(ctrl.phase(), MotionPhase::Idle);
}

#[test]
fn start_from_floor_always_opens() {
    let clock = VirtualClock::new();
    let config = TimingConfig::default();
    let (signal, _edges) = RecordingSignal::new(&clock);
    let act = Actuator::new(signal, &clock, &config);
    // latch says "up" but a door on the floor can only rise
    let ctrl = MotionController::new(&act, &config, DoorState::resting(0.0, true));

    let out = clock
        .block_on(ctrl.handle_request(MovementRequest::AbsoluteHeight(2.0)))
        .unwrap();

    assert_eq!(out.pulses, 2);
    assert!(ctrl.state().last_direction_up);
    assert!(close(ctrl.current_height(), 2.0));
}

#[test]
fn request_after_failed_release_is_busy() {
    let clock = VirtualClock::new();
    let config = TimingConfig::default();
    let signal = FailingSignal::once(1);
    let writes = signal.log.clone();
    let act = Actuator::new(signal, &clock, &config);
    let ctrl = MotionController::new(&act, &config, DoorState::closed());

    let first = clock.block_on(ctrl.handle_request(MovementRequest::RelativeUp(None)));
    assert_eq!(first, Err(Error::Actuator(ActuatorError::PinWriteFailed { active: false })));
    let stuck = ctrl.state();
    assert!(stuck.is_moving);

    // the line works again, but the latch state is unknown
    let second = clock.block_on(ctrl.handle_request(MovementRequest::AbsoluteHeight(3.0)));
    assert_eq!(second, Err(Error::Busy));
    assert_eq!(ctrl.state(), stuck);
    assert_eq!(writes.borrow().len(), 2);

    let report = clock.block_on(ctrl.stop()).unwrap();
    assert!(report.pulsed);
    assert!(!ctrl.state().is_moving);
    assert_eq!(writes.borrow()[2..], [true, false]);
}

#[test]
fn unrepresentable_travel_time_is_rejected_before_pressing() {
    let clock = VirtualClock::new();
    let config = TimingConfig {
        close_rate_ft_per_sec: 1e-30,
        ..TimingConfig::default()
    };
    let (signal, edges) = RecordingSignal::new(&clock);
    let act = Actuator::new(signal, &clock, &config);
    let ctrl = MotionController::new(&act, &config, DoorState::resting(3.0, true));

    let out = clock.block_on(ctrl.handle_request(MovementRequest::AbsoluteHeight(1.0)));

    assert_eq!(out, Err(Error::Config("completion wait out of range")));
    assert!(edges.borrow().is_empty());
    assert_eq!(ctrl.state(), DoorState::resting(3.0, true));
    assert_eq!(ctrl.phase(), MotionPhase::Idle);
}

#[test]
fn two_up_requests_reach_the_top_exactly() {
    let clock = VirtualClock::new();
    let config = TimingConfig::default();
    let (signal, edges) = RecordingSignal::new(&clock);
    let act = Actuator::new(signal, &clock, &config);
    let ctrl = MotionController::new(&act, &config, DoorState::resting(3.0, false));

    let first = clock
        .block_on(ctrl.handle_request(MovementRequest::RelativeUp(Some(3.0))))
        .unwrap();
    assert_eq!(first.pulses, 2);
    assert!(close(ctrl.current_height(), 6.0));
    assert!(ctrl.state().last_direction_up);

    // latched up at 6 ft: flip, then open the rest of the way
    let second = clock
        .block_on(ctrl.handle_request(MovementRequest::RelativeUp(Some(3.0))))
        .unwrap();
    assert_eq!(second.pulses, 3);
    assert_eq!(second.to_ft, config.door_height_ft);
    assert_eq!(ctrl.current_height(), config.door_height_ft);
    assert_eq!(ctrl.position(), DoorPosition::FullyOpen);
    assert!(!ctrl.state().is_moving);
    assert_eq!(presses(&edges), 5);
}

#[test]
fn stop_during_direction_flip_halts_for_good() {
    let clock = VirtualClock::new();
    let config = TimingConfig::default();
    let (signal, edges) = RecordingSignal::new(&clock);
    let act = Actuator::new(signal, &clock, &config);
    let half = config.door_height_ft / 2.0;
    let ctrl = MotionController::new(&act, &config, DoorState::resting(half, true));

    let (moved, stopped) = clock.block_on(zip(
        ctrl.handle_request(MovementRequest::RelativeUp(Some(0.5))),
        async {
            clock.sleep(Duration::from_millis(200)).await;
            ctrl.stop().await
        },
    ));

    assert_eq!(moved, Err(Error::Cancelled));
    let report = stopped.unwrap();
    assert!(report.pulsed);
    assert_eq!(report.cancelled_timers, 0);
    // first flip press started the door, the stop press halted it
    assert_eq!(presses(&edges), 2);
    assert!(close(secs(edges.borrow()[2].at), PRESS));
    assert_eq!(ctrl.current_height(), half);
    assert!(!ctrl.state().is_moving);

    let after_stop = edges.borrow().len();
    clock.block_on(clock.sleep(Duration::from_secs(60)));
    assert_eq!(edges.borrow().len(), after_stop);
    assert_eq!(ctrl.current_height(), half);
    assert_eq!(ctrl.pending_timers(), 0);
}

#[test]
fn stop_during_bounce_wait_halts_for_good() {
    let clock = VirtualClock::new();
    let config = TimingConfig::default();
    let (signal, edges) = RecordingSignal::new(&clock);
    let act = Actuator::new(signal, &clock, &config);
    let ctrl = MotionController::new(&act, &config, DoorState::resting(0.3, false));

    let (moved, stopped) = clock.block_on(zip(
        ctrl.handle_request(MovementRequest::RelativeUp(None)),
        async {
            clock.sleep(Duration::from_millis(2500)).await;
            ctrl.stop().await
        },
    ));

    assert_eq!(moved, Err(Error::Cancelled));
    let report = stopped.unwrap();
    assert_eq!(report.cancelled_timers, 1);
    assert!(report.pulsed);
    assert_eq!(presses(&edges), 2);
    assert_eq!(ctrl.current_height(), 0.3);
    assert!(!ctrl.state().is_moving);

    let after_stop = edges.borrow().len();
    clock.block_on(clock.sleep(Duration::from_secs(60)));
    assert_eq!(edges.borrow().len(), after_stop);
    assert_eq!(ctrl.current_height(), 0.3);
    assert_eq!(ctrl.pending_timers(), 0);
}

#[test]
fn bounce_then_settle_below_clear_height() {
    let clock = VirtualClock::new();
    let config = TimingConfig::default();
    let (signal, edges) = RecordingSignal::new(&clock);
    let act = Actuator::new(signal, &clock, &config);
    let ctrl = MotionController::new(&act, &config, DoorState::resting(0.3, false));

    // reversal clears 0.55 ft; halt, send it back down, stop at 0.4
    let out = clock
        .block_on(ctrl.handle_request(MovementRequest::AbsoluteHeight(0.4)))
        .unwrap();

    assert_eq!(out.pulses, 4);
    assert_eq!(presses(&edges), 4);
    assert!(close(ctrl.current_height(), 0.4));
    assert!(!ctrl.state().last_direction_up);
    assert!(!ctrl.state().is_moving);
}

#[test]
fn reactor_delay_drives_a_wall_clock_move() {
    let config = TimingConfig {
        door_height_ft: 1.0,
        open_rate_ft_per_sec: 10.0,
        close_rate_ft_per_sec: 10.0,
        pulse_hold_ms: 20,
        pulse_spacing_ms: 20,
        light_pulse_ms: 5,
        motor_engage_ms: 10,
        bounce_back_threshold_ft: 0.1,
        bounce_back_delay_ms: 10,
    };
    assert!(config.validate().is_ok());
    let delay = ReactorDelay;
    let act = Actuator::new(SimulatedSignal::new(), &delay, &config);
    let ctrl = MotionController::new(&act, &config, DoorState::closed());

    let start = std::time::Instant::now();
    let out = futures_lite::future::block_on(ctrl.handle_request(MovementRequest::AbsoluteHeight(0.5))).unwrap();

    assert_eq!(out.pulses, 2);
    assert!(close(ctrl.current_height(), 0.5));
    // two presses of hold plus spacing, and the travel in between
    assert!(start.elapsed() >= Duration::from_millis(100));
}
