//! Integration tests for the power-up initialization sequence.

use sdram_controller::common::constants::A10;
use sdram_controller::config::Config;
use sdram_controller::core::command::Command;
use sdram_controller::core::init::{InitSequence, InitStep};
use sdram_controller::core::mode::{BurstLength, ModeRegister};
use sdram_controller::core::timing::Timing;

fn timing() -> Timing {
    let mut config = Config::default();
    config.timing.t_power_up_ns = 100.0;
    config.cycle_timing().unwrap()
}

fn run_to_done(init: &mut InitSequence) -> Vec<(Command, bool, u16)> {
    let mut actions = Vec::new();
    while !init.is_done() {
        let a = init.step();
        actions.push((a.command, a.cke, a.address));
        assert!(actions.len() < 10_000, "init sequence never finishes");
    }
    actions
}

/// Tests the full command order and spacing for the default timings.
#[test]
fn test_command_order() {
    let t = timing();
    let mode = ModeRegister::new(BurstLength::Eight, 3);
    let mut init = InitSequence::new(&t, mode);
    let actions = run_to_done(&mut init);

    let mut expected = Vec::new();
    for _ in 0..t.power_up {
        expected.push((Command::Deselect, false, 0));
    }
    expected.push((Command::Nop, true, 0));
    expected.push((Command::PrechargeAll, true, A10));
    for _ in 1..t.rp {
        expected.push((Command::Nop, true, 0));
    }
    for _ in 0..t.init_refreshes {
        expected.push((Command::AutoRefresh, true, 0));
        for _ in 1..t.rc {
            expected.push((Command::Nop, true, 0));
        }
    }
    expected.push((Command::LoadModeRegister, true, 0x033));
    for _ in 1..t.mrd {
        expected.push((Command::Nop, true, 0));
    }
    assert_eq!(actions, expected);
}

/// Tests that the number of steps matches the advertised ready cycle.
#[test]
fn test_length_matches_init_cycles() {
    let t = timing();
    let mut init = InitSequence::new(&t, ModeRegister::new(BurstLength::Eight, 3));
    let actions = run_to_done(&mut init);
    assert_eq!(actions.len() as u64, t.init_cycles());
    assert_eq!(t.init_cycles(), 33);
}

/// Tests that extra init refreshes are issued when configured.
#[test]
fn test_extra_refreshes() {
    let mut config = Config::default();
    config.timing.t_power_up_ns = 100.0;
    config.timing.init_refresh_count = 8;
    let t = config.cycle_timing().unwrap();
    let mut init = InitSequence::new(&t, ModeRegister::new(BurstLength::Four, 2));
    let actions = run_to_done(&mut init);

    let refreshes = actions
        .iter()
        .filter(|(c, _, _)| *c == Command::AutoRefresh)
        .count();
    assert_eq!(refreshes, 8);
    let mrs = actions
        .iter()
        .find(|(c, _, _)| *c == Command::LoadModeRegister)
        .unwrap();
    assert_eq!(mrs.2, 0x022);
}

/// Tests the intermediate steps reported by the sequence.
#[test]
fn test_step_progression() {
    let t = timing();
    let mut init = InitSequence::new(&t, ModeRegister::new(BurstLength::Eight, 3));
    assert_eq!(
        init.current(),
        InitStep::PowerUp {
            remaining: t.power_up
        }
    );
    for _ in 0..t.power_up {
        init.step();
    }
    assert_eq!(init.current(), InitStep::Wake);
    init.step();
    assert_eq!(init.current(), InitStep::PrechargeAll);
    init.step();
    assert_eq!(init.current(), InitStep::PrechargeWait { remaining: 1 });
    init.step();
    assert_eq!(init.current(), InitStep::Refresh { issued: 0 });

    run_to_done(&mut init);
    assert_eq!(init.current(), InitStep::Done);
    let after = init.step();
    assert_eq!(after.command, Command::Nop);
    assert!(init.is_done());
}
