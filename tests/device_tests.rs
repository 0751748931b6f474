//! Integration tests for the SDRAM device model.

use sdram_controller::common::error::DeviceError;
use sdram_controller::config::Config;
use sdram_controller::core::command::Command;
use sdram_controller::core::init::InitSequence;
use sdram_controller::core::mode::{BurstLength, ModeRegister};
use sdram_controller::core::signals::DevicePins;
use sdram_controller::core::timing::Timing;
use sdram_controller::soc::memory::Sdram;
use sdram_controller::soc::mux::LineState;
use sdram_controller::soc::traits::MemoryDevice;

/// Default timings with a 12-cycle power-up delay.
fn timing() -> Timing {
    let mut config = Config::default();
    config.timing.t_power_up_ns = 100.0;
    config.cycle_timing().unwrap()
}

fn pins(command: Command, bank: u8, address: u16, dqm: u8) -> DevicePins {
    let mut p = DevicePins::default();
    p.cke = true;
    p.set_command(command);
    p.bank = bank;
    p.address = address;
    p.dqm = dqm;
    p
}

fn nop(dev: &mut Sdram, cycles: u32) {
    for _ in 0..cycles {
        dev.clk(&pins(Command::Nop, 0, 0, 0), LineState::HighZ).unwrap();
    }
}

/// Runs the controller's init sequence against a fresh device.
fn initialized(timing: Timing, mode: ModeRegister) -> Sdram {
    let mut dev = Sdram::new(timing);
    let mut init = InitSequence::new(&timing, mode);
    dev.clk(&DevicePins::default(), LineState::HighZ).unwrap();
    while !init.is_done() {
        let action = init.step();
        let mut p = DevicePins::default();
        p.cke = action.cke;
        p.set_command(action.command);
        p.address = action.address;
        dev.clk(&p, LineState::HighZ).unwrap();
    }
    dev
}

fn device() -> Sdram {
    initialized(timing(), ModeRegister::new(BurstLength::Eight, 3))
}

/// Tests that the init sequence leaves the device initialized.
#[test]
fn test_init_sequence_accepted() {
    let dev = device();
    assert!(dev.is_initialized());
    assert_eq!(dev.refresh_count(), 2);
    assert_eq!(dev.mode(), Some(&ModeRegister::new(BurstLength::Eight, 3)));
    assert_eq!(dev.output(), None);
}

/// Tests that commands before the power-up delay are rejected.
#[test]
fn test_command_before_power_up() {
    let mut dev = Sdram::new(timing());
    dev.clk(&pins(Command::Nop, 0, 0, 0xF), LineState::HighZ).unwrap();
    let err = dev
        .clk(&pins(Command::PrechargeAll, 0, 1 << 10, 0xF), LineState::HighZ)
        .unwrap_err();
    assert!(matches!(err, DeviceError::PowerUp { cycle: 1, .. }));
}

/// Tests that commands are ignored while CKE was low.
#[test]
fn test_cke_low_ignores_commands() {
    let mut dev = Sdram::new(timing());
    let mut p = pins(Command::PrechargeAll, 0, 1 << 10, 0xF);
    p.cke = false;
    for _ in 0..5 {
        dev.clk(&p, LineState::HighZ).unwrap();
    }
}

/// Tests that array access before initialization is rejected.
#[test]
fn test_active_before_init() {
    let t = timing();
    let mut dev = Sdram::new(t);
    nop(&mut dev, t.power_up + 1);
    let err = dev
        .clk(&pins(Command::Active, 0, 0, 0xF), LineState::HighZ)
        .unwrap_err();
    assert!(matches!(
        err,
        DeviceError::NotInitialized {
            command: Command::Active,
            ..
        }
    ));
}

/// Tests the ACTIVE to READ delay check.
#[test]
fn test_rcd_violation() {
    let mut dev = device();
    dev.clk(&pins(Command::Active, 0, 5, 0), LineState::HighZ).unwrap();
    nop(&mut dev, 2);
    let err = dev
        .clk(&pins(Command::Read, 0, 0, 0), LineState::HighZ)
        .unwrap_err();
    assert!(matches!(
        err,
        DeviceError::Timing {
            parameter: "tRCD",
            elapsed: 3,
            required: 6,
            ..
        }
    ));
}

/// Tests that activating an open bank is rejected.
#[test]
fn test_active_on_open_bank() {
    let mut dev = device();
    dev.clk(&pins(Command::Active, 2, 9, 0), LineState::HighZ).unwrap();
    nop(&mut dev, 20);
    let err = dev
        .clk(&pins(Command::Active, 2, 10, 0), LineState::HighZ)
        .unwrap_err();
    assert!(matches!(
        err,
        DeviceError::BankAlreadyActive {
            bank: 2,
            row: 9,
            ..
        }
    ));
}

/// Tests the spacing of ACTIVE commands to different banks.
#[test]
fn test_rrd_violation() {
    let mut dev = device();
    dev.clk(&pins(Command::Active, 0, 0, 0), LineState::HighZ).unwrap();
    let err = dev
        .clk(&pins(Command::Active, 1, 0, 0), LineState::HighZ)
        .unwrap_err();
    assert!(matches!(err, DeviceError::Timing { parameter: "tRRD", .. }));
}

/// Tests READ on a bank without an open row.
#[test]
fn test_read_on_idle_bank() {
    let mut dev = device();
    let err = dev
        .clk(&pins(Command::Read, 3, 0, 0), LineState::HighZ)
        .unwrap_err();
    assert!(matches!(err, DeviceError::BankNotActive { bank: 3, .. }));
}

/// Tests a burst write followed by a burst read with CAS latency 3.
#[test]
fn test_write_then_read_burst() {
    let t = timing();
    let mut dev = device();
    dev.clk(&pins(Command::Active, 1, 0x55, 0), LineState::HighZ).unwrap();
    nop(&mut dev, t.rcd - 1);

    dev.clk(&pins(Command::Write, 1, 0, 0), LineState::Driven(100)).unwrap();
    for i in 1..8 {
        dev.clk(&pins(Command::Nop, 0, 0, 0), LineState::Driven(100 + i))
            .unwrap();
    }
    assert_eq!(dev.peek(1, 0x55, 0), 100);
    assert_eq!(dev.peek(1, 0x55, 7), 107);

    dev.clk(&pins(Command::Read, 1, 0, 0), LineState::HighZ).unwrap();
    assert_eq!(dev.output(), None);
    nop(&mut dev, 1);
    assert_eq!(dev.output(), None);
    nop(&mut dev, 1);
    for i in 0..8 {
        assert_eq!(dev.output(), Some(100 + i));
        nop(&mut dev, 1);
    }
    assert_eq!(dev.output(), None);
}

/// Tests that a burst starting mid-block wraps inside its block.
#[test]
fn test_burst_wraps_within_block() {
    let t = timing();
    let mut dev = device();
    for col in 0..16 {
        dev.poke(0, 3, col, 0x1000 + col as u32);
    }
    dev.clk(&pins(Command::Active, 0, 3, 0), LineState::HighZ).unwrap();
    nop(&mut dev, t.rcd - 1);
    dev.clk(&pins(Command::Read, 0, 13, 0), LineState::HighZ).unwrap();
    nop(&mut dev, 2);

    let mut seen = Vec::new();
    for _ in 0..8 {
        seen.push(dev.output().unwrap());
        nop(&mut dev, 1);
    }
    assert_eq!(
        seen,
        vec![0x100D, 0x100E, 0x100F, 0x1008, 0x1009, 0x100A, 0x100B, 0x100C]
    );
}

/// Tests DQM lane masking on writes and the two-cycle read mask latency.
#[test]
fn test_data_mask() {
    let t = timing();
    let mut dev = device();
    dev.poke(0, 0, 0, 0x1122_3344);
    dev.clk(&pins(Command::Active, 0, 0, 0xF), LineState::HighZ).unwrap();
    nop(&mut dev, t.rcd - 1);

    dev.clk(&pins(Command::Write, 0, 0, 0b1000), LineState::Driven(0xAABB_CCDD))
        .unwrap();
    for _ in 1..8 {
        dev.clk(&pins(Command::Nop, 0, 0, 0xF), LineState::HighZ).unwrap();
    }
    assert_eq!(dev.peek(0, 0, 0), 0x11BB_CCDD);

    dev.clk(&pins(Command::Read, 0, 0, 0b1000), LineState::HighZ).unwrap();
    dev.clk(&pins(Command::Nop, 0, 0, 0b1000), LineState::HighZ).unwrap();
    dev.clk(&pins(Command::Nop, 0, 0, 0xF), LineState::HighZ).unwrap();
    // Beat 0 is gated by the DQM of the cycle after READ.
    assert_eq!(dev.output(), Some(0xFFBB_CCDD));
    dev.clk(&pins(Command::Nop, 0, 0, 0xF), LineState::HighZ).unwrap();
    assert_eq!(dev.output(), None);
}

/// Tests that an unmasked write beat on a floating bus is an error.
#[test]
fn test_undriven_write() {
    let t = timing();
    let mut dev = device();
    dev.clk(&pins(Command::Active, 0, 0, 0), LineState::HighZ).unwrap();
    nop(&mut dev, t.rcd - 1);
    let err = dev
        .clk(&pins(Command::Write, 0, 4, 0), LineState::HighZ)
        .unwrap_err();
    assert!(matches!(err, DeviceError::UndrivenWrite { column: 4, .. }));
}

/// Tests write recovery before PRECHARGE.
#[test]
fn test_wr_violation() {
    let t = timing();
    let mut dev = device();
    dev.clk(&pins(Command::Active, 0, 0, 0), LineState::HighZ).unwrap();
    nop(&mut dev, t.rcd - 1);
    dev.clk(&pins(Command::Write, 0, 0, 0), LineState::Driven(1)).unwrap();
    let err = dev
        .clk(&pins(Command::Precharge, 0, 0, 0xF), LineState::HighZ)
        .unwrap_err();
    assert!(matches!(err, DeviceError::Timing { parameter: "tWR", .. }));
}

/// Tests tRAS before PRECHARGE.
#[test]
fn test_ras_violation() {
    let mut dev = device();
    dev.clk(&pins(Command::Active, 0, 0, 0), LineState::HighZ).unwrap();
    nop(&mut dev, 1);
    let err = dev
        .clk(&pins(Command::Precharge, 0, 0, 0xF), LineState::HighZ)
        .unwrap_err();
    assert!(matches!(err, DeviceError::Timing { parameter: "tRAS", .. }));
}

/// Tests that REFRESH with an open row is rejected.
#[test]
fn test_refresh_with_open_bank() {
    let mut dev = device();
    dev.clk(&pins(Command::Active, 1, 0, 0), LineState::HighZ).unwrap();
    nop(&mut dev, 10);
    let err = dev
        .clk(&pins(Command::AutoRefresh, 0, 0, 0xF), LineState::HighZ)
        .unwrap_err();
    assert!(matches!(
        err,
        DeviceError::BankOpen {
            bank: 1,
            command: Command::AutoRefresh,
            ..
        }
    ));
}

/// Tests that missing refreshes are detected.
#[test]
fn test_refresh_overdue() {
    let t = timing();
    let mut dev = device();
    let mut result = Ok(());
    for _ in 0..(t.refi * 2) {
        result = dev.clk(&pins(Command::Nop, 0, 0, 0xF), LineState::HighZ);
        if result.is_err() {
            break;
        }
    }
    match result {
        Err(DeviceError::RefreshOverdue { elapsed, limit, .. }) => {
            assert_eq!(limit, t.refi as u64);
            assert_eq!(elapsed, limit + 1);
        }
        other => panic!("expected RefreshOverdue, got {:?}", other),
    }
}

/// Tests that an unsupported mode value is rejected.
#[test]
fn test_invalid_mode() {
    let t = timing();
    let mut dev = Sdram::new(t);
    nop(&mut dev, t.power_up + 1);
    let err = dev
        .clk(&pins(Command::LoadModeRegister, 0, 0x013, 0xF), LineState::HighZ)
        .unwrap_err();
    assert!(matches!(err, DeviceError::InvalidMode { value: 0x013, .. }));
}

/// Tests that auto-precharge column commands are refused.
#[test]
fn test_auto_precharge_refused() {
    let t = timing();
    let mut dev = device();
    dev.clk(&pins(Command::Active, 0, 0, 0), LineState::HighZ).unwrap();
    nop(&mut dev, t.rcd - 1);
    let err = dev
        .clk(&pins(Command::Read, 0, 1 << 10, 0), LineState::HighZ)
        .unwrap_err();
    assert!(matches!(err, DeviceError::AutoPrecharge { .. }));
}
