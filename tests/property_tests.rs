//! Property-based tests for the controller.
//! Checks invariants over arbitrary page addresses and data.

use proptest::prelude::*;

use sdram_controller::common::constants::PAGE_ADDRESS_MASK;
use sdram_controller::common::PageAddress;
use sdram_controller::config::Config;
use sdram_controller::core::mode::{BurstLength, ModeRegister};
use sdram_controller::sim::{self, Completion, Job, PageRequester};
use sdram_controller::soc::builder::Top;

fn fast_top() -> Top {
    let mut config = Config::default();
    config.timing.t_power_up_ns = 100.0;
    let mut top = Top::new(&config).unwrap();
    top.run_until_ready(1000).unwrap();
    top
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    /// Data written at any page address reads back unchanged in its 24 bits.
    #[test]
    fn round_trip_any_address(raw in 0u32..=PAGE_ADDRESS_MASK, seed in any::<u32>()) {
        let mut top = fast_top();
        let address = PageAddress::new(raw);
        let beats = BurstLength::Eight.beats_from(address.column());
        let words: Vec<u32> = (0..beats).map(|i| seed.rotate_left(i) ^ i).collect();

        let mut requester = PageRequester::new();
        requester.push(Job::Write { address, words: words.clone() });
        requester.push(Job::Read { address, words: beats as usize });
        sim::run_until_idle(&mut top, &mut requester, 2000).unwrap();

        let data = match &requester.completions()[1] {
            Completion::Read { data, .. } => data.clone(),
            other => panic!("unexpected completion {:?}", other),
        };
        let want: Vec<u32> = words.iter().map(|w| w & 0x00FF_FFFF).collect();
        prop_assert_eq!(data, want);
    }

    /// A write touches only its own burst block.
    #[test]
    fn write_stays_in_block(raw in 0u32..=PAGE_ADDRESS_MASK) {
        let mut top = fast_top();
        let address = PageAddress::new(raw);
        let beats = BurstLength::Eight.beats_from(address.column());
        let words: Vec<u32> = vec![0x00AB_CDEF; beats as usize];

        let mut requester = PageRequester::new();
        requester.push(Job::Write { address, words });
        sim::run_until_idle(&mut top, &mut requester, 2000).unwrap();

        let block = address.column() & !7;
        for column in block..block + 8 {
            let got = top.device().peek(address.bank(), address.row(), column);
            if column >= address.column() {
                prop_assert_eq!(got, 0x00AB_CDEF);
            } else {
                prop_assert_eq!(got, 0);
            }
        }
    }

    /// The mode register value decodes back to the same settings.
    #[test]
    fn mode_register_decodes_own_encoding(code in 0u16..5, cl in 2u8..=3) {
        let bl = BurstLength::from_code(if code == 4 { 7 } else { code }).unwrap();
        let mode = ModeRegister::new(bl, cl);
        prop_assert_eq!(ModeRegister::decode(mode.encode()), Some(mode));
    }

    /// Beats never cross the end of the burst block or the page.
    #[test]
    fn beats_stay_in_page(column in 0u16..256, code in 0u16..5) {
        let bl = BurstLength::from_code(if code == 4 { 7 } else { code }).unwrap();
        let beats = bl.beats_from(column);
        prop_assert!(beats >= 1);
        prop_assert!(column as u32 + beats <= 256);
        if bl != BurstLength::FullPage {
            prop_assert_eq!((column as u32 % bl.block_words()) + beats, bl.block_words());
        }
    }
}
