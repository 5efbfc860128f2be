//! Transmit wired straight back into receive

use baudline_core::{Mailbox, UartConfig};
use baudline_sim::Simulator;
use proptest::prelude::*;

/// Levels of the ten bit slots of an 8N1 frame
fn expected_levels(byte: u8) -> [bool; 10] {
    let mut levels = [true; 10];
    levels[0] = false;
    for bit in 0..8 {
        levels[bit + 1] = byte & (1 << bit) != 0;
    }
    levels
}

#[test]
fn test_every_byte_round_trips() {
    let mailbox = Mailbox::new();
    let mut sim = Simulator::looped_back(UartConfig::default(), &mailbox).unwrap();
    let settle = sim.frame_ticks() + sim.bit_ticks();

    for byte in 0..=255u8 {
        assert!(sim.putc(byte));
        sim.run_for(settle);
        assert_eq!(sim.getc(), Some(byte), "byte {byte:#04x}");
        assert!(sim.uart().is_idle());
    }

    let stats = mailbox.stats().snapshot();
    assert_eq!(stats.frames_sent, 256);
    assert_eq!(stats.frames_received, 256);
    assert_eq!(stats.framing_errors, 0);
    assert!(mailbox.take_errors().is_empty());
}

#[test]
fn test_waveform_for_0x41() {
    let mailbox = Mailbox::new();
    let mut sim = Simulator::looped_back(UartConfig::default(), &mailbox).unwrap();

    assert!(sim.putc(0x41));
    sim.run_for(1200);

    assert_eq!(
        sim.tx_wire().transitions(),
        vec![(0, false), (104, true), (208, false), (728, true), (832, false), (936, true)]
    );
    assert_eq!(sim.tx_wire().frame_levels(0, 104), expected_levels(0x41));
    assert_eq!(sim.getc(), Some(0x41));
}

#[test]
fn test_receiver_samples_bit_centers() {
    let mailbox = Mailbox::new();
    let mut sim = Simulator::looped_back(UartConfig::default(), &mailbox).unwrap();

    sim.putc(b'u');
    sim.run_for(1200);

    let expected: Vec<u64> = (0..10).map(|slot| 52 + slot * 104).collect();
    assert_eq!(sim.rx_timer().firings(), expected);
}

#[test]
fn test_back_to_back_frames_have_no_gap() {
    let mailbox = Mailbox::new();
    let mut sim = Simulator::looped_back(UartConfig::default(), &mailbox).unwrap();

    assert!(sim.putc(b'['));
    // Slot frees as soon as the first byte is latched
    assert!(sim.putc(b']'));
    assert!(!sim.putc(b'x'));

    sim.run_until(1000);
    assert_eq!(sim.getc(), Some(b'['));

    sim.run_until(2200);
    assert_eq!(sim.getc(), Some(b']'));

    let wire = sim.tx_wire();
    assert_eq!(wire.falling_edges()[0], 0);
    assert!(wire.falling_edges().contains(&1040));
    assert!(wire.level_at(1039));
    assert_eq!(wire.frame_levels(1040, 104), expected_levels(b']'));

    assert!(sim.uart().is_idle());
    assert_eq!(sim.tx_timer().deadline(), None);
    assert_eq!(mailbox.stats().snapshot().frames_sent, 2);
}

#[test]
fn test_idle_line_stays_quiet() {
    let mailbox = Mailbox::new();
    let mut sim = Simulator::looped_back(UartConfig::default(), &mailbox).unwrap();

    assert!(sim.uart().is_idle());
    sim.run_for(50_000);

    assert!(sim.uart().is_idle());
    assert!(sim.rx_timer().firings().is_empty());
    assert!(sim.tx_timer().firings().is_empty());
    assert!(sim.tx_wire().transitions().is_empty());
    assert_eq!(sim.getc(), None);
}

#[test]
fn test_run_until_idle() {
    let mailbox = Mailbox::new();
    let mut sim = Simulator::looped_back(UartConfig::default(), &mailbox).unwrap();

    sim.putc(0x00);
    sim.putc(0xFF);
    assert!(sim.run_until_idle(3000));
    assert_eq!(sim.now(), 2080);
    assert!(!mailbox.is_transmitting());
}

#[test]
fn test_full_duplex() {
    let mailbox = Mailbox::new();
    let mut sim = Simulator::new(UartConfig::default(), &mailbox).unwrap();
    let bit = sim.nominal_bit_ticks();

    sim.drive(&baudline_sim::Waveform::new().frame(30, b'R', bit));
    assert!(sim.putc(b'T'));
    sim.run_for(2000);

    assert_eq!(sim.getc(), Some(b'R'));
    assert_eq!(sim.tx_wire().frame_levels(0, 104), expected_levels(b'T'));
    assert!(sim.uart().is_idle());
}

proptest! {
    #[test]
    fn prop_bytes_arrive_in_order(frames in prop::collection::vec((any::<u8>(), 0u64..400), 1..12)) {
        let mailbox = Mailbox::new();
        let mut sim = Simulator::looped_back(UartConfig::default(), &mailbox).unwrap();
        let frame = sim.frame_ticks();

        for &(byte, gap) in &frames {
            prop_assert!(sim.putc(byte));
            sim.run_for(frame + gap);
            prop_assert_eq!(sim.getc(), Some(byte));
        }

        prop_assert_eq!(mailbox.stats().snapshot().frames_sent as usize, frames.len());
        prop_assert!(sim.uart().is_idle());
    }
}
