// SPDX-FileCopyrightText: 2026 Eli Array Minkoff
//
// SPDX-License-Identifier: 0BSD

//! Laws that should hold for any word, address, or operand

use intcode::decode::{Instruction, decode};
use intcode::prelude::*;
use intcode::{InvalidAddress, Memory};
use proptest::prelude::*;

proptest! {
    #[test]
    fn decoded_digits_rebuild_the_word(word in 0_i64..100_000) {
        let raw = decode(word);
        let [a, b, c] = raw.modes;
        prop_assert_eq!(raw.opcode + 100 * a + 1000 * b + 10_000 * c, word);
        prop_assert!(raw.opcode < 100);
        prop_assert!(raw.modes.iter().all(|m| (0..10).contains(m)));
    }

    #[test]
    fn digits_above_the_modes_are_ignored(word in 0_i64..100_000, extra in 1_i64..1000) {
        prop_assert_eq!(
            Instruction::from_word(word + extra * 100_000).ok(),
            Instruction::from_word(word).ok()
        );
    }

    #[test]
    fn written_values_read_back(
        writes in prop::collection::vec((0_i64..1 << 40, any::<i64>()), 1..64),
        probe in 0_i64..1 << 40,
    ) {
        let mut mem = Memory::new();
        for &(address, value) in &writes {
            mem.write(address, value).unwrap();
        }
        let expected = writes
            .iter()
            .rev()
            .find(|&&(address, _)| address == probe)
            .map_or(0, |&(_, value)| value);
        prop_assert_eq!(mem.read(probe), Ok(expected));
        let highest = writes.iter().map(|&(address, _)| address).max();
        prop_assert_eq!(mem.highest_written_address(), highest);
    }

    #[test]
    fn negative_addresses_are_rejected(address in i64::MIN..0) {
        let mut mem = Memory::new();
        prop_assert_eq!(mem.read(address), Err(InvalidAddress(address)));
        prop_assert_eq!(mem.write(address, 1), Err(InvalidAddress(address)));
    }

    #[test]
    fn arithmetic_wraps(a in any::<i64>(), b in any::<i64>()) {
        let mut sum = Executor::new([1101, a, b, 5, 99, 0], QueueIo::new());
        prop_assert_eq!(sum.run(), Ok(State::Halted));
        prop_assert_eq!(sum[5], a.wrapping_add(b));

        let mut product = Executor::new([1102, a, b, 5, 99, 0], QueueIo::new());
        prop_assert_eq!(product.run(), Ok(State::Halted));
        prop_assert_eq!(product[5], a.wrapping_mul(b));
    }

    #[test]
    fn echo_any_value(value in any::<i64>()) {
        let mut exec = Executor::new([3, 0, 4, 0, 99], QueueIo::new());
        prop_assert_eq!(exec.run_through_inputs([value]), Ok((vec![value], State::Halted)));
    }
}
