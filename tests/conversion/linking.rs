//! Linker properties.

use c64gfx_rs::prelude::*;
use rand::{Rng, SeedableRng, rngs::SmallRng};
use rstest::rstest;

#[rstest]
#[case(0x0801, 0x0900)]
#[case(0x2000, 0x3f40)]
#[case(0xc000, 0xcfff)]
fn test_overlapping_write_fails(#[case] first: u16, #[case] second: u16) {
	let mut linker = Linker::default();
	let len = usize::from(second - first) + 1;
	linker.write_at(first, &vec![1; len]).unwrap();
	let before = linker.to_prg().unwrap();
	let err = linker.write_at(second, &[2, 2, 2]).unwrap_err();
	assert!(matches!(
		err,
		MemoryError::Overlap {
			address,
			remaining: 3
		} if address == usize::from(second)
	));
	// a failed write leaves memory untouched
	assert_eq!(linker.to_prg().unwrap(), before);
}

#[test]
fn test_disjoint_blobs_keep_their_bytes() {
	let mut rng = SmallRng::seed_from_u64(11);
	for _ in 0..50 {
		let mut linker = Linker::default();
		let mut blobs: Vec<(u16, Vec<u8>)> = Vec::new();
		let mut address: u16 = rng.random_range(0x0400..0x1000);
		for _ in 0..rng.random_range(1..8) {
			let len = rng.random_range(1..200);
			let bytes: Vec<u8> = (0..len).map(|_| rng.random_range(1..=255)).collect();
			blobs.push((address, bytes));
			address += len as u16 + rng.random_range(0..300);
		}
		linker.write_map(blobs.iter().rev().map(|(a, b)| (*a, b.as_slice()))).unwrap();

		let prg = linker.to_prg().unwrap();
		let start = blobs[0].0;
		assert_eq!(&prg[..2], &start.to_le_bytes());
		for (address, bytes) in &blobs {
			let offset = 2 + usize::from(address - start);
			assert_eq!(&prg[offset..offset + bytes.len()], bytes.as_slice());
		}
		let (last, bytes) = blobs.last().unwrap();
		assert_eq!(prg.len(), 2 + usize::from(last - start) + bytes.len());
	}
}

#[test]
fn test_out_of_memory() {
	let mut linker = Linker::new(0xfff0);
	assert!(matches!(
		linker.write(&[0; 32]),
		Err(MemoryError::OutOfMemory {
			address: 0xfff0,
			len: 32
		})
	));
	assert!(matches!(linker.to_prg(), Err(MemoryError::Empty)));
}
