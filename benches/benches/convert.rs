//! Benchmark suite for the conversion pipeline
//!
//! Measures analysis, the per-mode encoders, animation deltas and the
//! brute-force bitpair search on synthetic images.
//!
//! Run with: cargo bench --manifest-path benches/Cargo.toml

use c64gfx_benches::{generate_charset, generate_hires_blocks, generate_noise};
use c64gfx_types::{
	analyze::ModeAnalyzer,
	animation::AnimationEncoder,
	bitpair::BitpairAssigner,
	bruteforce::BruteForce,
	color::HwColor,
	compress::Compressor,
	encode::EncodedImage,
	mode::GraphicsMode,
	options::Options,
	source::SourceImage,
};
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::{convert::Infallible, hint::black_box};

const COLORS: [HwColor; 4] = [HwColor::BLACK, HwColor::WHITE, HwColor::RED, HwColor::CYAN];

/// Run-length encoder standing in for a real cruncher
struct RunLength;

impl Compressor for RunLength {
	type Error = Infallible;

	fn compress(&self, data: &[u8]) -> Result<Vec<u8>, Self::Error> {
		let mut out = Vec::new();
		for run in data.chunk_by(|a, b| a == b) {
			for part in run.chunks(255) {
				out.push(part.len() as u8);
				out.push(part[0]);
			}
		}
		Ok(out)
	}
}

/// Benchmark palette matching and block analysis
fn bench_analyze(c: &mut Criterion) {
	let mut group = c.benchmark_group("analyze");
	group.throughput(Throughput::Elements(320 * 200));

	let images = vec![
		("noise", generate_noise(1, COLORS)),
		("hires_blocks", generate_hires_blocks(2)),
		("charset", generate_charset(3, 64)),
	];
	let options = Options::default();

	for (name, image) in &images {
		group.bench_with_input(BenchmarkId::new("analyze", name), image, |b, image| {
			b.iter(|| {
				let source = SourceImage::new(black_box(image)).unwrap();
				black_box(ModeAnalyzer::analyze(&source, &options))
			});
		});
	}

	group.finish();
}

/// Benchmark the encoders of each bitmap and charset mode
fn bench_encode(c: &mut Criterion) {
	let mut group = c.benchmark_group("encode");

	let cases = vec![
		(GraphicsMode::MultiColorBitmap, generate_noise(4, COLORS)),
		(GraphicsMode::SingleColorBitmap, generate_hires_blocks(5)),
		(GraphicsMode::SingleColorCharset, generate_charset(6, 200)),
	];

	for (mode, image) in &cases {
		let options = Options::with_mode(*mode);
		let analyzed = ModeAnalyzer::analyze(&SourceImage::new(image).unwrap(), &options).unwrap();
		let mapping = BitpairAssigner::assign(&analyzed, None, true);
		group.bench_function(BenchmarkId::new("encode", mode.name()), |b| {
			b.iter(|| black_box(EncodedImage::encode(black_box(&analyzed), &mapping)));
		});
	}

	group.finish();
}

/// Benchmark animation delta encoding
fn bench_animation(c: &mut Criterion) {
	let mut group = c.benchmark_group("animation");

	let options = Options::with_mode(GraphicsMode::MultiColorBitmap);
	let frames: Vec<EncodedImage> = (0..4)
		.map(|seed| {
			let image = generate_noise(seed, COLORS);
			let analyzed =
				ModeAnalyzer::analyze(&SourceImage::new(&image).unwrap(), &options).unwrap();
			let mapping = BitpairAssigner::assign(&analyzed, None, true);
			EncodedImage::encode(&analyzed, &mapping).unwrap()
		})
		.collect();

	group.throughput(Throughput::Elements(frames.len() as u64));
	group.bench_function("encode_frames", |b| {
		b.iter(|| black_box(AnimationEncoder::encode(black_box(&frames))));
	});

	group.finish();
}

/// Benchmark the brute-force search with different worker counts
fn bench_brute_force(c: &mut Criterion) {
	let mut group = c.benchmark_group("brute_force");
	group.sample_size(10);

	let image = generate_noise(7, COLORS);
	let options = Options::with_mode(GraphicsMode::MultiColorBitmap);
	let analyzed = ModeAnalyzer::analyze(&SourceImage::new(&image).unwrap(), &options).unwrap();

	for workers in [1, 4] {
		group.bench_with_input(BenchmarkId::new("koala", workers), &workers, |b, &workers| {
			b.iter(|| black_box(BruteForce::best(black_box(&analyzed), &RunLength, workers)));
		});
	}

	group.finish();
}

criterion_group!(benches, bench_analyze, bench_encode, bench_animation, bench_brute_force);
criterion_main!(benches);
