//! Brute-force bitpair search.
//!
//! The bitpair order changes which bit patterns an image produces, and with it
//! how well the program compresses. The search tries every ordering of the
//! most used colors, encodes, links and compresses each one, and keeps the
//! smallest.
//!
//! Candidates are scored by a fixed pool of worker threads draining a bounded
//! job queue. Results arrive in any order and are sorted once every worker has
//! finished, so the outcome does not depend on the number of workers.

use std::{
	sync::{Mutex, mpsc},
	thread,
};

use itertools::Itertools;
use log::{debug, info, trace};

use crate::{
	analyze::AnalyzedImage,
	bitpair::BitpairMapping,
	color::HwColor,
	compress::Compressor,
	encode::EncodedImage,
	error::{ConvertError, PackingError},
	mode::GraphicsMode,
};

/// Colors taken into the permutations, by frequency.
pub const MAX_CANDIDATE_COLORS: usize = 8;

/// Runners-up within this many bytes of the winner are logged.
pub const ALTERNATIVE_MARGIN: usize = 5;

/// Most runners-up logged.
pub const MAX_ALTERNATIVES: usize = 5;

/// A scored candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Score {
	/// The candidate mapping
	pub mapping: BitpairMapping,
	/// Compressed program length
	pub len: usize,
	/// Position in candidate order, breaks ties
	pub sequence: usize,
}

/// Searches bitpair orderings for the smallest compressed output.
pub struct BruteForce;

impl BruteForce {
	/// Every candidate mapping for the image, in a fixed order.
	///
	/// Candidates are the permutations of the most used colors into the mode's
	/// slots. Mappings whose slot 0 cannot be the global background are
	/// dropped, as are multicolor charset mappings whose slot 3 is a color the
	/// char color nibble cannot hold.
	pub fn candidates(image: &AnalyzedImage) -> Vec<BitpairMapping> {
		let mode = image.mode();
		let colors: Vec<HwColor> =
			image.colors_by_frequency().into_iter().take(MAX_CANDIDATE_COLORS).collect();
		let slots = mode.max_colors().min(colors.len());
		colors
			.into_iter()
			.permutations(slots)
			.filter(|p| !mode.has_global_background() || image.is_background_candidate(p[0]))
			.filter(|p| {
				mode != GraphicsMode::MultiColorCharset || p.get(3).is_none_or(|c| c.index() < 8)
			})
			.map(|p| BitpairMapping::from_colors(&p))
			.collect()
	}

	/// Scores every candidate with `workers` threads.
	///
	/// Candidates that fail to encode are skipped. A compressor failure
	/// aborts the search.
	///
	/// # Returns
	///
	/// Scores sorted by length, then by candidate order.
	pub fn search<C: Compressor>(
		image: &AnalyzedImage,
		compressor: &C,
		workers: usize,
	) -> Result<Vec<Score>, ConvertError> {
		let candidates = Self::candidates(image);
		let workers = workers.clamp(1, candidates.len().max(1));
		info!(
			"brute force: {} candidate(s) for {} on {} worker(s)",
			candidates.len(),
			image.mode(),
			workers
		);

		let (job_tx, job_rx) = mpsc::sync_channel::<(usize, BitpairMapping)>(workers);
		let job_rx = Mutex::new(job_rx);
		let (result_tx, result_rx) = mpsc::channel();

		thread::scope(|scope| {
			for id in 0..workers {
				let job_rx = &job_rx;
				let result_tx = result_tx.clone();
				scope.spawn(move || {
					let mut done = 0usize;
					loop {
						let job = match job_rx.lock() {
							Ok(rx) => rx.recv(),
							Err(_) => break,
						};
						let Ok((sequence, mapping)) = job else {
							break;
						};
						let outcome = Self::score(image, &mapping, compressor);
						if result_tx.send((sequence, mapping, outcome)).is_err() {
							break;
						}
						done += 1;
					}
					trace!("worker {} scored {} candidate(s)", id, done);
				});
			}
			drop(result_tx);
			for job in candidates.into_iter().enumerate() {
				if job_tx.send(job).is_err() {
					break;
				}
			}
			drop(job_tx);
		});

		let mut scores = Vec::new();
		for (sequence, mapping, outcome) in result_rx {
			let len = outcome.map_err(|err| ConvertError::external("compress", err))?;
			if let Some(len) = len {
				scores.push(Score {
					mapping,
					len,
					sequence,
				});
			}
		}
		scores.sort_by_key(|score| (score.len, score.sequence));
		Ok(scores)
	}

	/// The best candidate.
	///
	/// Fails with [`PackingError::NoCandidates`] if no candidate encodes.
	pub fn best<C: Compressor>(
		image: &AnalyzedImage,
		compressor: &C,
		workers: usize,
	) -> Result<Score, ConvertError> {
		let scores = Self::search(image, compressor, workers)?;
		let Some(best) = scores.first() else {
			return Err(PackingError::NoCandidates.into());
		};
		info!("brute force: best bitpair colors {} at {} byte(s)", best.mapping, best.len);
		for alternative in scores
			.iter()
			.skip(1)
			.take_while(|score| score.len <= best.len + ALTERNATIVE_MARGIN)
			.take(MAX_ALTERNATIVES)
		{
			info!("  alternative {} at {} byte(s)", alternative.mapping, alternative.len);
		}
		Ok(best.clone())
	}

	/// Encodes, links and compresses one candidate.
	///
	/// `Ok(None)` means the candidate cannot represent the image.
	fn score<C: Compressor>(
		image: &AnalyzedImage,
		mapping: &BitpairMapping,
		compressor: &C,
	) -> Result<Option<usize>, C::Error> {
		let prg = EncodedImage::encode(image, mapping)
			.and_then(|encoded| encoded.to_prg().map_err(ConvertError::from));
		match prg {
			Ok(prg) => {
				let len = compressor.compressed_len(&prg)?;
				debug!("{}: {} byte(s)", mapping, len);
				Ok(Some(len))
			}
			Err(err) => {
				trace!("skipping {}: {}", mapping, err);
				Ok(None)
			}
		}
	}
}
