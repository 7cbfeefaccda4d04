// Domain rules - Segmentation and pairing policies

use std::sync::OnceLock;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use regex::Regex;

use crate::domain::errors::*;
use crate::domain::model::*;

/// Upper bound on boundaries a single plan may hold
const MAX_BOUNDARIES: usize = 100_000;

fn duration_regex() -> &'static Regex {
    static DURATION_RE: OnceLock<Regex> = OnceLock::new();
    DURATION_RE.get_or_init(|| {
        Regex::new(r"Duration: (\d+):(\d+):(\d+\.\d+)").expect("duration pattern is valid")
    })
}

/// Extracts the container duration from media tool diagnostics
pub struct DurationParser;

impl DurationParser {
    /// Parse a single diagnostic line
    pub fn parse_line(line: &str) -> Option<MediaDuration> {
        let captures = duration_regex().captures(line)?;
        let hours = captures[1].parse::<u32>().ok()?;
        let minutes = captures[2].parse::<u32>().ok()?;
        let seconds = captures[3].parse::<f64>().ok()?;
        MediaDuration::from_components(hours, minutes, seconds).ok()
    }

    /// First duration found scanning the text line by line
    pub fn parse_diagnostics(text: &str) -> Option<MediaDuration> {
        text.lines().find_map(Self::parse_line)
    }
}

/// Computes cut points from a duration and a segment mode
pub struct SegmentPlanner;

impl SegmentPlanner {
    /// Plan the boundary set for one source.
    ///
    /// Count mode yields the `n - 1` interior cuts `i * duration / n`. Fixed-length
    /// mode yields every multiple of the length strictly below the duration, then
    /// the duration itself, so the last segment holds the remainder.
    pub fn plan_boundaries(
        duration: MediaDuration,
        mode: SegmentMode,
    ) -> Result<SegmentBoundarySet, DomainError> {
        mode.validate()?;
        let total = duration.seconds();

        let boundaries = match mode {
            SegmentMode::Count { n } => {
                let n = n as usize;
                if n > MAX_BOUNDARIES {
                    return Err(DomainError::SegmentOverflow {
                        planned: n,
                        max: MAX_BOUNDARIES,
                    });
                }
                let length = total / n as f64;
                (1..n).map(|i| i as f64 * length).collect()
            }
            SegmentMode::FixedLength { seconds } => {
                let expected = (total / seconds).ceil() as usize + 1;
                if expected > MAX_BOUNDARIES {
                    return Err(DomainError::SegmentOverflow {
                        planned: expected,
                        max: MAX_BOUNDARIES,
                    });
                }
                let mut boundaries = Vec::with_capacity(expected);
                let mut k = 1u64;
                loop {
                    let boundary = k as f64 * seconds;
                    if boundary >= total {
                        break;
                    }
                    boundaries.push(boundary);
                    k += 1;
                }
                boundaries.push(total);
                boundaries
            }
        };

        Ok(SegmentBoundarySet {
            mode,
            duration,
            boundaries,
        })
    }

    /// Reject plans whose segment files could not be ordered by name
    pub fn check_capacity(
        plan: &SegmentBoundarySet,
        naming: &SegmentNaming,
    ) -> Result<(), DomainError> {
        let planned = plan.segment_count();
        let max = naming.max_segments();
        if planned > max {
            return Err(DomainError::SegmentOverflow { planned, max });
        }
        Ok(())
    }

    /// Check what the segment muxer actually wrote. The listing must hold
    /// exactly the ordinals `0..len` under this naming, otherwise name order
    /// no longer matches time order.
    pub fn check_listing(list: &SegmentList, naming: &SegmentNaming) -> Result<(), DomainError> {
        let max = naming.max_segments();
        if list.len() > max {
            return Err(DomainError::SegmentOverflow {
                planned: list.len(),
                max,
            });
        }

        for file in &list.files {
            let expected = naming.file_name(file.ordinal);
            let actual = file.path.file_name().map(|name| name.to_string_lossy());
            if actual.as_deref() != Some(expected.as_str()) {
                return Err(DomainError::FsFail(format!(
                    "Unexpected segment file {} (expected {})",
                    file.path.display(),
                    expected
                )));
            }
        }
        Ok(())
    }
}

/// Selects one source's segment files out of a directory listing
pub struct SegmentSelector;

impl SegmentSelector {
    /// Keep names starting with `prefix`, sorted lexicographically
    pub fn select<I, S>(names: I, prefix: &str) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut selected: Vec<String> = names
            .into_iter()
            .map(Into::into)
            .filter(|name| name.starts_with(prefix))
            .collect();
        selected.sort();
        selected
    }
}

/// Assigns a secondary segment to every primary segment
pub struct Pairer;

impl Pairer {
    /// Pair using the policy; `Random` without a seed draws from OS entropy
    pub fn pair(
        primary: &SegmentList,
        secondary: &SegmentList,
        policy: PairingPolicy,
    ) -> Result<PairedSegments, DomainError> {
        let mut rng = match policy {
            PairingPolicy::Random { seed: None } => StdRng::from_entropy(),
            PairingPolicy::Random { seed: Some(seed) } => StdRng::seed_from_u64(seed),
            // Cyclic never draws
            PairingPolicy::Cyclic => StdRng::seed_from_u64(0),
        };
        Self::pair_with_rng(primary, secondary, policy, &mut rng)
    }

    /// Pair with an explicit random source. Indices covered by the secondary
    /// list are always paired positionally.
    pub fn pair_with_rng<R: Rng + ?Sized>(
        primary: &SegmentList,
        secondary: &SegmentList,
        policy: PairingPolicy,
        rng: &mut R,
    ) -> Result<PairedSegments, DomainError> {
        if primary.is_empty() {
            return Err(DomainError::EmptySegmentList(format!(
                "primary source {} has no segments",
                primary.label
            )));
        }
        if secondary.is_empty() {
            return Err(DomainError::EmptySegmentList(format!(
                "secondary source {} has no segments",
                secondary.label
            )));
        }

        let b = &secondary.files;
        let pairs = primary
            .files
            .iter()
            .enumerate()
            .map(|(i, a)| {
                let partner = if i < b.len() {
                    &b[i]
                } else {
                    match policy {
                        PairingPolicy::Cyclic => &b[i % b.len()],
                        PairingPolicy::Random { .. } => &b[rng.gen_range(0..b.len())],
                    }
                };
                SegmentPair {
                    index: i,
                    primary: a.clone(),
                    secondary: partner.clone(),
                }
            })
            .collect();

        Ok(pairs)
    }
}
