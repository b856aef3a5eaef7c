//! Lane boundary chaining.
//!
//! The peaks of all rows form a single pool of candidate points. A starting
//! point is found for each boundary on the nearest row with any peaks, after
//! which each boundary is extended row by row with the closest remaining
//! candidate. A candidate claimed by one boundary is removed from the pool
//! so that it can never be claimed by the other.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::Vector2;
use serde::Serialize;
use std::collections::BTreeSet;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A point on a lane boundary in the cut grayscale field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct LanePoint {
    /// Column index, 0 at the left of the frame
    pub col: usize,

    /// Row index, 0 nearest the vehicle
    pub row: usize,
}

/// An ordered sequence of boundary points, one per row, with strictly
/// increasing rows.
pub type BoundaryChain = Vec<LanePoint>;

/// The shared pool of unclaimed candidate points.
#[derive(Debug, Clone, Default)]
pub struct CandidatePool {
    /// Candidates keyed by `(row, col)` so that a row can be scanned in order
    /// of increasing column.
    points: BTreeSet<(usize, usize)>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The starting points of the two boundaries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Seed {
    /// Starting points were found on a row.
    Found {
        boundary1: LanePoint,
        boundary2: LanePoint
    },

    /// No row in the band contained any peaks.
    NotFound,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl LanePoint {
    pub fn new(col: usize, row: usize) -> Self {
        Self { col, row }
    }

    /// The point as an `(x, y)` vector.
    pub fn to_vector(&self) -> Vector2<f64> {
        Vector2::new(self.col as f64, self.row as f64)
    }
}

impl CandidatePool {
    /// Build the pool from the peak sets of each row.
    pub fn from_peaks(peaks: &[Vec<usize>]) -> Self {
        let points = peaks
            .iter()
            .enumerate()
            .flat_map(|(row, cols)| cols.iter().map(move |col| (row, *col)))
            .collect();

        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn contains(&self, point: &LanePoint) -> bool {
        self.points.contains(&(point.row, point.col))
    }

    /// Remove a point from the pool, returning whether it was present.
    pub fn claim(&mut self, point: &LanePoint) -> bool {
        self.points.remove(&(point.row, point.col))
    }

    /// Find the unclaimed candidate in `row` with the smallest column distance
    /// to `col`, returning it and the distance.
    ///
    /// If two candidates are equally close the leftmost is returned.
    pub fn nearest_in_row(&self, row: usize, col: usize) -> Option<(LanePoint, usize)> {
        let mut best: Option<(LanePoint, usize)> = None;

        for &(r, c) in self.points.range((row, 0)..=(row, usize::MAX)) {
            let dist = if c > col { c - col } else { col - c };
            match best {
                Some((_, d)) if d <= dist => (),
                _ => best = Some((LanePoint::new(c, r), dist))
            }
        }

        best
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Find the starting points of both boundaries.
///
/// Rows are scanned from nearest to farthest, the first row with any peaks
/// provides the seeds:
/// - One peak: the peak is boundary 1 and boundary 2 starts at the edge of
///   the frame opposite the peak (column 0 for a peak at `anchor_col` or to
///   its right, the last column otherwise).
/// - Two peaks: the peaks are taken left to right as boundaries 1 and 2.
/// - More peaks: the two closest to `anchor_col` are used, the closest
///   being boundary 1.
pub fn find_seeds(peaks: &[Vec<usize>], anchor_col: usize, width: usize) -> Seed {
    for (row, cols) in peaks.iter().enumerate() {
        match cols.len() {
            0 => continue,
            1 => {
                // The peak is always chained first, the opposite frame edge
                // only stands in for the missing boundary
                let opposite = if cols[0] >= anchor_col {
                    0
                }
                else {
                    width.saturating_sub(1)
                };

                return Seed::Found {
                    boundary1: LanePoint::new(cols[0], row),
                    boundary2: LanePoint::new(opposite, row)
                }
            },
            2 => {
                return Seed::Found {
                    boundary1: LanePoint::new(cols[0], row),
                    boundary2: LanePoint::new(cols[1], row)
                }
            },
            _ => {
                // Stable sort keeps the leftmost of equally distant peaks first
                let mut by_dist = cols.clone();
                by_dist.sort_by_key(|c| {
                    if *c > anchor_col { *c - anchor_col } else { anchor_col - *c }
                });

                return Seed::Found {
                    boundary1: LanePoint::new(by_dist[0], row),
                    boundary2: LanePoint::new(by_dist[1], row)
                }
            }
        }
    }

    Seed::NotFound
}

/// Extend a chain row by row with the closest unclaimed candidates.
///
/// Extension stops when the next row is outside of the band (`num_rows`), the
/// next row has no candidates, or the closest candidate is at least `max_gap`
/// columns away. Every point added is claimed from the pool.
pub fn extend_chain(
    chain: &mut BoundaryChain,
    pool: &mut CandidatePool,
    num_rows: usize,
    max_gap: usize
) {
    let mut last = match chain.last() {
        Some(p) => *p,
        None => return
    };

    loop {
        let next_row = last.row + 1;
        if next_row >= num_rows {
            break;
        }

        let next = match pool.nearest_in_row(next_row, last.col) {
            Some((p, dist)) if dist < max_gap => p,
            _ => break
        };

        pool.claim(&next);
        chain.push(next);
        last = next;
    }
}

/// Build both boundary chains from the peak sets of each row.
///
/// Returns the two chains and whether seeds were found. When no seeds are
/// found both chains hold only the `anchor` point and are not extended.
pub fn build_chains(
    peaks: &[Vec<usize>],
    anchor: LanePoint,
    width: usize,
    max_gap: usize
) -> (BoundaryChain, BoundaryChain, bool) {
    let (seed1, seed2) = match find_seeds(peaks, anchor.col, width) {
        Seed::Found { boundary1, boundary2 } => (boundary1, boundary2),
        Seed::NotFound => return (vec![anchor], vec![anchor], false)
    };

    let mut pool = CandidatePool::from_peaks(peaks);
    pool.claim(&seed1);
    pool.claim(&seed2);

    let mut chain1 = vec![seed1];
    let mut chain2 = vec![seed2];

    extend_chain(&mut chain1, &mut pool, peaks.len(), max_gap);
    extend_chain(&mut chain2, &mut pool, peaks.len(), max_gap);

    (chain1, chain2, true)
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use std::collections::HashSet;

    const WIDTH: usize = 96;
    const ANCHOR: usize = 48;

    fn seeds(peaks: Vec<Vec<usize>>) -> Seed {
        find_seeds(&peaks, ANCHOR, WIDTH)
    }

    #[test]
    fn test_single_peak_seeds() {
        assert_eq!(
            seeds(vec![vec![], vec![20]]),
            Seed::Found {
                boundary1: LanePoint::new(20, 1),
                boundary2: LanePoint::new(95, 1)
            }
        );
        assert_eq!(
            seeds(vec![vec![70]]),
            Seed::Found {
                boundary1: LanePoint::new(70, 0),
                boundary2: LanePoint::new(0, 0)
            }
        );
        // On the anchor counts as the right side
        assert_eq!(
            seeds(vec![vec![48]]),
            Seed::Found {
                boundary1: LanePoint::new(48, 0),
                boundary2: LanePoint::new(0, 0)
            }
        );
    }

    #[test]
    fn test_two_peak_seeds_keep_order() {
        assert_eq!(
            seeds(vec![vec![10, 80]]),
            Seed::Found {
                boundary1: LanePoint::new(10, 0),
                boundary2: LanePoint::new(80, 0)
            }
        );
        // Both on one side, still ordered by index not distance
        assert_eq!(
            seeds(vec![vec![60, 80]]),
            Seed::Found {
                boundary1: LanePoint::new(60, 0),
                boundary2: LanePoint::new(80, 0)
            }
        );
    }

    #[test]
    fn test_many_peak_seeds_nearest_anchor() {
        assert_eq!(
            seeds(vec![vec![], vec![], vec![10, 40, 55, 90]]),
            Seed::Found {
                boundary1: LanePoint::new(55, 2),
                boundary2: LanePoint::new(40, 2)
            }
        );
    }

    #[test]
    fn test_no_seeds() {
        assert_eq!(seeds(vec![vec![]; 10]), Seed::NotFound);

        let anchor = LanePoint::new(ANCHOR, 0);
        let (c1, c2, found) = build_chains(&vec![vec![]; 10], anchor, WIDTH, 100);
        assert!(!found);
        assert_eq!(c1, vec![anchor]);
        assert_eq!(c2, vec![anchor]);
    }

    #[test]
    fn test_extend_chain_stops() {
        // Row 3 is empty so extension stops at row 2
        let peaks = vec![vec![10], vec![11, 40], vec![13], vec![], vec![14]];
        let mut pool = CandidatePool::from_peaks(&peaks);
        let mut chain = vec![LanePoint::new(10, 0)];
        pool.claim(&chain[0]);

        extend_chain(&mut chain, &mut pool, peaks.len(), 100);
        assert_eq!(
            chain,
            vec![LanePoint::new(10, 0), LanePoint::new(11, 1), LanePoint::new(13, 2)]
        );
        assert!(pool.contains(&LanePoint::new(40, 1)));
        assert!(!pool.contains(&LanePoint::new(11, 1)));

        // A gap at or beyond the limit stops extension
        let peaks = vec![vec![10], vec![15]];
        let mut pool = CandidatePool::from_peaks(&peaks);
        let mut chain = vec![LanePoint::new(10, 0)];
        extend_chain(&mut chain, &mut pool, peaks.len(), 5);
        assert_eq!(chain.len(), 1);
    }

    #[test]
    fn test_claimed_points_are_exclusive() {
        // Both seeds want the single candidate at (30, 1)
        let peaks = vec![vec![28, 32], vec![30], vec![31]];
        let (c1, c2, found) = build_chains(&peaks, LanePoint::new(ANCHOR, 0), WIDTH, 100);

        assert!(found);
        assert_eq!(c1, vec![LanePoint::new(28, 0), LanePoint::new(30, 1), LanePoint::new(31, 2)]);
        assert_eq!(c2, vec![LanePoint::new(32, 0)]);
    }

    #[test]
    fn test_single_right_peak_owns_its_chain() {
        // Only a right boundary is visible, the gap allows any column
        let peaks: Vec<Vec<usize>> = (0..10).map(|r| vec![60 + r / 3]).collect();
        let (c1, c2, found) = build_chains(&peaks, LanePoint::new(ANCHOR, 0), WIDTH, 100);

        assert!(found);
        assert_eq!(c1.len(), 10);
        assert_eq!(c1[0], LanePoint::new(60, 0));
        assert!(c1.iter().all(|p| p.col >= 60));
        assert_eq!(c2, vec![LanePoint::new(0, 0)]);
    }

    #[test]
    fn test_chains_never_share_points() {
        // Simple LCG so the pools are reproducible
        let mut state: u64 = 0x2545_f491_4f6c_dd1d;
        let mut next = move |m: usize| {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            ((state >> 33) as usize) % m
        };

        for _ in 0..200 {
            let num_rows = 5 + next(60);
            let peaks: Vec<Vec<usize>> = (0..num_rows)
                .map(|_| {
                    let mut cols: Vec<usize> = (0..next(5)).map(|_| 1 + next(94)).collect();
                    cols.sort();
                    cols.dedup();
                    cols
                })
                .collect();

            let (c1, c2, found) = build_chains(&peaks, LanePoint::new(ANCHOR, 0), WIDTH, 1 + next(100));
            if !found {
                continue;
            }

            let s1: HashSet<LanePoint> = c1.iter().copied().collect();
            assert!(c2.iter().all(|p| !s1.contains(p)));

            for chain in [&c1, &c2].iter() {
                assert!(chain.windows(2).all(|w| w[1].row == w[0].row + 1));
            }
        }
    }
}
