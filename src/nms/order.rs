//! Candidate ordering by descending score with index tie-break.

use crate::element::Element;
use crate::util::alloc::try_with_capacity;
use crate::util::math::canonical_zero;
use crate::util::FastNmsResult;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Box index paired with its widened score.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Candidate {
    /// Row in the boxes tensor.
    pub index: usize,
    /// Finite score widened to `f64`.
    pub score: f64,
}

/// `Less` when `a` must be visited before `b`.
fn candidate_cmp_desc(a: &Candidate, b: &Candidate) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.index.cmp(&b.index))
}

/// Collects candidates with a finite score at or above `score_threshold`.
pub(crate) fn admit_candidates<T: Element>(
    scores: &[T],
    score_threshold: f64,
) -> FastNmsResult<Vec<Candidate>> {
    let admitted = scores
        .iter()
        .filter(|s| {
            let s = s.to_f64();
            s.is_finite() && s >= score_threshold
        })
        .count();
    let mut out = try_with_capacity(admitted, "candidate ordering")?;
    out.extend(
        scores
            .iter()
            .enumerate()
            .map(|(index, s)| (index, s.to_f64()))
            .filter(|&(_, s)| s.is_finite() && s >= score_threshold)
            .map(|(index, s)| Candidate {
                index,
                score: canonical_zero(s),
            }),
    );
    Ok(out)
}

/// Sorts candidates into visiting order.
///
/// The comparator is a total order over distinct indices, so the parallel
/// sort yields exactly the sequential order.
pub(crate) fn sort_candidates_desc(candidates: &mut [Candidate], parallel: bool) {
    #[cfg(feature = "rayon")]
    if parallel {
        use rayon::slice::ParallelSliceMut;
        candidates.par_sort_by(candidate_cmp_desc);
        return;
    }
    #[cfg(not(feature = "rayon"))]
    let _ = parallel;
    candidates.sort_by(candidate_cmp_desc);
}

/// Heap entry whose maximum is the next candidate to visit.
#[derive(Clone, Copy, Debug)]
pub(crate) struct HeapEntry(Candidate);

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for HeapEntry {}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        candidate_cmp_desc(&self.0, &other.0).reverse()
    }
}

/// Lazily or eagerly ordered stream of candidates.
pub(crate) enum CandidateOrder {
    /// Fully sorted up front.
    Sorted(std::vec::IntoIter<Candidate>),
    /// Heapified; each `next` pops the best remaining candidate.
    Heap(BinaryHeap<HeapEntry>),
}

impl CandidateOrder {
    /// Sorts every candidate before visiting.
    pub(crate) fn sorted(mut candidates: Vec<Candidate>, parallel: bool) -> Self {
        sort_candidates_desc(&mut candidates, parallel);
        Self::Sorted(candidates.into_iter())
    }

    /// Builds a max-heap in linear time; ordering work is paid per pop.
    pub(crate) fn heap(candidates: Vec<Candidate>) -> Self {
        let entries: Vec<HeapEntry> = candidates.into_iter().map(HeapEntry).collect();
        Self::Heap(BinaryHeap::from(entries))
    }

    /// Number of candidates not yet visited.
    pub(crate) fn remaining(&self) -> usize {
        match self {
            Self::Sorted(iter) => iter.len(),
            Self::Heap(heap) => heap.len(),
        }
    }
}

impl Iterator for CandidateOrder {
    type Item = Candidate;

    fn next(&mut self) -> Option<Candidate> {
        match self {
            Self::Sorted(iter) => iter.next(),
            Self::Heap(heap) => heap.pop().map(|HeapEntry(c)| c),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.remaining();
        (n, Some(n))
    }
}

/// Returns the full visiting order of `scores` above `score_threshold`.
pub fn order_candidates<T: Element>(
    scores: &[T],
    score_threshold: f64,
) -> FastNmsResult<Vec<Candidate>> {
    let candidates = admit_candidates(scores, score_threshold)?;
    Ok(CandidateOrder::sorted(candidates, false).collect())
}
