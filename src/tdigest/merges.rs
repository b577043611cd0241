use crate::tdigest::centroids::Centroid;
use std::iter::Peekable;

/// Merge stream that interleaves two runs already ascending by mean.
///
/// Used for the store + sorted buffer (compress) and for store + other store
/// (digest merge). Units are passed through whole; nothing is coalesced here, the
/// compressor decides what folds together. On equal means the left run goes first.
pub(crate) struct MergeByMean<L, R>
where
    L: Iterator<Item = Centroid>,
    R: Iterator<Item = Centroid>,
{
    left: Peekable<L>,
    right: Peekable<R>,
}

impl<L, R> MergeByMean<L, R>
where
    L: Iterator<Item = Centroid>,
    R: Iterator<Item = Centroid>,
{
    pub(crate) fn new<A, B>(left: A, right: B) -> Self
    where
        A: IntoIterator<Item = Centroid, IntoIter = L>,
        B: IntoIterator<Item = Centroid, IntoIter = R>,
    {
        Self {
            left: left.into_iter().peekable(),
            right: right.into_iter().peekable(),
        }
    }
}

impl<L, R> Iterator for MergeByMean<L, R>
where
    L: Iterator<Item = Centroid>,
    R: Iterator<Item = Centroid>,
{
    type Item = Centroid;

    fn next(&mut self) -> Option<Self::Item> {
        match (self.left.peek(), self.right.peek()) {
            (Some(l), Some(r)) => {
                if r < l {
                    self.right.next()
                } else {
                    self.left.next()
                }
            }
            (Some(_), None) => self.left.next(),
            (None, _) => self.right.next(),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let (l_lo, l_hi) = self.left.size_hint();
        let (r_lo, r_hi) = self.right.size_hint();
        let hi = match (l_hi, r_hi) {
            (Some(a), Some(b)) => a.checked_add(b),
            _ => None,
        };
        (l_lo.saturating_add(r_lo), hi)
    }
}
