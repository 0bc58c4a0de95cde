//! Total or partial preorders over elements, via classes of equal elements.

use crate::error::Result;
use crate::partition::Partition;
use crate::poset::Poset;

/// A preorder over `0..n`: an equivalence relation for "equal" and a strict
/// partial order between the equivalence classes.
///
/// Every query takes elements; internally the strict order is a [`Poset`]
/// over class indices that asks the element predicate about class
/// representatives.
pub struct Preorder<'a> {
    partition: Partition,
    poset: Poset<'a>,
}

impl<'a> Preorder<'a> {
    pub fn new(
        n: usize,
        greater: impl Fn(usize, usize) -> bool + 'a,
        equal: impl FnMut(usize, usize) -> bool,
    ) -> Self {
        let partition = Partition::new(n, equal);
        let reps = partition.reps();
        let poset = Poset::new(partition.class_count(), move |a, b| greater(reps[a], reps[b]));
        Self { partition, poset }
    }

    pub fn len(&self) -> usize {
        self.partition.len()
    }

    pub fn is_empty(&self) -> bool {
        self.partition.is_empty()
    }

    pub fn are_equal(&self, i: usize, j: usize) -> bool {
        self.partition.are_equal(i, j)
    }

    /// Whether `i` is strictly greater than `j`.
    pub fn is_greater(&self, i: usize, j: usize) -> bool {
        let (a, b) = (self.partition.class_index_of(i), self.partition.class_index_of(j));
        a != b && self.poset.is_greater(a, b)
    }

    pub fn is_greater_equal(&self, i: usize, j: usize) -> bool {
        self.are_equal(i, j) || self.is_greater(i, j)
    }

    pub fn is_total(&self) -> bool {
        self.poset.is_total()
    }

    /// Two incomparable elements (class representatives), if any.
    pub fn not_total_witness(&self) -> Option<(usize, usize)> {
        let reps = self.partition.reps();
        self.poset.not_total_witness().map(|(a, b)| (reps[a], reps[b]))
    }

    /// All elements from most to least, equal elements grouped together.
    pub fn non_increasing_order(&self) -> Result<Vec<usize>> {
        let order = self.poset.decreasing_order()?;
        Ok(order
            .into_iter()
            .flat_map(|c| self.partition.class(c).iter().copied())
            .collect())
    }

    /// Elements of the classes directly below the class of `elem`.
    pub fn direct_successors(&self, elem: usize) -> Vec<usize> {
        let mut res: Vec<usize> = self
            .poset
            .direct_successors(self.partition.class_index_of(elem))
            .into_iter()
            .flat_map(|c| self.partition.class(c).iter().copied())
            .collect();
        res.sort_unstable();
        res
    }

    pub fn class_count(&self) -> usize {
        self.partition.class_count()
    }

    pub fn classes(&self) -> &[Vec<usize>] {
        self.partition.classes()
    }

    /// Elements equal to `elem`, itself included.
    pub fn class_of(&self, elem: usize) -> &[usize] {
        self.partition.class(self.partition.class_index_of(elem))
    }

    pub fn partition(&self) -> &Partition {
        &self.partition
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use test_log::test;

    fn by_value(values: &[i32]) -> Preorder<'_> {
        Preorder::new(values.len(), move |i, j| values[i] > values[j], move |i, j| values[i] == values[j])
    }

    #[test]
    fn test_total_preorder() {
        let values = [3, 5, 3, 1, 5];
        let p = by_value(&values);

        assert_eq!(p.class_count(), 3);
        assert!(p.are_equal(0, 2));
        assert!(p.is_greater(1, 0));
        assert!(!p.is_greater(0, 2));
        assert!(p.is_greater_equal(0, 2));
        assert!(!p.is_greater_equal(3, 0));
        assert!(p.is_total());
        assert_eq!(p.non_increasing_order().unwrap(), vec![1, 4, 0, 2, 3]);
        assert_eq!(p.class_of(4), &[1, 4]);
        assert_eq!(p.direct_successors(1), vec![0, 2]);
    }

    #[test]
    fn test_partial_preorder() {
        // Pairs ordered componentwise; (1,0) and (0,1) are incomparable.
        let pts = [(1, 1), (1, 0), (0, 1), (0, 0), (1, 0)];
        let p = Preorder::new(
            pts.len(),
            |i, j| pts[i] != pts[j] && pts[i].0 >= pts[j].0 && pts[i].1 >= pts[j].1,
            |i, j| pts[i] == pts[j],
        );

        assert_eq!(p.class_count(), 4);
        assert!(!p.is_total());
        let (a, b) = p.not_total_witness().unwrap();
        assert!(!p.is_greater(a, b) && !p.is_greater(b, a));
        assert!(!p.are_equal(a, b));
        assert!(p.non_increasing_order().is_err());
        assert_eq!(p.direct_successors(0), vec![1, 2, 4]);
    }
}
