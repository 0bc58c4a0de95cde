//! Equivalence classes from a pairwise equality predicate.

use crate::union_find::UnionFind;

/// A partition of `0..n` into classes of mutually equal elements.
///
/// Classes are indexed in the order their first element appears, so the
/// class of element 0 has index 0.
#[derive(Debug, Clone)]
pub struct Partition {
    sets: UnionFind,
    classes: Vec<Vec<usize>>,
    class_index: Vec<usize>,
}

impl Partition {
    /// Groups `0..n` with `equal`, which must be an equivalence relation.
    ///
    /// Every element is compared with the representative of each class
    /// found so far and joins the first class it is equal to.
    pub fn new(n: usize, mut equal: impl FnMut(usize, usize) -> bool) -> Self {
        let mut sets = UnionFind::new(n);
        let mut reps: Vec<usize> = Vec::new();

        for i in 0..n {
            let found = reps.iter().copied().find(|&r| equal(r, i));
            match found {
                Some(r) => {
                    sets.union(r, i);
                }
                None => reps.push(i),
            }
        }

        let classes = sets.sets();
        let mut class_index = vec![0; n];
        for (k, class) in classes.iter().enumerate() {
            for &i in class {
                class_index[i] = k;
            }
        }

        Self {
            sets,
            classes,
            class_index,
        }
    }

    pub fn len(&self) -> usize {
        self.class_index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.class_index.is_empty()
    }

    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    /// Index of the class containing `elem`.
    pub fn class_index_of(&self, elem: usize) -> usize {
        self.class_index[elem]
    }

    /// Members of the class with the given index, sorted.
    pub fn class(&self, index: usize) -> &[usize] {
        &self.classes[index]
    }

    pub fn class_size(&self, index: usize) -> usize {
        self.classes[index].len()
    }

    pub fn classes(&self) -> &[Vec<usize>] {
        &self.classes
    }

    /// Smallest element of every class, by class index.
    pub fn reps(&self) -> Vec<usize> {
        self.classes.iter().map(|c| c[0]).collect()
    }

    pub fn are_equal(&self, i: usize, j: usize) -> bool {
        self.class_index[i] == self.class_index[j]
    }

    /// The underlying disjoint-set forest.
    pub fn sets(&self) -> &UnionFind {
        &self.sets
    }
}

/// Whether every class occupies a contiguous range of indices and the
/// classes follow each other in index order.
pub fn is_consecutive(classes: &[Vec<usize>]) -> bool {
    let mut next = 0;
    for class in classes {
        let mut sorted = class.clone();
        sorted.sort_unstable();
        for elem in sorted {
            if elem != next {
                return false;
            }
            next += 1;
        }
    }
    true
}
