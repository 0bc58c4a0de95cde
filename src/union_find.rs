//! Disjoint-set forest over `0..n`.

/// Union-find with union by rank and path compression.
#[derive(Debug, Clone)]
pub struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<u32>,
}

impl UnionFind {
    /// Creates `n` singleton sets.
    pub fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            rank: vec![0; n],
        }
    }

    pub fn len(&self) -> usize {
        self.parent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }

    /// Representative of the set containing `i`.
    ///
    /// Every element on the way to the root is re-attached to the root.
    pub fn find(&mut self, i: usize) -> usize {
        let mut root = i;
        while self.parent[root] != root {
            root = self.parent[root];
        }

        let mut current = i;
        while self.parent[current] != root {
            let next = self.parent[current];
            self.parent[current] = root;
            current = next;
        }

        root
    }

    /// Merges the sets containing `i` and `j`. Returns the new representative.
    pub fn union(&mut self, i: usize, j: usize) -> usize {
        let a = self.find(i);
        let b = self.find(j);
        if a == b {
            return a;
        }

        match self.rank[a].cmp(&self.rank[b]) {
            std::cmp::Ordering::Less => {
                self.parent[a] = b;
                b
            }
            std::cmp::Ordering::Greater => {
                self.parent[b] = a;
                a
            }
            std::cmp::Ordering::Equal => {
                self.parent[b] = a;
                self.rank[a] += 1;
                a
            }
        }
    }

    /// Representatives, one per set, in increasing element order of their
    /// first member.
    pub fn reps(&mut self) -> Vec<usize> {
        let mut seen = vec![false; self.len()];
        let mut reps = Vec::new();
        for i in 0..self.len() {
            let r = self.find(i);
            if !seen[r] {
                seen[r] = true;
                reps.push(r);
            }
        }
        reps
    }

    /// All sets, each sorted, ordered by their smallest element.
    pub fn sets(&mut self) -> Vec<Vec<usize>> {
        let mut index = vec![usize::MAX; self.len()];
        let mut sets: Vec<Vec<usize>> = Vec::new();
        for i in 0..self.len() {
            let r = self.find(i);
            if index[r] == usize::MAX {
                index[r] = sets.len();
                sets.push(Vec::new());
            }
            sets[index[r]].push(i);
        }
        sets
    }

    /// Members of the set containing `i`, sorted.
    pub fn set_of(&mut self, i: usize) -> Vec<usize> {
        let r = self.find(i);
        (0..self.len()).filter(|&j| self.find(j) == r).collect()
    }
}
