/// Disjoint-set over record indices.
///
/// `find` is iterative with path halving, so deep parent chains on large
/// batches never touch the call stack; unions are by rank. Total work for
/// clustering is near-linear in candidates + n.
#[derive(Debug)]
pub struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl UnionFind {
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

    pub fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    pub fn union(&mut self, x: usize, y: usize) {
        let root_x = self.find(x);
        let root_y = self.find(y);
        if root_x == root_y {
            return;
        }
        match self.rank[root_x].cmp(&self.rank[root_y]) {
            std::cmp::Ordering::Less => self.parent[root_x] = root_y,
            std::cmp::Ordering::Greater => self.parent[root_y] = root_x,
            std::cmp::Ordering::Equal => {
                self.parent[root_y] = root_x;
                self.rank[root_x] += 1;
            }
        }
    }

    pub fn connected(&mut self, x: usize, y: usize) -> bool {
        self.find(x) == self.find(y)
    }

    /// Partition all indices by root. Groups are ordered by their first-seen
    /// member and members keep input order, so group discovery order is a
    /// deterministic function of input order.
    pub fn into_groups(mut self) -> Vec<Vec<usize>> {
        let n = self.len();
        let mut groups: Vec<Vec<usize>> = Vec::new();
        let mut group_of_root: Vec<Option<usize>> = vec![None; n];

        for index in 0..n {
            let root = self.find(index);
            match group_of_root[root] {
                Some(group_index) => groups[group_index].push(index),
                None => {
                    group_of_root[root] = Some(groups.len());
                    groups.push(vec![index]);
                }
            }
        }
        groups
    }
}
