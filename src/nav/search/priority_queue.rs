use std::cmp::Ordering;

/// Binary min-heap ordered by a caller supplied comparator.
///
/// `compare(a, b) == Less` puts `a` closer to the front. Unlike
/// `std::collections::BinaryHeap` this accepts `f32` keys through
/// `total_cmp` without a wrapper type.
#[derive(Clone, Debug)]
pub struct PriorityQueue<T, F = fn(&T, &T) -> Ordering> {
    data: Vec<T>,
    compare: F,
}

impl<T: Ord> PriorityQueue<T> {
    /// Queue ordered by `T`'s natural ordering, smallest first.
    pub fn new() -> Self {
        Self::with_compare(<T as Ord>::cmp)
    }
}

impl<T: Ord> Default for PriorityQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, F> PriorityQueue<T, F>
where
    F: Fn(&T, &T) -> Ordering,
{
    pub fn with_compare(compare: F) -> Self {
        Self { data: Vec::new(), compare }
    }

    pub fn push(&mut self, item: T) {
        self.data.push(item);
        self.sift_up(self.data.len() - 1);
    }

    /// Remove and return the front item.
    pub fn pop(&mut self) -> Option<T> {
        if self.data.is_empty() {
            return None;
        }

        let top = self.data.swap_remove(0);
        if !self.data.is_empty() {
            self.sift_down(0);
        }
        Some(top)
    }

    pub fn peek(&self) -> Option<&T> {
        self.data.first()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn clear(&mut self) {
        self.data.clear();
    }

    fn sift_up(&mut self, mut pos: usize) {
        while pos > 0 {
            let parent = (pos - 1) / 2;
            if (self.compare)(&self.data[pos], &self.data[parent]) != Ordering::Less {
                break;
            }
            self.data.swap(pos, parent);
            pos = parent;
        }
    }

    fn sift_down(&mut self, mut pos: usize) {
        let len = self.data.len();
        loop {
            let left = 2 * pos + 1;
            if left >= len {
                break;
            }

            let right = left + 1;
            let best = if right < len
                && (self.compare)(&self.data[right], &self.data[left]) == Ordering::Less
            {
                right
            } else {
                left
            };

            if (self.compare)(&self.data[best], &self.data[pos]) != Ordering::Less {
                break;
            }
            self.data.swap(pos, best);
            pos = best;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pops_in_ascending_order() {
        let mut queue = PriorityQueue::new();
        for value in [5, 1, 4, 1, 3, 9, 2] {
            queue.push(value);
        }

        assert_eq!(queue.peek(), Some(&1));
        let drained: Vec<i32> = std::iter::from_fn(|| queue.pop()).collect();
        assert_eq!(drained, vec![1, 1, 2, 3, 4, 5, 9]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_custom_comparator_orders_floats() {
        let mut queue = PriorityQueue::with_compare(|a: &f32, b: &f32| b.total_cmp(a));
        for value in [0.5, 2.5, -1.0, 2.0] {
            queue.push(value);
        }

        assert_eq!(queue.len(), 4);
        assert_eq!(queue.pop(), Some(2.5));
        assert_eq!(queue.pop(), Some(2.0));
        queue.clear();
        assert_eq!(queue.pop(), None);
    }

    #[test]
    fn test_matches_sorted_random_input() {
        let mut rng = fastrand::Rng::with_seed(7);
        let mut queue = PriorityQueue::new();
        let mut values: Vec<u32> = (0..200).map(|_| rng.u32(0..1000)).collect();
        for &value in &values {
            queue.push(value);
        }

        values.sort_unstable();
        let drained: Vec<u32> = std::iter::from_fn(|| queue.pop()).collect();
        assert_eq!(drained, values);
    }
}
