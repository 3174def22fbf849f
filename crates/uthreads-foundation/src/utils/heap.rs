//! Binary min-heap that also supports removing an arbitrary element.
//!
//! `remove` is a linear search followed by a local re-heapify, so it costs
//! O(n). The heaps in this workspace hold at most one entry per thread, which
//! keeps that acceptable.

/// Min-heap: `peek`/`pop` yield the smallest element. Equal elements come out
/// in unspecified order.
#[derive(Debug, Clone)]
pub struct RemovablePriorityQueue<T> {
    items: Vec<T>,
}

impl<T: Ord> RemovablePriorityQueue<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, item: T) {
        self.items.push(item);
        self.sift_up(self.items.len() - 1);
    }

    pub fn peek(&self) -> Option<&T> {
        self.items.first()
    }

    pub fn pop(&mut self) -> Option<T> {
        if self.items.is_empty() {
            return None;
        }
        let item = self.items.swap_remove(0);
        self.sift_down(0);
        Some(item)
    }

    /// Removes one element equal to `item`. Returns whether one was found.
    pub fn remove(&mut self, item: &T) -> bool {
        let Some(index) = self.items.iter().position(|candidate| candidate == item) else {
            return false;
        };
        self.items.swap_remove(index);
        if index < self.items.len() {
            // The element moved into `index` may violate the heap property
            // in either direction.
            self.sift_down(index);
            self.sift_up(index);
        }
        true
    }

    fn sift_up(&mut self, mut index: usize) {
        while index > 0 {
            let parent = (index - 1) / 2;
            if self.items[index] >= self.items[parent] {
                break;
            }
            self.items.swap(index, parent);
            index = parent;
        }
    }

    fn sift_down(&mut self, mut index: usize) {
        let len = self.items.len();
        loop {
            let left = 2 * index + 1;
            let right = left + 1;
            let mut smallest = index;
            if left < len && self.items[left] < self.items[smallest] {
                smallest = left;
            }
            if right < len && self.items[right] < self.items[smallest] {
                smallest = right;
            }
            if smallest == index {
                return;
            }
            self.items.swap(index, smallest);
            index = smallest;
        }
    }
}
