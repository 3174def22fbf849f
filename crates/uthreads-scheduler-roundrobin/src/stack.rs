//! Per-thread stacks, owned by an arena indexed by thread id.

use crate::thread::Tid;

pub struct ThreadStack {
    memory: Box<[u8]>,
}

impl ThreadStack {
    fn new(size: usize) -> Self {
        Self {
            memory: vec![0u8; size].into_boxed_slice(),
        }
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.memory
    }
}

pub struct StackArena {
    slots: Vec<Option<ThreadStack>>,
    stack_size: usize,
    /// Stack of a thread that terminated itself. It is still executing on it
    /// until the next thread is resumed, so it cannot be freed on the spot.
    /// Freeing is left to [`StackArena::reap`], which must not be called from
    /// the signal handler.
    retired: Option<ThreadStack>,
}

impl StackArena {
    pub fn new(max_threads: usize, stack_size: usize) -> Self {
        Self {
            slots: (0..max_threads).map(|_| None).collect(),
            stack_size,
            retired: None,
        }
    }

    /// Gives `tid` a fresh stack, replacing any it held before.
    pub fn allocate(&mut self, tid: Tid) -> &mut ThreadStack {
        self.slots[tid].insert(ThreadStack::new(self.stack_size))
    }

    pub fn release(&mut self, tid: Tid) -> Option<ThreadStack> {
        self.slots.get_mut(tid).and_then(Option::take)
    }

    /// Parks the stack of `tid` until [`StackArena::reap`]. A stack parked
    /// earlier is freed now: nothing runs on it anymore.
    pub fn retire(&mut self, tid: Tid) {
        if let Some(stack) = self.release(tid) {
            self.retired = Some(stack);
        }
    }

    pub fn reap(&mut self) {
        self.retired = None;
    }

    #[cfg(test)]
    pub(crate) fn has_retired(&self) -> bool {
        self.retired.is_some()
    }
}
