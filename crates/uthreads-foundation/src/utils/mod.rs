pub mod global;
pub mod heap;

pub use global::GlobalOption;
pub use heap::RemovablePriorityQueue;
