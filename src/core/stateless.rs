//! Per-tick tasks that run regardless of the active continuation.

/// Closures run unconditionally, in insertion order, at the start of every
/// tick of the state that registered them.
#[derive(Default)]
pub struct StatelessTaskList {
    tasks: Vec<Box<dyn FnMut()>>,
}

impl StatelessTaskList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push<F>(&mut self, task: F)
    where
        F: FnMut() + 'static,
    {
        self.tasks.push(Box::new(task));
    }

    pub fn run_all(&mut self) {
        for task in &mut self.tasks {
            task();
        }
    }

    pub fn clear(&mut self) {
        self.tasks.clear();
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}
