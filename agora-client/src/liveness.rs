use std::{
    future::Future,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use crate::api::Error;

/// Tells asynchronous work whether the view that started it is still there
#[derive(Clone, Debug)]
pub struct Liveness(Arc<AtomicBool>);

impl Default for Liveness {
    fn default() -> Liveness {
        Liveness::new()
    }
}

impl Liveness {
    pub fn new() -> Liveness {
        Liveness(Arc::new(AtomicBool::new(true)))
    }

    pub fn is_alive(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Marks the view as gone, shared with every clone
    pub fn tear_down(&self) {
        self.0.store(false, Ordering::Release)
    }

    /// Runs `fut`, discarding its output if the view got torn down meanwhile
    pub async fn guard<F: Future>(&self, fut: F) -> Result<F::Output, Error> {
        let res = fut.await;
        match self.is_alive() {
            true => Ok(res),
            false => {
                tracing::debug!("discarding result for a torn down view");
                Err(Error::Discarded)
            }
        }
    }
}
