//! Worker pool for blocking work (password hashing, token signing, SMTP).
//!
//! Two queues: `immed` for work a request is waiting on, `slow` for
//! fire-and-forget work. Dedicated threads only serve the immediate queue,
//! shared threads serve both with the immediate queue first.

use flume::{Receiver, Sender};
use futures::channel::oneshot;
use std::{sync::Arc, thread};

use crate::prelude::*;

type Job = Box<dyn FnOnce() + Send>;
type JobQueue = Arc<Receiver<Job>>;

#[derive(Debug)]
pub struct WorkerPool {
	immed: Sender<Job>,
	slow: Sender<Job>,
}

impl WorkerPool {
	/// `n_immed` threads serve only the immediate queue, `n_shared` serve both
	pub fn new(n_immed: usize, n_shared: usize) -> Self {
		let (immed, rx_immed) = flume::unbounded();
		let (slow, rx_slow) = flume::unbounded();

		let rx_immed = Arc::new(rx_immed);
		let rx_slow = Arc::new(rx_slow);

		for _ in 0..n_immed {
			let rx_immed = Arc::clone(&rx_immed);
			thread::spawn(move || worker_loop(&[rx_immed]));
		}

		for _ in 0..n_shared {
			let rx_immed = Arc::clone(&rx_immed);
			let rx_slow = Arc::clone(&rx_slow);
			thread::spawn(move || worker_loop(&[rx_immed, rx_slow]));
		}

		Self { immed, slow }
	}

	fn submit<F, T>(queue: &Sender<Job>, f: F) -> impl Future<Output = ClResult<T>> + use<F, T>
	where
		F: FnOnce() -> T + Send + 'static,
		T: Send + 'static,
	{
		let (res_tx, res_rx) = oneshot::channel();

		let job: Job = Box::new(move || {
			let _ignore = res_tx.send(f());
		});

		if queue.send(job).is_err() {
			error!("Failed to send job to worker queue");
		}

		async move {
			res_rx.await.map_err(|_| {
				error!("Worker dropped result channel (task may have panicked)");
				Error::Internal("worker task failed".into())
			})
		}
	}

	pub fn run_immed<F, T>(&self, f: F) -> impl Future<Output = ClResult<T>> + use<F, T>
	where
		F: FnOnce() -> T + Send + 'static,
		T: Send + 'static,
	{
		Self::submit(&self.immed, f)
	}

	pub fn run_slow<F, T>(&self, f: F) -> impl Future<Output = ClResult<T>> + use<F, T>
	where
		F: FnOnce() -> T + Send + 'static,
		T: Send + 'static,
	{
		Self::submit(&self.slow, f)
	}

	/// Like `run_immed`, but flattens `ClResult<ClResult<T>>` into `ClResult<T>`.
	pub fn try_run_immed<F, T>(&self, f: F) -> impl Future<Output = ClResult<T>> + use<F, T>
	where
		F: FnOnce() -> ClResult<T> + Send + 'static,
		T: Send + 'static,
	{
		let fut = self.run_immed(f);
		async move { fut.await? }
	}

	/// Like `run_slow`, but flattens `ClResult<ClResult<T>>` into `ClResult<T>`.
	pub fn try_run_slow<F, T>(&self, f: F) -> impl Future<Output = ClResult<T>> + use<F, T>
	where
		F: FnOnce() -> ClResult<T> + Send + 'static,
		T: Send + 'static,
	{
		let fut = self.run_slow(f);
		async move { fut.await? }
	}
}

fn run_job(job: Job) {
	if let Err(e) = std::panic::catch_unwind(std::panic::AssertUnwindSafe(job)) {
		error!("Worker thread caught panic: {:?}", e);
	}
}

fn worker_loop(queues: &[JobQueue]) {
	loop {
		// Earlier queues win when several have work
		if let Some(job) = queues.iter().find_map(|rx| rx.try_recv().ok()) {
			run_job(job);
			continue;
		}

		let mut selector = flume::Selector::new();
		for rx in queues {
			selector = selector.recv(rx, |res| res);
		}

		match selector.wait() {
			Ok(job) => run_job(job),
			// All senders gone: the pool was dropped
			Err(flume::RecvError::Disconnected) => return,
		}
	}
}


// vim: ts=4
