// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Mode Scheduler
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Dispatch of independent per-mode tasks.
//!
//! Each task owns its working vectors and returns its result; nothing is
//! shared mutably between tasks. Results come back in mode order whatever
//! the execution order was.

use fusion_types::config::ModeSchedule;
use fusion_types::error::{FusionError, FusionResult};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

#[derive(Debug)]
pub struct ModeScheduler {
    schedule: ModeSchedule,
    pool: Option<ThreadPool>,
}

impl ModeScheduler {
    /// `num_threads` bounds the parallel schedule with a private rayon pool;
    /// `None` uses the global pool.
    pub fn new(schedule: ModeSchedule, num_threads: Option<usize>) -> FusionResult<Self> {
        let pool = match (schedule, num_threads) {
            (ModeSchedule::Parallel, Some(n)) => Some(
                ThreadPoolBuilder::new()
                    .num_threads(n)
                    .thread_name(|i| format!("laplace-mode-{i}"))
                    .build()
                    .map_err(|e| FusionError::ConfigError(format!("thread pool: {e}")))?,
            ),
            _ => None,
        };
        Ok(Self { schedule, pool })
    }

    pub fn schedule(&self) -> ModeSchedule {
        self.schedule
    }

    /// Worker count used by the parallel schedule, 1 when serial.
    pub fn num_threads(&self) -> usize {
        match (self.schedule, &self.pool) {
            (ModeSchedule::Serial, _) => 1,
            (ModeSchedule::Parallel, Some(pool)) => pool.current_num_threads(),
            (ModeSchedule::Parallel, None) => rayon::current_num_threads(),
        }
    }

    /// Run `task(kz)` for every `kz in 0..nmodes`. Returns once all tasks have
    /// finished; the first error fails the whole call.
    pub fn run<T, F>(&self, nmodes: usize, task: F) -> FusionResult<Vec<T>>
    where
        T: Send,
        F: Fn(usize) -> FusionResult<T> + Sync + Send,
    {
        match self.schedule {
            ModeSchedule::Serial => (0..nmodes).map(&task).collect(),
            ModeSchedule::Parallel => {
                let job = || {
                    (0..nmodes)
                        .into_par_iter()
                        .map(&task)
                        .collect::<FusionResult<Vec<T>>>()
                };
                match &self.pool {
                    Some(pool) => pool.install(job),
                    None => job(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_results_in_mode_order() {
        for schedule in [ModeSchedule::Serial, ModeSchedule::Parallel] {
            let scheduler = ModeScheduler::new(schedule, Some(3)).unwrap();
            let out = scheduler.run(50, |kz| Ok(kz * kz)).unwrap();
            assert_eq!(out, (0..50).map(|k| k * k).collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_error_fails_call() {
        let scheduler = ModeScheduler::new(ModeSchedule::Parallel, None).unwrap();
        let result = scheduler.run(10, |kz| {
            if kz == 7 {
                Err(FusionError::LinAlg("boom".into()))
            } else {
                Ok(kz)
            }
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_thread_counts() {
        let serial = ModeScheduler::new(ModeSchedule::Serial, Some(8)).unwrap();
        assert_eq!(serial.num_threads(), 1);
        let bounded = ModeScheduler::new(ModeSchedule::Parallel, Some(2)).unwrap();
        assert_eq!(bounded.num_threads(), 2);
    }

    #[test]
    fn test_zero_modes() {
        let scheduler = ModeScheduler::new(ModeSchedule::Parallel, None).unwrap();
        let out: Vec<usize> = scheduler.run(0, |kz| Ok(kz)).unwrap();
        assert!(out.is_empty());
    }
}
