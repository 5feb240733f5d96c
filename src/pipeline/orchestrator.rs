// 全ジョブ実行

use crate::pipeline::job_runner::{JobConfig, JobResult, SweepJobResult, run_job, run_sweep_job};

/// Run multiple jobs, collecting results.
/// One job failure does NOT prevent other jobs from running.
pub fn run_all_jobs(jobs: &[JobConfig]) -> Vec<crate::error::Result<JobResult>> {
    jobs.iter().map(run_job).collect()
}

/// Run a parameter sweep for every job, isolating failures the same way.
pub fn sweep_all_jobs(
    jobs: &[JobConfig],
    thresholds: &[u32],
) -> Vec<crate::error::Result<SweepJobResult>> {
    jobs.iter().map(|job| run_sweep_job(job, thresholds)).collect()
}
