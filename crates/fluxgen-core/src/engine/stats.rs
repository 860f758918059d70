/// Counters accumulated by one job driver over its lifetime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JobStats {
    /// Probes drawn from the flux source.
    pub probes_drawn: u64,
    /// Probes whose path-length list was empty.
    pub geometry_misses: u64,
    /// Probes that reached the accept/reject test and were rejected.
    pub rejections: u64,
    /// Probes accepted and turned into interaction records.
    pub accepted: u64,
    /// Number of times the adaptive bound was raised.
    pub bound_raises: u64,
}

impl JobStats {
    /// Probes that crossed at least one volume.
    pub fn probes_tested(&self) -> u64 {
        self.probes_drawn - self.geometry_misses
    }

    /// Accepted fraction of the probes that crossed at least one volume.
    pub fn acceptance_rate(&self) -> f64 {
        match self.probes_tested() {
            0 => 0.0,
            n => self.accepted as f64 / n as f64,
        }
    }

    /// Sums counters of independent jobs.
    pub fn merge(&mut self, other: &JobStats) {
        self.probes_drawn += other.probes_drawn;
        self.geometry_misses += other.geometry_misses;
        self.rejections += other.rejections;
        self.accepted += other.accepted;
        self.bound_raises += other.bound_raises;
    }
}
