/// Progress events emitted by the job driver and the generation workflow.
///
/// `configure` reports one phase whose tasks are the drivers built for the
/// geometry's targets; the workflow reports one phase whose tasks are accepted events.
#[derive(Debug, Clone, PartialEq)]
pub enum Progress {
    PhaseStart { name: &'static str },
    PhaseFinish,

    /// `total_steps` is the driver count or the requested event count.
    TaskStart { total_steps: u64 },
    TaskIncrement,
    TaskFinish,

    /// The adaptive bound of a job driver was raised to `pmax`.
    BoundRaised { pmax: f64 },

    /// Free-form notice, e.g. an exhausted flux.
    Message(String),
}

pub type ProgressCallback<'a> = Box<dyn Fn(Progress) + Send + Sync + 'a>;

/// Forwards [`Progress`] events to an optional front-end callback.
#[derive(Default)]
pub struct ProgressReporter<'a> {
    callback: Option<ProgressCallback<'a>>,
}

impl<'a> ProgressReporter<'a> {
    /// A reporter that drops every event.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_callback(callback: ProgressCallback<'a>) -> Self {
        Self {
            callback: Some(callback),
        }
    }

    /// `false` for a silent reporter; lets callers skip building costly events.
    pub fn is_enabled(&self) -> bool {
        self.callback.is_some()
    }

    #[inline]
    pub fn report(&self, event: Progress) {
        if let Some(callback) = &self.callback {
            callback(event);
        }
    }
}

impl std::fmt::Debug for ProgressReporter<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressReporter")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}
