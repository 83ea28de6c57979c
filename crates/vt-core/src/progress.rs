/// Receives advisory progress updates from a running flow.
pub trait ProgressReporter: Send + Sync {
    /// `fraction` is in `0.0..=1.0`.
    fn report(&self, fraction: f32, message: &str);
}

/// Discards every update.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressReporter for NoProgress {
    fn report(&self, _fraction: f32, _message: &str) {}
}

impl<F> ProgressReporter for F
where
    F: Fn(f32, &str) + Send + Sync,
{
    fn report(&self, fraction: f32, message: &str) {
        self(fraction, message)
    }
}
