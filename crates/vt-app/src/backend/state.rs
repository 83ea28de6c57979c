use vt_core::TryOnFlow;

pub struct AppState {
    pub flow: TryOnFlow,
}

impl AppState {
    pub fn new(flow: TryOnFlow) -> Self {
        Self {
            flow
        }
    }
}
