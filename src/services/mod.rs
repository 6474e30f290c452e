pub mod diagnostics;
pub mod prediction_controller;
pub mod premium_gate;
pub mod view_renderer;
pub mod widget_scheduler;

#[cfg(test)]
pub(crate) mod test_support;
