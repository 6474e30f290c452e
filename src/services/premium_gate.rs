use crate::models::{GatedContent, PredictionContent};

/// Upsell text shown in place of the prediction when the user is not premium.
pub const PREDICTION_FEATURE: &str =
    "Get daily AI-powered stock predictions with advanced technical analysis";

/// Renders its child only for entitled users. The child closure is not
/// invoked otherwise, so locked widgets never build prediction content.
#[derive(Debug, Clone, Copy)]
pub struct PremiumGate<'a> {
    feature: &'a str,
}

impl<'a> PremiumGate<'a> {
    pub fn new(feature: &'a str) -> Self {
        Self { feature }
    }

    pub fn render<F>(&self, entitled: bool, child: F) -> GatedContent
    where
        F: FnOnce() -> PredictionContent,
    {
        if entitled {
            GatedContent::Unlocked { content: child() }
        } else {
            GatedContent::Locked {
                feature: self.feature.to_string(),
            }
        }
    }
}
