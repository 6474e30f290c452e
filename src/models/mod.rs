mod prediction;
mod widget_view;

pub use prediction::{PredictionResult, PredictionTimestamp, TechnicalIndicators};
pub use widget_view::{
    GatedContent, IndicatorCard, PredictionCard, PredictionContent, Trend, WidgetAction, WidgetView,
};
