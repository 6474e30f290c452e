use std::fmt;

use serde::Serialize;

/// Fully rendered widget, ready to be serialized for the front end.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WidgetView {
    pub title: String,
    pub subtitle: String,
    pub body: GatedContent,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "gate", rename_all = "snake_case")]
pub enum GatedContent {
    Unlocked { content: PredictionContent },
    Locked { feature: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PredictionContent {
    Loading,
    Error { message: String, action: WidgetAction },
    Empty { message: String, action: WidgetAction },
    Shown(PredictionCard),
}

/// User-triggered action offered by a given state. Every action re-runs the fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WidgetAction {
    Retry,
    GeneratePrediction,
    RefreshPrediction,
}

impl WidgetAction {
    pub fn label(&self) -> &'static str {
        match self {
            WidgetAction::Retry => "Retry",
            WidgetAction::GeneratePrediction => "Generate Prediction",
            WidgetAction::RefreshPrediction => "Refresh Prediction",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Up,
    Down,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionCard {
    pub label: String,
    pub predicted_price: String,
    pub trend: Trend,
    pub price_change: String,
    pub price_change_percent: String,
    pub confidence: String,
    pub confidence_bar_width: f64,
    pub analysis: String,
    pub indicators: Vec<IndicatorCard>,
    pub generated_at: String,
    pub action: WidgetAction,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorCard {
    pub label: String,
    pub value: String,
}

impl fmt::Display for WidgetView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} - {}", self.title, self.subtitle)?;
        match &self.body {
            GatedContent::Locked { feature } => write!(f, "[premium] {}", feature),
            GatedContent::Unlocked { content } => write!(f, "{}", content),
        }
    }
}

impl fmt::Display for PredictionContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PredictionContent::Loading => write!(f, "Loading..."),
            PredictionContent::Error { message, action }
            | PredictionContent::Empty { message, action } => {
                write!(f, "{} [{}]", message, action.label())
            }
            PredictionContent::Shown(card) => {
                let arrow = match card.trend {
                    Trend::Up => "▲",
                    Trend::Down => "▼",
                };
                writeln!(f, "{}: {}", card.label, card.predicted_price)?;
                writeln!(f, "{} {} ({})", arrow, card.price_change, card.price_change_percent)?;
                writeln!(f, "Confidence: {}", card.confidence)?;
                writeln!(f, "Analysis: {}", card.analysis)?;
                let indicators: Vec<String> = card
                    .indicators
                    .iter()
                    .map(|i| format!("{} {}", i.label, i.value))
                    .collect();
                writeln!(f, "{}", indicators.join(" | "))?;
                write!(f, "Prediction generated at {} [{}]", card.generated_at, card.action.label())
            }
        }
    }
}
