use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use crate::config::{WidgetConfig, DEFAULT_CURRENCY_SYMBOL};
use crate::models::{
    IndicatorCard, PredictionCard, PredictionContent, PredictionResult, Trend, WidgetAction,
    WidgetView,
};
use crate::services::premium_gate::{PremiumGate, PREDICTION_FEATURE};
use crate::services::prediction_controller::{RenderState, WidgetState};

pub const WIDGET_TITLE: &str = "Daily Prediction";
pub const WIDGET_SUBTITLE: &str = "AI-powered stock forecast based on technicals";
pub const EMPTY_MESSAGE: &str = "No prediction available";
pub const INVALID_DATE: &str = "Invalid Date";

#[derive(Debug, Clone)]
pub struct DisplayOptions {
    pub currency_symbol: String,
    pub timezone: Tz,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            currency_symbol: DEFAULT_CURRENCY_SYMBOL.to_string(),
            timezone: chrono_tz::UTC,
        }
    }
}

impl DisplayOptions {
    pub fn from_config(config: &WidgetConfig) -> Self {
        Self {
            currency_symbol: config.currency_symbol.clone(),
            timezone: config.display_timezone,
        }
    }
}

/// Render the whole widget: header plus gated body.
pub fn render_widget(
    state: &WidgetState,
    entitled: bool,
    options: &DisplayOptions,
    now: DateTime<Utc>,
) -> WidgetView {
    let body = PremiumGate::new(PREDICTION_FEATURE)
        .render(entitled, || render_content(state, options, now));

    WidgetView {
        title: WIDGET_TITLE.to_string(),
        subtitle: WIDGET_SUBTITLE.to_string(),
        body,
    }
}

pub fn render_content(
    state: &WidgetState,
    options: &DisplayOptions,
    now: DateTime<Utc>,
) -> PredictionContent {
    match (state.render_state(), &state.prediction) {
        (RenderState::Loading, _) => PredictionContent::Loading,
        (RenderState::Error, _) => PredictionContent::Error {
            message: state.error.clone().unwrap_or_default(),
            action: WidgetAction::Retry,
        },
        (RenderState::Shown, Some(prediction)) => {
            PredictionContent::Shown(render_card(prediction, options, now))
        }
        (RenderState::Empty, _) | (RenderState::Shown, None) => PredictionContent::Empty {
            message: EMPTY_MESSAGE.to_string(),
            action: WidgetAction::GeneratePrediction,
        },
    }
}

pub fn render_card(
    prediction: &PredictionResult,
    options: &DisplayOptions,
    now: DateTime<Utc>,
) -> PredictionCard {
    let sym = options.currency_symbol.as_str();
    let is_positive = prediction.is_positive();
    let sign = if is_positive { "+" } else { "" };
    let indicators = prediction.indicators();

    PredictionCard {
        label: "AI Prediction".to_string(),
        predicted_price: format!("{}{:.2}", sym, prediction.predicted_price),
        trend: if is_positive { Trend::Up } else { Trend::Down },
        price_change: format!("{}{}{:.2}", sign, sym, prediction.price_change()),
        price_change_percent: format!("{}{:.2}%", sign, prediction.price_change_percent()),
        confidence: format!("{:.1}%", prediction.confidence),
        confidence_bar_width: prediction.confidence.clamp(0.0, 100.0),
        analysis: prediction.analysis.clone(),
        indicators: vec![
            indicator("RSI", format!("{:.1}", indicators.rsi)),
            indicator("MACD", format!("{:.2}", indicators.macd)),
            indicator("SMA 20", format!("{}{:.2}", sym, indicators.sma20)),
            indicator("SMA 50", format!("{}{:.2}", sym, indicators.sma50)),
        ],
        generated_at: prediction
            .generated_at(now)
            .map(|at| format_time(at, options.timezone))
            .unwrap_or_else(|| INVALID_DATE.to_string()),
        action: WidgetAction::RefreshPrediction,
    }
}

/// Wall-clock time in the display zone, e.g. `3:04:05 PM`.
pub fn format_time(at: DateTime<Utc>, timezone: Tz) -> String {
    at.with_timezone(&timezone).format("%-I:%M:%S %p").to_string()
}

fn indicator(label: &str, value: String) -> IndicatorCard {
    IndicatorCard {
        label: label.to_string(),
        value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::FETCH_FAILED_MESSAGE;
    use crate::models::{GatedContent, PredictionTimestamp};
    use crate::services::test_support::bullish_payload;
    use chrono::TimeZone;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 5, 7).unwrap()
    }

    fn shown(payload: serde_json::Value) -> PredictionCard {
        let prediction = PredictionResult::from_payload(payload).unwrap();
        render_card(&prediction, &DisplayOptions::default(), now())
    }

    fn indicator_values(card: &PredictionCard) -> Vec<&str> {
        card.indicators.iter().map(|i| i.value.as_str()).collect()
    }

    #[test]
    fn test_bullish_scenario() {
        let card = shown(bullish_payload());

        assert_eq!(card.predicted_price, "₹110.00");
        assert_eq!(card.price_change, "+₹10.00");
        assert_eq!(card.price_change_percent, "+10.00%");
        assert_eq!(card.trend, Trend::Up);
        assert_eq!(card.confidence, "82.5%");
        assert_eq!(card.confidence_bar_width, 82.5);
        assert_eq!(card.analysis, "Bullish");
        assert_eq!(indicator_values(&card), vec!["65.2", "1.23", "₹98.50", "₹95.00"]);
        assert_eq!(card.action, WidgetAction::RefreshPrediction);
    }

    #[test]
    fn test_bearish_prediction_formatting() {
        let card = shown(json!({
            "currentPrice": 250,
            "predictedPrice": 237.5,
            "confidence": 61
        }));

        assert_eq!(card.trend, Trend::Down);
        assert_eq!(card.price_change, "₹-12.50");
        assert_eq!(card.price_change_percent, "-5.00%");
        assert_eq!(card.confidence, "61.0%");
    }

    #[test]
    fn test_zero_current_price_renders_zero_percent() {
        let card = shown(json!({ "currentPrice": 0, "predictedPrice": 12 }));
        assert_eq!(card.price_change_percent, "+0.00%");
        assert!(!card.price_change_percent.contains("NaN"));
        assert!(!card.price_change_percent.contains("inf"));
    }

    #[test]
    fn test_missing_indicators_render_zero() {
        let card = shown(json!({ "currentPrice": 10, "predictedPrice": 11 }));
        assert_eq!(indicator_values(&card), vec!["0.0", "0.00", "₹0.00", "₹0.00"]);
        let labels: Vec<&str> = card.indicators.iter().map(|i| i.label.as_str()).collect();
        assert_eq!(labels, vec!["RSI", "MACD", "SMA 20", "SMA 50"]);
    }

    #[test]
    fn test_confidence_bar_is_clamped() {
        let card = shown(json!({ "currentPrice": 10, "predictedPrice": 11, "confidence": 140 }));
        assert_eq!(card.confidence, "140.0%");
        assert_eq!(card.confidence_bar_width, 100.0);
    }

    #[test]
    fn test_generated_at_formatting() {
        let mut prediction = PredictionResult::from_payload(bullish_payload()).unwrap();
        let options = DisplayOptions::default();

        assert_eq!(render_card(&prediction, &options, now()).generated_at, "9:05:07 AM");

        prediction.timestamp = Some(PredictionTimestamp::EpochMillis(1_700_000_000_000.0));
        assert_eq!(render_card(&prediction, &options, now()).generated_at, "10:13:20 PM");

        let kolkata = DisplayOptions {
            currency_symbol: "₹".to_string(),
            timezone: chrono_tz::Asia::Kolkata,
        };
        assert_eq!(render_card(&prediction, &kolkata, now()).generated_at, "3:43:20 AM");

        prediction.timestamp = Some(PredictionTimestamp::Text("not a date".into()));
        assert_eq!(render_card(&prediction, &options, now()).generated_at, INVALID_DATE);
    }

    #[test]
    fn test_content_for_each_render_state() {
        let options = DisplayOptions::default();
        let mut state = WidgetState::default();

        assert_eq!(
            render_content(&state, &options, now()),
            PredictionContent::Empty {
                message: EMPTY_MESSAGE.to_string(),
                action: WidgetAction::GeneratePrediction,
            }
        );

        state.is_loading = true;
        assert_eq!(render_content(&state, &options, now()), PredictionContent::Loading);

        state.is_loading = false;
        state.error = Some(FETCH_FAILED_MESSAGE.to_string());
        assert_eq!(
            render_content(&state, &options, now()),
            PredictionContent::Error {
                message: FETCH_FAILED_MESSAGE.to_string(),
                action: WidgetAction::Retry,
            }
        );
    }

    #[test]
    fn test_locked_widget_shows_only_gate() {
        let mut state = WidgetState::default();
        state.is_loading = true;

        let view = render_widget(&state, false, &DisplayOptions::default(), now());

        assert_eq!(view.title, WIDGET_TITLE);
        assert_eq!(
            view.body,
            GatedContent::Locked {
                feature: PREDICTION_FEATURE.to_string()
            }
        );
    }

    #[test]
    fn test_plain_text_rendering() {
        let mut state = WidgetState::default();
        state.prediction = Some(PredictionResult::from_payload(bullish_payload()).unwrap());

        let text = render_widget(&state, true, &DisplayOptions::default(), now()).to_string();

        assert!(text.starts_with("Daily Prediction - AI-powered stock forecast based on technicals"));
        assert!(text.contains("AI Prediction: ₹110.00"));
        assert!(text.contains("▲ +₹10.00 (+10.00%)"));
        assert!(text.contains("RSI 65.2 | MACD 1.23 | SMA 20 ₹98.50 | SMA 50 ₹95.00"));
        assert!(text.contains("[Refresh Prediction]"));
    }
}
