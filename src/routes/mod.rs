pub mod health;
pub mod prediction_widget;
