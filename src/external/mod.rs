pub mod entitlement;
pub mod http_prediction;
pub mod prediction_source;
