mod settings;

pub use settings::{
    AudioSettings, BillingSettings, DatabaseSettings, PayPalSettings, PlanSettings, Settings,
    SummarySettings, TranscriptionSettings,
};
