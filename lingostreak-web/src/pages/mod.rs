pub mod auth;
pub mod dashboard;
pub mod loading;
pub mod onboarding;
pub mod public_profile;
pub mod sections;
pub mod settings;
