use std::env;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub clinic_timezone: String,
    pub slot_duration_minutes: i64,
    pub availability_lookahead_days: i64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            supabase_url: env::var("SUPABASE_URL")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_URL not set, using empty value");
                    String::new()
                }),
            supabase_anon_key: env::var("SUPABASE_ANON_PUBLIC_KEY")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_ANON_PUBLIC_KEY not set, using empty value");
                    String::new()
                }),
            clinic_timezone: env::var("CLINIC_TIMEZONE")
                .unwrap_or_else(|_| "America/Sao_Paulo".to_string()),
            slot_duration_minutes: Self::env_i64("SLOT_DURATION_MINUTES", 30),
            availability_lookahead_days: Self::env_i64("AVAILABILITY_LOOKAHEAD_DAYS", 14),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    fn env_i64(name: &str, default: i64) -> i64 {
        match env::var(name) {
            Ok(raw) => raw.parse().unwrap_or_else(|_| {
                warn!("{} is not a number, using default {}", name, default);
                default
            }),
            Err(_) => default,
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.supabase_url.is_empty() && !self.supabase_anon_key.is_empty()
    }
}
