//! Periodic housekeeping for OTP records and refresh tokens
//!
//! Cleanup is not needed for correctness; it only bounds storage growth.
//! Failures are logged and the next cycle tries again.

use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use acct_shared::config::MaintenanceConfig;

use super::otp::OtpService;
use super::token::TokenService;

/// Runs the OTP and refresh-token cleanups on an interval
pub struct MaintenanceService {
    otp_service: Arc<OtpService>,
    token_service: Arc<TokenService>,
    config: MaintenanceConfig,
}

impl MaintenanceService {
    pub fn new(
        otp_service: Arc<OtpService>,
        token_service: Arc<TokenService>,
        config: MaintenanceConfig,
    ) -> Self {
        Self {
            otp_service,
            token_service,
            config,
        }
    }

    /// Run a single cleanup cycle
    pub async fn run_cleanup(&self) -> CleanupResult {
        let mut result = CleanupResult::default();

        match self.otp_service.cleanup_expired_otps().await {
            Ok(count) => result.otps_deleted = count,
            Err(e) => {
                error!(error = %e, "Failed to clean up OTP records");
                result.errors.push(format!("OTP cleanup error: {}", e));
            }
        }

        match self.token_service.cleanup_expired_tokens().await {
            Ok(count) => result.refresh_tokens_deleted = count,
            Err(e) => {
                error!(error = %e, "Failed to clean up refresh tokens");
                result
                    .errors
                    .push(format!("Refresh token cleanup error: {}", e));
            }
        }

        info!(
            otps_deleted = result.otps_deleted,
            refresh_tokens_deleted = result.refresh_tokens_deleted,
            event = "maintenance_cycle",
            "Maintenance cycle completed"
        );
        result
    }

    /// Spawn the cleanup loop; returns `None` when maintenance is disabled
    pub fn start_background_task(self: Arc<Self>) -> Option<tokio::task::JoinHandle<()>> {
        if !self.config.enabled {
            warn!("Maintenance task is disabled");
            return None;
        }

        let interval = Duration::from_secs(self.config.interval_seconds.max(1));

        Some(tokio::spawn(async move {
            info!(
                interval_seconds = self.config.interval_seconds,
                "Maintenance task started"
            );

            let mut interval_timer = tokio::time::interval(interval);
            loop {
                interval_timer.tick().await;
                let result = self.run_cleanup().await;
                if !result.is_success() {
                    warn!(errors = ?result.errors, "Maintenance cycle completed with errors");
                }
            }
        }))
    }
}

/// Result of a cleanup cycle
#[derive(Debug, Default)]
pub struct CleanupResult {
    pub otps_deleted: u64,
    pub refresh_tokens_deleted: usize,
    pub errors: Vec<String>,
}

impl CleanupResult {
    /// Check if the cleanup was successful (no errors)
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}
