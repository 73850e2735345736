//! Application wiring: feeds → status line → stdout.

use crate::config::AppConfig;
use crate::error::AppResult;
use dsts_bar::StatusLine;
use dsts_feeds::{mpd, tamriel, Clock};
use dsts_source::{Lifetime, Marquee, Notifier};
use std::sync::Arc;
use tokio::io::AsyncWrite;
use tracing::{info, warn};

pub struct Application {
    config: AppConfig,
    lifetime: Lifetime,
}

impl Application {
    pub fn new(config: AppConfig) -> AppResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            lifetime: Lifetime::new(),
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Root lifetime; cancelling it stops the status line.
    pub fn lifetime(&self) -> &Lifetime {
        &self.lifetime
    }

    /// Build a status line over `writer` with the configured feeds,
    /// left to right: MPD, Tamriel, Unix timestamp, date/time.
    pub fn build<W: AsyncWrite + Unpin>(&self, writer: W) -> AppResult<StatusLine<W>> {
        let mut line = StatusLine::new(self.lifetime.clone(), writer);

        if let Some(addr) = &self.config.mpd_addr {
            info!(addr = %addr, width = self.config.marquee_width, "Adding MPD feed");
            let mpd = mpd::provider(addr.clone());
            line.add_provider(Marquee::new(mpd, self.config.marquee_width))?;
        }

        if self.config.tamriel {
            info!("Adding Tamriel feed");
            line.add_provider(tamriel::provider)?;
        }

        if self.config.clock {
            info!("Adding clock feed");
            let clock = Clock::new(&self.lifetime);
            let slots = [Some(clock.unix_slot()), Some(clock.datetime_slot())];
            let notifier: Arc<dyn Notifier> = Arc::new(clock);
            line.add_notifier(Some(notifier))?;
            line.add_slots(slots)?;
        }

        Ok(line)
    }

    /// Run until interrupted (Ctrl-C or SIGTERM) or a feed fails.
    pub async fn run(self) -> AppResult<()> {
        let mut line = self.build(tokio::io::stdout())?;
        spawn_signal_handler(self.lifetime.clone());

        info!(blocks = line.board().len(), "Status line starting");
        line.run().await?;
        info!(frames = line.frames_written(), "Status line stopped");
        Ok(())
    }
}

fn spawn_signal_handler(lifetime: Lifetime) {
    tokio::spawn(async move {
        tokio::select! {
            _ = lifetime.cancelled() => return,
            _ = shutdown_signal() => {}
        }
        info!("Shutdown requested");
        lifetime.cancel();
    });
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use dsts_bar::HEADER;
    use std::time::Duration;

    #[test]
    fn test_rejects_invalid_config() {
        let config = AppConfig {
            marquee_width: 0,
            ..Default::default()
        };
        assert!(matches!(Application::new(config), Err(AppError::Config(_))));
    }

    #[test]
    fn test_build_lays_out_blocks() {
        let config = AppConfig {
            tamriel: true,
            mpd_addr: Some("127.0.0.1:6600".to_string()),
            ..Default::default()
        };
        let expected = config.block_count();
        let app = Application::new(config).unwrap();
        let line = app.build(Vec::new()).unwrap();

        assert_eq!(line.board().len(), expected);
        assert_eq!(line.notifier_count(), 3);
    }

    #[tokio::test]
    async fn test_clock_only_run_until_cancelled() {
        let app = Application::new(AppConfig::default()).unwrap();
        let mut line = app.build(Vec::new()).unwrap();

        let lifetime = app.lifetime().clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(500)).await;
            lifetime.cancel();
        });

        tokio::time::timeout(Duration::from_secs(5), line.run())
            .await
            .expect("status line did not stop")
            .unwrap();

        assert!(line.frames_written() >= 1);
        let out = String::from_utf8(line.into_writer()).unwrap();
        assert!(out.starts_with(HEADER));
        assert!(out.contains("\"full_text\":\"@"));
    }
}
