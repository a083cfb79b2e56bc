//! Host service core logic.
//!
//! Runs the acceptor on its own task and drives the operator console on
//! this one. Every drawing command goes through the [`Dispatcher`], so the
//! host canvas is always updated before any client hears about it.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures::StreamExt;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::Notify;
use tokio_stream::wrappers::LinesStream;
use tracing::{info, warn};

use slate_core::{Acceptor, ConnectionRegistry, Dispatcher, Raster, SlateError};

use crate::config::HostConfig;
use crate::console::{Console, ConsoleAction, HELP};

// ── HostService ──────────────────────────────────────────────────

/// The top-level host service.
///
/// Owns the configuration, a running flag, and a stop signal that other
/// tasks (the Ctrl-C handler, tests) use to shut it down. A stop that
/// arrives before [`serve`](Self::serve) starts is kept, not lost.
pub struct HostService {
    config: HostConfig,
    running: AtomicBool,
    shutdown: Arc<Notify>,
}

enum Flow {
    Continue,
    Quit,
}

impl HostService {
    pub fn new(config: HostConfig) -> Self {
        Self {
            config,
            running: AtomicBool::new(false),
            shutdown: Arc::new(Notify::new()),
        }
    }

    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    /// Obtain a handle that can be used to stop the service from
    /// another task: call `notify_one` on it.
    pub fn stop_handle(&self) -> Arc<Notify> {
        Arc::clone(&self.shutdown)
    }

    /// Signal the service to stop.
    pub fn stop(&self) {
        self.shutdown.notify_one();
    }

    /// Whether the service is running.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Bind the acceptor on the configured address.
    pub async fn bind(&self) -> Result<Acceptor, SlateError> {
        Acceptor::bind(
            self.config.network.bind_address.as_str(),
            Arc::new(ConnectionRegistry::new()),
            self.config.link_options(),
        )
        .await
    }

    /// Bind, then serve with stdin as the operator console.
    pub async fn run(&self) -> Result<Raster, SlateError> {
        let acceptor = self.bind().await?;
        self.serve(acceptor, BufReader::new(tokio::io::stdin())).await
    }

    /// Serve until `quit`, or until the stop handle is cleared.
    ///
    /// Running out of console input does not stop the host; clients
    /// stay connected until an explicit stop. Returns the final host
    /// canvas.
    pub async fn serve<I>(&self, acceptor: Acceptor, input: I) -> Result<Raster, SlateError>
    where
        I: AsyncBufRead + Unpin,
    {
        self.running.store(true, Ordering::SeqCst);

        let registry = Arc::clone(acceptor.registry());
        let mut dispatcher = Dispatcher::new(self.config.new_raster(), Arc::clone(&registry))
            .with_max_frame_len(self.config.link_options().max_frame_len);
        let accept_task = acceptor.spawn();

        let mut console = Console::new(&self.config.console);
        let mut lines = LinesStream::new(input.lines());
        let mut input_open = true;

        loop {
            tokio::select! {
                line = lines.next(), if input_open => match line {
                    Some(Ok(line)) => {
                        if let Flow::Quit = Self::handle_line(&mut console, &mut dispatcher, &line).await {
                            break;
                        }
                    }
                    Some(Err(e)) => {
                        warn!("console read error: {e}");
                        input_open = false;
                    }
                    None => {
                        info!("console input closed; serving until stopped");
                        input_open = false;
                    }
                },
                _ = self.shutdown.notified() => break,
            }
        }

        let dropped = registry.disconnect_all().await;
        accept_task.abort();
        self.running.store(false, Ordering::SeqCst);
        info!("host stopped, {dropped} client(s) disconnected");
        Ok(dispatcher.into_raster())
    }

    // ── Internal ─────────────────────────────────────────────────

    async fn handle_line(console: &mut Console, dispatcher: &mut Dispatcher, line: &str) -> Flow {
        let action = match console.parse(line) {
            Ok(Some(action)) => action,
            Ok(None) => return Flow::Continue,
            Err(msg) => {
                println!("[ERR ] {msg}");
                return Flow::Continue;
            }
        };

        match action {
            ConsoleAction::Draw(command) => {
                let label = command.to_string();
                match dispatcher.dispatch(command).await {
                    Ok(report) => {
                        println!("[SEND] {label} -> {} client(s)", report.delivered);
                        for id in report.dropped {
                            println!("[DROP] {id}");
                        }
                    }
                    Err(e) => println!("[ERR ] {e}"),
                }
            }
            ConsoleAction::Settings { color, size } => {
                println!("brush: {color}, size {size}");
            }
            ConsoleAction::Peers => {
                let peers = dispatcher.registry().peers().await;
                if peers.is_empty() {
                    println!("no clients connected");
                }
                for peer in peers {
                    println!("{} {}", peer.id, peer.addr);
                }
            }
            ConsoleAction::Fingerprint => {
                println!("{}", dispatcher.raster().fingerprint());
            }
            ConsoleAction::Help => println!("{HELP}"),
            ConsoleAction::Quit => return Flow::Quit,
        }
        Flow::Continue
    }
}

// ── Tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use slate_core::{CommandCodec, HostLink, Renderer};
    use tokio::io::AsyncWriteExt;

    const TIMEOUT: Duration = Duration::from_secs(5);

    fn local_service() -> HostService {
        let mut config = HostConfig::default();
        config.network.bind_address = "127.0.0.1:0".into();
        HostService::new(config)
    }

    async fn wait_for_clients(registry: &ConnectionRegistry, n: usize) {
        tokio::time::timeout(TIMEOUT, async {
            while registry.len().await != n {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("registry never reached the expected size");
    }

    #[test]
    fn service_creates_with_defaults() {
        let svc = HostService::new(HostConfig::default());
        assert!(!svc.is_running());
        assert_eq!(svc.config().network.bind_address, "0.0.0.0:12345");
    }

    #[tokio::test]
    async fn stop_before_serve_is_not_lost() {
        let svc = local_service();
        let acceptor = svc.bind().await.unwrap();

        svc.stop_handle().notify_one();
        assert!(!svc.is_running());

        let raster = tokio::time::timeout(TIMEOUT, svc.serve(acceptor, &b""[..]))
            .await
            .expect("serve ignored a stop issued before it started")
            .unwrap();
        assert!(raster.is_blank());
        assert!(!svc.is_running());
    }

    #[tokio::test]
    async fn console_drives_connected_clients() {
        let svc = local_service();
        let acceptor = svc.bind().await.unwrap();
        let addr = acceptor.local_addr().unwrap();
        let registry = Arc::clone(acceptor.registry());

        let (mut operator, input) = tokio::io::duplex(1024);
        let host = tokio::spawn(async move { svc.serve(acceptor, BufReader::new(input)).await });

        let link = HostLink::connect(addr, CommandCodec::new()).await.unwrap();
        let client = tokio::spawn(async move {
            let mut raster = Raster::blank();
            let summary = link.mirror(&mut raster).await;
            (raster, summary)
        });
        wait_for_clients(&registry, 1).await;

        operator
            .write_all(b"line 0 0 10 10 black 2\nclear\nbogus\nrect 5 5 50 50 red 3\nquit\n")
            .await
            .unwrap();

        let host_raster = tokio::time::timeout(TIMEOUT, host)
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        let (client_raster, summary) = tokio::time::timeout(TIMEOUT, client)
            .await
            .unwrap()
            .unwrap();

        let mut expected = Raster::blank();
        expected.draw_rectangle((5.0, 5.0), (50.0, 50.0), "red", 3);

        assert!(summary.is_clean());
        assert_eq!(summary.applied, 3);
        assert_eq!(host_raster, expected);
        assert_eq!(client_raster, expected);
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn console_text_over_the_frame_limit_is_refused() {
        let mut config = HostConfig::default();
        config.network.bind_address = "127.0.0.1:0".into();
        config.protocol.max_frame_bytes = 128;
        let svc = HostService::new(config);
        let acceptor = svc.bind().await.unwrap();

        let script = format!("text 5 5 {}\nquit\n", "x".repeat(200));
        let raster = tokio::time::timeout(
            TIMEOUT,
            svc.serve(acceptor, std::io::Cursor::new(script.into_bytes())),
        )
        .await
        .unwrap()
        .unwrap();
        assert!(raster.is_blank());
    }

    #[tokio::test]
    async fn closed_console_keeps_serving_until_stopped() {
        let svc = Arc::new(local_service());
        let acceptor = svc.bind().await.unwrap();

        let serving = Arc::clone(&svc);
        let host = tokio::spawn(async move { serving.serve(acceptor, &b""[..]).await });

        tokio::time::timeout(TIMEOUT, async {
            while !svc.is_running() {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("service never started");
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(svc.is_running());

        svc.stop();
        let raster = tokio::time::timeout(TIMEOUT, host)
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        assert!(raster.is_blank());
        assert!(!svc.is_running());
    }
}
