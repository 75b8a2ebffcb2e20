use crate::cdp::CdpSession;
use crate::export::{export_png_with, export_svgs_with, ExportOptions};
use crate::layout::Layout;
use crate::{Driver, Error, Result, SessionConfig};
use std::path::PathBuf;
use std::sync::mpsc::{self, Sender};
use std::thread;
use tokio::sync::oneshot;

enum Command {
    ExportPng(Box<Layout>, ExportOptions, oneshot::Sender<Result<PathBuf>>),
    ExportSvgs(Box<Layout>, ExportOptions, oneshot::Sender<Result<Vec<PathBuf>>>),
    Close(oneshot::Sender<Result<()>>),
}

/// An async-friendly export facade backed by a dedicated worker thread.
///
/// The worker thread owns a synchronous `CdpSession` and executes export
/// commands sent from async tasks, so callers can use an async interface
/// without requiring the session to be `Send` across threads.
#[derive(Clone)]
pub struct AsyncExporter {
    cmd_tx: Sender<Command>,
}

impl AsyncExporter {
    /// Create a new exporter (spawns a background thread that owns the session).
    pub async fn new(config: Option<SessionConfig>) -> Result<Self> {
        let config = config.unwrap_or_default();

        let (cmd_tx, cmd_rx) = mpsc::channel::<Command>();
        let (init_tx, init_rx): (oneshot::Sender<Result<()>>, oneshot::Receiver<Result<()>>) =
            oneshot::channel();

        thread::spawn(move || {
            // Initialize the session on the worker thread
            let mut session = match CdpSession::new(config) {
                Ok(s) => s,
                Err(err) => {
                    let _ = init_tx.send(Err(err));
                    return;
                }
            };

            let _ = init_tx.send(Ok(()));

            // Command loop
            while let Ok(cmd) = cmd_rx.recv() {
                match cmd {
                    Command::ExportPng(layout, options, resp) => {
                        let res = export_png_with(&layout, &mut session, &options);
                        let _ = resp.send(res);
                    }
                    Command::ExportSvgs(layout, options, resp) => {
                        let res = export_svgs_with(&layout, &mut session, &options);
                        let _ = resp.send(res);
                    }
                    Command::Close(resp) => {
                        let res = session.close();
                        let _ = resp.send(res);
                        break;
                    }
                }
            }
        });

        // Wait for the worker to report initialization success or failure
        let init_res = init_rx
            .await
            .map_err(|e| Error::Other(format!("Worker init canceled: {}", e)))?;
        init_res?;

        Ok(Self { cmd_tx })
    }

    /// Export a layout as a PNG; returns the absolute path of the written file
    pub async fn export_png(&self, layout: &Layout, options: &ExportOptions) -> Result<PathBuf> {
        let (tx, rx) = oneshot::channel();
        let _ = self
            .cmd_tx
            .send(Command::ExportPng(Box::new(layout.clone()), options.clone(), tx));
        rx.await
            .map_err(|e| Error::Other(format!("ExportPng canceled: {}", e)))?
    }

    /// Export the SVG-backed plots within a layout, one file per plot
    pub async fn export_svgs(
        &self,
        layout: &Layout,
        options: &ExportOptions,
    ) -> Result<Vec<PathBuf>> {
        let (tx, rx) = oneshot::channel();
        let _ = self
            .cmd_tx
            .send(Command::ExportSvgs(Box::new(layout.clone()), options.clone(), tx));
        rx.await
            .map_err(|e| Error::Other(format!("ExportSvgs canceled: {}", e)))?
    }

    /// Shutdown the background worker and close the session.
    pub async fn close(self) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        let _ = self.cmd_tx.send(Command::Close(tx));
        rx.await
            .map_err(|e| Error::Other(format!("Close canceled: {}", e)))?
    }
}
