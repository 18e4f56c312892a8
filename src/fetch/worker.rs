//! Background worker for profile loading and chart queries
//!
//! Keeps the UI responsive while polars scans the profile.

use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver, Sender, TryRecvError};
use std::thread::{self, JoinHandle};

use super::{ChartDataFetcher, ChartDataResponse, FetchEvent};
use crate::charts::ChartRequest;
use crate::data::{self, ProfileSource};
use crate::error::{DashboardError, Result};

/// Requests that can be sent to the background worker
enum WorkerRequest {
    LoadProfile { path: PathBuf },
    ChartData(ChartRequest),
    Shutdown,
}

/// Worker thread owning the loaded profile; talks to the UI only over channels
pub struct BackgroundFetcher {
    tx: Sender<WorkerRequest>,
    rx: Receiver<FetchEvent>,
    handle: Option<JoinHandle<()>>,
}

impl BackgroundFetcher {
    /// Spawn a new worker thread reading CSVs with `separator`
    pub fn spawn(separator: u8) -> Self {
        let (req_tx, req_rx) = channel::<WorkerRequest>();
        let (res_tx, res_rx) = channel::<FetchEvent>();

        let handle = thread::spawn(move || {
            Self::worker_loop(req_rx, res_tx, separator);
        });

        Self {
            tx: req_tx,
            rx: res_rx,
            handle: Some(handle),
        }
    }

    fn worker_loop(rx: Receiver<WorkerRequest>, tx: Sender<FetchEvent>, separator: u8) {
        let mut source: Option<ProfileSource> = None;

        while let Ok(request) = rx.recv() {
            let event = match request {
                WorkerRequest::LoadProfile { path } => {
                    match Self::load_profile(&path, separator, &tx) {
                        Ok((loaded, event)) => {
                            source = Some(loaded);
                            event
                        }
                        Err(e) => FetchEvent::Error {
                            message: e.user_message(),
                        },
                    }
                }
                WorkerRequest::ChartData(request) => {
                    FetchEvent::ChartData(Self::answer(source.as_ref(), &request))
                }
                WorkerRequest::Shutdown => break,
            };

            if tx.send(event).is_err() {
                break;
            }
        }
    }

    fn load_profile(
        path: &PathBuf,
        separator: u8,
        tx: &Sender<FetchEvent>,
    ) -> Result<(ProfileSource, FetchEvent)> {
        log::info!("loading profile {}", path.display());
        let source = ProfileSource::load(path, separator)?;

        let universes = source.collect_universes(|chunks| {
            let _ = tx.send(FetchEvent::ChunkParsed { chunks });
        })?;
        let summary = source.summary()?;

        let event = FetchEvent::ProfileLoaded {
            summary,
            events: universes.events,
            operators: universes.operators,
            pipelines: universes.pipelines,
        };
        Ok((source, event))
    }

    fn answer(source: Option<&ProfileSource>, request: &ChartRequest) -> ChartDataResponse {
        let result = source
            .ok_or_else(|| DashboardError::Custom("No profile loaded".to_string()))
            .and_then(|source| data::chart_data(source, request));

        match result {
            Ok(data) => ChartDataResponse::ok(request, data),
            Err(e) => ChartDataResponse::failed(request, e.user_message()),
        }
    }
}

impl ChartDataFetcher for BackgroundFetcher {
    fn load_profile(&self, path: PathBuf) {
        let _ = self.tx.send(WorkerRequest::LoadProfile { path });
    }

    fn request_chart_data(&self, request: ChartRequest) {
        let _ = self.tx.send(WorkerRequest::ChartData(request));
    }

    fn poll(&self) -> Option<FetchEvent> {
        match self.rx.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => None,
        }
    }
}

impl Drop for BackgroundFetcher {
    fn drop(&mut self) {
        let _ = self.tx.send(WorkerRequest::Shutdown);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
