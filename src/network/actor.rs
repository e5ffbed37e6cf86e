//! Network actor - runs service calls in the Tokio async runtime

use tokio::sync::mpsc;
use tokio::task::JoinSet;

use crate::config::Config;
use crate::messages::{NetworkCommand, NetworkResponse};
use crate::network::client::{resolved_path, ApiClient};

/// Network actor that executes service commands concurrently
pub struct NetworkActor {
    client: ApiClient,
    response_tx: mpsc::UnboundedSender<NetworkResponse>,
    active_requests: JoinSet<()>,
}

impl NetworkActor {
    pub fn new(config: Config, response_tx: mpsc::UnboundedSender<NetworkResponse>) -> Self {
        NetworkActor {
            client: ApiClient::new(config),
            response_tx,
            active_requests: JoinSet::new(),
        }
    }

    /// Run the network actor message loop
    pub async fn run(mut self, mut cmd_rx: mpsc::UnboundedReceiver<NetworkCommand>) {
        loop {
            tokio::select! {
                biased;

                cmd = cmd_rx.recv() => {
                    match cmd {
                        Some(NetworkCommand::Shutdown) | None => break,
                        Some(cmd) => self.dispatch(cmd),
                    }
                }

                // Clean up completed tasks
                Some(_result) = self.active_requests.join_next() => {}
            }
        }

        // No cancellation: anything still running is simply dropped
        self.active_requests.abort_all();
    }

    fn dispatch(&mut self, cmd: NetworkCommand) {
        let client = self.client.clone();
        let response_tx = self.response_tx.clone();

        self.active_requests.spawn(async move {
            let response = execute(&client, cmd).await;
            if let Some(response) = response {
                tracing::info!(id = response.id(), ok = response.is_ok(), "Request completed");
                let _ = response_tx.send(response);
            }
        });
    }
}

/// Run one command against the service
pub async fn execute(client: &ApiClient, cmd: NetworkCommand) -> Option<NetworkResponse> {
    let response = match cmd {
        NetworkCommand::UploadImage { id, file } => {
            tracing::info!(id, file = %file.file_name, "Uploading image");
            NetworkResponse::UploadFinished {
                id,
                result: client.upload_image(&file).await,
            }
        }
        NetworkCommand::FetchProfessions { id } => {
            tracing::info!(id, "Fetching professions");
            NetworkResponse::ProfessionsLoaded {
                id,
                result: client.get_professions().await,
            }
        }
        NetworkCommand::SwapFace { id, request } => {
            tracing::info!(id, image_id = %request.image_id, profession = %request.profession, "Swapping face");
            NetworkResponse::SwapFinished {
                id,
                result: client.swap_face(&request).await,
            }
        }
        NetworkCommand::DownloadResult { id, url, dest } => {
            tracing::info!(id, url = %url, "Downloading result");
            let result = client.download(&url, &dest).await.map(|bytes| {
                tracing::debug!(id, bytes, "Saved result image");
                resolved_path(&dest)
            });
            NetworkResponse::DownloadFinished { id, result }
        }
        NetworkCommand::HealthCheck { id } => NetworkResponse::HealthChecked {
            id,
            result: client.health().await,
        },
        NetworkCommand::Shutdown => return None,
    };

    Some(response)
}
