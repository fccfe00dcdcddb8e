use crate::gui_bridge::model::VisualizationModel;
use crate::workflow::config::WorkflowConfig;
use crate::workflow::runner::Runner;
use log::{error, info};
use serde_json::json;
use std::{
    net::SocketAddr,
    sync::{Arc, PoisonError, RwLock},
    thread,
};
use tokio::runtime::Builder;
use warp::{http::StatusCode, Filter};

pub fn gui_bind_address() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 9000))
}

/// Bridge that hosts the plot HTTP endpoint and regenerates waveforms on request.
pub struct GuiBridge {
    state: Arc<RwLock<VisualizationModel>>,
    runner: Arc<Runner>,
}

impl GuiBridge {
    pub fn new(runner: Arc<Runner>) -> Self {
        Self {
            state: Arc::new(RwLock::new(VisualizationModel::default())),
            runner,
        }
    }

    pub fn routes(
        &self,
    ) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
        let state = self.state.clone();
        let runner = self.runner.clone();
        let state_filter = warp::any().map(move || state.clone());
        let runner_filter = warp::any().map(move || runner.clone());

        let get_route = warp::path("waveform")
            .and(warp::get())
            .and(state_filter.clone())
            .map(|state: Arc<RwLock<VisualizationModel>>| {
                let guard = state.read().unwrap_or_else(PoisonError::into_inner);
                warp::reply::json(&*guard)
            });

        let generate_route = warp::path("generate")
            .and(warp::post())
            .and(warp::body::json())
            .and(state_filter)
            .and(runner_filter)
            .and_then(
                |config: WorkflowConfig,
                 state: Arc<RwLock<VisualizationModel>>,
                 runner: Arc<Runner>| async move {
                    let job_config = config.clone();
                    let outcome = tokio::task::spawn_blocking(move || {
                        runner.execute_with(&job_config)
                    })
                    .await
                    .map_err(anyhow::Error::from)
                    .and_then(|result| result);
                    match outcome {
                        Ok(result) => {
                            let records = result.record_count;
                            let mut guard = state.write().unwrap_or_else(PoisonError::into_inner);
                            *guard = result.model;
                            info!(
                                "[GUI] regenerated {} -> {} records",
                                config.output.display(),
                                records
                            );
                            Ok::<_, warp::Rejection>(warp::reply::with_status(
                                warp::reply::json(&json!({
                                    "status": "ok",
                                    "records": records,
                                    "output": config.output.display().to_string(),
                                })),
                                StatusCode::OK,
                            ))
                        }
                        Err(err) => {
                            error!("generate error: {:#}", err);
                            Ok(warp::reply::with_status(
                                warp::reply::json(&json!({
                                    "status": "error",
                                    "error": format!("{:#}", err),
                                })),
                                StatusCode::BAD_REQUEST,
                            ))
                        }
                    }
                },
            );

        get_route.or(generate_route)
    }

    /// Serves the routes from a background thread until the process exits.
    pub fn serve(&self, address: SocketAddr) {
        let routes = self.routes();
        thread::spawn(move || {
            let runtime = match Builder::new_current_thread().enable_all().build() {
                Ok(runtime) => runtime,
                Err(err) => {
                    error!("failed to build bridge runtime: {}", err);
                    return;
                }
            };
            runtime.block_on(async move {
                warp::serve(routes).run(address).await;
            });
        });
        info!("[GUI] serving waveform on http://{}/waveform", address);
    }

    pub fn publish(&self, model: &VisualizationModel) {
        let mut guard = self.state.write().unwrap_or_else(PoisonError::into_inner);
        *guard = model.clone();
        info!(
            "[GUI] plot points: {} of {} samples",
            guard.time.len(),
            guard.total_samples
        );
    }

    pub fn publish_status(&self, message: &str) {
        println!("[GUI] {}", message);
    }

    #[cfg(test)]
    pub fn snapshot(&self) -> VisualizationModel {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pwmcore::PwmConfig;
    use tempfile::tempdir;

    fn bridge_in(dir: &std::path::Path) -> (GuiBridge, WorkflowConfig) {
        let signal = PwmConfig {
            duration: 2e-3,
            ..Default::default()
        };
        let cfg = WorkflowConfig::from_args(dir.join("pwm.txt"), signal, 100);
        let runner = Arc::new(Runner::new(cfg.clone()));
        (GuiBridge::new(runner), cfg)
    }

    #[test]
    fn gui_bridge_updates_state() {
        let dir = tempdir().unwrap();
        let (gui, cfg) = bridge_in(dir.path());
        let result = Runner::new(cfg).execute().unwrap();
        gui.publish(&result.model);
        assert_eq!(gui.snapshot().total_samples, result.record_count);
    }

    #[tokio::test]
    async fn waveform_route_returns_published_model() {
        let dir = tempdir().unwrap();
        let (gui, cfg) = bridge_in(dir.path());
        let result = Runner::new(cfg).execute().unwrap();
        gui.publish(&result.model);

        let response = warp::test::request()
            .method("GET")
            .path("/waveform")
            .reply(&gui.routes())
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        let model: VisualizationModel = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(model.time.len(), 100);
        assert_eq!(model.total_samples, 2_000);
    }

    #[tokio::test]
    async fn generate_route_regenerates_and_rejects_bad_config() {
        let dir = tempdir().unwrap();
        let (gui, mut cfg) = bridge_in(dir.path());
        cfg.sine_amplitude = 5.0;

        let response = warp::test::request()
            .method("POST")
            .path("/generate")
            .json(&cfg)
            .reply(&gui.routes())
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(gui.snapshot().sine_amplitude, 5.0);
        assert!(cfg.output.exists());

        cfg.pwm_frequency = 0.0;
        let response = warp::test::request()
            .method("POST")
            .path("/generate")
            .json(&cfg)
            .reply(&gui.routes())
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
