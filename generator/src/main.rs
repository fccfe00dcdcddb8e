use anyhow::Context;
use clap::Parser;
use gui_bridge::bridge::{gui_bind_address, GuiBridge};
use pwmcore::PwmConfig;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Builder as TokioBuilder;
use tokio::signal;
use workflow::config::{WorkflowConfig, DEFAULT_OUTPUT, DEFAULT_PLOT_POINTS};
use workflow::runner::Runner;

mod gui_bridge;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Natural PWM sine generator emitting PWL files")]
struct Args {
    /// Load a workflow config from YAML (replaces the signal flags)
    #[arg(long)]
    workflow: Option<PathBuf>,
    /// PWL output path
    #[arg(long, short, default_value = DEFAULT_OUTPUT)]
    output: PathBuf,
    /// Carrier frequency in Hz
    #[arg(long, default_value_t = 10_000.0)]
    pwm_frequency: f64,
    /// High-state output value
    #[arg(long, default_value_t = 24.0)]
    sine_amplitude: f64,
    /// Reference sine frequency in Hz
    #[arg(long, default_value_t = 100.0)]
    sine_frequency: f64,
    /// Total signal length in seconds
    #[arg(long, default_value_t = 0.1)]
    duration: f64,
    /// Sampling interval in seconds
    #[arg(long, default_value_t = 1e-6)]
    timestep: f64,
    /// Samples published to the visualizer
    #[arg(long, default_value_t = DEFAULT_PLOT_POINTS)]
    plot_points: usize,
    /// Keep the plot bridge alive for the visualizer
    #[arg(long, default_value_t = false)]
    serve: bool,
}

impl Args {
    fn signal(&self) -> PwmConfig {
        PwmConfig {
            pwm_frequency: self.pwm_frequency,
            sine_amplitude: self.sine_amplitude,
            sine_frequency: self.sine_frequency,
            duration: self.duration,
            timestep: self.timestep,
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let workflow_config = if let Some(path) = args.workflow.as_ref() {
        WorkflowConfig::load(path)?
    } else {
        WorkflowConfig::from_args(args.output.clone(), args.signal(), args.plot_points)
    };

    let runner = Arc::new(Runner::new(workflow_config));
    let result = runner.execute()?;

    println!(
        "Wrote {} records to {} (high fraction {:.4}, max duty error {:.4})",
        result.record_count,
        result.output_path.display(),
        result.high_fraction,
        result.max_duty_error
    );
    if let Some(fundamental) = result.fundamental_hz {
        println!("Baseband fundamental {:.1} Hz", fundamental);
    }

    if args.serve {
        let gui_bridge = GuiBridge::new(runner.clone());
        gui_bridge.publish(&result.model);
        gui_bridge.serve(gui_bind_address());
        gui_bridge.publish_status("Plot bridge running (Ctrl+C to stop)...");
        let runtime = TokioBuilder::new_current_thread()
            .enable_all()
            .build()
            .context("creating runtime for signal handling")?;
        runtime.block_on(async {
            signal::ctrl_c().await.context("awaiting Ctrl+C to exit")?;
            Ok::<(), anyhow::Error>(())
        })?;
    }

    let metrics = runner.metrics();
    log::info!(
        "session totals: generated {}, written {}, errors {}",
        metrics.generated,
        metrics.written,
        metrics.errors
    );

    Ok(())
}
